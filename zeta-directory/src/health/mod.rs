//! リレーのヘルス監視
//!
//! - `probe`: 1回分の到達性チェック（HTTP/WebSocket）
//! - `prober`: エンドポイントごとの定期チェックタスクの管理

pub mod probe;
pub mod prober;

pub use probe::{HttpProbe, ProbeError, ProbeKind, ProbeTarget, RelayProbe};
pub use prober::HealthProber;
