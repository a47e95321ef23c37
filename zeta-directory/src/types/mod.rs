//! 型定義
//!
//! エンドポイントレコードとネットワークパラメータ

pub mod endpoint;
pub mod network;

pub use endpoint::{EndpointHealth, EndpointId, EndpointRecord, HealthPolicy, NewEndpoint};
pub use network::NetworkParameters;
