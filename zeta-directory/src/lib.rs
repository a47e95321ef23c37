//! Zeta Network relay directory
//!
//! リレーノードの一覧とヘルス状態を管理し、クライアントへ配布するサーバー

#![warn(missing_docs)]

/// 共通型定義（エラー型）
pub mod common;

/// 型定義
pub mod types;

/// データベースアクセス
pub mod db;

/// リレー登録管理
pub mod registry;

/// ヘルスチェック監視
pub mod health;

/// スナップショット生成とキャッシュ
pub mod snapshot;

/// REST APIハンドラー
pub mod api;

/// 設定管理（環境変数ヘルパー）
pub mod config;

/// ロギング初期化ユーティリティ
pub mod logging;

/// 協調シャットダウン
pub mod shutdown;

/// HTTPサーバー起動
pub mod server;

/// 起動処理（DB・レジストリ・バックグラウンドタスク）
pub mod bootstrap;

/// CLIインターフェース
pub mod cli;

use api::auth::AdminAuth;
use registry::RelayRegistry;
use shutdown::ShutdownController;
use snapshot::SnapshotCache;
use std::sync::Arc;
use types::network::NetworkParameters;

/// アプリケーション状態
#[derive(Clone)]
pub struct AppState {
    /// リレーレジストリ
    pub registry: RelayRegistry,
    /// スナップショットキャッシュ
    pub snapshots: SnapshotCache,
    /// ネットワークパラメータ
    pub network: Arc<NetworkParameters>,
    /// 管理APIの認証設定
    pub admin: AdminAuth,
    /// シャットダウン制御
    pub shutdown: ShutdownController,
}
