//! serve サブコマンド
//!
//! ディレクトリサーバーを起動します。

use crate::config::DirectoryConfig;
use clap::Args;

/// serve サブコマンドの引数
///
/// 指定がなければ環境変数（`ZETA_PORT`/`ZETA_HOST`）の値を使う。
#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Listen port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Bind address
    #[arg(short = 'H', long)]
    pub host: Option<String>,
}

impl ServeArgs {
    /// 引数で設定を上書き
    pub fn apply(&self, config: &mut DirectoryConfig) {
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
    }
}
