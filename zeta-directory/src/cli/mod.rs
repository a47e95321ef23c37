//! CLI module for zeta-directory
//!
//! Provides command-line interface for the relay directory server.

pub mod serve;

use clap::{Parser, Subcommand};

/// Zeta Network relay directory - tracks relay health and serves the relay list
#[derive(Parser, Debug)]
#[command(name = "zeta-directory")]
#[command(version, about, long_about = None)]
#[command(after_help = r#"ENVIRONMENT VARIABLES:
    ZETA_HOST                        Bind address (default: 0.0.0.0)
    ZETA_PORT                        Listen port (default: 5000)
    ZETA_DATABASE_URL                SQLite URL (default: sqlite://zeta-directory.db)
    ZETA_HEALTH_CHECK_INTERVAL_SECS  Probe interval (default: 30)
    ZETA_PROBE_TIMEOUT_SECS          Per-probe timeout (default: 5)
    ZETA_FAILURE_THRESHOLD           Failures before Unreachable (default: 3)
    ZETA_SNAPSHOT_TTL_SECS           Snapshot cache TTL (default: 5)
    ZETA_INCLUDE_UNREACHABLE         Include unreachable relays in the relay list
    ZETA_UNREACHABLE_RETENTION_SECS  Evict relays unreachable this long (default: 86400, 0 = never)
    ZETA_TOPIC                       Pub/sub topic (default: /zeta2/social/v1)
    ZETA_PROTOCOL_VERSION            Protocol version (default: 1.0.0)
    ZETA_MAX_MESSAGE_LENGTH          Max message length (default: 280)
    ZETA_ADMIN_TOKEN                 Bearer token for relay add/remove
    ZETA_AUTH_DISABLED               Disable admin auth (dev/test only)
    ZETA_RELAYS_FILE                 YAML relay seed file
    ZETA_LOG_LEVEL                   Log filter (default: RUST_LOG or info)
    ZETA_LOG_DIR                     Directory for daily-rotated log files
"#)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the directory server
    Serve(serve::ServeArgs),
}
