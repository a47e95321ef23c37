//! Zeta relay directory server entry point

use clap::Parser;
use zeta_directory::cli::{Cli, Commands};
use zeta_directory::config::DirectoryConfig;
use zeta_directory::{bootstrap, logging, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _log_guard = logging::init(&logging::LogSettings::from_env())?;

    let mut config = DirectoryConfig::from_env()?;
    if let Some(Commands::Serve(args)) = &cli.command {
        args.apply(&mut config);
    }

    let ctx = bootstrap::initialize(&config).await?;
    let bind_addr = format!("{}:{}", config.host, config.port);

    let result = server::run(ctx.state.clone(), &bind_addr).await;
    ctx.shutdown().await;
    result?;

    Ok(())
}
