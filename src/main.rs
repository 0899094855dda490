use clap::Parser;

use treefind::cli::commands::{init, query, serve};
use treefind::cli::{Cli, Commands};
use treefind::config::Settings;
use treefind::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Init writes the file it would otherwise load
    if let Commands::Init { force } = cli.command {
        return init::run_init(cli.config.as_deref(), force);
    }

    let config = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    }
    .map_err(|e| anyhow::anyhow!("Configuration error: {e}"))?;

    logging::init_with_config(&config.logging);

    match cli.command {
        Commands::Init { force } => init::run_init(cli.config.as_deref(), force),

        Commands::Config => init::run_config(&config),

        Commands::Serve { dir, socket } => {
            serve::run(serve::ServeArgs { dir, socket }, config).await
        }

        Commands::Query {
            pattern,
            socket,
            json,
        } => {
            let socket = socket.unwrap_or_else(|| config.socket_path.clone());
            query::run(query::QueryArgs {
                pattern,
                socket,
                json,
            })
            .await
        }
    }
}
