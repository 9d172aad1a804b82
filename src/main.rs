use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use quill::config::{self, Config};
use quill::{AppContext, Server};

/// Serve the posts REST API.
#[derive(Parser, Debug)]
#[command(name = "quill", version, about)]
struct Cli {
    /// Config file; defaults to config/app.toml under PROJECT_PATH.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured host.
    #[arg(long)]
    host: Option<String>,

    /// Override the configured port.
    #[arg(long)]
    port: Option<u16>,

    /// Apply pending schema migrations before serving.
    #[arg(long)]
    migrate: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    config.override_server(cli.host, cli.port);

    if let Err(e) = quill::logging::init(&config.logging) {
        eprintln!("failed to initialize logging: {e}");
    }

    info!(env = %config.envname, "starting the app");

    match run(config, cli.migrate).await {
        Ok(()) => {
            info!("server shut down gracefully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "server exited with error");
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&std::path::Path>) -> quill::Result<Config> {
    match path {
        Some(path) => Config::load(path, &config::env_name(std::env::var("ENV").ok())),
        None => Config::from_env(),
    }
}

async fn run(config: Config, migrate: bool) -> quill::Result<()> {
    let addr = config.server.addr();
    let app = AppContext::connect(config).await?;
    if migrate {
        app.migrate().await?;
    }

    info!(%addr, "binding listener");
    Server::bind(addr).serve(app.router()).await
}
