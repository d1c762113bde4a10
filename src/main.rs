use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use capital_projection::cli::{Cli, Command, render_projection};
use capital_projection::config::ServerConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = ServerConfig::from_env()?;
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    init_tracing(&config.log_level);

    match cli.command {
        Command::Serve(args) => {
            args.apply(&mut config);
            capital_projection::api::run_http_server(&config).await?;
        }
        Command::Project(args) => {
            let output = render_projection(&args, config.default_currency)?;
            println!("{output}");
        }
    }

    Ok(())
}

// Logs go to stderr so `project` output on stdout stays pipeable.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
