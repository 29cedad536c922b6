//! Binary crate for the `weatherly` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Running the weather gateway server
//! - Terminal rendering and interactive configuration

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use weatherly_core::Config;

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "weatherly=info,weatherly_core=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cmd = cli::Cli::parse();
    let config = Config::from_env()?;
    cmd.run(config).await
}
