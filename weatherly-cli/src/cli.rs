use std::{io::IsTerminal, sync::Arc};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use inquire::{Confirm, Password, PasswordDisplayMode};
use tokio::net::TcpListener;
use tracing::info;
use weatherly_core::{
    Config, CurrentConditions, GatewayClient, Unit, ViewState, WeatherGateway, WeatherSession,
    provider_from_config, server,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherly", version, about = "Weather gateway and terminal client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum UnitArg {
    Celsius,
    Fahrenheit,
}

impl From<UnitArg> for Unit {
    fn from(value: UnitArg) -> Self {
        match value {
            UnitArg::Celsius => Unit::Celsius,
            UnitArg::Fahrenheit => Unit::Fahrenheit,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the weather gateway HTTP server.
    Serve {
        /// Listen address; overrides config and WEATHERLY_BIND.
        #[arg(long)]
        bind: Option<String>,
    },

    /// Show current weather for a city via the gateway.
    Show {
        /// City name, e.g. "London" or "New York".
        city: String,

        #[arg(long, value_enum, default_value_t = UnitArg::Celsius)]
        unit: UnitArg,
    },

    /// Store the OpenWeatherMap API key in the config file.
    Configure,
}

impl Cli {
    pub async fn run(self, config: Config) -> anyhow::Result<()> {
        match self.command {
            Command::Serve { bind } => serve(config, bind).await,
            Command::Show { city, unit } => show(&config, &city, unit.into()).await,
            Command::Configure => configure(config),
        }
    }
}

async fn serve(config: Config, bind: Option<String>) -> anyhow::Result<()> {
    let addr = bind.unwrap_or_else(|| config.server.bind.clone());

    if config.api_key().is_none() {
        tracing::warn!(
            "no OpenWeatherMap API key configured; every lookup will fail until one is set"
        );
    }

    let provider = provider_from_config(&config)?;
    let gateway = WeatherGateway::new(Arc::new(config), provider);
    let app = server::router(Arc::new(gateway));

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(addr = %listener.local_addr()?, "weather gateway listening");

    server::serve(listener, app, async {
        let _ = tokio::signal::ctrl_c().await;
        info!("shutting down");
    })
    .await
    .context("Server error")
}

async fn show(config: &Config, city: &str, unit: Unit) -> anyhow::Result<()> {
    let session = WeatherSession::new(GatewayClient::new(&config.client), city);
    if !session.search(city).await {
        bail!("City name must not be empty");
    }

    loop {
        match session.state().await {
            ViewState::Success(result) => {
                let current = CurrentConditions::from_result(&result)
                    .context("Gateway returned weather in an unexpected shape")?;
                print_card(&current, unit);
                return Ok(());
            }
            ViewState::Error(message) => {
                eprintln!("Error: {message}");
                let interactive = std::io::stdin().is_terminal();
                if interactive && Confirm::new("Try again?").with_default(true).prompt()? {
                    session.retry().await;
                    continue;
                }
                bail!(message);
            }
            ViewState::Loading => bail!("Weather lookup did not complete"),
        }
    }
}

fn print_card(current: &CurrentConditions, unit: Unit) {
    const RESET: &str = "\x1b[0m";
    let color = current.theme().ansi();
    let mut lines = current.render(unit).into_iter();

    if let Some(heading) = lines.next() {
        println!("{color}{heading}{RESET}  ({})", unit.symbol());
    }
    for line in lines {
        println!("  {line}");
    }
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let key = Password::new("OpenWeatherMap API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()?;

    if key.trim().is_empty() {
        bail!("API key must not be empty");
    }

    config.set_api_key(key.trim().to_string());
    let path = config.save()?;
    println!("Saved API key to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_show_with_unit() {
        let cli = Cli::try_parse_from(["weatherly", "show", "New York", "--unit", "fahrenheit"])
            .expect("valid args");

        match cli.command {
            Command::Show { city, unit } => {
                assert_eq!(city, "New York");
                assert_eq!(Unit::from(unit), Unit::Fahrenheit);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_serve_bind_override() {
        let cli = Cli::try_parse_from(["weatherly", "serve", "--bind", "0.0.0.0:8080"])
            .expect("valid args");

        assert!(matches!(cli.command, Command::Serve { bind: Some(b) } if b == "0.0.0.0:8080"));
    }

    #[test]
    fn show_requires_city() {
        assert!(Cli::try_parse_from(["weatherly", "show"]).is_err());
    }
}
