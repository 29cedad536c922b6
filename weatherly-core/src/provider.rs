use crate::{Config, WeatherQuery, WeatherResult, provider::openweather::OpenWeatherProvider};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};
use thiserror::Error;

pub mod openweather;

/// Why a provider call did not yield a weather payload.
///
/// The variants carry diagnostic detail for logs only.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider answered with a non-success HTTP status.
    #[error("provider responded with status {status}: {body}")]
    Status { status: u16, body: String },

    /// The provider could not be reached (DNS, TLS, refused, reset, timeout).
    #[error("could not reach provider: {0}")]
    Connection(String),

    #[error("unexpected provider failure: {0}")]
    Unexpected(String),
}

/// Source of current weather for a city.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Fetch current conditions. Makes exactly one attempt.
    async fn current_weather(
        &self,
        query: &WeatherQuery,
        api_key: &str,
    ) -> Result<WeatherResult, ProviderError>;
}

/// Construct the OpenWeatherMap provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let provider = OpenWeatherProvider::new(&config.upstream)?;
    Ok(Arc::new(provider))
}
