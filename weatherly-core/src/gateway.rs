//! The weather gateway: validates a lookup, forwards it to the provider and
//! folds every failure into one of a few fixed, caller-safe errors.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, instrument};

use crate::{
    Config,
    model::{ErrorBody, WeatherQuery, WeatherResult},
    provider::{ProviderError, WeatherProvider},
};

pub const CITY_REQUIRED: &str = "The city field is required.";
pub const NOT_CONFIGURED: &str = "API key not configured. Please contact support.";
pub const UPSTREAM_FAILED: &str =
    "Failed to fetch weather data. Please try again later or check the city name.";
pub const CONNECTION_FAILED: &str =
    "Could not connect to the weather service. Please try again later.";
pub const UNEXPECTED: &str = "An unexpected error occurred. Please try again later.";

/// Failures the gateway reports to its callers.
///
/// Each variant has exactly one status and one fixed message; the detail
/// behind it is logged, never returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("{}", CITY_REQUIRED)]
    Validation,

    #[error("{}", NOT_CONFIGURED)]
    Configuration,

    #[error("{}", UPSTREAM_FAILED)]
    Upstream { status: u16 },

    #[error("{}", CONNECTION_FAILED)]
    Connection,

    #[error("{}", UNEXPECTED)]
    Unexpected,
}

impl GatewayError {
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Validation => 422,
            Self::Configuration | Self::Unexpected => 500,
            Self::Upstream { status } => *status,
            Self::Connection => 503,
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody { error: self.message() }
    }
}

/// Stateless proxy in front of a [`WeatherProvider`].
#[derive(Debug, Clone)]
pub struct WeatherGateway {
    config: Arc<Config>,
    provider: Arc<dyn WeatherProvider>,
}

impl WeatherGateway {
    pub fn new(config: Arc<Config>, provider: Arc<dyn WeatherProvider>) -> Self {
        Self { config, provider }
    }

    /// Look up current weather for `city`.
    ///
    /// Validation and configuration are checked before any network call.
    #[instrument(skip(self))]
    pub async fn weather(&self, city: Option<&str>) -> Result<WeatherResult, GatewayError> {
        let query = WeatherQuery::new(city).ok_or(GatewayError::Validation)?;

        let Some(api_key) = self.config.api_key() else {
            error!("OpenWeatherMap API key not configured");
            return Err(GatewayError::Configuration);
        };

        match self.provider.current_weather(&query, api_key).await {
            Ok(result) => {
                debug!(city = %query.city, "weather fetched");
                Ok(result)
            }
            Err(ProviderError::Status { status, body }) => {
                error!(city = %query.city, status, response = %body, "OpenWeatherMap request failed");
                Err(GatewayError::Upstream { status })
            }
            Err(ProviderError::Connection(e)) => {
                error!(city = %query.city, error = %e, "could not connect to OpenWeatherMap");
                Err(GatewayError::Connection)
            }
            Err(ProviderError::Unexpected(e)) => {
                error!(city = %query.city, error = %e, "unexpected error while fetching weather");
                Err(GatewayError::Unexpected)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, Copy)]
    enum Outcome {
        Ok,
        Status(u16),
        Connection,
        Unexpected,
    }

    #[derive(Debug)]
    struct FakeProvider {
        outcome: Outcome,
        calls: AtomicUsize,
    }

    impl FakeProvider {
        fn new(outcome: Outcome) -> Arc<Self> {
            Arc::new(Self { outcome, calls: AtomicUsize::new(0) })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl WeatherProvider for FakeProvider {
        async fn current_weather(
            &self,
            query: &WeatherQuery,
            _api_key: &str,
        ) -> Result<WeatherResult, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.outcome {
                Outcome::Ok => Ok(WeatherResult::from_json(format!(r#"{{"name":"{}"}}"#, query.city))
                    .expect("valid json")),
                Outcome::Status(status) => Err(ProviderError::Status {
                    status,
                    body: r#"{"cod":"404","message":"city not found"}"#.into(),
                }),
                Outcome::Connection => Err(ProviderError::Connection("connection refused".into())),
                Outcome::Unexpected => Err(ProviderError::Unexpected("boom".into())),
            }
        }
    }

    fn configured() -> Arc<Config> {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".into());
        Arc::new(cfg)
    }

    #[tokio::test]
    async fn forwards_successful_payload() {
        let provider = FakeProvider::new(Outcome::Ok);
        let gateway = WeatherGateway::new(configured(), provider.clone());

        let result = gateway.weather(Some("London")).await.expect("success");

        assert_eq!(result.as_json(), r#"{"name":"London"}"#);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn missing_or_blank_city_never_reaches_provider() {
        let provider = FakeProvider::new(Outcome::Ok);
        let gateway = WeatherGateway::new(configured(), provider.clone());

        for city in [None, Some(""), Some("   ")] {
            let err = gateway.weather(city).await.unwrap_err();
            assert_eq!(err, GatewayError::Validation);
            assert_eq!(err.http_status(), 422);
        }
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn missing_api_key_fails_before_provider() {
        let provider = FakeProvider::new(Outcome::Ok);
        let gateway = WeatherGateway::new(Arc::new(Config::default()), provider.clone());

        let err = gateway.weather(Some("London")).await.unwrap_err();

        assert_eq!(err.http_status(), 500);
        assert_eq!(err.message(), NOT_CONFIGURED);
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn upstream_status_is_mirrored_with_fixed_message() {
        let gateway = WeatherGateway::new(configured(), FakeProvider::new(Outcome::Status(404)));

        let err = gateway.weather(Some("Atlantis")).await.unwrap_err();

        assert_eq!(err.http_status(), 404);
        assert_eq!(err.body().error, UPSTREAM_FAILED);
    }

    #[tokio::test]
    async fn connection_failure_maps_to_503() {
        let gateway = WeatherGateway::new(configured(), FakeProvider::new(Outcome::Connection));

        let err = gateway.weather(Some("London")).await.unwrap_err();

        assert_eq!(err.http_status(), 503);
        assert_eq!(err.message(), CONNECTION_FAILED);
    }

    #[tokio::test]
    async fn anything_else_maps_to_500() {
        let gateway = WeatherGateway::new(configured(), FakeProvider::new(Outcome::Unexpected));

        let err = gateway.weather(Some("London")).await.unwrap_err();

        assert_eq!(err.http_status(), 500);
        assert_eq!(err.message(), UNEXPECTED);
    }

    #[tokio::test]
    async fn repeated_lookups_are_independent() {
        let provider = FakeProvider::new(Outcome::Ok);
        let gateway = WeatherGateway::new(configured(), provider.clone());

        let first = gateway.weather(Some("Paris")).await.expect("success");
        let second = gateway.weather(Some("Paris")).await.expect("success");

        assert_eq!(first, second);
        assert_eq!(provider.calls(), 2);
    }
}
