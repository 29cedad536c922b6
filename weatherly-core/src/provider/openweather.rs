use std::{error::Error as _, io};

use async_trait::async_trait;
use reqwest::Client;
use tracing::warn;

use crate::{
    config::UpstreamConfig,
    model::{WeatherQuery, WeatherResult},
};

use super::{ProviderError, WeatherProvider};

const CURRENT_WEATHER_PATH: &str = "/data/2.5/weather";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(config: &UpstreamConfig) -> anyhow::Result<Self> {
        let mut builder = Client::builder().timeout(config.timeout());

        if config.accept_invalid_certs {
            warn!("TLS certificate verification for OpenWeatherMap is DISABLED; use for local development only");
            builder = builder.danger_accept_invalid_certs(true);
        }

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http: builder.build()?,
        })
    }

    fn current_weather_url(&self) -> String {
        format!("{}{CURRENT_WEATHER_PATH}", self.base_url)
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current_weather(
        &self,
        query: &WeatherQuery,
        api_key: &str,
    ) -> Result<WeatherResult, ProviderError> {
        let res = self
            .http
            .get(self.current_weather_url())
            .query(&[
                ("q", query.city.as_str()),
                ("appid", api_key),
                ("units", "metric"),
            ])
            .send()
            .await
            .map_err(classify)?;

        let status = res.status();
        let body = res.text().await.map_err(classify)?;

        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        WeatherResult::from_json(body).map_err(|e| {
            ProviderError::Unexpected(format!("OpenWeatherMap returned a non-JSON body: {e}"))
        })
    }
}

/// Sort a transport error into connection-level or unexpected.
///
/// The URL is stripped because its query string carries the API key.
fn classify(err: reqwest::Error) -> ProviderError {
    let connection = err.is_connect() || err.is_timeout() || is_dropped_connection(&err);
    let err = err.without_url();

    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }

    if connection {
        ProviderError::Connection(message)
    } else {
        ProviderError::Unexpected(message)
    }
}

/// A connection the peer reset or closed mid-exchange, anywhere in the cause chain.
fn is_dropped_connection(err: &reqwest::Error) -> bool {
    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(io) = cause.downcast_ref::<io::Error>() {
            if matches!(
                io.kind(),
                io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::BrokenPipe
                    | io::ErrorKind::UnexpectedEof
            ) {
                return true;
            }
        }
        if let Some(hyper) = cause.downcast_ref::<hyper::Error>() {
            if hyper.is_incomplete_message() || hyper.is_closed() {
                return true;
            }
        }
        source = cause.source();
    }
    false
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let cut = (0..=MAX).rev().find(|&i| body.is_char_boundary(i)).unwrap_or(0);
        format!("{}...", &body[..cut])
    } else {
        body.to_string()
    }
}
