//! Client side of the gateway: an HTTP caller plus the loading/error/success
//! state a front end renders from.

use reqwest::Client;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

use crate::{
    config::ClientConfig,
    model::{ErrorBody, WeatherResult},
};

/// Failure surfaced to the user by the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The gateway answered with an error; holds its message.
    #[error("{0}")]
    Gateway(String),

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("{0}")]
    Malformed(#[from] serde_json::Error),
}

/// Thin HTTP caller for `GET {base}/weather`.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    base_url: String,
    http: Client,
}

impl GatewayClient {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    pub async fn fetch(&self, city: &str) -> Result<WeatherResult, ClientError> {
        let res = self
            .http
            .get(format!("{}/weather", self.base_url))
            .query(&[("city", city)])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or_else(|_| format!("Error: {}", status.as_u16()));
            return Err(ClientError::Gateway(message));
        }

        Ok(WeatherResult::from_json(body)?)
    }
}

/// What the front end shows. Exactly one at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Loading,
    Error(String),
    Success(WeatherResult),
}

/// Handle for one issued request; carries its generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub generation: u64,
    pub city: String,
}

/// State machine that only accepts the outcome of the latest request.
#[derive(Debug)]
pub struct WeatherView {
    state: ViewState,
    latest: u64,
}

impl Default for WeatherView {
    fn default() -> Self {
        Self::new()
    }
}

impl WeatherView {
    pub fn new() -> Self {
        Self { state: ViewState::Loading, latest: 0 }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Enter loading for a new request and hand out its ticket.
    pub fn begin(&mut self, city: &str) -> Ticket {
        self.latest += 1;
        self.state = ViewState::Loading;
        Ticket { generation: self.latest, city: city.to_owned() }
    }

    /// Apply an outcome. Returns `false` if the ticket is stale and was dropped.
    pub fn complete(&mut self, ticket: &Ticket, outcome: Result<WeatherResult, ClientError>) -> bool {
        if ticket.generation != self.latest {
            debug!(
                city = %ticket.city,
                generation = ticket.generation,
                latest = self.latest,
                "dropping stale weather response"
            );
            return false;
        }

        self.state = match outcome {
            Ok(result) => ViewState::Success(result),
            Err(e) => ViewState::Error(e.to_string()),
        };
        true
    }
}

/// A client bound to a current city, as a front end would hold it.
#[derive(Debug)]
pub struct WeatherSession {
    client: GatewayClient,
    view: Mutex<WeatherView>,
    city: Mutex<String>,
}

impl WeatherSession {
    pub fn new(client: GatewayClient, city: impl Into<String>) -> Self {
        Self {
            client,
            view: Mutex::new(WeatherView::new()),
            city: Mutex::new(city.into()),
        }
    }

    pub async fn city(&self) -> String {
        self.city.lock().await.clone()
    }

    pub async fn state(&self) -> ViewState {
        self.view.lock().await.state().clone()
    }

    /// Switch to a new city from a search box. Blank terms are ignored.
    pub async fn search(&self, term: &str) -> bool {
        let term = term.trim();
        if term.is_empty() {
            return false;
        }
        *self.city.lock().await = term.to_owned();
        self.load(term).await;
        true
    }

    /// Re-issue the request for the current city.
    pub async fn retry(&self) {
        let city = self.city().await;
        self.load(&city).await;
    }

    async fn load(&self, city: &str) {
        let ticket = self.view.lock().await.begin(city);
        let outcome = self.client.fetch(city).await;
        self.view.lock().await.complete(&ticket, outcome);
    }
}
