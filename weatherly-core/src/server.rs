//! HTTP surface of the gateway.

use std::{future::Future, io, sync::Arc};

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::debug;

use crate::{
    gateway::{GatewayError, WeatherGateway},
    model::WeatherResult,
};

/// Query string of `GET /weather`.
#[derive(Debug, Deserialize)]
pub struct WeatherParams {
    pub city: Option<String>,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.body())).into_response()
    }
}

/// `GET /weather?city=...`
pub async fn get_weather(
    State(gateway): State<Arc<WeatherGateway>>,
    params: Result<Query<WeatherParams>, QueryRejection>,
) -> Result<Json<WeatherResult>, GatewayError> {
    let Query(params) = params.map_err(|rejection| {
        debug!(error = %rejection.body_text(), "rejected weather query string");
        GatewayError::Validation
    })?;
    gateway.weather(params.city.as_deref()).await.map(Json)
}

/// Router with the weather route mounted under `/api`.
pub fn router(gateway: Arc<WeatherGateway>) -> Router {
    let api = Router::new().route("/weather", get(get_weather));

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(gateway)
}

/// Serve `app` on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await
}
