//! Core library for Weatherly.
//!
//! This crate defines:
//! - Configuration loading (file + environment)
//! - The weather gateway and its HTTP router
//! - The OpenWeatherMap provider
//! - The gateway client, its view state and presentation helpers
//!
//! It is used by `weatherly-cli`, but can also be embedded in other binaries or services.

pub mod client;
pub mod config;
pub mod gateway;
pub mod model;
pub mod present;
pub mod provider;
pub mod server;

pub use client::{ClientError, GatewayClient, ViewState, WeatherSession, WeatherView};
pub use config::Config;
pub use gateway::{GatewayError, WeatherGateway};
pub use model::{ErrorBody, WeatherQuery, WeatherResult};
pub use present::{CurrentConditions, Unit};
pub use provider::{ProviderError, WeatherProvider, provider_from_config};
pub use server::router;
