use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

/// A validated lookup: the city is present and not blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherQuery {
    pub city: String,
}

impl WeatherQuery {
    /// Returns `None` for a missing or blank city.
    pub fn new(city: Option<&str>) -> Option<Self> {
        let city = city.map(str::trim).filter(|c| !c.is_empty())?;
        Some(Self { city: city.to_owned() })
    }
}

/// Upstream weather payload, kept as the exact JSON text the provider sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeatherResult(Box<RawValue>);

impl WeatherResult {
    /// Wraps `body` after checking that it is valid JSON.
    pub fn from_json(body: String) -> serde_json::Result<Self> {
        RawValue::from_string(body).map(Self)
    }

    pub fn as_json(&self) -> &str {
        self.0.get()
    }
}

impl PartialEq for WeatherResult {
    fn eq(&self, other: &Self) -> bool {
        self.as_json() == other.as_json()
    }
}

/// Wire shape of every error the gateway returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
