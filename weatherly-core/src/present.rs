//! Pure view-side derivations from a [`WeatherResult`].

use chrono::DateTime;
use serde::Deserialize;

use crate::model::WeatherResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Unit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl Unit {
    pub fn symbol(self) -> &'static str {
        match self {
            Unit::Celsius => "°C",
            Unit::Fahrenheit => "°F",
        }
    }

    /// Convert a Celsius reading and round half-up to whole degrees.
    pub fn convert(self, celsius: f64) -> i64 {
        let value = match self {
            Unit::Celsius => celsius,
            Unit::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
        };
        (value + 0.5).floor() as i64
    }
}

/// Background mood picked from the first condition's `main` group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Rain,
    Clouds,
    Clear,
    Snow,
    Neutral,
}

impl Theme {
    pub fn from_condition(main: &str) -> Self {
        let main = main.to_lowercase();
        if main.contains("rain") {
            Theme::Rain
        } else if main.contains("clouds") {
            Theme::Clouds
        } else if main.contains("clear") {
            Theme::Clear
        } else if main.contains("snow") {
            Theme::Snow
        } else {
            Theme::Neutral
        }
    }

    /// ANSI foreground colour used for headings.
    pub fn ansi(self) -> &'static str {
        match self {
            Theme::Rain => "\x1b[34m",
            Theme::Clouds => "\x1b[37m",
            Theme::Clear => "\x1b[33m",
            Theme::Snow => "\x1b[36m",
            Theme::Neutral => "\x1b[39m",
        }
    }
}

/// Glyph for an OpenWeatherMap icon code such as `01d` or `10n`.
pub fn icon_glyph(code: &str) -> &'static str {
    match code {
        "01d" => "☀",
        "01n" => "☾",
        "02d" | "02n" => "⛅",
        "03d" | "03n" | "04d" | "04n" => "☁",
        "09d" | "09n" => "🌧",
        "10d" | "10n" => "🌦",
        "11d" | "11n" => "⚡",
        "13d" | "13n" => "❄",
        "50d" | "50n" => "🌫",
        _ => "?",
    }
}

/// `07:13 AM` in the location's local time.
pub fn format_local_time(timestamp: i64, utc_offset_secs: i64) -> String {
    DateTime::from_timestamp(timestamp.saturating_add(utc_offset_secs), 0)
        .map(|t| t.format("%I:%M %p").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}

/// `Tuesday, November 14, 2023` in the location's local time.
pub fn format_local_date(timestamp: i64, utc_offset_secs: i64) -> String {
    DateTime::from_timestamp(timestamp.saturating_add(utc_offset_secs), 0)
        .map(|t| t.format("%A, %B %-d, %Y").to_string())
        .unwrap_or_default()
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Readings {
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: f64,
    pub pressure: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Condition {
    pub main: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Wind {
    pub speed: f64,
    pub deg: f64,
    pub gust: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Sun {
    pub country: String,
    pub sunrise: i64,
    pub sunset: i64,
}

/// The fields of a current-weather payload the views read.
///
/// Missing fields fall back to defaults so partial payloads still render.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CurrentConditions {
    pub name: String,
    pub dt: i64,
    pub timezone: i64,
    pub main: Readings,
    pub weather: Vec<Condition>,
    pub wind: Wind,
    pub visibility: Option<f64>,
    pub sys: Sun,
}

impl CurrentConditions {
    pub fn from_result(result: &WeatherResult) -> serde_json::Result<Self> {
        serde_json::from_str(result.as_json())
    }

    pub fn condition(&self) -> Option<&Condition> {
        self.weather.first()
    }

    pub fn theme(&self) -> Theme {
        self.condition()
            .map(|c| Theme::from_condition(&c.main))
            .unwrap_or(Theme::Neutral)
    }

    pub fn location(&self) -> String {
        if self.sys.country.is_empty() {
            self.name.clone()
        } else {
            format!("{}, {}", self.name, self.sys.country)
        }
    }

    /// Text lines for a terminal card.
    pub fn render(&self, unit: Unit) -> Vec<String> {
        let (glyph, description) = self
            .condition()
            .map(|c| (icon_glyph(&c.icon), c.description.as_str()))
            .unwrap_or(("?", "unknown"));

        let mut lines = vec![
            self.location(),
            format_local_date(self.dt, self.timezone),
            format!("{glyph}  {}° {description}", unit.convert(self.main.temp)),
            format!("Feels like {}°", unit.convert(self.main.feels_like)),
            format!("Wind: {} m/s", self.wind.speed),
        ];
        if let Some(gust) = self.wind.gust {
            lines.push(format!("Gusts: {gust} m/s"));
        }
        lines.push(format!("Humidity: {}%", self.main.humidity));
        lines.push(format!("Pressure: {} hPa", self.main.pressure));
        if let Some(visibility) = self.visibility {
            lines.push(format!("Visibility: {:.1} km", visibility / 1000.0));
        }
        lines.push(format!("Sunrise: {}", format_local_time(self.sys.sunrise, self.timezone)));
        lines.push(format!("Sunset: {}", format_local_time(self.sys.sunset, self.timezone)));
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONDON: &str = r#"{"name":"London","main":{"temp":15.2},"weather":[{"icon":"01d","description":"clear sky"}],"sys":{"country":"GB","sunrise":1700000000,"sunset":1700030000},"timezone":0}"#;

    #[test]
    fn converts_and_rounds_half_up() {
        assert_eq!(Unit::Celsius.convert(15.2), 15);
        assert_eq!(Unit::Celsius.convert(-2.5), -2);
        assert_eq!(Unit::Fahrenheit.convert(15.2), 59);
        assert_eq!(Unit::Fahrenheit.convert(-40.0), -40);
    }

    #[test]
    fn theme_follows_condition_group() {
        assert_eq!(Theme::from_condition("Rain"), Theme::Rain);
        assert_eq!(Theme::from_condition("Clouds"), Theme::Clouds);
        assert_eq!(Theme::from_condition("Clear"), Theme::Clear);
        assert_eq!(Theme::from_condition("Snow"), Theme::Snow);
        assert_eq!(Theme::from_condition("Mist"), Theme::Neutral);
    }

    #[test]
    fn unknown_icon_falls_back() {
        assert_eq!(icon_glyph("01d"), "☀");
        assert_eq!(icon_glyph("99x"), "?");
    }

    #[test]
    fn times_use_utc_offset() {
        assert_eq!(format_local_time(1_700_000_000, 0), "10:13 PM");
        assert_eq!(format_local_time(1_700_030_000, 0), "06:33 AM");
        assert_eq!(format_local_time(1_700_000_000, 3 * 3600), "01:13 AM");
        assert_eq!(format_local_date(1_700_000_000, 0), "Tuesday, November 14, 2023");
    }

    #[test]
    fn renders_london_scenario() {
        let result = WeatherResult::from_json(LONDON.to_string()).expect("valid json");
        let current = CurrentConditions::from_result(&result).expect("parses");

        assert_eq!(current.location(), "London, GB");
        assert_eq!(current.theme(), Theme::Neutral);

        let lines = current.render(Unit::Celsius);
        assert_eq!(lines[0], "London, GB");
        assert!(lines[2].contains("15°"));
        assert!(lines[2].contains("clear sky"));
        assert!(lines.iter().any(|l| l == "Sunrise: 10:13 PM"));
    }

    #[test]
    fn empty_payload_still_renders() {
        let result = WeatherResult::from_json("{}".to_string()).expect("valid json");
        let current = CurrentConditions::from_result(&result).expect("parses");

        let lines = current.render(Unit::Fahrenheit);
        assert!(lines[2].contains("unknown"));
    }
}
