use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Nairobi city, GPO.
    pub const NAIROBI: Coordinate = Coordinate { latitude: -1.2921, longitude: 36.8219 };

    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl Default for Coordinate {
    fn default() -> Self {
        Self::NAIROBI
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// Where to fetch a forecast for.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    Coordinates(Coordinate),
    /// Free-text place name, e.g. "London" or "Nairobi, KE".
    Text(String),
}

impl From<Coordinate> for LocationQuery {
    fn from(value: Coordinate) -> Self {
        LocationQuery::Coordinates(value)
    }
}

impl std::fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocationQuery::Coordinates(c) => std::fmt::Display::fmt(c, f),
            LocationQuery::Text(s) => f.write_str(s),
        }
    }
}

/// One raw reading as delivered by a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    /// Provider date-time text, expected to start with `yyyy-MM-dd`.
    pub date_time: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub temperature_c: f64,
    pub condition_code: u32,
    pub condition_label: String,
}

impl ForecastSample {
    pub fn new(
        date_time: impl Into<String>,
        temperature_c: f64,
        condition_code: u32,
        condition_label: impl Into<String>,
    ) -> Self {
        Self {
            date_time: date_time.into(),
            timestamp: None,
            temperature_c,
            condition_code,
            condition_label: condition_label.into(),
        }
    }

    /// Calendar day this sample belongs to: the first 10 characters.
    ///
    /// Strings too short to hold a date are used whole.
    pub fn day_tag(&self) -> &str {
        match self.date_time.char_indices().nth(10) {
            Some((idx, _)) => &self.date_time[..idx],
            None => &self.date_time,
        }
    }
}

/// Aggregated forecast for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    /// `yyyy-mm-dd`
    pub date: String,
    pub temperature_c: f64,
    pub condition_code: u32,
    pub condition_label: String,
}

impl DaySummary {
    pub fn weekday(&self) -> String {
        day_of_week(&self.date)
    }
}

/// Full English weekday name for a `yyyy-mm-dd` date, or an empty string
/// when the date does not parse.
pub fn day_of_week(date: &str) -> String {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|d| d.format("%A").to_string())
        .unwrap_or_default()
}
