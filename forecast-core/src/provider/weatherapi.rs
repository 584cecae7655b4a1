use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::{
    FetchError,
    model::{ForecastSample, LocationQuery},
    provider::truncate_body,
};

use super::{ForecastProvider, ProviderId};

const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com";

/// WeatherAPI.com daily forecast. Yields one sample per day.
#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl WeatherApiProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: &str) -> Self {
        Self { api_key, base_url: base_url.trim_end_matches('/').to_string(), http: Client::new() }
    }
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
    code: u32,
}

#[derive(Debug, Deserialize)]
struct WaDay {
    avgtemp_c: f64,
    condition: WaCondition,
}

#[derive(Debug, Deserialize)]
struct WaForecastDay {
    date: String,
    date_epoch: Option<i64>,
    day: WaDay,
}

#[derive(Debug, Deserialize)]
struct WaForecast {
    forecastday: Vec<WaForecastDay>,
}

#[derive(Debug, Deserialize)]
struct WaForecastResponse {
    forecast: WaForecast,
}

impl From<WaForecastDay> for ForecastSample {
    fn from(fd: WaForecastDay) -> Self {
        ForecastSample {
            date_time: fd.date,
            timestamp: fd.date_epoch.and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
            temperature_c: fd.day.avgtemp_c,
            condition_code: fd.day.condition.code,
            condition_label: fd.day.condition.text,
        }
    }
}

#[async_trait]
impl ForecastProvider for WeatherApiProvider {
    fn id(&self) -> ProviderId {
        ProviderId::WeatherApi
    }

    #[instrument(skip(self), fields(provider = "weatherapi"))]
    async fn fetch_forecast(
        &self,
        query: &LocationQuery,
        days: u8,
    ) -> Result<Vec<ForecastSample>, FetchError> {
        let provider = self.id();
        let url = format!("{}/v1/forecast.json", self.base_url);
        let q = query.to_string();
        let days = days.to_string();

        let res = self
            .http
            .get(&url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("q", q.as_str()),
                ("days", days.as_str()),
                ("aqi", "no"),
                ("alerts", "no"),
            ])
            .send()
            .await
            .map_err(|source| FetchError::Transport { provider, source })?;

        let status = res.status();
        let body = res.text().await.map_err(|source| FetchError::Transport { provider, source })?;

        if !status.is_success() {
            return Err(FetchError::Status { provider, status, body: truncate_body(&body) });
        }

        let parsed: WaForecastResponse =
            serde_json::from_str(&body).map_err(|source| FetchError::Parse { provider, source })?;

        debug!(days = parsed.forecast.forecastday.len(), "WeatherAPI forecast received");

        Ok(parsed.forecast.forecastday.into_iter().map(ForecastSample::from).collect())
    }
}
