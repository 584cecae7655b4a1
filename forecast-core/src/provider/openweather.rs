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

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

/// The free 5-day feed never returns more than 40 three-hour slots.
const MAX_SLOTS: u32 = 40;
const SLOTS_PER_DAY: u32 = 8;

/// OpenWeatherMap 5-day / 3-hour forecast.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: &str) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    fn query_params(&self, query: &LocationQuery, days: u8) -> Vec<(&'static str, String)> {
        let mut params = match query {
            LocationQuery::Coordinates(c) => vec![
                ("lat", c.latitude.to_string()),
                ("lon", c.longitude.to_string()),
            ],
            LocationQuery::Text(q) => vec![("q", q.clone())],
        };

        let cnt = (u32::from(days) * SLOTS_PER_DAY).min(MAX_SLOTS);
        params.push(("appid", self.api_key.clone()));
        params.push(("units", "metric".to_string()));
        params.push(("cnt", cnt.to_string()));
        params
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    id: u32,
    main: String,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    dt_txt: String,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

impl From<OwForecastEntry> for ForecastSample {
    fn from(entry: OwForecastEntry) -> Self {
        let (condition_code, condition_label) = entry
            .weather
            .into_iter()
            .next()
            .map(|w| (w.id, w.main))
            .unwrap_or_else(|| (0, "Unknown".to_string()));

        ForecastSample {
            date_time: entry.dt_txt,
            timestamp: DateTime::<Utc>::from_timestamp(entry.dt, 0),
            temperature_c: entry.main.temp,
            condition_code,
            condition_label,
        }
    }
}

#[async_trait]
impl ForecastProvider for OpenWeatherProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenWeather
    }

    #[instrument(skip(self), fields(provider = "openweather"))]
    async fn fetch_forecast(
        &self,
        query: &LocationQuery,
        days: u8,
    ) -> Result<Vec<ForecastSample>, FetchError> {
        let provider = self.id();
        let url = format!("{}/data/2.5/forecast", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(&self.query_params(query, days))
            .send()
            .await
            .map_err(|source| FetchError::Transport { provider, source })?;

        let status = res.status();
        let body = res.text().await.map_err(|source| FetchError::Transport { provider, source })?;

        if !status.is_success() {
            return Err(FetchError::Status { provider, status, body: truncate_body(&body) });
        }

        let parsed: OwForecastResponse =
            serde_json::from_str(&body).map_err(|source| FetchError::Parse { provider, source })?;

        debug!(entries = parsed.list.len(), "OpenWeather forecast received");

        Ok(parsed.list.into_iter().map(ForecastSample::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Coordinate;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn forecast_body() -> serde_json::Value {
        serde_json::json!({
            "cod": "200",
            "message": 0,
            "cnt": 3,
            "list": [
                {
                    "dt": 1739556000,
                    "dt_txt": "2025-02-14 18:00:00",
                    "main": {"temp": 20.07, "feels_like": 19.59, "humidity": 56},
                    "weather": [{"id": 803, "main": "Clouds", "description": "broken clouds", "icon": "04n"}]
                },
                {
                    "dt": 1739566800,
                    "dt_txt": "2025-02-14 21:00:00",
                    "main": {"temp": 23.07, "feels_like": 19.59, "humidity": 56},
                    "weather": [{"id": 500, "main": "Rain", "description": "light rain", "icon": "10n"}]
                },
                {
                    "dt": 1739577600,
                    "dt_txt": "2025-02-15 00:00:00",
                    "main": {"temp": 22.07}
                }
            ],
            "city": {"name": "Nairobi", "country": "KE"}
        })
    }

    #[tokio::test]
    async fn fetches_samples_by_coordinates() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/forecast"))
            .and(query_param("lat", "-1.2921"))
            .and(query_param("lon", "36.8219"))
            .and(query_param("appid", "KEY"))
            .and(query_param("units", "metric"))
            .and(query_param("cnt", "40"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
            .expect(1)
            .mount(&server)
            .await;

        let provider = OpenWeatherProvider::with_base_url("KEY".into(), &server.uri());
        let query = LocationQuery::Coordinates(Coordinate::new(-1.2921, 36.8219));
        let samples = provider.fetch_forecast(&query, 5).await.unwrap();

        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0].date_time, "2025-02-14 18:00:00");
        assert_eq!(samples[0].condition_code, 803);
        assert_eq!(samples[0].condition_label, "Clouds");
        assert_eq!(samples[0].timestamp.map(|t| t.timestamp()), Some(1739556000));
        assert_eq!(samples[1].temperature_c, 23.07);
        assert_eq!(samples[2].condition_code, 0);
        assert_eq!(samples[2].condition_label, "Unknown");
    }

    #[tokio::test]
    async fn text_query_uses_q_and_limits_slots() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/2.5/forecast"))
            .and(query_param("q", "London"))
            .and(query_param("cnt", "16"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"list": []})))
            .expect(1)
            .mount(&server)
            .await;

        let provider = OpenWeatherProvider::with_base_url("KEY".into(), &server.uri());
        let samples = provider
            .fetch_forecast(&LocationQuery::Text("London".into()), 2)
            .await
            .unwrap();

        assert!(samples.is_empty());
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(401).set_body_string(r#"{"cod":401,"message":"Invalid API key"}"#),
            )
            .mount(&server)
            .await;

        let provider = OpenWeatherProvider::with_base_url("BAD".into(), &server.uri());
        let err = provider
            .fetch_forecast(&LocationQuery::Text("London".into()), 5)
            .await
            .unwrap_err();

        match err {
            FetchError::Status { status, body, .. } => {
                assert_eq!(status.as_u16(), 401);
                assert!(body.contains("Invalid API key"));
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_json_is_a_parse_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"list": [{"dt": "oops"}]}"#))
            .mount(&server)
            .await;

        let provider = OpenWeatherProvider::with_base_url("KEY".into(), &server.uri());
        let err = provider
            .fetch_forecast(&LocationQuery::Text("London".into()), 5)
            .await
            .unwrap_err();

        assert!(err.is_parse());
    }
}
