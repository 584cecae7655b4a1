//! Best-effort location lookup.
//!
//! A [`LocationSource`] produces a coordinate or an error. [`resolve_location`]
//! wraps any source with a timeout and a fallback coordinate so callers always
//! get something to query with.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::{LocationError, model::Coordinate};

const DEFAULT_IP_LOOKUP_URL: &str = "http://ip-api.com";

#[async_trait]
pub trait LocationSource: Send + Sync + std::fmt::Debug {
    async fn locate(&self) -> Result<Coordinate, LocationError>;
}

/// Outcome of [`resolve_location`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocationFix {
    Live(Coordinate),
    Fallback(Coordinate),
}

impl LocationFix {
    pub fn coordinate(&self) -> Coordinate {
        match self {
            LocationFix::Live(c) | LocationFix::Fallback(c) => *c,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, LocationFix::Fallback(_))
    }
}

/// Ask `source` for a coordinate, giving up after `timeout`.
///
/// Failures are logged and replaced by `fallback`; they never reach the caller.
#[instrument(skip(source))]
pub async fn resolve_location(
    source: &dyn LocationSource,
    timeout: Duration,
    fallback: Coordinate,
) -> LocationFix {
    match tokio::time::timeout(timeout, source.locate()).await {
        Ok(Ok(coordinate)) => {
            debug!(%coordinate, "Location resolved");
            LocationFix::Live(coordinate)
        }
        Ok(Err(err)) => {
            warn!(error = %err, %fallback, "Could not retrieve location, using fallback");
            LocationFix::Fallback(fallback)
        }
        Err(_) => {
            warn!(?timeout, %fallback, "Location lookup timed out, using fallback");
            LocationFix::Fallback(fallback)
        }
    }
}

/// Always answers with the same coordinate.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinate);

#[async_trait]
impl LocationSource for FixedLocation {
    async fn locate(&self) -> Result<Coordinate, LocationError> {
        Ok(self.0)
    }
}

/// Approximate location from the public IP address (ip-api.com format).
#[derive(Debug, Clone)]
pub struct IpLocation {
    base_url: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    status: String,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl IpLocation {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_IP_LOOKUP_URL)
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self { base_url: base_url.trim_end_matches('/').to_string(), http: Client::new() }
    }
}

impl Default for IpLocation {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LocationSource for IpLocation {
    async fn locate(&self) -> Result<Coordinate, LocationError> {
        let url = format!("{}/json", self.base_url);
        let body = self.http.get(&url).send().await?.error_for_status()?.text().await?;
        let parsed: IpLookupResponse = serde_json::from_str(&body)?;

        match (parsed.status.as_str(), parsed.lat, parsed.lon) {
            ("success", Some(lat), Some(lon)) => Ok(Coordinate::new(lat, lon)),
            _ => Err(LocationError::Unavailable(
                parsed.message.unwrap_or_else(|| format!("lookup status '{}'", parsed.status)),
            )),
        }
    }
}

/// Tries each source in order; the first coordinate wins.
#[derive(Debug, Default)]
pub struct LocationChain {
    sources: Vec<Box<dyn LocationSource>>,
}

impl LocationChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, source: impl LocationSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }
}

#[async_trait]
impl LocationSource for LocationChain {
    async fn locate(&self) -> Result<Coordinate, LocationError> {
        let mut last_err = LocationError::NoSources;

        for source in &self.sources {
            match source.locate().await {
                Ok(coordinate) => return Ok(coordinate),
                Err(err) => {
                    debug!(?source, error = %err, "Location source failed, trying next");
                    last_err = err;
                }
            }
        }

        Err(last_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug)]
    struct Failing;

    #[async_trait]
    impl LocationSource for Failing {
        async fn locate(&self) -> Result<Coordinate, LocationError> {
            Err(LocationError::Unavailable("no fix".into()))
        }
    }

    #[derive(Debug)]
    struct Stalled;

    #[async_trait]
    impl LocationSource for Stalled {
        async fn locate(&self) -> Result<Coordinate, LocationError> {
            std::future::pending().await
        }
    }

    const LONDON: Coordinate = Coordinate { latitude: 51.52, longitude: -0.11 };

    #[tokio::test]
    async fn live_coordinate_is_returned() {
        let fix =
            resolve_location(&FixedLocation(LONDON), Duration::from_secs(1), Coordinate::NAIROBI)
                .await;
        assert_eq!(fix, LocationFix::Live(LONDON));
        assert!(!fix.is_fallback());
    }

    #[tokio::test]
    async fn error_resolves_to_fallback() {
        let fix = resolve_location(&Failing, Duration::from_secs(1), Coordinate::NAIROBI).await;
        assert_eq!(fix, LocationFix::Fallback(Coordinate::NAIROBI));
        assert_eq!(fix.coordinate(), Coordinate::NAIROBI);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_resolves_to_fallback() {
        let fix = resolve_location(&Stalled, Duration::from_secs(20), Coordinate::NAIROBI).await;
        assert!(fix.is_fallback());
    }

    #[tokio::test]
    async fn chain_uses_first_successful_source() {
        let chain = LocationChain::new().with(Failing).with(FixedLocation(LONDON));
        assert_eq!(chain.locate().await.unwrap(), LONDON);
    }

    #[tokio::test]
    async fn empty_chain_reports_no_sources() {
        let err = LocationChain::new().locate().await.unwrap_err();
        assert!(matches!(err, LocationError::NoSources));
    }

    #[tokio::test]
    async fn ip_lookup_success() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "country": "Kenya",
                "city": "Nairobi",
                "lat": -1.2841,
                "lon": 36.8155
            })))
            .mount(&server)
            .await;

        let source = IpLocation::with_base_url(&server.uri());
        assert_eq!(source.locate().await.unwrap(), Coordinate::new(-1.2841, 36.8155));
    }

    #[tokio::test]
    async fn ip_lookup_failure_status_is_unavailable() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "fail",
                "message": "reserved range"
            })))
            .mount(&server)
            .await;

        let source = IpLocation::with_base_url(&server.uri());
        let err = source.locate().await.unwrap_err();
        assert!(err.to_string().contains("reserved range"));
    }
}
