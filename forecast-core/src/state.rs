use std::sync::Arc;

use serde::Serialize;
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, error, info, instrument};

use crate::{
    FetchError,
    aggregate::aggregate_by_day,
    condition::CoarseCondition,
    model::{DaySummary, LocationQuery},
    provider::ForecastProvider,
};

const UNEXPECTED_ERROR: &str = "An unexpected error occurred.";

/// Snapshot rendered by the view. Never patched in place: every transition
/// publishes a fresh value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ViewState {
    pub is_loading: bool,
    pub forecasts: Vec<DaySummary>,
    pub error: Option<String>,
    /// Condition of the earliest sample of the last successful fetch.
    pub condition: Option<CoarseCondition>,
}

impl ViewState {
    pub fn loading() -> Self {
        Self { is_loading: true, ..Self::default() }
    }

    pub fn loaded(forecasts: Vec<DaySummary>, condition: Option<CoarseCondition>) -> Self {
        Self { is_loading: false, forecasts, error: None, condition }
    }

    pub fn errored(message: impl Into<String>) -> Self {
        Self { error: Some(message.into()), ..Self::default() }
    }
}

/// Turn a fetch failure into the message shown to the user.
pub fn error_message(err: &FetchError) -> String {
    match err {
        FetchError::Parse { source, .. } => format!("Error parsing weather data: {source}"),
        other => {
            let msg = other.to_string();
            if msg.is_empty() { UNEXPECTED_ERROR.to_string() } else { msg }
        }
    }
}

/// Owns the forecast screen state and runs fetches against one provider.
#[derive(Debug)]
pub struct ForecastPresenter {
    provider: Arc<dyn ForecastProvider>,
    days: u8,
    state: watch::Sender<ViewState>,
}

impl ForecastPresenter {
    pub fn new(provider: Arc<dyn ForecastProvider>, days: u8) -> Self {
        let (state, _) = watch::channel(ViewState::default());
        Self { provider, days, state }
    }

    pub fn state(&self) -> ViewState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.subscribe()
    }

    /// Fetch and publish. Errors end up in the published state, not here.
    ///
    /// Overlapping calls are not coalesced; the last one to finish wins.
    #[instrument(skip(self), fields(provider = %self.provider.id()))]
    pub async fn fetch(&self, query: &LocationQuery) {
        self.state.send_replace(ViewState::loading());

        let next = match self.provider.fetch_forecast(query, self.days).await {
            Ok(samples) => {
                let condition =
                    samples.first().map(|s| CoarseCondition::from_label(&s.condition_label));
                let forecasts = aggregate_by_day(&samples);
                info!(samples = samples.len(), days = forecasts.len(), "Forecast loaded");
                debug!(?forecasts);
                ViewState::loaded(forecasts, condition)
            }
            Err(err) => {
                error!(error = %err, "Error fetching weather data");
                ViewState::errored(error_message(&err))
            }
        };

        self.state.send_replace(next);
    }

    /// Run [`fetch`](Self::fetch) on its own task. Aborting the handle
    /// cancels the request; the state is left as `Loading`.
    pub fn spawn_fetch(self: &Arc<Self>, query: LocationQuery) -> JoinHandle<()> {
        let this = Arc::clone(self);
        tokio::spawn(async move { this.fetch(&query).await })
    }
}
