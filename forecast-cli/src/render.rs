use std::fmt::Write;

use forecast_core::{CoarseCondition, DaySummary, ProviderId, ViewState, classify_code};

const CARD_WIDTH: usize = 36;

/// Text rendering of the forecast screen.
pub fn render_state(state: &ViewState, provider: ProviderId, days: u8) -> String {
    let mut out = String::new();

    match header_condition(state, provider) {
        Some(condition) => {
            let _ = writeln!(out, "{days} Day Forecast · {condition}");
        }
        None => {
            let _ = writeln!(out, "{days} Day Forecast");
        }
    }
    let _ = writeln!(out, "{}", "─".repeat(CARD_WIDTH));

    if state.is_loading {
        let _ = writeln!(out, "Loading...");
    } else if let Some(error) = &state.error {
        let _ = writeln!(out, "Error: {error}");
    } else if state.forecasts.is_empty() {
        let _ = writeln!(out, "No forecast data.");
    } else {
        for day in &state.forecasts {
            out.push_str(&render_card(day, provider));
            out.push('\n');
        }
    }

    out
}

/// Current condition for the header. Falls back to the first day's icon when
/// the fetch gave no label-based condition.
fn header_condition(state: &ViewState, provider: ProviderId) -> Option<CoarseCondition> {
    state.condition.or_else(|| {
        state.forecasts.first().map(|day| classify_code(provider, day.condition_code).coarse())
    })
}

/// One line per day: weekday, whole degrees, icon.
pub fn render_card(day: &DaySummary, provider: ProviderId) -> String {
    let icon = classify_code(provider, day.condition_code);
    let weekday = day.weekday();
    let label = if weekday.is_empty() { day.date.as_str() } else { weekday.as_str() };
    // Whole degrees, truncated toward zero.
    let degrees = day.temperature_c as i64;

    format!("{label:<12}{:>5}°  {} {}", degrees, icon.glyph(), icon.description())
}
