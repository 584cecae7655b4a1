use std::collections::HashMap;

use crate::model::{DaySummary, ForecastSample};

struct DayGroup<'a> {
    first: &'a ForecastSample,
    sum: f64,
    count: usize,
}

/// Collapse a sequence of samples into one summary per calendar day.
///
/// Days appear in the order their first sample appears in `samples`. The
/// temperature is the plain mean of the day's samples; the condition is
/// taken from the day's first sample.
pub fn aggregate_by_day(samples: &[ForecastSample]) -> Vec<DaySummary> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, DayGroup<'_>)> = Vec::new();

    for sample in samples {
        let tag = sample.day_tag();
        match index.get(tag).copied() {
            Some(i) => {
                let group = &mut groups[i].1;
                group.sum += sample.temperature_c;
                group.count += 1;
            }
            None => {
                index.insert(tag, groups.len());
                groups.push((tag, DayGroup { first: sample, sum: sample.temperature_c, count: 1 }));
            }
        }
    }

    groups
        .into_iter()
        .map(|(tag, group)| DaySummary {
            date: tag.to_string(),
            temperature_c: group.sum / group.count as f64,
            condition_code: group.first.condition_code,
            condition_label: group.first.condition_label.clone(),
        })
        .collect()
}
