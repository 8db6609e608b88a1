//! Reference-window min-max normalization.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Inclusive date window whose values define the normalization range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReferenceWindow {
    /// Resolve optional bounds against the calendar; missing bounds default
    /// to the first and last day.
    pub fn resolve(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        calendar: &[NaiveDate],
    ) -> Option<Self> {
        let first = *calendar.first()?;
        let last = *calendar.last()?;
        Some(Self {
            start: start.unwrap_or(first),
            end: end.unwrap_or(last),
        })
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }
}

fn finite_range<'a, I>(values: I) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = &'a f64>,
{
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        });

    if lo.is_finite() && hi.is_finite() && hi > lo {
        Some((lo, hi))
    } else {
        None
    }
}

/// Rescale `series` to [0, 1] using the values dated inside `window`.
///
/// When the window holds no usable range the global range is used instead;
/// a constant series maps to 0.5 everywhere. Results are clamped to [0, 1].
pub fn min_max_by_window(
    series: &[f64],
    calendar: &[NaiveDate],
    window: Option<ReferenceWindow>,
) -> Vec<f64> {
    let in_window = series
        .iter()
        .zip(calendar)
        .filter(|(_, d)| window.map_or(true, |w| w.contains(**d)))
        .map(|(v, _)| v);

    let range = finite_range(in_window).or_else(|| finite_range(series));

    match range {
        Some((lo, hi)) => series
            .iter()
            .map(|v| ((v - lo) / (hi - lo)).clamp(0.0, 1.0))
            .collect(),
        None => vec![0.5; series.len()],
    }
}
