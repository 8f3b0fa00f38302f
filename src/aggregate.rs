use chrono::{Duration, NaiveDate};
use tracing::warn;

use crate::error::DiagnosticsError;
use crate::models::{AggregateSummary, DailyMetric};

pub const SUPPORTED_WINDOWS: [u32; 5] = [1, 7, 30, 90, 365];

/// Longest lookback a report may cover.
pub const MAX_WINDOW_DAYS: u32 = 365;

pub fn validate_window(window_days: i64) -> Result<u32, DiagnosticsError> {
    let window = u32::try_from(window_days)
        .ok()
        .filter(|days| (1..=MAX_WINDOW_DAYS).contains(days))
        .ok_or(DiagnosticsError::InvalidWindow(window_days))?;
    if !SUPPORTED_WINDOWS.contains(&window) {
        warn!(window_days = window, "window is not one of the standard report windows");
    }
    Ok(window)
}

/// Inclusive first and last calendar day covered by a window ending on `today`.
pub fn window_bounds(today: NaiveDate, window_days: u32) -> (NaiveDate, NaiveDate) {
    let span = i64::from(window_days.max(1)) - 1;
    (today - Duration::days(span), today)
}

/// Negative and missing counts contribute nothing.
pub fn sanitize(value: Option<i64>) -> u64 {
    value.and_then(|v| u64::try_from(v).ok()).unwrap_or(0)
}

pub fn summarize(
    metrics: &[DailyMetric],
    total_clicks: u64,
    window_days: i64,
) -> Result<AggregateSummary, DiagnosticsError> {
    let window_days = validate_window(window_days)?;

    let (total_views, total_unique_views) =
        metrics.iter().fold((0u64, 0u64), |(views, unique), metric| {
            (
                views.saturating_add(sanitize(metric.views)),
                unique.saturating_add(sanitize(metric.unique_views)),
            )
        });

    // Sparse history still divides by the full requested window.
    Ok(AggregateSummary {
        total_views,
        total_unique_views,
        total_clicks,
        window_days,
        avg_views_per_day: per_day(total_views, window_days),
        avg_unique_per_day: per_day(total_unique_views, window_days),
    })
}

fn per_day(total: u64, window_days: u32) -> u64 {
    (total as f64 / f64::from(window_days)).round() as u64
}
