use crate::aggregate::sanitize;
use crate::models::{AggregateSummary, DailyMetric, DerivedRatios};

pub fn derive(summary: &AggregateSummary, metrics: &[DailyMetric]) -> DerivedRatios {
    let conversion_rate = conversion_rate(summary.total_clicks, summary.total_views);

    DerivedRatios {
        conversion_rate,
        retention_rate: retention_rate(summary.total_unique_views, summary.total_views),
        engagement_score: engagement_score(conversion_rate),
        growth_rate: growth_rate(metrics),
    }
}

pub fn conversion_rate(total_clicks: u64, total_views: u64) -> f64 {
    percentage(total_clicks, total_views)
}

/// Not clamped: inconsistent upstream data can push this past 100.
pub fn retention_rate(total_unique_views: u64, total_views: u64) -> f64 {
    percentage(total_unique_views, total_views)
}

/// Saturates once conversion reaches 10%.
pub fn engagement_score(conversion_rate: f64) -> u32 {
    (conversion_rate / 10.0 * 100.0).round().clamp(0.0, 100.0) as u32
}

/// Split-half trend: mean views of the later half against the earlier half.
///
/// The first `n / 2` records form the earlier half, so an odd-length series
/// puts its extra record in the later half.
pub fn growth_rate(metrics: &[DailyMetric]) -> i64 {
    let (first, second) = metrics.split_at(metrics.len() / 2);
    let first_mean = mean_views(first);
    if first_mean <= 0.0 {
        return 0;
    }

    let second_mean = mean_views(second);
    ((second_mean - first_mean) / first_mean * 100.0).round() as i64
}

fn mean_views(metrics: &[DailyMetric]) -> f64 {
    if metrics.is_empty() {
        return 0.0;
    }
    let total: u64 = metrics.iter().map(|metric| sanitize(metric.views)).sum();
    total as f64 / metrics.len() as f64
}

fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
