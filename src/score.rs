use crate::models::{AggregateSummary, ContentInventory, DerivedRatios, ScoreBreakdown, ScoreTier};

pub const TRAFFIC_MAX: f64 = 40.0;
pub const CONVERSION_MAX: f64 = 30.0;
pub const CONTENT_MAX: f64 = 20.0;
pub const RETENTION_MAX: f64 = 10.0;

// Values at which each component saturates.
const TRAFFIC_TARGET_VIEWS_PER_DAY: f64 = 100.0;
const CONVERSION_TARGET_RATE: f64 = 10.0;
const CONTENT_TARGET_COUNT: f64 = 20.0;
const RETENTION_TARGET_RATE: f64 = 70.0;

pub fn score(
    summary: &AggregateSummary,
    ratios: &DerivedRatios,
    inventory: &ContentInventory,
) -> ScoreBreakdown {
    let traffic_score = capped(
        summary.avg_views_per_day as f64 / TRAFFIC_TARGET_VIEWS_PER_DAY * TRAFFIC_MAX,
        TRAFFIC_MAX,
    );
    let conversion_score = capped(
        ratios.conversion_rate / CONVERSION_TARGET_RATE * CONVERSION_MAX,
        CONVERSION_MAX,
    );
    let content_score = capped(
        inventory.total() as f64 / CONTENT_TARGET_COUNT * CONTENT_MAX,
        CONTENT_MAX,
    );
    let retention_score = capped(
        ratios.retention_rate / RETENTION_TARGET_RATE * RETENTION_MAX,
        RETENTION_MAX,
    );

    let total = traffic_score + conversion_score + content_score + retention_score;

    ScoreBreakdown {
        traffic_score,
        conversion_score,
        content_score,
        retention_score,
        total,
        tier: tier_for(total),
    }
}

pub fn tier_for(total: f64) -> ScoreTier {
    match total {
        t if t >= 70.0 => ScoreTier::Excellent,
        t if t >= 40.0 => ScoreTier::Average,
        _ => ScoreTier::NeedsImprovement,
    }
}

fn capped(value: f64, max: f64) -> f64 {
    value.clamp(0.0, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn summary(avg_views_per_day: u64) -> AggregateSummary {
        AggregateSummary {
            total_views: avg_views_per_day * 30,
            total_unique_views: 0,
            total_clicks: 0,
            window_days: 30,
            avg_views_per_day,
            avg_unique_per_day: 0,
        }
    }

    fn ratios(conversion_rate: f64, retention_rate: f64) -> DerivedRatios {
        DerivedRatios {
            conversion_rate,
            retention_rate,
            engagement_score: 0,
            growth_rate: 0,
        }
    }

    fn inventory(total: u64) -> ContentInventory {
        ContentInventory {
            links_count: total,
            ..ContentInventory::default()
        }
    }

    #[test]
    fn tiers_follow_expected_thresholds() {
        assert_eq!(tier_for(100.0), ScoreTier::Excellent);
        assert_eq!(tier_for(70.0), ScoreTier::Excellent);
        assert_eq!(tier_for(69.99), ScoreTier::Average);
        assert_eq!(tier_for(40.0), ScoreTier::Average);
        assert_eq!(tier_for(39.9), ScoreTier::NeedsImprovement);
        assert_eq!(tier_for(0.0), ScoreTier::NeedsImprovement);
    }

    #[test]
    fn saturated_inputs_score_one_hundred() {
        let breakdown = score(&summary(100), &ratios(10.0, 70.0), &inventory(20));
        assert_eq!(breakdown.traffic_score, 40.0);
        assert_eq!(breakdown.conversion_score, 30.0);
        assert_eq!(breakdown.content_score, 20.0);
        assert_eq!(breakdown.retention_score, 10.0);
        assert_eq!(breakdown.total, 100.0);
        assert_eq!(breakdown.tier, ScoreTier::Excellent);
    }

    #[test]
    fn components_are_capped_independently() {
        let breakdown = score(&summary(5_000), &ratios(0.0, 0.0), &inventory(0));
        assert_eq!(breakdown.traffic_score, 40.0);
        assert_eq!(breakdown.total, 40.0);
        assert_eq!(breakdown.tier, ScoreTier::Average);
    }

    #[test]
    fn partial_inputs_keep_fractional_total() {
        let breakdown = score(&summary(25), &ratios(2.5, 35.0), &inventory(5));
        assert!((breakdown.traffic_score - 10.0).abs() < 1e-9);
        assert!((breakdown.conversion_score - 7.5).abs() < 1e-9);
        assert!((breakdown.content_score - 5.0).abs() < 1e-9);
        assert!((breakdown.retention_score - 5.0).abs() < 1e-9);
        assert!((breakdown.total - 27.5).abs() < 1e-9);
        assert_eq!(breakdown.tier, ScoreTier::NeedsImprovement);
    }

    #[test]
    fn retention_above_one_hundred_percent_is_still_capped() {
        let breakdown = score(&summary(0), &ratios(0.0, 180.0), &inventory(0));
        assert_eq!(breakdown.retention_score, 10.0);
    }

    proptest! {
        #[test]
        fn total_stays_within_bounds(
            avg in 0u64..100_000,
            conversion in 0.0f64..5_000.0,
            retention in 0.0f64..5_000.0,
            content in 0u64..1_000,
        ) {
            let breakdown = score(&summary(avg), &ratios(conversion, retention), &inventory(content));
            prop_assert!(breakdown.total >= 0.0);
            prop_assert!(breakdown.total <= 100.0);
        }
    }
}
