use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::aggregate;
use crate::models::{AdviceItem, Diagnostics, ProfileSnapshot, ScoreBreakdown, ScoreTier};

pub const REPORT_TITLE: &str = "Performance Report";

/// Ordered, typed content handed to a renderer. Carries no layout information.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "section", rename_all = "snake_case")]
pub enum Section {
    Header {
        title: String,
        display_name: String,
        handle: String,
        generated_at: DateTime<Utc>,
        window_label: String,
    },
    Overview {
        cells: Vec<StatCell>,
    },
    Score {
        breakdown: ScoreBreakdown,
        headline: String,
    },
    Advice {
        items: Vec<AdviceItem>,
    },
    Footer {
        first_day: NaiveDate,
        last_day: NaiveDate,
        days_with_data: usize,
        note: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatCell {
    pub label: String,
    pub value: String,
    pub detail: String,
}

impl StatCell {
    fn new(label: &str, value: String, detail: String) -> Self {
        Self {
            label: label.to_string(),
            value,
            detail,
        }
    }
}

pub fn compose(
    snapshot: &ProfileSnapshot,
    diagnostics: &Diagnostics,
    generated_at: DateTime<Utc>,
) -> Report {
    let window_days = diagnostics.summary.window_days;
    let (first_day, last_day) = aggregate::window_bounds(generated_at.date_naive(), window_days);

    let sections = vec![
        Section::Header {
            title: REPORT_TITLE.to_string(),
            display_name: snapshot.profile.display_name.clone(),
            handle: snapshot.profile.handle.clone(),
            generated_at,
            window_label: window_label(window_days),
        },
        Section::Overview {
            cells: overview_cells(snapshot, diagnostics),
        },
        Section::Score {
            breakdown: diagnostics.score.clone(),
            headline: tier_headline(diagnostics.score.tier).to_string(),
        },
        Section::Advice {
            items: diagnostics.advice.clone(),
        },
        Section::Footer {
            first_day,
            last_day,
            days_with_data: snapshot.metrics.len(),
            note: "Days without recorded traffic count as zero in daily averages.".to_string(),
        },
    ];

    Report { sections }
}

fn overview_cells(snapshot: &ProfileSnapshot, diagnostics: &Diagnostics) -> Vec<StatCell> {
    let summary = &diagnostics.summary;
    let ratios = &diagnostics.ratios;
    let links = snapshot.inventory.links_count;

    vec![
        StatCell::new(
            "Total views",
            summary.total_views.to_string(),
            format!("{} per day", summary.avg_views_per_day),
        ),
        StatCell::new(
            "Unique visitors",
            summary.total_unique_views.to_string(),
            format!("{} per day", summary.avg_unique_per_day),
        ),
        StatCell::new(
            "Link clicks",
            summary.total_clicks.to_string(),
            format!("{:.1}% conversion", ratios.conversion_rate),
        ),
        StatCell::new(
            "Active links",
            links.to_string(),
            format!("{:.1} clicks per link", clicks_per_link(summary.total_clicks, links)),
        ),
        StatCell::new(
            "Engagement",
            format!("{}/100", ratios.engagement_score),
            engagement_label(ratios.engagement_score).to_string(),
        ),
        StatCell::new(
            "Growth",
            format!("{:+}%", ratios.growth_rate),
            growth_label(ratios.growth_rate).to_string(),
        ),
    ]
}

pub fn window_label(window_days: u32) -> String {
    match window_days {
        1 => "Last 24 hours".to_string(),
        7 => "Last 7 days".to_string(),
        30 => "Last 30 days".to_string(),
        90 => "Last 90 days".to_string(),
        365 => "Last 12 months".to_string(),
        days => format!("Last {days} days"),
    }
}

pub fn engagement_label(score: u32) -> &'static str {
    match score {
        70.. => "Strong",
        30..=69 => "Moderate",
        _ => "Weak",
    }
}

pub fn growth_label(rate: i64) -> &'static str {
    match rate {
        r if r > 0 => "Growing",
        0 => "Stable",
        _ => "Declining",
    }
}

pub fn clicks_per_link(clicks: u64, links: u64) -> f64 {
    if links == 0 {
        0.0
    } else {
        clicks as f64 / links as f64
    }
}

fn tier_headline(tier: ScoreTier) -> &'static str {
    match tier {
        ScoreTier::Excellent => "Your page is performing excellently.",
        ScoreTier::Average => "Your page is doing well, with clear room to grow.",
        ScoreTier::NeedsImprovement => {
            "Your page needs attention. Start with the recommendations below."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContentInventory, DailyMetric, Profile};
    use crate::pipeline;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    fn snapshot() -> ProfileSnapshot {
        let start = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        ProfileSnapshot {
            profile: Profile {
                id: Uuid::nil(),
                handle: "maya.runs".to_string(),
                display_name: "Maya Ortiz".to_string(),
            },
            metrics: (0..4)
                .map(|i| DailyMetric {
                    date: start + chrono::Duration::days(i),
                    views: Some(20 + i * 10),
                    unique_views: Some(12),
                })
                .collect(),
            inventory: ContentInventory {
                links_count: 4,
                races_count: 2,
                sponsors_count: 1,
                media_count: 0,
            },
            clicks: 6,
        }
    }

    fn generated_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 7, 9, 30, 0).unwrap()
    }

    #[test]
    fn sections_follow_fixed_order() {
        let snapshot = snapshot();
        let diagnostics = pipeline::diagnose(&snapshot, 7).unwrap();
        let report = compose(&snapshot, &diagnostics, generated_at());

        let kinds: Vec<&str> = report
            .sections
            .iter()
            .map(|section| match section {
                Section::Header { .. } => "header",
                Section::Overview { .. } => "overview",
                Section::Score { .. } => "score",
                Section::Advice { .. } => "advice",
                Section::Footer { .. } => "footer",
            })
            .collect();
        assert_eq!(kinds, vec!["header", "overview", "score", "advice", "footer"]);
    }

    #[test]
    fn overview_has_six_cells() {
        let snapshot = snapshot();
        let diagnostics = pipeline::diagnose(&snapshot, 7).unwrap();
        let report = compose(&snapshot, &diagnostics, generated_at());

        let Section::Overview { cells } = &report.sections[1] else {
            panic!("expected overview section");
        };
        let labels: Vec<&str> = cells.iter().map(|cell| cell.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "Total views",
                "Unique visitors",
                "Link clicks",
                "Active links",
                "Engagement",
                "Growth"
            ]
        );
        // 140 views over 7 days, 6 clicks across 4 links
        assert_eq!(cells[0].value, "140");
        assert_eq!(cells[0].detail, "20 per day");
        assert_eq!(cells[3].detail, "1.5 clicks per link");
        assert_eq!(cells[5].value, "+80%");
        assert_eq!(cells[5].detail, "Growing");
    }

    #[test]
    fn footer_covers_requested_window() {
        let snapshot = snapshot();
        let diagnostics = pipeline::diagnose(&snapshot, 7).unwrap();
        let report = compose(&snapshot, &diagnostics, generated_at());

        let Some(Section::Footer {
            first_day,
            last_day,
            days_with_data,
            ..
        }) = report.sections.last()
        else {
            panic!("expected footer section");
        };
        assert_eq!(*first_day, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        assert_eq!(*last_day, NaiveDate::from_ymd_opt(2026, 3, 7).unwrap());
        assert_eq!(*days_with_data, 4);
    }

    #[test]
    fn labels_cover_every_band() {
        assert_eq!(window_label(1), "Last 24 hours");
        assert_eq!(window_label(7), "Last 7 days");
        assert_eq!(window_label(30), "Last 30 days");
        assert_eq!(window_label(90), "Last 90 days");
        assert_eq!(window_label(45), "Last 45 days");
        assert_eq!(window_label(365), "Last 12 months");
        assert_eq!(engagement_label(100), "Strong");
        assert_eq!(engagement_label(45), "Moderate");
        assert_eq!(engagement_label(0), "Weak");
        assert_eq!(growth_label(12), "Growing");
        assert_eq!(growth_label(0), "Stable");
        assert_eq!(growth_label(-3), "Declining");
    }

    #[test]
    fn clicks_per_link_handles_no_links() {
        assert_eq!(clicks_per_link(12, 0), 0.0);
        assert_eq!(clicks_per_link(12, 8), 1.5);
    }
}
