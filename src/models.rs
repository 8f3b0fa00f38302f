use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct Profile {
    pub id: Uuid,
    pub handle: String,
    pub display_name: String,
}

/// One calendar day of pre-aggregated traffic. Days without traffic have no record.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyMetric {
    pub date: NaiveDate,
    pub views: Option<i64>,
    pub unique_views: Option<i64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContentInventory {
    pub links_count: u64,
    pub races_count: u64,
    pub sponsors_count: u64,
    pub media_count: u64,
}

impl ContentInventory {
    pub fn total(&self) -> u64 {
        self.links_count + self.races_count + self.sponsors_count + self.media_count
    }
}

/// Everything the data-access layer hands over for a single report request.
#[derive(Debug, Clone)]
pub struct ProfileSnapshot {
    pub profile: Profile,
    pub metrics: Vec<DailyMetric>,
    pub inventory: ContentInventory,
    pub clicks: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateSummary {
    pub total_views: u64,
    pub total_unique_views: u64,
    pub total_clicks: u64,
    pub window_days: u32,
    pub avg_views_per_day: u64,
    pub avg_unique_per_day: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedRatios {
    pub conversion_rate: f64,
    pub retention_rate: f64,
    pub engagement_score: u32,
    pub growth_rate: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum ScoreTier {
    Excellent,
    Average,
    NeedsImprovement,
}

impl ScoreTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreTier::Excellent => "EXCELLENT",
            ScoreTier::Average => "AVERAGE",
            ScoreTier::NeedsImprovement => "NEEDS-IMPROVEMENT",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub traffic_score: f64,
    pub conversion_score: f64,
    pub content_score: f64,
    pub retention_score: f64,
    pub total: f64,
    pub tier: ScoreTier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum AdviceStatus {
    Critical,
    NeedsImprovement,
    Medium,
    Excellent,
    Insufficient,
    Good,
    Low,
    QuickWin,
}

impl AdviceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdviceStatus::Critical => "CRITICAL",
            AdviceStatus::NeedsImprovement => "NEEDS-IMPROVEMENT",
            AdviceStatus::Medium => "MEDIUM",
            AdviceStatus::Excellent => "EXCELLENT",
            AdviceStatus::Insufficient => "INSUFFICIENT",
            AdviceStatus::Good => "GOOD",
            AdviceStatus::Low => "LOW",
            AdviceStatus::QuickWin => "QUICK-WIN",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdviceItem {
    pub priority: u8,
    pub category: String,
    pub problem: String,
    pub status: AdviceStatus,
    pub description: String,
    pub solutions: Vec<String>,
}

/// Computed output of the pipeline before it is laid out as a report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostics {
    pub summary: AggregateSummary,
    pub ratios: DerivedRatios,
    pub score: ScoreBreakdown,
    pub advice: Vec<AdviceItem>,
}
