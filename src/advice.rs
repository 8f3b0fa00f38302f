//! Threshold rules that turn computed ratios into prioritized advice.
//!
//! Every rule is a gate plus a builder. Rules run in declared order, each one
//! emits at most one item, and the combined output is cut to the three most
//! urgent items.

use crate::models::{
    AdviceItem, AdviceStatus, AggregateSummary, ContentInventory, DerivedRatios,
};

pub const MAX_ADVICE_ITEMS: usize = 3;

/// The subset of pipeline output the rules look at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdviceSignals {
    pub avg_views_per_day: u64,
    pub total_views: u64,
    pub conversion_rate: f64,
    pub retention_rate: f64,
    pub total_content_count: u64,
}

impl AdviceSignals {
    pub fn new(
        summary: &AggregateSummary,
        ratios: &DerivedRatios,
        inventory: &ContentInventory,
    ) -> Self {
        Self {
            avg_views_per_day: summary.avg_views_per_day,
            total_views: summary.total_views,
            conversion_rate: ratios.conversion_rate,
            retention_rate: ratios.retention_rate,
            total_content_count: inventory.total(),
        }
    }
}

struct AdviceRule {
    priority: u8,
    /// Receives the number of items already emitted by earlier rules.
    gate: fn(&AdviceSignals, usize) -> bool,
    build: fn(u8, &AdviceSignals) -> Option<AdviceItem>,
}

const RULES: [AdviceRule; 5] = [
    AdviceRule {
        priority: 1,
        gate: always,
        build: traffic_advice,
    },
    AdviceRule {
        priority: 2,
        gate: more_than_ten_views,
        build: conversion_advice,
    },
    AdviceRule {
        priority: 3,
        gate: always,
        build: content_advice,
    },
    AdviceRule {
        priority: 4,
        gate: more_than_twenty_views,
        build: retention_advice,
    },
    AdviceRule {
        priority: 5,
        gate: few_rules_fired,
        build: quick_wins_advice,
    },
];

pub fn recommend(signals: &AdviceSignals) -> Vec<AdviceItem> {
    let mut items: Vec<AdviceItem> = Vec::new();

    for rule in RULES.iter() {
        if !(rule.gate)(signals, items.len()) {
            continue;
        }
        if let Some(item) = (rule.build)(rule.priority, signals) {
            items.push(item);
        }
    }

    items.sort_by_key(|item| item.priority);
    items.truncate(MAX_ADVICE_ITEMS);
    items
}

fn always(_: &AdviceSignals, _: usize) -> bool {
    true
}

fn more_than_ten_views(signals: &AdviceSignals, _: usize) -> bool {
    signals.total_views > 10
}

fn more_than_twenty_views(signals: &AdviceSignals, _: usize) -> bool {
    signals.total_views > 20
}

fn few_rules_fired(signals: &AdviceSignals, fired: usize) -> bool {
    signals.total_views > 10 && fired < MAX_ADVICE_ITEMS
}

fn item(
    priority: u8,
    category: &str,
    status: AdviceStatus,
    problem: String,
    description: String,
    solutions: &[&str],
) -> AdviceItem {
    AdviceItem {
        priority,
        category: category.to_string(),
        problem,
        status,
        description,
        solutions: solutions.iter().map(|s| s.to_string()).collect(),
    }
}

fn traffic_advice(priority: u8, signals: &AdviceSignals) -> Option<AdviceItem> {
    let avg = signals.avg_views_per_day;

    let advice = match avg {
        0..=9 => item(
            priority,
            "VISIBILITY",
            AdviceStatus::Critical,
            format!("Very low traffic: {avg} views per day"),
            format!(
                "Your page is barely being discovered. Reaching 10 views per day is the \
                 first milestone; you are {} views per day short of it.",
                10 - avg
            ),
            &[
                "Put your page link in the bio of every social profile you run",
                "Share your page in each post-race recap and training update",
                "Add the link to your email signature and messaging profiles",
                "Ask clubs and teammates to feature your page on their channels",
            ],
        ),
        10..=49 => item(
            priority,
            "GROWTH",
            AdviceStatus::NeedsImprovement,
            format!("Moderate traffic: {avg} views per day"),
            format!(
                "People are finding you, but reach is still limited. The next target is \
                 50 views per day, {} more than today.",
                50 - avg
            ),
            &[
                "Post on a fixed weekly schedule so followers know when to check in",
                "Cross-promote with athletes and creators in your discipline",
                "Pin your page link on your most-viewed social posts",
                "Use event hashtags when you publish race content",
            ],
        ),
        _ => item(
            priority,
            "TRAFFIC",
            AdviceStatus::Excellent,
            format!("Strong traffic: {avg} views per day"),
            format!(
                "Your audience is growing well. Keep the momentum toward 100 views per \
                 day, where your traffic score maxes out{}.",
                if avg >= 100 { " (already reached)" } else { "" }
            ),
            &[
                "Keep the publishing rhythm that brought you here",
                "Turn repeat visitors into followers with a newsletter or community link",
                "Pitch sponsors with your traffic numbers as proof of reach",
            ],
        ),
    };

    Some(advice)
}

fn conversion_advice(priority: u8, signals: &AdviceSignals) -> Option<AdviceItem> {
    let rate = signals.conversion_rate;

    let advice = if rate < 2.0 {
        item(
            priority,
            "CONVERSION",
            AdviceStatus::Critical,
            format!("Low click-through: {rate:.1}% of views lead to a click"),
            "Visitors arrive but rarely act. Aim for at least 2% of views turning into \
             link clicks."
                .to_string(),
            &[
                "Move your most important link to the top of the page",
                "Rewrite link titles as clear calls to action",
                "Remove stale or duplicate links that dilute attention",
                "Add a short intro that tells visitors what to click first",
            ],
        )
    } else if rate < 5.0 {
        item(
            priority,
            "OPTIMIZATION",
            AdviceStatus::Medium,
            format!("Average click-through: {rate:.1}%"),
            "Your links work, but there is room to improve. The next target is 5% of \
             views turning into clicks."
                .to_string(),
            &[
                "Test different titles on your top two links",
                "Highlight time-limited offers from sponsors",
                "Group links by theme so visitors scan faster",
            ],
        )
    } else {
        item(
            priority,
            "CONVERSION",
            AdviceStatus::Excellent,
            format!("Excellent click-through: {rate:.1}%"),
            "Visitors engage strongly with your links. Past 10% your conversion score \
             is maxed out, so protect what works."
                .to_string(),
            &[
                "Keep top-performing links in place and rotate the rest",
                "Share click numbers with sponsors to negotiate better deals",
                "Add affiliate or partner links where they fit your audience",
            ],
        )
    };

    Some(advice)
}

fn content_advice(priority: u8, signals: &AdviceSignals) -> Option<AdviceItem> {
    let count = signals.total_content_count;

    match count {
        0..=4 => Some(item(
            priority,
            "CONTENT",
            AdviceStatus::Insufficient,
            format!("Thin page: only {count} content items"),
            format!(
                "Visitors have little to explore. Add at least {} more items to reach 5, \
                 and aim for 20 to max out your content score.",
                5 - count
            ),
            &[
                "Add links to your results, training logs and shop",
                "List your upcoming and past races",
                "Showcase current sponsors with their logos",
                "Upload photos or videos from recent events",
            ],
        )),
        5..=14 => Some(item(
            priority,
            "CONTENT",
            AdviceStatus::Good,
            format!("Solid content base: {count} items"),
            format!(
                "Your page has a good foundation. Reaching 15 items ({} more) gives \
                 visitors a reason to come back.",
                15 - count
            ),
            &[
                "Add a race or media entry after every event",
                "Refresh sponsor entries with current campaigns",
                "Retire outdated links and replace them with fresh ones",
            ],
        )),
        _ => None,
    }
}

fn retention_advice(priority: u8, signals: &AdviceSignals) -> Option<AdviceItem> {
    let rate = signals.retention_rate;

    if rate < 40.0 {
        Some(item(
            priority,
            "RETENTION",
            AdviceStatus::Low,
            format!("Low unique reach: {rate:.1}% of views are unique"),
            "Most views come from a small group of repeat visitors. Aim for at least 40% \
             unique views by reaching new audiences."
                .to_string(),
            &[
                "Share your page on channels you have not used before",
                "Collaborate with creators whose audience differs from yours",
                "Appear in event listings and club directories",
            ],
        ))
    } else if rate >= 70.0 {
        Some(item(
            priority,
            "RETENTION",
            AdviceStatus::Excellent,
            format!("Broad reach: {rate:.1}% of views are unique"),
            "You consistently reach new people. Give them a reason to return.".to_string(),
            &[
                "Post regular updates so new visitors come back",
                "Invite visitors to follow you on your main social channel",
                "Feature a sign-up link for race-day notifications",
            ],
        ))
    } else {
        None
    }
}

fn quick_wins_advice(priority: u8, _: &AdviceSignals) -> Option<AdviceItem> {
    Some(item(
        priority,
        "QUICK WINS",
        AdviceStatus::QuickWin,
        "Quick improvements you can make today".to_string(),
        "A few small changes that reliably lift traffic and clicks.".to_string(),
        &[
            "Update your profile photo and bio",
            "Check that every link still works",
            "Share your page link in your next post",
            "Add one new link, race or sponsor this week",
        ],
    ))
}
