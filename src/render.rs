use std::fmt::Write;

use anyhow::Context;
use chrono::NaiveDate;

use crate::models::{AdviceItem, ScoreBreakdown, ScoreTier};
use crate::report::{Report, Section, StatCell};
use crate::score::{CONTENT_MAX, CONVERSION_MAX, RETENTION_MAX, TRAFFIC_MAX};

/// Turns an ordered report into document bytes.
pub trait DocumentRenderer {
    fn extension(&self) -> &'static str;

    fn render(&self, report: &Report) -> anyhow::Result<Vec<u8>>;
}

pub struct MarkdownRenderer;

pub struct JsonRenderer;

impl DocumentRenderer for JsonRenderer {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn render(&self, report: &Report) -> anyhow::Result<Vec<u8>> {
        serde_json::to_vec_pretty(report).context("failed to serialize report as JSON")
    }
}

impl DocumentRenderer for MarkdownRenderer {
    fn extension(&self) -> &'static str {
        "md"
    }

    fn render(&self, report: &Report) -> anyhow::Result<Vec<u8>> {
        let mut output = String::new();

        for section in &report.sections {
            match section {
                Section::Header {
                    title,
                    display_name,
                    handle,
                    generated_at,
                    window_label,
                } => {
                    writeln!(output, "# {title}: {display_name} (@{handle})")?;
                    writeln!(
                        output,
                        "{window_label} · generated {}",
                        generated_at.format("%Y-%m-%d %H:%M UTC")
                    )?;
                }
                Section::Overview { cells } => write_overview(&mut output, cells)?,
                Section::Score {
                    breakdown,
                    headline,
                } => write_score(&mut output, breakdown, headline)?,
                Section::Advice { items } => write_advice(&mut output, items)?,
                Section::Footer {
                    first_day,
                    last_day,
                    days_with_data,
                    note,
                } => write_footer(&mut output, *first_day, *last_day, *days_with_data, note)?,
            }
        }

        Ok(output.into_bytes())
    }
}

fn write_overview(output: &mut String, cells: &[StatCell]) -> std::fmt::Result {
    writeln!(output)?;
    writeln!(output, "## Overview")?;
    writeln!(output, "| Metric | Value | Detail |")?;
    writeln!(output, "| --- | --- | --- |")?;
    for cell in cells {
        writeln!(output, "| {} | {} | {} |", cell.label, cell.value, cell.detail)?;
    }
    Ok(())
}

fn write_score(
    output: &mut String,
    breakdown: &ScoreBreakdown,
    headline: &str,
) -> std::fmt::Result {
    writeln!(output)?;
    writeln!(output, "## Performance Score")?;
    writeln!(
        output,
        "**{:.0}/100** {} {}",
        breakdown.total,
        tier_badge(breakdown.tier),
        headline
    )?;
    writeln!(output)?;
    writeln!(output, "- Traffic: {:.1}/{TRAFFIC_MAX:.0}", breakdown.traffic_score)?;
    writeln!(output, "- Conversion: {:.1}/{CONVERSION_MAX:.0}", breakdown.conversion_score)?;
    writeln!(output, "- Content: {:.1}/{CONTENT_MAX:.0}", breakdown.content_score)?;
    writeln!(output, "- Retention: {:.1}/{RETENTION_MAX:.0}", breakdown.retention_score)?;
    Ok(())
}

fn write_advice(output: &mut String, items: &[AdviceItem]) -> std::fmt::Result {
    writeln!(output)?;
    writeln!(output, "## Recommendations")?;

    if items.is_empty() {
        writeln!(output, "No recommendations for this window.")?;
        return Ok(());
    }

    for item in items {
        writeln!(output)?;
        writeln!(
            output,
            "### {}. {} [{}]",
            item.priority,
            item.category,
            item.status.as_str()
        )?;
        writeln!(output, "**{}**", item.problem)?;
        writeln!(output)?;
        writeln!(output, "{}", item.description)?;
        writeln!(output)?;
        for (index, solution) in item.solutions.iter().enumerate() {
            writeln!(output, "{}. {}", index + 1, solution)?;
        }
    }
    Ok(())
}

fn write_footer(
    output: &mut String,
    first_day: NaiveDate,
    last_day: NaiveDate,
    days_with_data: usize,
    note: &str,
) -> std::fmt::Result {
    writeln!(output)?;
    writeln!(output, "---")?;
    writeln!(
        output,
        "Covers {first_day} to {last_day} ({days_with_data} days with data). {note}"
    )?;
    Ok(())
}

fn tier_badge(tier: ScoreTier) -> String {
    format!("`{}`", tier.as_str())
}

/// `performance-<handle>-<window>d-<date>.<ext>`, with the handle reduced to
/// filename-safe characters.
pub fn suggested_filename(
    handle: &str,
    window_days: u32,
    date: NaiveDate,
    extension: &str,
) -> String {
    let handle: String = handle
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '-'
            }
        })
        .collect();
    format!("performance-{handle}-{window_days}d-{date}.{extension}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AdviceStatus;
    use chrono::{TimeZone, Utc};

    fn sample_report(items: Vec<AdviceItem>) -> Report {
        Report {
            sections: vec![
                Section::Header {
                    title: "Performance Report".to_string(),
                    display_name: "Maya Ortiz".to_string(),
                    handle: "maya.runs".to_string(),
                    generated_at: Utc.with_ymd_and_hms(2026, 3, 7, 9, 30, 0).unwrap(),
                    window_label: "Last 7 days".to_string(),
                },
                Section::Score {
                    breakdown: ScoreBreakdown {
                        traffic_score: 8.0,
                        conversion_score: 12.4,
                        content_score: 7.0,
                        retention_score: 10.0,
                        total: 37.4,
                        tier: ScoreTier::NeedsImprovement,
                    },
                    headline: "Needs attention.".to_string(),
                },
                Section::Advice { items },
            ],
        }
    }

    fn sample_item() -> AdviceItem {
        AdviceItem {
            priority: 1,
            category: "VISIBILITY".to_string(),
            problem: "Very low traffic: 3 views per day".to_string(),
            status: AdviceStatus::Critical,
            description: "Barely discovered.".to_string(),
            solutions: vec!["Share the link".to_string(), "Update your bio".to_string()],
        }
    }

    #[test]
    fn markdown_lists_numbered_solutions() {
        let bytes = MarkdownRenderer.render(&sample_report(vec![sample_item()])).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert!(text.starts_with("# Performance Report: Maya Ortiz (@maya.runs)"));
        assert!(text.contains("Last 7 days · generated 2026-03-07 09:30 UTC"));
        assert!(text.contains("**37/100** `NEEDS-IMPROVEMENT`"));
        assert!(text.contains("- Conversion: 12.4/30"));
        assert!(text.contains("### 1. VISIBILITY [CRITICAL]"));
        assert!(text.contains("1. Share the link\n2. Update your bio\n"));
    }

    #[test]
    fn markdown_handles_empty_advice() {
        let bytes = MarkdownRenderer.render(&sample_report(Vec::new())).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("No recommendations for this window."));
    }

    #[test]
    fn json_keeps_section_order() {
        let bytes = JsonRenderer.render(&sample_report(vec![sample_item()])).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let kinds: Vec<&str> = value["sections"]
            .as_array()
            .unwrap()
            .iter()
            .map(|section| section["section"].as_str().unwrap())
            .collect();
        assert_eq!(kinds, vec!["header", "score", "advice"]);
        assert_eq!(value["sections"][2]["items"][0]["status"], "CRITICAL");
        assert_eq!(value["sections"][1]["breakdown"]["tier"], "NEEDS-IMPROVEMENT");
    }

    #[test]
    fn filename_follows_pattern() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(
            suggested_filename("maya.runs", 30, date, "md"),
            "performance-maya.runs-30d-2026-03-07.md"
        );
        assert_eq!(
            suggested_filename("sam/trails", 7, date, "json"),
            "performance-sam-trails-7d-2026-03-07.json"
        );
    }
}
