use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::advice::{self, AdviceSignals};
use crate::aggregate;
use crate::error::DiagnosticsError;
use crate::models::{Diagnostics, ProfileSnapshot};
use crate::ratios;
use crate::render::{self, DocumentRenderer};
use crate::report;
use crate::score;

#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Resolves the caller's identity. A blank handle counts as no identity.
pub fn resolve_caller(handle: Option<&str>) -> Result<String, DiagnosticsError> {
    match handle.map(str::trim) {
        Some(handle) if !handle.is_empty() => Ok(handle.to_string()),
        _ => Err(DiagnosticsError::AuthenticationRequired),
    }
}

/// Runs aggregation, ratios, scoring and advice over an already-loaded snapshot.
pub fn diagnose(
    snapshot: &ProfileSnapshot,
    window_days: i64,
) -> Result<Diagnostics, DiagnosticsError> {
    let summary = aggregate::summarize(&snapshot.metrics, snapshot.clicks, window_days)?;
    let ratios = ratios::derive(&summary, &snapshot.metrics);
    let score = score::score(&summary, &ratios, &snapshot.inventory);
    let advice = advice::recommend(&AdviceSignals::new(&summary, &ratios, &snapshot.inventory));

    debug!(
        handle = %snapshot.profile.handle,
        total_views = summary.total_views,
        conversion_rate = ratios.conversion_rate,
        score = score.total,
        advice_items = advice.len(),
        "diagnostics computed"
    );

    Ok(Diagnostics {
        summary,
        ratios,
        score,
        advice,
    })
}

/// Produces the rendered report for `handle`.
///
/// `snapshot` is `None` when the data-access layer could not resolve the
/// profile. The window is validated before anything else is looked at.
pub fn generate_report(
    handle: &str,
    snapshot: Option<&ProfileSnapshot>,
    window_days: i64,
    generated_at: DateTime<Utc>,
    renderer: &dyn DocumentRenderer,
) -> Result<RenderedDocument, DiagnosticsError> {
    let window = aggregate::validate_window(window_days)?;
    let snapshot = snapshot.ok_or_else(|| DiagnosticsError::ProfileNotFound {
        handle: handle.to_string(),
    })?;

    let diagnostics = diagnose(snapshot, window_days)?;
    let report = report::compose(snapshot, &diagnostics, generated_at);
    let bytes = renderer.render(&report)?;
    let filename = render::suggested_filename(
        &snapshot.profile.handle,
        window,
        generated_at.date_naive(),
        renderer.extension(),
    );

    info!(
        handle = %snapshot.profile.handle,
        window_days = window,
        tier = diagnostics.score.tier.as_str(),
        bytes = bytes.len(),
        "report generated"
    );

    Ok(RenderedDocument { filename, bytes })
}
