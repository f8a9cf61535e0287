//! Projection of issue reports into weighted heat layer samples.

use chrono::{DateTime, Utc};
use civic_map_heatmap_models::{FilterState, RenderedSample};
use civic_map_issue_models::IssueReport;

/// Projects `issues` through `state` into heat layer samples.
///
/// Keeps every issue whose category is active and whose report time is
/// admitted by the state's time window at `now`, scaling its weight by the
/// intensity. Output order follows input order. Never fails: an empty
/// category set or an empty window simply yields no samples.
#[must_use]
pub fn project(
    issues: &[IssueReport],
    state: &FilterState,
    now: DateTime<Utc>,
) -> Vec<RenderedSample> {
    let window = state.time_window();
    let intensity = state.intensity_scale();

    issues
        .iter()
        .filter(|issue| state.is_active(issue.category))
        .filter(|issue| window.admits(issue.reported_at, now))
        .map(|issue| RenderedSample {
            lat: issue.position.lat,
            lng: issue.position.lng,
            weight: issue.weight * intensity,
        })
        .collect()
}
