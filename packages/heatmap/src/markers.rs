//! Marker layer: one pin per issue report, colored by severity.

use civic_map_heatmap_models::IssueMarker;
use civic_map_issue_models::IssueReport;

/// Builds a marker for every issue, regardless of the active filters.
#[must_use]
pub fn markers(issues: &[IssueReport]) -> Vec<IssueMarker> {
    issues.iter().map(marker).collect()
}

/// Builds the marker for a single issue.
#[must_use]
pub fn marker(issue: &IssueReport) -> IssueMarker {
    IssueMarker {
        id: issue.id,
        position: issue.position,
        title: issue.title.clone(),
        category: issue.category,
        category_label: issue.category.label().to_string(),
        severity: issue.severity,
        color: issue.severity.marker_color().to_string(),
        reported_at: issue.reported_at,
    }
}
