//! Alerts shown in the map's real-time notification panel.

use civic_map_heatmap_models::Alert;
use civic_map_issue_models::IssueSeverity;

/// Returns the current zone alerts, most severe first.
#[must_use]
pub fn zone_alerts() -> Vec<Alert> {
    [
        (
            "1",
            "High concentration of issues detected in North Zone",
            IssueSeverity::High,
        ),
        (
            "2",
            "Water supply complaints increasing in East Zone",
            IssueSeverity::Medium,
        ),
        (
            "3",
            "New road maintenance scheduled in West Zone",
            IssueSeverity::Low,
        ),
    ]
    .into_iter()
    .map(|(id, message, severity)| Alert {
        id: id.to_string(),
        message: message.to_string(),
        severity,
    })
    .collect()
}
