//! Built-in issue reports used when no other data source is wired in.

use chrono::{DateTime, TimeDelta, Utc};
use civic_map_issue_models::{IssueCategory, IssueReport, IssueSeverity, LatLng};

/// Returns the demo dataset, with report times relative to `now`.
#[must_use]
pub fn sample_issues(now: DateTime<Utc>) -> Vec<IssueReport> {
    [
        (
            1,
            "Pothole",
            (18.5204, 73.8567),
            1.0,
            IssueCategory::Road,
            IssueSeverity::High,
            TimeDelta::zero(),
        ),
        (
            2,
            "Water Leakage",
            (18.5304, 73.8467),
            0.8,
            IssueCategory::Water,
            IssueSeverity::Medium,
            TimeDelta::hours(1),
        ),
        (
            3,
            "Garbage Collection",
            (18.5404, 73.8367),
            0.5,
            IssueCategory::Waste,
            IssueSeverity::Low,
            TimeDelta::hours(2),
        ),
        (
            4,
            "Street Light Outage",
            (18.5104, 73.8667),
            0.7,
            IssueCategory::Electricity,
            IssueSeverity::Medium,
            TimeDelta::days(3),
        ),
        (
            5,
            "Blocked Storm Drain",
            (18.5004, 73.8267),
            0.9,
            IssueCategory::Infrastructure,
            IssueSeverity::High,
            TimeDelta::days(12),
        ),
    ]
    .into_iter()
    .map(
        |(id, title, (lat, lng), weight, category, severity, age)| IssueReport {
            id,
            title: title.to_string(),
            position: LatLng::new(lat, lng),
            weight,
            category,
            severity,
            reported_at: now - age,
        },
    )
    .collect()
}
