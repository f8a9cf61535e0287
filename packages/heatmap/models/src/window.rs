//! Time windows used to narrow the heatmap to recent reports.

use std::str::FromStr;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use crate::FilterError;

/// An explicit, inclusive date range for a custom time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    from: DateTime<Utc>,
    to: DateTime<Utc>,
}

impl DateRange {
    /// Creates a range covering `from..=to`.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidArgument`] if `from` is after `to`.
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Self, FilterError> {
        if from > to {
            return Err(FilterError::InvalidArgument {
                message: format!("custom range starts after it ends ({from} > {to})"),
            });
        }
        Ok(Self { from, to })
    }

    /// Start of the range (inclusive).
    #[must_use]
    pub const fn from(&self) -> DateTime<Utc> {
        self.from
    }

    /// End of the range (inclusive).
    #[must_use]
    pub const fn to(&self) -> DateTime<Utc> {
        self.to
    }

    /// Whether `at` falls inside the range, both ends inclusive.
    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from <= at && at <= self.to
    }
}

/// How far back the heatmap looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "kind", content = "range", rename_all = "camelCase")]
pub enum TimeWindow {
    /// Reports filed in the last 24 hours.
    #[default]
    Last24Hours,
    /// Reports filed in the last 7 days.
    Last7Days,
    /// Reports filed in the last 30 days.
    Last30Days,
    /// Reports filed inside an explicit date range.
    Custom(DateRange),
}

impl TimeWindow {
    /// Returns the short key used by the view's window selector.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Last24Hours => "24h",
            Self::Last7Days => "7d",
            Self::Last30Days => "30d",
            Self::Custom(_) => "custom",
        }
    }

    /// Returns the fixed look-back duration, or `None` for a custom range.
    #[must_use]
    pub fn duration(&self) -> Option<TimeDelta> {
        match self {
            Self::Last24Hours => Some(TimeDelta::hours(24)),
            Self::Last7Days => Some(TimeDelta::days(7)),
            Self::Last30Days => Some(TimeDelta::days(30)),
            Self::Custom(_) => None,
        }
    }

    /// Returns the earliest timestamp this window admits relative to `now`.
    #[must_use]
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Self::Custom(range) => range.from(),
            fixed => fixed
                .duration()
                .and_then(|d| now.checked_sub_signed(d))
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
        }
    }

    /// Whether a report filed at `reported_at` is visible at `now`.
    ///
    /// Fixed windows have an inclusive lower bound and no upper bound.
    #[must_use]
    pub fn admits(&self, reported_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self {
            Self::Custom(range) => range.contains(reported_at),
            fixed => reported_at >= fixed.cutoff(now),
        }
    }
}

impl FromStr for TimeWindow {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "24h" => Ok(Self::Last24Hours),
            "7d" => Ok(Self::Last7Days),
            "30d" => Ok(Self::Last30Days),
            "custom" => Err(FilterError::InvalidArgument {
                message: "custom window requires an explicit date range".to_string(),
            }),
            other => Err(FilterError::InvalidArgument {
                message: format!("unknown time window '{other}'"),
            }),
        }
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Custom(range) => write!(f, "{}..={}", range.from(), range.to()),
            fixed => f.write_str(fixed.key()),
        }
    }
}
