//! Owner of a view session's filter state.
//!
//! Every mutator recomputes the rendered sample set immediately; there is
//! no batching across calls.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use civic_map_heatmap_models::{DateRange, FilterError, FilterState, RenderedSample, TimeWindow};
use civic_map_issue_models::{IssueCategory, IssueReport};

use crate::projection::project;

/// Source of the current time for window cutoffs.
pub type Clock = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Holds the [`FilterState`] for one view session and keeps the derived
/// heat layer samples in sync with it.
pub struct FilterController {
    issues: Arc<[IssueReport]>,
    state: FilterState,
    clock: Clock,
    samples: Vec<RenderedSample>,
    revision: u64,
}

impl fmt::Debug for FilterController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterController")
            .field("issues", &self.issues.len())
            .field("state", &self.state)
            .field("samples", &self.samples.len())
            .field("revision", &self.revision)
            .finish_non_exhaustive()
    }
}

impl FilterController {
    /// Starts a session over `issues` with the default filter state,
    /// using the system clock.
    #[must_use]
    pub fn new(issues: impl Into<Arc<[IssueReport]>>) -> Self {
        Self::with_clock(issues, Box::new(Utc::now))
    }

    /// Starts a session with an explicit clock.
    #[must_use]
    pub fn with_clock(issues: impl Into<Arc<[IssueReport]>>, clock: Clock) -> Self {
        let mut controller = Self {
            issues: issues.into(),
            state: FilterState::default(),
            clock,
            samples: Vec::new(),
            revision: 0,
        };
        controller.recompute();
        controller
    }

    /// Current filter state.
    #[must_use]
    pub const fn state(&self) -> &FilterState {
        &self.state
    }

    /// Samples for the current state.
    #[must_use]
    pub fn samples(&self) -> &[RenderedSample] {
        &self.samples
    }

    /// Number of recomputations so far, starting at 1 after construction.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// The issue reports this session projects.
    #[must_use]
    pub fn issues(&self) -> &[IssueReport] {
        &self.issues
    }

    /// Replaces the time window.
    pub fn set_time_window(&mut self, window: TimeWindow) {
        self.state.set_time_window(window);
        self.recompute();
    }

    /// Parses a window key (`24h`, `7d`, `30d`) and applies it.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidArgument`] for an unknown key, or for
    /// `custom` (use [`Self::set_custom_range`] instead). State is left
    /// unchanged on error.
    pub fn set_time_window_key(&mut self, key: &str) -> Result<(), FilterError> {
        let window = key.parse::<TimeWindow>().inspect_err(|e| {
            log::debug!("Rejected time window key '{key}': {e}");
        })?;
        self.set_time_window(window);
        Ok(())
    }

    /// Switches to a custom window covering `from..=to`.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidArgument`] if `from` is after `to`.
    /// State is left unchanged on error.
    pub fn set_custom_range(
        &mut self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<(), FilterError> {
        let range = DateRange::new(from, to)?;
        self.set_time_window(TimeWindow::Custom(range));
        Ok(())
    }

    /// Shows `category` if hidden, hides it if shown.
    pub fn toggle_category(&mut self, category: IssueCategory) {
        self.state.toggle_category(category);
        self.recompute();
    }

    /// Shows exactly the given categories, hiding every other one.
    pub fn set_active_categories(&mut self, categories: impl IntoIterator<Item = IssueCategory>) {
        self.state.set_active_categories(categories);
        self.recompute();
    }

    /// Sets the intensity, clamped into `[0.0, 1.0]`.
    pub fn set_intensity_scale(&mut self, value: f64) {
        self.state.set_intensity_scale(value);
        self.recompute();
    }

    /// Stores the place search text.
    pub fn set_search_query(&mut self, text: impl Into<String>) {
        self.state.set_search_query(text);
        self.recompute();
    }

    /// Recomputes against a fresh `now` without touching the filters.
    pub fn refresh(&mut self) {
        self.recompute();
    }

    fn recompute(&mut self) {
        let now = (self.clock)();
        self.samples = project(&self.issues, &self.state, now);
        self.revision += 1;
        log::trace!(
            "Recomputed heatmap (revision {}): {} of {} issues visible",
            self.revision,
            self.samples.len(),
            self.issues.len()
        );
    }
}
