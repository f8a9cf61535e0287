//! View sessions: one-request filter sessions built from query
//! parameters, and the store of long-lived place search sessions.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::{Arc, Mutex};

use civic_map_geocoder::lookup::PlaceResolver;
use civic_map_geocoder::session::MapSession;
use civic_map_heatmap::FilterController;
use civic_map_heatmap_models::FilterError;
use civic_map_issue_models::{IssueCategory, IssueReport};
use civic_map_server_models::HeatmapQueryParams;

/// Starts a session over `issues` and applies every parameter in `params`
/// through the controller's mutators.
///
/// # Errors
///
/// Returns [`FilterError::InvalidArgument`] for an unknown window key, an
/// unknown category name, a custom window without an ordered `from`/`to`
/// pair, or `from`/`to` given with any other window.
pub fn controller_from_params(
    issues: Arc<[IssueReport]>,
    params: &HeatmapQueryParams,
) -> Result<FilterController, FilterError> {
    let mut controller = FilterController::new(issues);

    match (params.window.as_deref(), params.from, params.to) {
        (Some("custom"), Some(from), Some(to)) => controller.set_custom_range(from, to)?,
        (Some("custom"), _, _) => {
            return Err(FilterError::InvalidArgument {
                message: "custom window requires both 'from' and 'to'".to_string(),
            });
        }
        (_, Some(_), _) | (_, _, Some(_)) => {
            return Err(FilterError::InvalidArgument {
                message: "'from' and 'to' are only accepted with window=custom".to_string(),
            });
        }
        (Some(key), None, None) => controller.set_time_window_key(key)?,
        (None, None, None) => {}
    }

    if let Some(list) = params.categories.as_deref() {
        controller.set_active_categories(parse_categories(list)?);
    }

    if let Some(intensity) = params.intensity {
        controller.set_intensity_scale(intensity);
    }

    Ok(controller)
}

/// A place search session shared between requests.
pub type SharedSession = Arc<MapSession<Arc<dyn PlaceResolver>>>;

/// Place search sessions keyed by client-chosen id.
///
/// Holds at most `capacity` sessions; the oldest is evicted first.
pub struct SessionStore {
    capacity: usize,
    slots: Mutex<SessionSlots>,
}

#[derive(Default)]
struct SessionSlots {
    sessions: BTreeMap<String, SharedSession>,
    order: VecDeque<String>,
}

impl SessionStore {
    /// Creates an empty store holding up to `capacity` sessions.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            slots: Mutex::new(SessionSlots::default()),
        }
    }

    /// Returns the session for `id`, creating it with `create` if absent.
    ///
    /// # Panics
    ///
    /// Panics if the `Mutex` is poisoned.
    pub fn get_or_insert_with(
        &self,
        id: &str,
        create: impl FnOnce() -> SharedSession,
    ) -> SharedSession {
        let mut slots = self.slots.lock().expect("Session store mutex poisoned");
        if let Some(session) = slots.sessions.get(id) {
            return Arc::clone(session);
        }

        while slots.sessions.len() >= self.capacity {
            let Some(oldest) = slots.order.pop_front() else {
                break;
            };
            slots.sessions.remove(&oldest);
            log::debug!("Evicted map session '{oldest}'");
        }

        let session = create();
        slots.sessions.insert(id.to_string(), Arc::clone(&session));
        slots.order.push_back(id.to_string());
        drop(slots);

        log::debug!("Started map session '{id}'");
        session
    }

    /// Number of live sessions.
    ///
    /// # Panics
    ///
    /// Panics if the `Mutex` is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .expect("Session store mutex poisoned")
            .sessions
            .len()
    }

    /// Whether the store holds no sessions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Parses a comma-separated category list, rejecting unknown names.
fn parse_categories(list: &str) -> Result<BTreeSet<IssueCategory>, FilterError> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<IssueCategory>()
                .map_err(|_| FilterError::InvalidArgument {
                    message: format!("unknown category '{s}'"),
                })
        })
        .collect()
}
