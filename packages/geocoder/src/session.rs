//! A map view session: filters, viewport and place search together.

use std::sync::{Mutex, MutexGuard};

use civic_map_heatmap::FilterController;
use civic_map_heatmap_models::Viewport;

use crate::lookup::{LookupOutcome, PlaceLookup, PlaceResolver};

/// One user's view of the issue map.
///
/// The search text lives in the session's filter state. Each call to
/// [`Self::search`] stores it there, issues a lookup ticket for it and
/// recenters the viewport when the result comes back. All searches in a
/// session share one [`PlaceLookup`], so when searches overlap only the
/// most recently issued one can move the view.
#[derive(Debug)]
pub struct MapSession<R> {
    filters: Mutex<FilterController>,
    viewport: Mutex<Viewport>,
    lookup: PlaceLookup<R>,
}

impl<R: PlaceResolver> MapSession<R> {
    /// Starts a session at the default viewport.
    #[must_use]
    pub fn new(filters: FilterController, lookup: PlaceLookup<R>) -> Self {
        Self {
            filters: Mutex::new(filters),
            viewport: Mutex::new(Viewport::default()),
            lookup,
        }
    }

    /// Locks the session's filter controller.
    ///
    /// # Panics
    ///
    /// Panics if the `Mutex` is poisoned.
    pub fn filters(&self) -> MutexGuard<'_, FilterController> {
        self.filters.lock().expect("Filter controller mutex poisoned")
    }

    /// The current map view.
    ///
    /// # Panics
    ///
    /// Panics if the `Mutex` is poisoned.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        *self.viewport.lock().expect("Viewport mutex poisoned")
    }

    /// Sets the search text and looks it up.
    ///
    /// A resolved place recenters the viewport at the default zoom. Not
    /// found, failed and superseded searches leave it where it is.
    ///
    /// # Panics
    ///
    /// Panics if a session `Mutex` is poisoned.
    pub async fn search(&self, text: impl Into<String>) -> LookupOutcome {
        let ticket = {
            let mut filters = self.filters();
            filters.set_search_query(text);
            self.lookup.issue(filters.state().search_query())
        };

        let outcome = self.lookup.resolve(ticket).await;

        let mut viewport = self.viewport.lock().expect("Viewport mutex poisoned");
        if outcome.apply_to(&mut viewport) {
            log::debug!(
                "Recentered map on ({}, {})",
                viewport.center.lat,
                viewport.center.lng
            );
        }
        drop(viewport);

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GeocodeError, GeocodedPlace};
    use async_trait::async_trait;
    use civic_map_issue_models::IssueReport;
    use std::collections::BTreeMap;
    use std::time::Duration;
    use tokio::sync::oneshot;

    const PUNE: (f64, f64) = (18.5204, 73.8567);
    const MUMBAI: (f64, f64) = (19.0760, 72.8777);

    fn place((latitude, longitude): (f64, f64)) -> GeocodedPlace {
        GeocodedPlace {
            latitude,
            longitude,
            display_name: None,
        }
    }

    /// Answers each query only when the test releases its response.
    struct ScriptedResolver {
        pending: Mutex<BTreeMap<String, oneshot::Receiver<Option<GeocodedPlace>>>>,
    }

    impl ScriptedResolver {
        fn new(
            entries: impl IntoIterator<Item = (&'static str, oneshot::Receiver<Option<GeocodedPlace>>)>,
        ) -> Self {
            Self {
                pending: Mutex::new(
                    entries
                        .into_iter()
                        .map(|(q, rx)| (q.to_string(), rx))
                        .collect(),
                ),
            }
        }
    }

    #[async_trait]
    impl PlaceResolver for ScriptedResolver {
        async fn resolve(&self, query: &str) -> Result<Option<GeocodedPlace>, GeocodeError> {
            let rx = self.pending.lock().unwrap().remove(query);
            match rx {
                Some(rx) => Ok(rx.await.ok().flatten()),
                None => Ok(None),
            }
        }
    }

    fn session<R: PlaceResolver>(resolver: R) -> MapSession<R> {
        MapSession::new(
            FilterController::new(Vec::<IssueReport>::new()),
            PlaceLookup::new(resolver, Duration::from_secs(5)),
        )
    }

    async fn race(
        mumbai_answers_first: bool,
    ) -> (LookupOutcome, LookupOutcome, MapSession<ScriptedResolver>) {
        let (pune_tx, pune_rx) = oneshot::channel();
        let (mumbai_tx, mumbai_rx) = oneshot::channel();
        let session = session(ScriptedResolver::new([
            ("Pune", pune_rx),
            ("Mumbai", mumbai_rx),
        ]));

        let (pune, mumbai, ()) = tokio::join!(
            session.search("Pune"),
            session.search("Mumbai"),
            async move {
                if mumbai_answers_first {
                    mumbai_tx.send(Some(place(MUMBAI))).unwrap();
                    tokio::task::yield_now().await;
                    pune_tx.send(Some(place(PUNE))).unwrap();
                } else {
                    pune_tx.send(Some(place(PUNE))).unwrap();
                    tokio::task::yield_now().await;
                    mumbai_tx.send(Some(place(MUMBAI))).unwrap();
                }
            },
        );

        (pune, mumbai, session)
    }

    #[tokio::test]
    async fn newest_search_wins_when_older_response_arrives_last() {
        let (pune, mumbai, session) = race(true).await;
        assert!(matches!(pune, LookupOutcome::Stale { ref query } if query == "Pune"));
        assert!(matches!(mumbai, LookupOutcome::Resolved(_)));

        let viewport = session.viewport();
        assert!((viewport.center.lat - MUMBAI.0).abs() < 1e-9);
        assert!((viewport.center.lng - MUMBAI.1).abs() < 1e-9);
        assert_eq!(session.filters().state().search_query(), "Mumbai");
    }

    #[tokio::test]
    async fn newest_search_wins_when_older_response_arrives_first() {
        let (pune, mumbai, session) = race(false).await;
        assert!(matches!(pune, LookupOutcome::Stale { .. }));
        assert!(matches!(mumbai, LookupOutcome::Resolved(_)));
        assert!((session.viewport().center.lat - MUMBAI.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn unmatched_search_keeps_the_view() {
        let session = session(ScriptedResolver::new(std::iter::empty()));
        let before = session.viewport();

        let outcome = session.search("Atlantis").await;
        assert!(matches!(outcome, LookupOutcome::NotFound));
        assert_eq!(session.viewport(), before);
        assert_eq!(session.filters().state().search_query(), "Atlantis");
    }

    #[tokio::test]
    async fn search_does_not_touch_the_heatmap_filters() {
        let (tx, rx) = oneshot::channel();
        let session = session(ScriptedResolver::new([("Mumbai", rx)]));
        tx.send(Some(place(MUMBAI))).unwrap();

        let before = *session.filters().state().time_window();
        let outcome = session.search("Mumbai").await;
        assert!(matches!(outcome, LookupOutcome::Resolved(_)));
        assert_eq!(*session.filters().state().time_window(), before);

        let viewport = session.viewport();
        assert!((viewport.center.lng - MUMBAI.1).abs() < 1e-9);
        assert_eq!(viewport.zoom, civic_map_heatmap_models::DEFAULT_ZOOM);
    }
}
