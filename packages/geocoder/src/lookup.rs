//! Last-write-wins place lookups.
//!
//! Every search is issued as a [`LookupTicket`] carrying a generation
//! number. When a response comes back it is only applied if no newer
//! ticket has been issued in the meantime; otherwise it is reported as
//! [`LookupOutcome::Stale`] and dropped. Responses therefore cannot move
//! the map out of issue order, regardless of network timing.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use civic_map_heatmap_models::Viewport;

use crate::service_registry::{GeocodingService, ProviderConfig};
use crate::{GeocodeError, GeocodedPlace, nominatim};

/// Something that can turn a place name into a coordinate.
#[async_trait]
pub trait PlaceResolver: Send + Sync {
    /// Resolves `query`, returning `Ok(None)` if nothing matched.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] on transport or response failures.
    async fn resolve(&self, query: &str) -> Result<Option<GeocodedPlace>, GeocodeError>;
}

#[async_trait]
impl<T: PlaceResolver + ?Sized> PlaceResolver for Arc<T> {
    async fn resolve(&self, query: &str) -> Result<Option<GeocodedPlace>, GeocodeError> {
        (**self).resolve(query).await
    }
}

/// [`PlaceResolver`] backed by a Nominatim search endpoint.
#[derive(Debug, Clone)]
pub struct NominatimResolver {
    client: reqwest::Client,
    base_url: String,
    country_codes: Option<String>,
}

impl NominatimResolver {
    /// Creates a resolver from a registry entry.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the HTTP client cannot be built.
    pub fn from_service(service: &GeocodingService) -> Result<Self, GeocodeError> {
        let client = service.build_client()?;
        let ProviderConfig::Nominatim {
            base_url,
            country_codes,
            ..
        } = &service.provider;

        Ok(Self {
            client,
            base_url: base_url.clone(),
            country_codes: country_codes.clone(),
        })
    }
}

#[async_trait]
impl PlaceResolver for NominatimResolver {
    async fn resolve(&self, query: &str) -> Result<Option<GeocodedPlace>, GeocodeError> {
        nominatim::search(
            &self.client,
            &self.base_url,
            query,
            self.country_codes.as_deref(),
        )
        .await
    }
}

/// A single issued search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTicket {
    generation: u64,
    query: String,
}

impl LookupTicket {
    /// The query text this ticket was issued for.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Issue order; later tickets have higher generations.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

/// What happened to a lookup.
#[derive(Debug)]
pub enum LookupOutcome {
    /// The place was found and this is still the latest search.
    Resolved(GeocodedPlace),
    /// The provider returned no candidates, or the query was blank.
    NotFound,
    /// The lookup failed or timed out.
    Failed(GeocodeError),
    /// A newer search was issued before this one finished.
    Stale {
        /// The superseded query.
        query: String,
    },
}

impl LookupOutcome {
    /// Recenters `viewport` on a resolved place. Any other outcome leaves
    /// it unchanged. Returns whether the viewport moved.
    pub fn apply_to(&self, viewport: &mut Viewport) -> bool {
        match self {
            Self::Resolved(place) => {
                viewport.recenter(place.position());
                true
            }
            Self::NotFound | Self::Failed(_) | Self::Stale { .. } => false,
        }
    }
}

/// Issues place lookups and suppresses stale responses.
#[derive(Debug)]
pub struct PlaceLookup<R> {
    resolver: R,
    latest: AtomicU64,
    timeout: Duration,
}

impl<R: PlaceResolver> PlaceLookup<R> {
    /// Wraps `resolver`, abandoning any lookup that exceeds `timeout`.
    #[must_use]
    pub const fn new(resolver: R, timeout: Duration) -> Self {
        Self {
            resolver,
            latest: AtomicU64::new(0),
            timeout,
        }
    }

    /// Issues a new search, superseding every earlier ticket.
    pub fn issue(&self, query: impl Into<String>) -> LookupTicket {
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        LookupTicket {
            generation,
            query: query.into(),
        }
    }

    /// Whether `ticket` is still the most recently issued search.
    #[must_use]
    pub fn is_current(&self, ticket: &LookupTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.generation
    }

    /// Runs the search for `ticket`.
    ///
    /// Failures and timeouts are logged and returned as
    /// [`LookupOutcome::Failed`]. If a newer ticket was issued while this
    /// one was in flight, the result is discarded as
    /// [`LookupOutcome::Stale`].
    pub async fn resolve(&self, ticket: LookupTicket) -> LookupOutcome {
        let query = ticket.query.trim();

        let result = if query.is_empty() {
            Ok(None)
        } else {
            log::debug!("Looking up place '{query}' (generation {})", ticket.generation);
            match tokio::time::timeout(self.timeout, self.resolver.resolve(query)).await {
                Ok(result) => result,
                Err(_) => Err(GeocodeError::Timeout {
                    after_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                }),
            }
        };

        if !self.is_current(&ticket) {
            log::debug!(
                "Discarding stale result for '{query}' (generation {})",
                ticket.generation
            );
            return LookupOutcome::Stale {
                query: ticket.query,
            };
        }

        match result {
            Ok(Some(place)) => LookupOutcome::Resolved(place),
            Ok(None) => {
                log::info!("No place found for '{query}'");
                LookupOutcome::NotFound
            }
            Err(e) => {
                log::warn!("Place lookup for '{query}' failed: {e}");
                LookupOutcome::Failed(e)
            }
        }
    }
}
