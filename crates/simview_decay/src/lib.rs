//! # simview_decay
//!
//! A decay time window component and a periodic expiry checker — the simplest
//! possible consumer of the view container, with the view type set to the
//! entity identity itself.

use serde::{Deserialize, Serialize};
use tracing::debug;

use simview_entity::{Component, Entity, EntityRecord, SubscriptionDescriptor};
use simview_store::EntityStore;
use simview_view::{ViewContainer, ViewError, ViewHandler};

/// A decay time window attached to an entity. Times are in seconds of
/// simulation time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Decay {
    /// When the decay window opened.
    pub start_time: f64,
    /// When the entity expires.
    pub end_time: f64,
}

impl Component for Decay {
    fn type_name() -> &'static str {
        "Decay"
    }
}

impl Decay {
    /// Seconds left before expiry; zero once expired.
    #[must_use]
    pub fn time_remaining(&self, now: f64) -> f64 {
        (self.end_time - now).max(0.0)
    }

    /// Fraction of the window still remaining, clamped to `[0, 1]`.
    ///
    /// A zero-duration window reports 0 rather than dividing by zero.
    #[must_use]
    pub fn percent_remaining(&self, now: f64) -> f64 {
        let duration = self.end_time - self.start_time;
        if duration <= 0.0 {
            return 0.0;
        }
        (self.time_remaining(now) / duration).clamp(0.0, 1.0)
    }

    /// Returns `true` once the window has closed.
    #[must_use]
    pub fn is_dead(&self, now: f64) -> bool {
        now >= self.end_time
    }
}

/// Identity pass-through views: the "view" for an entity is the entity itself.
struct IdentityViews;

impl ViewHandler for IdentityViews {
    type View = Entity;

    fn create_view(&mut self, record: &EntityRecord) -> anyhow::Result<Entity> {
        Ok(record.entity())
    }
}

/// Tracks every entity carrying a [`Decay`] component and destroys the expired
/// ones on each tick.
pub struct ExpiryChecker {
    container: ViewContainer<IdentityViews>,
}

impl ExpiryChecker {
    /// Create a checker. Nothing is tracked until [`ExpiryChecker::start`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            container: ViewContainer::new(
                SubscriptionDescriptor::new().require(Decay::type_id()),
                IdentityViews,
            ),
        }
    }

    /// Subscribe to decaying entities.
    pub fn start<S: EntityStore>(&mut self, store: &mut S) -> Result<(), ViewError> {
        self.container.start(store)
    }

    /// Reconcile membership, then destroy every tracked entity whose window
    /// has closed at `now`. Returns the number destroyed.
    pub fn tick<S: EntityStore>(&mut self, store: &mut S, now: f64) -> Result<usize, ViewError> {
        self.container.update(store)?;

        // Snapshot is a cheap cached read between membership changes; copy it
        // out so the store can be mutated while iterating.
        let tracked: Vec<Entity> = self.container.snapshot()?.to_vec();
        let mut destroyed = 0;
        for entity in tracked {
            let Some(record) = store.fetch(entity) else {
                continue;
            };
            let Some(decay) = record.get::<Decay>() else {
                continue;
            };
            if decay.is_dead(now) {
                store.destroy(entity);
                destroyed += 1;
                debug!(%entity, now, end_time = decay.end_time, "expired entity destroyed");
            }
        }
        Ok(destroyed)
    }

    /// Stop tracking and release the subscription.
    pub fn stop<S: EntityStore>(&mut self, store: &mut S) -> Result<(), ViewError> {
        self.container.stop(store)
    }

    /// How many entities are currently tracked.
    #[must_use]
    pub fn tracked_count(&self) -> usize {
        self.container.managed_count()
    }
}

impl Default for ExpiryChecker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use simview_store::MemoryStore;

    use super::*;

    #[test]
    fn test_decay_mid_window() {
        let decay = Decay {
            start_time: 0.0,
            end_time: 100.0,
        };
        assert_eq!(decay.time_remaining(40.0), 60.0);
        assert_eq!(decay.percent_remaining(40.0), 0.6);
        assert!(!decay.is_dead(40.0));
    }

    #[test]
    fn test_decay_at_and_past_expiry() {
        let decay = Decay {
            start_time: 0.0,
            end_time: 100.0,
        };
        for now in [100.0, 150.0] {
            assert_eq!(decay.time_remaining(now), 0.0);
            assert_eq!(decay.percent_remaining(now), 0.0);
            assert!(decay.is_dead(now));
        }
    }

    #[test]
    fn test_zero_duration_window_never_nan() {
        let decay = Decay {
            start_time: 50.0,
            end_time: 50.0,
        };
        let percent = decay.percent_remaining(10.0);
        assert!(percent.is_finite());
        assert_eq!(percent, 0.0);
    }

    #[test]
    fn test_checker_destroys_only_expired() {
        let mut store = MemoryStore::new();
        let expired = store.spawn();
        store
            .set_component(
                expired,
                &Decay {
                    start_time: 0.0,
                    end_time: 10.0,
                },
            )
            .unwrap();
        let alive = store.spawn();
        store
            .set_component(
                alive,
                &Decay {
                    start_time: 0.0,
                    end_time: 100.0,
                },
            )
            .unwrap();

        let mut checker = ExpiryChecker::new();
        checker.start(&mut store).unwrap();
        assert_eq!(checker.tracked_count(), 2);

        assert_eq!(checker.tick(&mut store, 50.0).unwrap(), 1);
        assert!(!store.exists(expired));
        assert!(store.exists(alive));

        // The destruction shows up as a removal on the following tick.
        assert_eq!(checker.tick(&mut store, 50.0).unwrap(), 0);
        assert_eq!(checker.tracked_count(), 1);
    }

    #[test]
    fn test_checker_picks_up_new_decaying_entities() {
        let mut store = MemoryStore::new();
        let mut checker = ExpiryChecker::new();
        checker.start(&mut store).unwrap();
        assert_eq!(checker.tracked_count(), 0);

        let e = store.spawn();
        store
            .set_component(
                e,
                &Decay {
                    start_time: 0.0,
                    end_time: 5.0,
                },
            )
            .unwrap();

        // First tick adopts the entity; it is already expired, so it dies in
        // the same tick.
        assert_eq!(checker.tick(&mut store, 10.0).unwrap(), 1);
        assert!(!store.exists(e));

        checker.stop(&mut store).unwrap();
    }
}
