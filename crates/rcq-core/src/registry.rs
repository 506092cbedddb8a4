#![forbid(unsafe_code)]

//! Container registry: the set of elements currently under observation.
//!
//! Identity is element reference equality (`PartialEq` on the handle). After
//! [`ContainerRegistry::reconcile`] the observed set equals the discovered set
//! exactly: stale elements are unobserved, new ones observed, and elements
//! present on both sides are left alone, so repeated passes over an unchanged
//! document cause no observer churn.

use crate::observer::SizeObserver;

/// Summary of one reconciliation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileReport<E> {
    /// Newly observed elements, in discovery order.
    pub added: Vec<E>,
    /// Number of elements unobserved and dropped.
    pub removed: usize,
    /// Number of elements already tracked and still present.
    pub retained: usize,
}

impl<E> ReconcileReport<E> {
    /// Whether the pass changed any subscription.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.removed == 0
    }
}

/// Ordered list of tracked containers.
#[derive(Debug, Clone)]
pub struct ContainerRegistry<E> {
    tracked: Vec<E>,
}

impl<E> Default for ContainerRegistry<E> {
    fn default() -> Self {
        Self {
            tracked: Vec::new(),
        }
    }
}

impl<E: PartialEq + Clone> ContainerRegistry<E> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tracked.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }

    #[must_use]
    pub fn contains(&self, element: &E) -> bool {
        self.tracked.contains(element)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.tracked.iter()
    }

    /// Diff `discovered` (the live query result) against the tracked list.
    ///
    /// Removals are unobserved before additions are observed. Duplicates in
    /// `discovered` are ignored.
    pub fn reconcile<I, O>(&mut self, discovered: I, observer: &mut O) -> ReconcileReport<E>
    where
        I: IntoIterator<Item = E>,
        O: SizeObserver<E> + ?Sized,
    {
        let mut live: Vec<E> = Vec::new();
        for element in discovered {
            if !live.contains(&element) {
                live.push(element);
            }
        }

        let before = self.tracked.len();
        self.tracked.retain(|element| {
            let keep = live.contains(element);
            if !keep {
                observer.unobserve(element);
            }
            keep
        });
        let removed = before - self.tracked.len();
        let retained = self.tracked.len();

        let mut added = Vec::new();
        for element in live {
            if self.tracked.contains(&element) {
                continue;
            }
            observer.observe(&element);
            self.tracked.push(element.clone());
            added.push(element);
        }

        ReconcileReport {
            added,
            removed,
            retained,
        }
    }

    /// Unobserve and drop every tracked element. Returns how many were dropped.
    pub fn clear<O>(&mut self, observer: &mut O) -> usize
    where
        O: SizeObserver<E> + ?Sized,
    {
        let dropped = self.tracked.len();
        for element in self.tracked.drain(..) {
            observer.unobserve(&element);
        }
        dropped
    }
}
