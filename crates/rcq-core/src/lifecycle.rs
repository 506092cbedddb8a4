#![forbid(unsafe_code)]

//! Lifecycle owner: registry, observer, and debounced reconciliation.
//!
//! [`ContainerQueries`] is host-driven. The host calls:
//! ```text
//! page ready            → on_ready(discovered)
//! store / DOM changed   → notify_change_at(now)
//! timer expired         → poll_at(now, || discover())
//! observer callback     → on_resize(element, width)
//! teardown              → shutdown()
//! ```
//! and schedules its timer from [`ContainerQueries::time_until_reconcile`].
//! Nothing here reads a clock or schedules work on its own.

use core::time::Duration;

use crate::classes::{ClassUpdate, update_container_classes};
use crate::config::ContainerConfig;
use crate::debounce::{DebounceAction, ReconcileDebouncer};
use crate::element::ContainerElement;
use crate::observer::SizeObserver;
use crate::registry::{ContainerRegistry, ReconcileReport};

pub struct ContainerQueries<E, O> {
    config: ContainerConfig,
    registry: ContainerRegistry<E>,
    observer: O,
    debouncer: ReconcileDebouncer,
    reconcile_count: u64,
}

impl<E, O> ContainerQueries<E, O>
where
    E: ContainerElement + PartialEq + Clone,
    O: SizeObserver<E>,
{
    /// Create an idle instance. Nothing is observed until the first reconcile.
    #[must_use]
    pub fn new(config: ContainerConfig, observer: O) -> Self {
        let debouncer = ReconcileDebouncer::new(config.debounce);
        Self {
            config,
            registry: ContainerRegistry::new(),
            observer,
            debouncer,
            reconcile_count: 0,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    #[must_use]
    pub fn registry(&self) -> &ContainerRegistry<E> {
        &self.registry
    }

    #[must_use]
    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// Number of reconciliation passes run so far.
    #[must_use]
    pub fn reconcile_count(&self) -> u64 {
        self.reconcile_count
    }

    /// Page-ready signal: run the initial reconciliation.
    pub fn on_ready<I>(&mut self, discovered: I) -> ReconcileReport<E>
    where
        I: IntoIterator<Item = E>,
    {
        tracing::debug!(selector = %self.config.selector(), "page ready");
        self.reconcile(discovered)
    }

    /// Reconcile immediately against `discovered`.
    ///
    /// Satisfies any pending debounced request. Newly observed containers are
    /// classified synchronously when
    /// [`classify_on_register`](ContainerConfig::classify_on_register) is set.
    pub fn reconcile<I>(&mut self, discovered: I) -> ReconcileReport<E>
    where
        I: IntoIterator<Item = E>,
    {
        self.debouncer.cancel();
        let report = self.registry.reconcile(discovered, &mut self.observer);
        self.reconcile_count += 1;

        if self.config.classify_on_register {
            for element in &report.added {
                update_container_classes(element, None, &self.config);
            }
        }

        tracing::debug!(
            pass = self.reconcile_count,
            added = report.added.len(),
            removed = report.removed,
            retained = report.retained,
            "containers reconciled"
        );
        report
    }

    /// Record an external structural-change notification at `now`.
    pub fn notify_change_at(&mut self, now: Duration) {
        self.debouncer.notify_at(now);
    }

    /// Whether a debounced reconcile is waiting.
    #[must_use]
    pub fn has_pending_reconcile(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Remaining wait before [`poll_at`](Self::poll_at) would reconcile.
    #[must_use]
    pub fn time_until_reconcile(&self, now: Duration) -> Option<Duration> {
        self.debouncer.time_until_fire(now)
    }

    /// Run the debounced reconcile if its window has elapsed.
    ///
    /// `discover` is only called when the reconcile actually fires.
    pub fn poll_at<I, F>(&mut self, now: Duration, discover: F) -> Option<ReconcileReport<E>>
    where
        I: IntoIterator<Item = E>,
        F: FnOnce() -> I,
    {
        match self.debouncer.tick_at(now) {
            DebounceAction::None => None,
            DebounceAction::Fire { coalesced, elapsed } => {
                tracing::debug!(
                    coalesced,
                    elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                    "debounced reconcile"
                );
                Some(self.reconcile(discover()))
            }
        }
    }

    /// Size-change callback: forward the reported width to the class updater.
    pub fn on_resize(&self, element: &E, width: f64) -> ClassUpdate {
        update_container_classes(element, Some(width), &self.config)
    }

    /// Stop observing every container and drop any pending reconcile.
    pub fn shutdown(&mut self) -> usize {
        self.debouncer.cancel();
        let dropped = self.registry.clear(&mut self.observer);
        tracing::debug!(dropped, "container queries shut down");
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeElement, ObserverCall, RecordingObserver};
    use pretty_assertions::assert_eq;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn queries(config: ContainerConfig) -> ContainerQueries<FakeElement, RecordingObserver> {
        ContainerQueries::new(config, RecordingObserver::default())
    }

    #[test]
    fn ready_observes_and_classifies_synchronously() {
        let node = FakeElement::new().with_width(500.0);
        let mut cq = queries(ContainerConfig::default());

        let report = cq.on_ready([node.clone()]);

        assert_eq!(report.added.len(), 1);
        assert_eq!(node.class_string(), "container-md");
        assert_eq!(cq.observer_mut().take_calls(), vec![ObserverCall::Observe(node)]);
        assert_eq!(cq.reconcile_count(), 1);
    }

    #[test]
    fn registration_classification_can_be_disabled() {
        let node = FakeElement::new().with_width(500.0);
        let mut cq = queries(ContainerConfig::default().with_classify_on_register(false));

        cq.on_ready([node.clone()]);
        assert_eq!(node.measurements(), 0);
        assert_eq!(node.class_string(), "");

        cq.on_resize(&node, 900.0);
        assert_eq!(node.class_string(), "container-lg");
    }

    #[test]
    fn retained_containers_are_not_reclassified() {
        let node = FakeElement::new().with_width(500.0);
        let mut cq = queries(ContainerConfig::default());
        cq.on_ready([node.clone()]);
        cq.reconcile([node.clone()]);
        assert_eq!(node.measurements(), 1);
    }

    #[test]
    fn notifications_are_debounced_into_one_reconcile() {
        let a = FakeElement::new();
        let b = FakeElement::new();
        let mut cq = queries(ContainerConfig::default());
        cq.on_ready([a.clone()]);
        cq.observer_mut().take_calls();

        cq.notify_change_at(ms(1_000));
        cq.notify_change_at(ms(1_030));
        cq.notify_change_at(ms(1_060));
        assert!(cq.has_pending_reconcile());
        assert_eq!(cq.time_until_reconcile(ms(1_100)), Some(ms(60)));

        let mut discovered = 0;
        assert!(
            cq.poll_at(ms(1_100), || {
                discovered += 1;
                vec![a.clone(), b.clone()]
            })
            .is_none()
        );
        assert_eq!(discovered, 0);

        let report = cq
            .poll_at(ms(1_160), || vec![a.clone(), b.clone()])
            .expect("window elapsed");
        assert_eq!(report.added, vec![b.clone()]);
        assert_eq!(cq.reconcile_count(), 2);
        assert!(!cq.has_pending_reconcile());
        assert_eq!(cq.observer_mut().take_calls(), vec![ObserverCall::Observe(b)]);
    }

    #[test]
    fn explicit_reconcile_satisfies_pending_request() {
        let mut cq = queries(ContainerConfig::default());
        cq.notify_change_at(ms(0));
        cq.reconcile(Vec::new());
        assert!(cq.poll_at(ms(500), Vec::new).is_none());
    }

    #[test]
    fn debounce_window_comes_from_config() {
        let mut cq = queries(ContainerConfig::default().with_debounce(ms(10)));
        cq.notify_change_at(ms(0));
        assert!(cq.poll_at(ms(10), Vec::new).is_some());
    }

    #[test]
    fn shutdown_unobserves_everything() {
        let (a, b) = (FakeElement::new(), FakeElement::new());
        let mut cq = queries(ContainerConfig::default());
        cq.on_ready([a.clone(), b.clone()]);
        cq.observer_mut().take_calls();
        cq.notify_change_at(ms(0));

        assert_eq!(cq.shutdown(), 2);
        assert!(cq.registry().is_empty());
        assert!(!cq.has_pending_reconcile());
        assert_eq!(
            cq.observer_mut().take_calls(),
            vec![ObserverCall::Unobserve(a), ObserverCall::Unobserve(b)]
        );
    }
}
