//! In-memory element and observer doubles for unit tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::element::ContainerElement;
use crate::observer::SizeObserver;

#[derive(Debug, Default)]
struct FakeNode {
    attributes: RefCell<Vec<(String, String)>>,
    classes: RefCell<Vec<String>>,
    width: Cell<f64>,
    measurements: Cell<u32>,
}

/// Shared handle to a fake node. Clones alias the same node and compare equal,
/// like two references to one DOM element.
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeElement(Rc<FakeNode>);

impl FakeElement {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_attribute(self, name: &str, value: &str) -> Self {
        self.0
            .attributes
            .borrow_mut()
            .push((name.to_owned(), value.to_owned()));
        self
    }

    pub(crate) fn with_width(self, width: f64) -> Self {
        self.0.width.set(width);
        self
    }

    pub(crate) fn with_class(self, name: &str) -> Self {
        self.0.classes.borrow_mut().push(name.to_owned());
        self
    }

    /// Classes in insertion order, joined like `classList.toString()`.
    pub(crate) fn class_string(&self) -> String {
        self.0.classes.borrow().join(" ")
    }

    pub(crate) fn measurements(&self) -> u32 {
        self.0.measurements.get()
    }
}

impl PartialEq for FakeElement {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl ContainerElement for FakeElement {
    fn attribute(&self, name: &str) -> Option<String> {
        self.0
            .attributes
            .borrow()
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
    }

    fn measure_width(&self) -> f64 {
        self.0.measurements.set(self.0.measurements.get() + 1);
        self.0.width.get()
    }

    fn set_class(&self, name: &str, present: bool) {
        let mut classes = self.0.classes.borrow_mut();
        let position = classes.iter().position(|existing| existing == name);
        match (present, position) {
            (true, None) => classes.push(name.to_owned()),
            (false, Some(idx)) => {
                classes.remove(idx);
            }
            _ => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ObserverCall {
    Observe(FakeElement),
    Unobserve(FakeElement),
}

/// Observer double that records every call.
#[derive(Debug, Default)]
pub(crate) struct RecordingObserver {
    pub(crate) calls: Vec<ObserverCall>,
}

impl RecordingObserver {
    pub(crate) fn take_calls(&mut self) -> Vec<ObserverCall> {
        std::mem::take(&mut self.calls)
    }
}

impl SizeObserver<FakeElement> for RecordingObserver {
    fn observe(&mut self, target: &FakeElement) {
        self.calls.push(ObserverCall::Observe(target.clone()));
    }

    fn unobserve(&mut self, target: &FakeElement) {
        self.calls.push(ObserverCall::Unobserve(target.clone()));
    }
}
