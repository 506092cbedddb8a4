//! Fake document shared by the integration tests.
//!
//! Elements are `Rc` handles so identity behaves like DOM references: two
//! elements with identical attributes are still different containers.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use rcq_core::{ContainerElement, SizeObserver};

#[derive(Debug, Default)]
struct Node {
    attributes: RefCell<BTreeMap<String, String>>,
    classes: RefCell<Vec<String>>,
    width: RefCell<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct Element(Rc<Node>);

impl Element {
    pub fn container(width: f64) -> Self {
        let element = Self::default();
        element.set_attribute("data-responsive-container", "");
        *element.0.width.borrow_mut() = width;
        element
    }

    pub fn set_attribute(&self, name: &str, value: &str) {
        self.0
            .attributes
            .borrow_mut()
            .insert(name.to_owned(), value.to_owned());
    }

    pub fn remove_attribute(&self, name: &str) {
        self.0.attributes.borrow_mut().remove(name);
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.0.attributes.borrow().contains_key(name)
    }

    pub fn set_width(&self, width: f64) {
        *self.0.width.borrow_mut() = width;
    }

    pub fn classes(&self) -> Vec<String> {
        self.0.classes.borrow().clone()
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl ContainerElement for Element {
    fn attribute(&self, name: &str) -> Option<String> {
        self.0.attributes.borrow().get(name).cloned()
    }

    fn measure_width(&self) -> f64 {
        *self.0.width.borrow()
    }

    fn set_class(&self, name: &str, present: bool) {
        let mut classes = self.0.classes.borrow_mut();
        let idx = classes.iter().position(|c| c == name);
        match (present, idx) {
            (true, None) => classes.push(name.to_owned()),
            (false, Some(idx)) => {
                classes.remove(idx);
            }
            _ => {}
        }
    }
}

/// Body-level element list standing in for `document.querySelectorAll`.
#[derive(Debug, Default)]
pub struct Document {
    elements: Vec<Element>,
}

impl Document {
    pub fn append(&mut self, element: Element) {
        self.elements.push(element);
    }

    pub fn remove(&mut self, element: &Element) {
        self.elements.retain(|e| e != element);
    }

    pub fn query(&self, attribute: &str) -> Vec<Element> {
        self.elements
            .iter()
            .filter(|e| e.has_attribute(attribute))
            .cloned()
            .collect()
    }
}

/// Observer that tracks the live subscription set and counts churn.
#[derive(Debug, Default)]
pub struct CountingObserver {
    pub observed: Vec<Element>,
    pub observe_calls: usize,
    pub unobserve_calls: usize,
}

impl CountingObserver {
    pub fn churn(&self) -> usize {
        self.observe_calls + self.unobserve_calls
    }
}

impl SizeObserver<Element> for CountingObserver {
    fn observe(&mut self, target: &Element) {
        assert!(
            !self.observed.contains(target),
            "element observed twice without unobserve"
        );
        self.observe_calls += 1;
        self.observed.push(target.clone());
    }

    fn unobserve(&mut self, target: &Element) {
        let before = self.observed.len();
        self.observed.retain(|e| e != target);
        assert_eq!(before - 1, self.observed.len(), "unobserve of unknown element");
        self.unobserve_calls += 1;
    }
}
