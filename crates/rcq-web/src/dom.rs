#![forbid(unsafe_code)]

//! DOM implementations of the core element and observer seams.

use js_sys::Array;
use rcq_core::{ContainerElement, SizeObserver};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, ResizeObserver};

/// A live DOM element acting as a container. Equality is JS identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomContainer(Element);

impl DomContainer {
    #[must_use]
    pub fn new(element: Element) -> Self {
        Self(element)
    }

    #[must_use]
    pub fn element(&self) -> &Element {
        &self.0
    }
}

impl ContainerElement for DomContainer {
    fn attribute(&self, name: &str) -> Option<String> {
        self.0.get_attribute(name)
    }

    fn measure_width(&self) -> f64 {
        self.0.get_bounding_client_rect().width()
    }

    fn set_class(&self, name: &str, present: bool) {
        // Throws for empty or whitespace-containing tokens.
        if let Err(err) = self.0.class_list().toggle_with_force(name, present) {
            tracing::warn!(class = name, error = ?err, "classList.toggle rejected class name");
        }
    }
}

/// Every element in `document` matching `selector`, in document order.
pub(crate) fn discover(document: &Document, selector: &str) -> Vec<DomContainer> {
    let nodes = match document.query_selector_all(selector) {
        Ok(nodes) => nodes,
        Err(err) => {
            tracing::warn!(selector, error = ?err, "querySelectorAll failed");
            return Vec::new();
        }
    };
    (0..nodes.length())
        .filter_map(|idx| nodes.item(idx))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .map(DomContainer::new)
        .collect()
}

type ResizeCallback = dyn FnMut(Array, ResizeObserver);

/// One shared `ResizeObserver` for every tracked container.
///
/// When the browser lacks `ResizeObserver` the bridge is inert: containers
/// are still classified at registration, but not on later size changes.
pub struct ResizeObserverBridge {
    observer: Option<ResizeObserver>,
    _callback: Closure<ResizeCallback>,
}

impl ResizeObserverBridge {
    pub(crate) fn new(callback: Closure<ResizeCallback>) -> Self {
        let observer = match ResizeObserver::new(callback.as_ref().unchecked_ref()) {
            Ok(observer) => Some(observer),
            Err(err) => {
                tracing::warn!(error = ?err, "ResizeObserver unavailable");
                None
            }
        };
        Self {
            observer,
            _callback: callback,
        }
    }

    /// Whether size changes are actually being reported.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.observer.is_some()
    }
}

impl SizeObserver<DomContainer> for ResizeObserverBridge {
    fn observe(&mut self, target: &DomContainer) {
        if let Some(observer) = &self.observer {
            observer.observe(target.element());
        }
    }

    fn unobserve(&mut self, target: &DomContainer) {
        if let Some(observer) = &self.observer {
            observer.unobserve(target.element());
        }
    }
}

impl Drop for ResizeObserverBridge {
    fn drop(&mut self) {
        if let Some(observer) = &self.observer {
            observer.disconnect();
        }
    }
}
