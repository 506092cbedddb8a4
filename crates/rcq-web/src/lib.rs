#![forbid(unsafe_code)]

//! WASM bindings for rcq.
//!
//! This crate provides [`ResponsiveContainers`], a `wasm-bindgen`-exported
//! struct that wires `rcq_core::ContainerQueries` to the live document:
//! `querySelectorAll` for discovery, one shared `ResizeObserver` for size
//! changes, `classList` for class toggling, and `setTimeout` for debounced
//! reconciliation.
//!
//! Loading the module starts a default instance (default options) that
//! reconciles on `DOMContentLoaded`. Free functions operate on it:
//!
//! | JS export                        | Effect                                         |
//! |----------------------------------|------------------------------------------------|
//! | `updateResponsiveContainers()`   | reconcile now                                  |
//! | `notifyResponsiveContainers()`   | debounced reconcile (use as a store listener)  |
//! | `configureResponsiveContainers()`| replace the default instance with new options  |
//! | `responsiveContainerBreakpoints()`| serialize a breakpoint map for an attribute   |
//!
//! Option parsing lives in [`options`] and is shared with native tests.

pub mod options;

#[cfg(target_arch = "wasm32")]
mod console;
#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use dom::{DomContainer, ResizeObserverBridge};
#[cfg(target_arch = "wasm32")]
pub use wasm::{
    ResponsiveContainers, configure_responsive_containers, notify_responsive_containers,
    responsive_container_breakpoints_js, update_responsive_containers,
};
