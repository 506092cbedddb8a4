#![forbid(unsafe_code)]

//! Core: breakpoint resolution, class toggling, and container tracking.
//!
//! # Role in rcq
//! `rcq-core` simulates CSS container queries without touching the DOM
//! directly. Elements are reached through the [`ContainerElement`] trait and
//! size notifications through the [`SizeObserver`] trait, so everything here
//! runs (and is tested) natively. `rcq-web` supplies the browser
//! implementations of both traits.
//!
//! # Primary responsibilities
//! - **Breakpoint resolution**: per-element JSON configuration or the defaults,
//!   sorted ascending by threshold ([`breakpoint`]).
//! - **Class updates**: toggle breakpoint classes for a width under a
//!   [`MatchPolicy`] ([`classes`]).
//! - **Container registry**: reconcile the observed set against the live
//!   query result ([`registry`]).
//! - **Lifecycle**: page-ready reconciliation plus debounced reconciliation on
//!   external change notifications ([`lifecycle`], [`debounce`]).
//!
//! # Data flow
//! ```text
//! host ready / store change
//!   → ContainerQueries::on_ready / notify_change_at + poll_at
//!   → ContainerRegistry::reconcile   (observe / unobserve)
//!   → SizeObserver callback → ContainerQueries::on_resize
//!   → update_container_classes       (resolve + toggle)
//! ```

pub mod breakpoint;
pub mod classes;
pub mod config;
pub mod debounce;
pub mod element;
pub mod error;
pub mod lifecycle;
pub mod observer;
pub mod registry;
pub mod serialize;

#[cfg(test)]
pub(crate) mod testing;

pub use breakpoint::{Breakpoint, BreakpointMap, BreakpointSet, parse_breakpoints, resolve};
pub use classes::{ClassUpdate, MatchPolicy, update_container_classes};
pub use config::ContainerConfig;
pub use debounce::{DebounceAction, ReconcileDebouncer};
pub use element::ContainerElement;
pub use error::{BreakpointParseError, ConfigError};
pub use lifecycle::ContainerQueries;
pub use observer::SizeObserver;
pub use registry::{ContainerRegistry, ReconcileReport};
pub use serialize::responsive_container_breakpoints;
