#![forbid(unsafe_code)]

//! Class updater: toggles breakpoint classes for a container width.

use crate::breakpoint::{Breakpoint, BreakpointSet, resolve};
use crate::config::ContainerConfig;
use crate::element::ContainerElement;
use crate::error::ConfigError;

/// How a width selects classes from a sorted breakpoint set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchPolicy {
    /// `threshold <= width < next threshold`; at most one class is active.
    /// The last band is open-ended.
    #[default]
    ExclusiveRange,
    /// `threshold <= width`; every class at or below the width is active.
    Layered,
}

impl MatchPolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ExclusiveRange => "exclusive-range",
            Self::Layered => "layered",
        }
    }

    /// Whether a breakpoint at `threshold`, followed by one at `next` (if
    /// any), applies at `width`. A NaN width matches nothing.
    #[must_use]
    pub fn applies(self, threshold: f64, next: Option<f64>, width: f64) -> bool {
        if threshold > width || width.is_nan() {
            return false;
        }
        match self {
            Self::ExclusiveRange => next.is_none_or(|next| width < next),
            Self::Layered => true,
        }
    }

    /// Pair each breakpoint with whether it applies at `width`.
    pub fn evaluate(
        self,
        set: &BreakpointSet,
        width: f64,
    ) -> impl Iterator<Item = (&Breakpoint, bool)> {
        let breakpoints = set.as_slice();
        breakpoints.iter().enumerate().map(move |(idx, bp)| {
            let next = breakpoints.get(idx + 1).map(|next| next.threshold);
            (bp, self.applies(bp.threshold, next, width))
        })
    }
}

impl core::str::FromStr for MatchPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exclusive-range" | "exclusive" | "range" => Ok(Self::ExclusiveRange),
            "layered" | "cumulative" => Ok(Self::Layered),
            other => Err(ConfigError::UnknownPolicy(other.to_owned())),
        }
    }
}

/// Outcome of one [`update_container_classes`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassUpdate {
    /// Width the classes were computed for.
    pub width: f64,
    /// Classes left present, in threshold order.
    pub active: Vec<String>,
    /// Number of breakpoints evaluated.
    pub evaluated: usize,
}

/// Set every configured breakpoint class on `element` to match `width`.
///
/// When `width` is `None` the element is measured (a layout read). Classes
/// outside the resolved breakpoint set are never touched.
pub fn update_container_classes<E>(
    element: &E,
    width: Option<f64>,
    config: &ContainerConfig,
) -> ClassUpdate
where
    E: ContainerElement + ?Sized,
{
    let width = width.unwrap_or_else(|| element.measure_width());
    let set = resolve(Some(element), config);

    let mut active = Vec::new();
    for (bp, present) in config.policy.evaluate(&set, width) {
        element.set_class(&bp.name, present);
        if present {
            active.push(bp.name.clone());
        }
    }

    tracing::trace!(width, policy = config.policy.as_str(), ?active, "container classes updated");
    ClassUpdate {
        width,
        active,
        evaluated: set.len(),
    }
}
