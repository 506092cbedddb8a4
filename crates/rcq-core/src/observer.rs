#![forbid(unsafe_code)]

//! Size-observation seam.
//!
//! The platform facility (a browser `ResizeObserver`) is injected through
//! [`SizeObserver`]. Implementations report size changes back by calling
//! [`ContainerQueries::on_resize`](crate::lifecycle::ContainerQueries::on_resize)
//! once right after `observe` and again whenever the content box changes.

/// A single shared size-change subscription.
pub trait SizeObserver<E: ?Sized> {
    /// Start reporting size changes for `target`.
    fn observe(&mut self, target: &E);

    /// Stop reporting size changes for `target`.
    fn unobserve(&mut self, target: &E);
}

impl<E: ?Sized, O: SizeObserver<E> + ?Sized> SizeObserver<E> for Box<O> {
    fn observe(&mut self, target: &E) {
        (**self).observe(target);
    }

    fn unobserve(&mut self, target: &E) {
        (**self).unobserve(target);
    }
}
