#![forbid(unsafe_code)]

//! Element abstraction used by the resolver and the class updater.

/// A DOM element opted into width-based class toggling.
///
/// Methods take `&self`: browser element handles are shared references with
/// interior mutability, and the class updater never needs exclusive access.
pub trait ContainerElement {
    /// Raw value of the attribute `name`, or `None` when it is absent.
    fn attribute(&self, name: &str) -> Option<String>;

    /// Current rendered width in CSS pixels (forces a layout read in browsers).
    fn measure_width(&self) -> f64;

    /// Add (`present == true`) or remove the class `name`.
    fn set_class(&self, name: &str, present: bool);
}

impl<T: ContainerElement + ?Sized> ContainerElement for &T {
    fn attribute(&self, name: &str) -> Option<String> {
        (**self).attribute(name)
    }

    fn measure_width(&self) -> f64 {
        (**self).measure_width()
    }

    fn set_class(&self, name: &str, present: bool) {
        (**self).set_class(name, present);
    }
}
