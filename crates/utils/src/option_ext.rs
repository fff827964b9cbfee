use crate::f;

/// Extends Option for display formatting with a fallback
pub trait OptionExt {
    /// Display the contained value, or `fallback` for the `None` variant
    ///
    /// NeXus uses `"."` to mean "no dependency", so this is handy for writing
    /// optional references straight into a file.
    ///
    /// ```rust
    /// # use nxtools_utils::OptionExt;
    /// let x: Option<&str> = Some("/entry/instrument/detector/transforms/offset");
    /// assert_eq!(x.display_or("."), "/entry/instrument/detector/transforms/offset");
    ///
    /// let x: Option<u32> = None;
    /// assert_eq!(x.display_or("."), ".");
    /// ```
    fn display_or(&self, fallback: &str) -> String;
}

impl<T: std::fmt::Display> OptionExt for Option<T> {
    fn display_or(&self, fallback: &str) -> String {
        match self {
            Some(value) => f!("{value}"),
            None => fallback.to_string(),
        }
    }
}
