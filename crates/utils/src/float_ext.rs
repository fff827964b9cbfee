use std::f64::consts::TAU;

/// Relative tolerance used by [FloatExt::is_close]
pub const RELATIVE_TOLERANCE: f64 = 1e-5;

/// Absolute tolerance used by [FloatExt::is_close]
pub const ABSOLUTE_TOLERANCE: f64 = 1e-8;

/// Extends `f64` with tolerant comparisons
pub trait FloatExt {
    /// Check two values are equal within tolerance
    ///
    /// Uses the asymmetric `|a - b| <= atol + rtol * |b|` test with
    /// [ABSOLUTE_TOLERANCE] and [RELATIVE_TOLERANCE].
    ///
    /// ```rust
    /// # use nxtools_utils::FloatExt;
    /// assert!(1.0_f64.is_close(1.0 + 1e-9));
    /// assert!(!1.0_f64.is_close(1.001));
    /// ```
    fn is_close(&self, other: f64) -> bool;

    /// Wrap an angle in radians into `[0, 2π)`
    ///
    /// ```rust
    /// # use nxtools_utils::FloatExt;
    /// # use std::f64::consts::PI;
    /// assert!((3.0 * PI).wrap_angle().is_close(PI));
    /// assert!((-0.5 * PI).wrap_angle().is_close(1.5 * PI));
    /// ```
    fn wrap_angle(&self) -> f64;
}

impl FloatExt for f64 {
    fn is_close(&self, other: f64) -> bool {
        (self - other).abs() <= ABSOLUTE_TOLERANCE + RELATIVE_TOLERANCE * other.abs()
    }

    fn wrap_angle(&self) -> f64 {
        self.rem_euclid(TAU)
    }
}
