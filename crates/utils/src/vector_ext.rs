use crate::FloatExt;
use nalgebra::Vector3;

/// Extends 3D vectors with helpers common to transformations and shapes
pub trait VectorExt {
    /// Split a vector into a unit direction and its magnitude
    ///
    /// A zero vector has no direction, so it comes back unchanged with a
    /// magnitude of zero rather than filled with NaNs.
    ///
    /// ```rust
    /// # use nxtools_utils::VectorExt;
    /// # use nalgebra::Vector3;
    /// let (direction, magnitude) = Vector3::new(0.0, 3.0, 4.0).split_magnitude();
    /// assert_eq!(direction, Vector3::new(0.0, 0.6, 0.8));
    /// assert_eq!(magnitude, 5.0);
    ///
    /// let (direction, magnitude) = Vector3::<f64>::zeros().split_magnitude();
    /// assert_eq!(direction, Vector3::zeros());
    /// assert_eq!(magnitude, 0.0);
    /// ```
    fn split_magnitude(&self) -> (Vector3<f64>, f64);

    /// True when every component is exactly zero
    fn is_zero_vector(&self) -> bool;

    /// Component-wise [FloatExt::is_close]
    fn is_close(&self, other: &Vector3<f64>) -> bool;
}

impl VectorExt for Vector3<f64> {
    fn split_magnitude(&self) -> (Vector3<f64>, f64) {
        let magnitude = self.norm();
        if magnitude == 0.0 {
            (*self, 0.0)
        } else {
            (self / magnitude, magnitude)
        }
    }

    fn is_zero_vector(&self) -> bool {
        self.iter().all(|v| *v == 0.0)
    }

    fn is_close(&self, other: &Vector3<f64>) -> bool {
        self.iter().zip(other.iter()).all(|(a, b)| a.is_close(*b))
    }
}
