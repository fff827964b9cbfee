// crate modules
use crate::error::Result;

// nxtools modules
use nxtools_units::{angle_conversion_factor, calculate_unit_conversion_factor};
use nxtools_utils::FloatExt;

/// Chopper parameters in radians and metres
///
/// Edges are wrapped into `[0, 2π)`. The edges as given are also kept, since
/// sorting and uniqueness are checked against the original values.
#[derive(Debug, Clone, PartialEq)]
pub struct ChopperDetails {
    slits: usize,
    slit_edges: Vec<f64>,
    raw_slit_edges: Vec<f64>,
    radius: f64,
    slit_height: f64,
}

impl ChopperDetails {
    /// Convert user or file input into radians and metres
    pub fn new(
        slits: usize,
        slit_edges: &[f64],
        radius: f64,
        slit_height: f64,
        angle_units: &str,
        slit_height_units: &str,
        radius_units: &str,
    ) -> Result<Self> {
        let angle_factor = angle_conversion_factor(angle_units)?;

        Ok(Self {
            slits,
            slit_edges: slit_edges
                .iter()
                .map(|edge| (edge * angle_factor).wrap_angle())
                .collect(),
            raw_slit_edges: slit_edges.to_vec(),
            radius: radius * calculate_unit_conversion_factor(radius_units)?,
            slit_height: slit_height * calculate_unit_conversion_factor(slit_height_units)?,
        })
    }

    /// Details already in radians and metres
    pub fn from_radians(slits: usize, slit_edges: &[f64], radius: f64, slit_height: f64) -> Self {
        Self {
            slits,
            slit_edges: slit_edges.iter().map(|edge| edge.wrap_angle()).collect(),
            raw_slit_edges: slit_edges.to_vec(),
            radius,
            slit_height,
        }
    }

    /// Number of slits
    pub fn slits(&self) -> usize {
        self.slits
    }

    /// Slit edge angles in radians, wrapped into `[0, 2π)`
    pub fn slit_edges(&self) -> &[f64] {
        &self.slit_edges
    }

    /// Slit edges exactly as provided
    pub fn raw_slit_edges(&self) -> &[f64] {
        &self.raw_slit_edges
    }

    /// Disk radius in metres
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Slit height in metres
    pub fn slit_height(&self) -> f64 {
        self.slit_height
    }
}

#[cfg(test)]
mod details_tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn degrees_are_converted_and_wrapped() {
        let details =
            ChopperDetails::new(1, &[90.0, 450.0], 1.0, 0.5, "deg", "m", "m").unwrap();

        assert!(details.slit_edges()[0].is_close(PI / 2.0));
        assert!(details.slit_edges()[1].is_close(PI / 2.0));
        assert_eq!(details.raw_slit_edges(), &[90.0, 450.0]);
    }

    #[test]
    fn lengths_are_converted_to_metres() {
        let details = ChopperDetails::new(1, &[0.0, 1.0], 50.0, 200.0, "rad", "mm", "cm").unwrap();
        assert!(details.radius().is_close(0.5));
        assert!(details.slit_height().is_close(0.2));
    }

    #[test]
    fn bad_units_are_rejected() {
        assert!(ChopperDetails::new(1, &[0.0, 1.0], 1.0, 0.5, "m", "m", "m").is_err());
        assert!(ChopperDetails::new(1, &[0.0, 1.0], 1.0, 0.5, "deg", "deg", "m").is_err());
    }
}
