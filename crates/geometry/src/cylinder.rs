// standard library
use std::f64::consts::{PI, TAU};

// crate modules
use crate::error::{Error, Result};
use crate::off::OffGeometry;

// nxtools modules
use nxtools_units::calculate_unit_conversion_factor;
use nxtools_utils::{FloatExt, VectorExt};

// external crates
use log::warn;
use nalgebra::{Rotation3, Unit, Vector3};

/// Default number of points around each circle of a cylinder mesh
pub const DEFAULT_CYLINDER_STEPS: usize = 20;

/// Cylinder described by its axis, height and radius
///
/// The base of the cylinder is centred on the origin, and the top is `height`
/// along `axis_direction`. All lengths are in `units`.
///
/// ```rust
/// # use nxtools_geometry::CylindricalGeometry;
/// # use nalgebra::Vector3;
/// let cylinder = CylindricalGeometry::new("cm", Vector3::new(1.0, 0.0, 0.0), 3.0, 4.0).unwrap();
///
/// // derived points are always in metres
/// assert_eq!(cylinder.base_center_point(), Vector3::zeros());
/// assert_eq!(cylinder.top_center_point(), Vector3::new(0.03, 0.0, 0.0));
///
/// // 20 side faces plus the top and bottom
/// assert_eq!(cylinder.off_geometry(20).faces.len(), 22);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CylindricalGeometry {
    units: String,
    axis_direction: Vector3<f64>,
    height: f64,
    radius: f64,
    factor: f64,
}

impl CylindricalGeometry {
    /// Create a cylinder, validating the axis, dimensions and units
    pub fn new(
        units: &str,
        axis_direction: Vector3<f64>,
        height: f64,
        radius: f64,
    ) -> Result<Self> {
        if axis_direction.is_zero_vector() {
            return Err(Error::ZeroAxisVector);
        }

        for (name, value) in [("height", height), ("radius", radius)] {
            // rejects NaN too
            if !(value > 0.0 && value.is_finite()) {
                return Err(Error::NonPositiveDimension { name, value });
            }
        }

        Ok(Self {
            units: units.to_string(),
            axis_direction,
            height,
            radius,
            factor: calculate_unit_conversion_factor(units)?,
        })
    }

    /// Rebuild a cylinder from its base centre, base edge and top centre
    ///
    /// This is the inverse of [calculate_vertices()](Self::calculate_vertices),
    /// with every point in the cylinder's own `units`.
    pub fn from_vertices(
        units: &str,
        base_center: Vector3<f64>,
        base_edge: Vector3<f64>,
        top_center: Vector3<f64>,
    ) -> Result<Self> {
        let axis = top_center - base_center;
        let height = axis.norm();
        let radius = (base_edge - base_center).norm();
        Self::new(units, axis, height, radius)
    }

    /// Length units
    pub fn units(&self) -> &str {
        &self.units
    }

    /// Axis direction as given, not necessarily normalised
    pub fn axis_direction(&self) -> Vector3<f64> {
        self.axis_direction
    }

    /// Height along the axis in `units`
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Radius in `units`
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Multiplier from `units` to metres
    pub fn unit_conversion_factor(&self) -> f64 {
        self.factor
    }

    /// Rotation taking the +Z axis onto the cylinder axis
    ///
    /// Rotates about `Z × axis` by the angle between them. When the axis is
    /// parallel to Z this is the identity, and when it is anti-parallel the
    /// cylinder is flipped about X.
    pub fn rotation(&self) -> Rotation3<f64> {
        let z = Vector3::z();
        let direction = self.axis_direction.normalize();
        let angle = direction.dot(&z).clamp(-1.0, 1.0).acos();

        match Unit::try_new(z.cross(&direction), f64::EPSILON) {
            Some(axis) => Rotation3::from_axis_angle(&axis, angle),
            None if angle > PI / 2.0 => Rotation3::from_axis_angle(&Vector3::x_axis(), PI),
            None => Rotation3::identity(),
        }
    }

    /// Centre of the base in metres, always the origin
    pub fn base_center_point(&self) -> Vector3<f64> {
        Vector3::zeros()
    }

    /// A point on the edge of the base circle in metres
    pub fn base_edge_point(&self) -> Vector3<f64> {
        self.rotation() * Vector3::new(self.radius * self.factor, 0.0, 0.0)
    }

    /// Centre of the top in metres
    pub fn top_center_point(&self) -> Vector3<f64> {
        self.axis_direction.normalize() * self.height * self.factor
    }

    /// Base centre, base edge and top centre in the cylinder's own units
    ///
    /// These are the three vertices stored for a cylinder on disk.
    pub fn calculate_vertices(&self) -> [Vector3<f64>; 3] {
        [
            Vector3::zeros(),
            self.rotation() * Vector3::new(self.radius, 0.0, 0.0),
            self.axis_direction.normalize() * self.height,
        ]
    }

    /// Approximate the cylinder with a polygon mesh in metres
    ///
    /// Each circle gets `steps` points, so the mesh has `steps` quadrilateral
    /// side faces plus a bottom face and a top face. The top face is listed in
    /// reverse to keep the normals pointing outwards.
    pub fn off_geometry(&self, steps: usize) -> OffGeometry {
        let steps = if steps < 3 {
            warn!("Cylinder mesh needs at least 3 steps, using 3 instead of {steps}");
            3
        } else {
            steps
        };

        let rotation = self.rotation();
        let radius = self.radius * self.factor;
        let height = self.height * self.factor;

        let bottom = (0..steps)
            .map(|i| {
                let theta = TAU * i as f64 / steps as f64;
                Vector3::new(theta.sin() * radius, theta.cos() * radius, 0.0)
            })
            .collect::<Vec<Vector3<f64>>>();
        let top = bottom
            .iter()
            .map(|v| v + Vector3::new(0.0, 0.0, height))
            .collect::<Vec<Vector3<f64>>>();

        let vertices = bottom
            .into_iter()
            .chain(top)
            .map(|v| rotation * v)
            .collect();

        let mut faces = (0..steps)
            .map(|i| {
                let next = (i + 1) % steps;
                vec![i, i + steps, next + steps, next]
            })
            .collect::<Vec<Vec<usize>>>();
        faces.push((0..steps).collect());
        faces.push((steps..2 * steps).rev().collect());

        OffGeometry::new(vertices, faces)
    }

    /// Compare two cylinders within floating point tolerance
    ///
    /// Axis directions are compared after normalisation, so cylinders that
    /// went through [calculate_vertices()](Self::calculate_vertices) compare
    /// equal to the original.
    pub fn is_close(&self, other: &CylindricalGeometry) -> bool {
        self.units == other.units
            && self.height.is_close(other.height)
            && self.radius.is_close(other.radius)
            && self
                .axis_direction
                .normalize()
                .is_close(&other.axis_direction.normalize())
    }
}

impl std::fmt::Display for CylindricalGeometry {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "cylinder of height {} and radius {} ({}) along [{}, {}, {}]",
            self.height,
            self.radius,
            self.units,
            self.axis_direction.x,
            self.axis_direction.y,
            self.axis_direction.z
        )
    }
}
