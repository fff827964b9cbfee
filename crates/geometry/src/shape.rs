// crate modules
use crate::cylinder::{CylindricalGeometry, DEFAULT_CYLINDER_STEPS};
use crate::off::OffGeometry;

/// NeXus class of a cylinder shape group
pub const CYLINDRICAL_GEOMETRY_CLASS: &str = "NXcylindrical_geometry";

/// NeXus class of a polygon mesh shape group
pub const OFF_GEOMETRY_CLASS: &str = "NXoff_geometry";

/// Shape of a component
///
/// The set of shapes is closed, so consumers match on every variant.
///
/// ```rust
/// # use nxtools_geometry::{Geometry, OffGeometry};
/// // components without a shape still render as a placeholder cube
/// let geometry = Geometry::NoShape;
/// assert_eq!(geometry.off_geometry(), OffGeometry::cube());
/// assert_eq!(geometry.nx_class(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Geometry {
    /// No shape information
    #[default]
    NoShape,
    /// Cylinder described parametrically
    Cylindrical(CylindricalGeometry),
    /// Arbitrary polygon mesh
    Off(OffGeometry),
}

impl Geometry {
    /// Equivalent polygon mesh
    ///
    /// Cylinders use [DEFAULT_CYLINDER_STEPS] points per circle.
    pub fn off_geometry(&self) -> OffGeometry {
        match self {
            Geometry::NoShape => OffGeometry::cube(),
            Geometry::Cylindrical(cylinder) => cylinder.off_geometry(DEFAULT_CYLINDER_STEPS),
            Geometry::Off(off) => off.clone(),
        }
    }

    /// NeXus class of the shape group, if a shape is stored at all
    pub fn nx_class(&self) -> Option<&'static str> {
        match self {
            Geometry::NoShape => None,
            Geometry::Cylindrical(_) => Some(CYLINDRICAL_GEOMETRY_CLASS),
            Geometry::Off(_) => Some(OFF_GEOMETRY_CLASS),
        }
    }

    /// Number of addressable faces for a pixel mapping
    ///
    /// A cylinder is a single face, and no shape has none.
    pub fn face_count(&self) -> usize {
        match self {
            Geometry::NoShape => 0,
            Geometry::Cylindrical(_) => 1,
            Geometry::Off(off) => off.face_count(),
        }
    }

    /// True for [Geometry::NoShape]
    pub fn is_none(&self) -> bool {
        matches!(self, Geometry::NoShape)
    }

    /// Length units of the stored shape
    pub fn units(&self) -> Option<&str> {
        match self {
            Geometry::NoShape => None,
            Geometry::Cylindrical(cylinder) => Some(cylinder.units()),
            Geometry::Off(off) => Some(&off.units),
        }
    }
}

impl From<CylindricalGeometry> for Geometry {
    fn from(cylinder: CylindricalGeometry) -> Self {
        Geometry::Cylindrical(cylinder)
    }
}

impl From<OffGeometry> for Geometry {
    fn from(off: OffGeometry) -> Self {
        Geometry::Off(off)
    }
}

impl std::fmt::Display for Geometry {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Geometry::NoShape => write!(f, "no shape"),
            Geometry::Cylindrical(cylinder) => write!(f, "{cylinder}"),
            Geometry::Off(off) => write!(f, "{off}"),
        }
    }
}
