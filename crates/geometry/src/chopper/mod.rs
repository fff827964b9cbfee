//! Disk chopper mesh generation
//!
//! A disk chopper is a spinning disk with slits cut into its edge. Choppers are
//! described by a handful of numbers rather than a mesh:
//!
//! - `slits`: number of slits in the disk
//! - `slit_edges`: angle of every slit edge, two per slit
//! - `radius`: radius of the disk
//! - `slit_height`: how far each slit cuts in from the edge
//!
//! These are collected into [ChopperDetails], checked with
//! [validate_chopper()], and turned into an [OffGeometry](crate::OffGeometry)
//! by the [DiskChopperGeometryCreator].
//!
//! ```rust
//! # use nxtools_geometry::chopper::{validate_chopper, ChopperDetails, DiskChopperGeometryCreator};
//! let details = ChopperDetails::new(
//!     2,
//!     &[0.0, 45.0, 180.0, 225.0],
//!     300.0,
//!     70.0,
//!     "deg",
//!     "mm",
//!     "mm",
//! ).unwrap();
//!
//! validate_chopper(&details).unwrap();
//! let mesh = DiskChopperGeometryCreator::new(&details).create_disk_chopper_geometry();
//! assert!(mesh.validate().is_ok());
//! ```

mod checker;
mod creator;
mod details;

#[doc(inline)]
pub use checker::{edges_array_has_correct_shape, validate_chopper};

#[doc(inline)]
pub use creator::{DiskChopperGeometryCreator, PointSet, ARROW_SIZE, HALF_THICKNESS, RESOLUTION};

#[doc(inline)]
pub use details::ChopperDetails;

/// Field holding the number of slits
pub const SLITS: &str = "slits";

/// Field holding the slit edge angles
pub const SLIT_EDGES: &str = "slit_edges";

/// Field holding the disk radius
pub const RADIUS: &str = "radius";

/// Field holding the slit height
pub const SLIT_HEIGHT: &str = "slit_height";
