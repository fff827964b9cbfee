//! Shape representations and mesh generation for instrument components
#![doc = include_str!("../readme.md")]

// Split into subfiles for development, but anything important is re-exported
mod cylinder;
mod error;
mod off;
mod shape;
mod writer;

pub mod chopper;
pub mod reader;
pub mod vtk;

// inline the important shape modules for a nice public API
#[doc(inline)]
pub use cylinder::{CylindricalGeometry, DEFAULT_CYLINDER_STEPS};

#[doc(inline)]
pub use off::OffGeometry;

#[doc(inline)]
pub use shape::{Geometry, CYLINDRICAL_GEOMETRY_CLASS, OFF_GEOMETRY_CLASS};

#[doc(inline)]
pub use reader::{parse_off, read_off};

#[doc(inline)]
pub use writer::{off_to_string, write_off};

#[doc(inline)]
pub use error::{Error, Result};
