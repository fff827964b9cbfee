//! Unit parsing and conversion for NeXus `units` attributes
#![doc = include_str!("../readme.md")]

// Split into subfiles for development, but anything important is re-exported
mod error;
mod registry;
mod units;

pub mod parsers;

#[doc(inline)]
pub use units::{
    angle_conversion_factor, calculate_unit_conversion_factor, parse_units,
    validate_angle_units, validate_length_units, Units,
};

#[doc(inline)]
pub use registry::{Dimension, UnitDefinition, UNIT_REGISTRY};

#[doc(inline)]
pub use error::{Error, Result};
