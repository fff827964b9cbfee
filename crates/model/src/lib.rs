//! Instrument model of components, transformation chains and pixel data
#![doc = include_str!("../readme.md")]

// Split into subfiles for development, but anything important is re-exported
mod chain;
mod component;
mod component_type;
mod dataset;
mod error;
mod instrument;
mod node;
mod pixel;
mod transformation;
mod value;

// inline the important model modules for a nice public API
#[doc(inline)]
pub use instrument::{ComponentId, Instrument, TransformId};

#[doc(inline)]
pub use chain::default_dependent_transform;

#[doc(inline)]
pub use component::{Component, RESERVED_FIELDS};

#[doc(inline)]
pub use component_type::ComponentType;

#[doc(inline)]
pub use transformation::{
    Dependent, Transformation, TransformationType, DEPENDS_ON, TRANSFORMATION_TYPE, UNITS, VECTOR,
};

#[doc(inline)]
pub use pixel::{
    Corner, CountDirection, PixelData, PixelGrid, PixelGridBuilder, PixelMapping, PIXEL_FIELDS,
};

#[doc(inline)]
pub use node::{Attributes, Node, NX_CLASS};

#[doc(inline)]
pub use dataset::Dataset;

#[doc(inline)]
pub use value::{DType, Data, Value};

#[doc(inline)]
pub use error::{Error, Result};
