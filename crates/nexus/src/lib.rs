//! NeXus layout of instrument models, in memory and as JSON
#![doc = include_str!("../readme.md")]

// Split into subfiles for development, but anything important is re-exported
mod decode;
mod encode;
mod error;
mod json;
mod layout;
mod options;
mod pixels;
mod shapes;
mod tree;
mod warnings;

#[doc(inline)]
pub use encode::{encode, encode_into};

#[doc(inline)]
pub use decode::decode;

#[doc(inline)]
pub use json::{
    from_json_str, read_json_file, to_json_string, tree_from_json, tree_to_json, write_json_file,
};

#[doc(inline)]
pub use tree::{join, NexusGroup, NexusNode, NexusTree, Storage};

#[doc(inline)]
pub use layout::{
    component_path, extract_dependency_names, transform_path, DESCRIPTION, ENTRY, INSTRUMENT,
    NX_ENTRY, NX_INSTRUMENT, NX_TRANSFORMATIONS, PIXEL_SHAPE, SHAPE, TRANSFORMS,
};

#[doc(inline)]
pub use pixels::{
    decode_grid, decode_mapping, encode_grid, encode_mapping, pixel_position, GridArrays,
};

#[doc(inline)]
pub use options::{DecodeOptions, DecodeOptionsBuilder};

#[doc(inline)]
pub use warnings::{Severity, Warning, Warnings};

#[doc(inline)]
pub use error::{Error, Result};
