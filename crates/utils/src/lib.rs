//! Common utility for extended `std` and `nalgebra` types
//!
//! These are left public for convenience.
//!
//! For example, comparing floats within a tolerance or splitting a vector into
//! its direction and magnitude are needed by the geometry, model, and codec
//! crates alike.
#![doc = include_str!("../readme.md")]

// Alias for the format! macro
pub use std::format as f;

// Modules
mod float_ext;
mod option_ext;
mod string_ext;
mod vector_ext;

// Flatten
pub use float_ext::FloatExt;
pub use option_ext::OptionExt;
pub use string_ext::StringExt;
pub use vector_ext::VectorExt;
