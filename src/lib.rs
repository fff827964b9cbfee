//! `nxtools` is a semi-modular toolkit for describing instrument geometry and
//! reading and writing it as NeXus structures
//!
#![doc = include_str!("../readme.md")]
#![deny(missing_docs, missing_debug_implementations)]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

// Re-exports of toolkit crates.
#[doc(inline)]
pub use nxtools_units as units;

#[doc(inline)]
pub use nxtools_utils as utils;

#[cfg(feature = "geometry")]
#[cfg_attr(docsrs, doc(cfg(feature = "geometry")))]
#[doc(inline)]
pub use nxtools_geometry as geometry;

#[cfg(feature = "model")]
#[cfg_attr(docsrs, doc(cfg(feature = "model")))]
#[doc(inline)]
pub use nxtools_model as model;

#[cfg(feature = "nexus")]
#[cfg_attr(docsrs, doc(cfg(feature = "nexus")))]
#[doc(inline)]
pub use nxtools_nexus as nexus;
