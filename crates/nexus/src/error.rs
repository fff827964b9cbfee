//! Result and Error types for nxtools-nexus

/// Type alias for Result<T, nexus::Error>
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `nxtools-nexus` crate
///
/// Only problems that stop a whole load or save end up here. Anything wrong
/// with a single component while decoding is recorded as a
/// [Warning](crate::Warning) instead.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed input/output stream")]
    IOError(#[from] std::io::Error),

    #[error("invalid JSON")]
    JSONError(#[from] serde_json::Error),

    #[error("model error")]
    ModelError(#[from] nxtools_model::Error),

    #[error("geometry error")]
    GeometryError(#[from] nxtools_geometry::Error),

    #[error("not recognised as a valid instrument: {0}")]
    NotAnInstrument(String),

    #[error("no node found at \"{0}\"")]
    NodeNotFound(String),

    #[error("\"{0}\" is not a group")]
    NotAGroup(String),

    #[error("\"{parent}\" already has a child named \"{name}\"")]
    NameExists { parent: String, name: String },

    #[error("invalid node name \"{0}\"")]
    InvalidName(String),

    #[error("pixel arrays should share a shape, found {0:?}")]
    PixelArrayShape(Vec<(usize, usize)>),

    #[error("pixel array rows should share a length, found {0:?}")]
    RaggedPixelArray(Vec<usize>),

    #[error("pixel arrays should not be empty")]
    EmptyPixelArrays,

    #[error("face {face} is outside a mesh of {face_count} faces")]
    FaceOutOfRange { face: i64, face_count: usize },
}
