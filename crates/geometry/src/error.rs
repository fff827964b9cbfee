//! Result and Error types for nxtools-geometry

/// Type alias for Result<T, geometry::Error>
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `nxtools-geometry` crate
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed input/output stream")]
    IOError(#[from] std::io::Error),

    #[error("vtkio error")]
    VtkioError(#[from] vtkio::Error),

    #[error("invalid units")]
    UnitsError(#[from] nxtools_units::Error),

    #[error("parser failed")]
    ParseError(String),

    #[error("axis direction must be non-zero")]
    ZeroAxisVector,

    #[error("{name} must be positive, found {value}")]
    NonPositiveDimension { name: &'static str, value: f64 },

    #[error("face {face} references vertex {index} but there are only {vertices} vertices")]
    VertexIndexOutOfRange {
        face: usize,
        index: usize,
        vertices: usize,
    },

    #[error("face start indices {0:?} are not ascending offsets into the winding order")]
    InvalidFaceStarts(Vec<usize>),

    #[error(
        "size of slit edges array should be twice the number of slits, found {slits} slits and {edges} slit edges"
    )]
    SlitEdgeCount { slits: usize, edges: usize },

    #[error("slit height should be smaller than radius, found slit height {slit_height} and radius {radius}")]
    SlitHeightTooLarge { slit_height: f64, radius: f64 },

    #[error("slit edges array is not sorted, found {0:?}")]
    UnsortedSlitEdges(Vec<f64>),

    #[error("angles in slit edges array should be unique, found {0:?}")]
    RepeatedSlitEdges(Vec<f64>),

    #[error("slit edges contain overlapping slits, found {0:?}")]
    OverlappingSlits(Vec<f64>),

    #[error("expected slit edges array to be 1D but it has shape {0:?}")]
    SlitEdgesNotOneDimensional(Vec<usize>),
}
