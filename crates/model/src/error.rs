//! Result and Error types for nxtools-model

// crate modules
use crate::instrument::{ComponentId, TransformId};

/// Type alias for Result<T, model::Error>
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `nxtools-model` crate
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("geometry error")]
    GeometryError(#[from] nxtools_geometry::Error),

    #[error("invalid units")]
    UnitsError(#[from] nxtools_units::Error),

    #[error("component {0:?} not found")]
    ComponentNotFound(ComponentId),

    #[error("transformation {0:?} not found")]
    TransformNotFound(TransformId),

    #[error("names must be non-empty")]
    EmptyName,

    #[error("a component named \"{0}\" already exists")]
    DuplicateComponentName(String),

    #[error("component \"{component}\" already has a transformation named \"{name}\"")]
    DuplicateTransformName { component: String, name: String },

    #[error("\"{0}\" is reserved for the structure of a component and cannot be used as a field")]
    ReservedFieldName(String),

    #[error("transformation \"{transform}\" is not owned by component \"{component}\"")]
    TransformNotOwned { transform: String, component: String },

    #[error("transformation \"{transform}\" still has {count} dependent(s)")]
    TransformHasDependents { transform: String, count: usize },

    #[error("transformation \"{transform}\" is not in the transforms of \"{parent}\"")]
    DependentTransformNotFound { transform: String, parent: String },

    #[error("transform parents of \"{0}\" form a cycle")]
    CyclicTransformParent(String),

    #[error("depends_on chain through \"{0}\" forms a cycle")]
    CyclicDependsOn(String),

    #[error("component \"{component}\" is the transform parent of \"{child}\"")]
    ComponentIsTransformParent { component: String, child: String },

    #[error("components of type {0} do not support pixel data")]
    PixelDataNotSupported(String),

    #[error("pixel mapping has {found} entries but the shape has {expected} faces")]
    PixelMappingLength { expected: usize, found: usize },

    #[error("invalid pixel grid, {0}")]
    InvalidPixelGrid(String),

    #[error("inconsistent dependency graph, {0}")]
    InconsistentDependents(String),

    #[error("chopper field \"{0}\" is missing")]
    MissingChopperField(String),

    #[error("chopper field \"{0}\" has the wrong type or shape")]
    InvalidChopperField(String),

    #[error("size {size:?} does not describe {len} values")]
    ValueSizeMismatch { size: Vec<usize>, len: usize },

    #[error("values do not match dtype {0}")]
    ValueTypeMismatch(String),

    #[error("unknown dtype \"{0}\"")]
    UnknownDType(String),
}

impl Error {
    /// Failures caused by the dependency graph between transformations
    pub fn is_dependency_error(&self) -> bool {
        matches!(
            self,
            Error::TransformHasDependents { .. }
                | Error::DependentTransformNotFound { .. }
                | Error::CyclicTransformParent(_)
                | Error::CyclicDependsOn(_)
                | Error::ComponentIsTransformParent { .. }
        )
    }

    /// Failures caused by acting on something a component does not own
    pub fn is_permission_error(&self) -> bool {
        matches!(self, Error::TransformNotOwned { .. })
    }
}
