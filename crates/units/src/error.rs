//! Result and Error types for nxtools-units

/// Type alias for Result<T, units::Error>
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `nxtools-units` crate
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum Error {
    #[error("failed to parse units from \"{0}\"")]
    ParseError(String),

    #[error("units \"{0}\" are not recognised")]
    UnrecognisedUnits(String),

    #[error("units \"{units}\" do not describe a {expected}")]
    WrongDimensionality {
        units: String,
        expected: &'static str,
    },

    #[error("units \"{units}\" have a magnitude of {magnitude}, expected 1")]
    MagnitudeNotOne { units: String, magnitude: f64 },
}
