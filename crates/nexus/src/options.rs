// crate modules
use crate::warnings::Severity;

/// Severity of each check made on datasets while decoding
///
/// An [Issue](Severity::Issue) keeps the data and records a warning, an
/// [Error](Severity::Error) drops the dataset (and with it any shape that
/// needs it). The defaults only drop values whose elements cannot be read as
/// a single type.
///
/// ```rust
/// # use nxtools_nexus::{DecodeOptions, Severity};
/// let options = DecodeOptions::builder()
///     .size_mismatch(Severity::Error)
///     .build();
///
/// assert_eq!(options.size_mismatch, Severity::Error);
/// assert_eq!(options.missing_size, Severity::Issue);
/// assert_eq!(options.value_type_mismatch, Severity::Error);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Declared size differs from the shape of the values
    pub size_mismatch: Severity,
    /// No declared size
    pub missing_size: Severity,
    /// Declared dtype cannot hold the values, or is not recognised
    pub dtype_mismatch: Severity,
    /// No declared dtype
    pub missing_dtype: Severity,
    /// Values mix types or are not a regular array
    pub value_type_mismatch: Severity,
}

impl DecodeOptions {
    /// Get an instance of the [DecodeOptionsBuilder]
    pub fn builder() -> DecodeOptionsBuilder {
        DecodeOptionsBuilder::default()
    }

    /// Drop anything that fails a check
    pub fn strict() -> Self {
        Self::builder()
            .size_mismatch(Severity::Error)
            .missing_size(Severity::Error)
            .dtype_mismatch(Severity::Error)
            .missing_dtype(Severity::Error)
            .value_type_mismatch(Severity::Error)
            .build()
    }

    /// Keep whatever can be kept
    pub fn lenient() -> Self {
        Self::builder()
            .value_type_mismatch(Severity::Issue)
            .build()
    }
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptionsBuilder::default().build()
    }
}

/// Builder implementation for [DecodeOptions]
#[derive(Debug)]
pub struct DecodeOptionsBuilder {
    size_mismatch: Severity,
    missing_size: Severity,
    dtype_mismatch: Severity,
    missing_dtype: Severity,
    value_type_mismatch: Severity,
}

impl DecodeOptionsBuilder {
    /// Create a new instance of the builder with default parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the [DecodeOptions] type
    pub fn build(self) -> DecodeOptions {
        DecodeOptions {
            size_mismatch: self.size_mismatch,
            missing_size: self.missing_size,
            dtype_mismatch: self.dtype_mismatch,
            missing_dtype: self.missing_dtype,
            value_type_mismatch: self.value_type_mismatch,
        }
    }

    /// Declared size differs from the values
    pub fn size_mismatch(mut self, severity: Severity) -> Self {
        self.size_mismatch = severity;
        self
    }

    /// No declared size
    pub fn missing_size(mut self, severity: Severity) -> Self {
        self.missing_size = severity;
        self
    }

    /// Declared dtype does not fit the values
    pub fn dtype_mismatch(mut self, severity: Severity) -> Self {
        self.dtype_mismatch = severity;
        self
    }

    /// No declared dtype
    pub fn missing_dtype(mut self, severity: Severity) -> Self {
        self.missing_dtype = severity;
        self
    }

    /// Values mix types or are ragged
    pub fn value_type_mismatch(mut self, severity: Severity) -> Self {
        self.value_type_mismatch = severity;
        self
    }
}

impl Default for DecodeOptionsBuilder {
    fn default() -> Self {
        Self {
            size_mismatch: Severity::Issue,
            missing_size: Severity::Issue,
            dtype_mismatch: Severity::Issue,
            missing_dtype: Severity::Issue,
            value_type_mismatch: Severity::Error,
        }
    }
}
