// crate modules
use crate::error::{Error, Result};

// nxtools modules
use nxtools_utils::f;

// external crates
use nalgebra::Vector3;

/// Element type of a dataset or attribute
///
/// Names follow the JSON wire format, so `float32` and `float64` are written
/// as `float` and `double`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    String,
}

impl DType {
    /// Every dtype, smallest integers first
    pub const ALL: [DType; 11] = [
        DType::Int8,
        DType::Int16,
        DType::Int32,
        DType::Int64,
        DType::UInt8,
        DType::UInt16,
        DType::UInt32,
        DType::UInt64,
        DType::Float32,
        DType::Float64,
        DType::String,
    ];

    /// Name used in files
    pub fn name(&self) -> &'static str {
        match self {
            DType::Int8 => "int8",
            DType::Int16 => "int16",
            DType::Int32 => "int32",
            DType::Int64 => "int64",
            DType::UInt8 => "uint8",
            DType::UInt16 => "uint16",
            DType::UInt32 => "uint32",
            DType::UInt64 => "uint64",
            DType::Float32 => "float",
            DType::Float64 => "double",
            DType::String => "string",
        }
    }

    /// Parse a dtype name, accepting the common aliases
    ///
    /// ```rust
    /// # use nxtools_model::DType;
    /// assert_eq!(DType::from_name("double"), Some(DType::Float64));
    /// assert_eq!(DType::from_name("float64"), Some(DType::Float64));
    /// assert_eq!(DType::from_name("int"), Some(DType::Int32));
    /// assert_eq!(DType::from_name("complex"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<DType> {
        let dtype = match name.trim().to_lowercase().as_str() {
            "int8" | "i8" => DType::Int8,
            "int16" | "i16" => DType::Int16,
            "int32" | "i32" | "int" => DType::Int32,
            "int64" | "i64" | "long" => DType::Int64,
            "uint8" | "u8" => DType::UInt8,
            "uint16" | "u16" => DType::UInt16,
            "uint32" | "u32" | "uint" => DType::UInt32,
            "uint64" | "u64" | "ulong" => DType::UInt64,
            "float32" | "f32" | "float" => DType::Float32,
            "float64" | "f64" | "double" => DType::Float64,
            "string" | "str" => DType::String,
            _ => return None,
        };
        Some(dtype)
    }

    /// Signed integer types
    pub fn is_signed(&self) -> bool {
        matches!(self, DType::Int8 | DType::Int16 | DType::Int32 | DType::Int64)
    }

    /// Unsigned integer types
    pub fn is_unsigned(&self) -> bool {
        matches!(
            self,
            DType::UInt8 | DType::UInt16 | DType::UInt32 | DType::UInt64
        )
    }

    /// Any integer type
    pub fn is_integer(&self) -> bool {
        self.is_signed() || self.is_unsigned()
    }

    /// Floating point types
    pub fn is_float(&self) -> bool {
        matches!(self, DType::Float32 | DType::Float64)
    }

    /// String type
    pub fn is_text(&self) -> bool {
        matches!(self, DType::String)
    }

    fn accepts(&self, data: &Data) -> bool {
        match data {
            Data::Int(_) => self.is_signed(),
            Data::UInt(_) => self.is_unsigned(),
            Data::Float(_) => self.is_float(),
            Data::Text(_) => self.is_text(),
        }
    }
}

impl std::fmt::Display for DType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Flat storage behind a [Value]
#[derive(Debug, Clone, PartialEq)]
pub enum Data {
    Int(Vec<i64>),
    UInt(Vec<u64>),
    Float(Vec<f64>),
    Text(Vec<String>),
}

impl Data {
    /// Number of elements
    pub fn len(&self) -> usize {
        match self {
            Data::Int(v) => v.len(),
            Data::UInt(v) => v.len(),
            Data::Float(v) => v.len(),
            Data::Text(v) => v.len(),
        }
    }

    /// True if there are no elements
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Widest dtype for the variant
    pub fn default_dtype(&self) -> DType {
        match self {
            Data::Int(_) => DType::Int64,
            Data::UInt(_) => DType::UInt64,
            Data::Float(_) => DType::Float64,
            Data::Text(_) => DType::String,
        }
    }
}

/// Typed, shaped array of values
///
/// Values are stored flat in row-major order next to their `size`. A scalar
/// is a value with `size == [1]`.
///
/// ```rust
/// # use nxtools_model::{DType, Value};
/// let value = Value::float_array(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![2, 3]).unwrap();
/// assert_eq!(value.size(), &[2, 3]);
/// assert_eq!(value.dtype(), DType::Float64);
/// assert!(!value.is_scalar());
///
/// let value = Value::from(2.5);
/// assert!(value.is_scalar());
/// assert_eq!(value.as_f64(), Some(2.5));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    dtype: DType,
    size: Vec<usize>,
    data: Data,
}

impl Value {
    /// Checked constructor
    ///
    /// Fails if the size does not account for every element, or if the data
    /// cannot hold the given dtype.
    pub fn new(dtype: DType, size: Vec<usize>, data: Data) -> Result<Self> {
        if size.is_empty() || size.iter().product::<usize>() != data.len() {
            return Err(Error::ValueSizeMismatch {
                size,
                len: data.len(),
            });
        }

        if !dtype.accepts(&data) {
            return Err(Error::ValueTypeMismatch(dtype.to_string()));
        }

        Ok(Self { dtype, size, data })
    }

    /// Float64 array with an explicit size
    pub fn float_array(values: Vec<f64>, size: Vec<usize>) -> Result<Self> {
        Self::new(DType::Float64, size, Data::Float(values))
    }

    /// Int64 array with an explicit size
    pub fn int_array(values: Vec<i64>, size: Vec<usize>) -> Result<Self> {
        Self::new(DType::Int64, size, Data::Int(values))
    }

    /// Two dimensional integer array from rows of equal length
    pub fn int_rows(dtype: DType, rows: &[Vec<i64>]) -> Result<Self> {
        let columns = rows.first().map_or(0, Vec::len);
        let data = rows.iter().flatten().copied().collect();
        Self::new(dtype, vec![rows.len(), columns], Data::Int(data))
    }

    /// Two dimensional float array from rows of equal length
    pub fn float_rows(dtype: DType, rows: &[Vec<f64>]) -> Result<Self> {
        let columns = rows.first().map_or(0, Vec::len);
        let data = rows.iter().flatten().copied().collect();
        Self::new(dtype, vec![rows.len(), columns], Data::Float(data))
    }

    /// An `[n, 3]` float64 array of points
    pub fn from_vectors(vectors: &[Vector3<f64>]) -> Self {
        Self {
            dtype: DType::Float64,
            size: vec![vectors.len(), 3],
            data: Data::Float(vectors.iter().flat_map(|v| [v.x, v.y, v.z]).collect()),
        }
    }

    /// Element type
    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// Dimension lengths
    pub fn size(&self) -> &[usize] {
        &self.size
    }

    /// Flat storage
    pub fn data(&self) -> &Data {
        &self.data
    }

    /// Total number of elements
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if there are no elements
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// True for a single element with size `[1]`
    pub fn is_scalar(&self) -> bool {
        self.size == [1]
    }

    /// Same data under a different dtype of the same kind
    pub fn with_dtype(self, dtype: DType) -> Result<Self> {
        Self::new(dtype, self.size, self.data)
    }

    /// Same data under a different size
    pub fn reshape(self, size: Vec<usize>) -> Result<Self> {
        Self::new(self.dtype, size, self.data)
    }

    /// All elements as floats, for any numeric data
    pub fn to_f64_vec(&self) -> Option<Vec<f64>> {
        match &self.data {
            Data::Int(v) => Some(v.iter().map(|x| *x as f64).collect()),
            Data::UInt(v) => Some(v.iter().map(|x| *x as f64).collect()),
            Data::Float(v) => Some(v.clone()),
            Data::Text(_) => None,
        }
    }

    /// All elements as signed integers, for integer data that fits
    pub fn to_i64_vec(&self) -> Option<Vec<i64>> {
        match &self.data {
            Data::Int(v) => Some(v.clone()),
            Data::UInt(v) => v.iter().map(|x| i64::try_from(*x).ok()).collect(),
            _ => None,
        }
    }

    /// First element as a float
    pub fn as_f64(&self) -> Option<f64> {
        match &self.data {
            Data::Int(v) => v.first().map(|x| *x as f64),
            Data::UInt(v) => v.first().map(|x| *x as f64),
            Data::Float(v) => v.first().copied(),
            Data::Text(_) => None,
        }
    }

    /// First element as a signed integer
    pub fn as_i64(&self) -> Option<i64> {
        match &self.data {
            Data::Int(v) => v.first().copied(),
            Data::UInt(v) => v.first().and_then(|x| i64::try_from(*x).ok()),
            _ => None,
        }
    }

    /// First element as a string
    pub fn as_str(&self) -> Option<&str> {
        match &self.data {
            Data::Text(v) => v.first().map(String::as_str),
            _ => None,
        }
    }

    /// Split a two dimensional numeric array into rows of floats
    pub fn float_rows_vec(&self) -> Option<Vec<Vec<f64>>> {
        let [_, columns] = self.size[..] else {
            return None;
        };
        let values = self.to_f64_vec()?;
        Some(values.chunks(columns.max(1)).map(<[f64]>::to_vec).collect())
    }

    /// Split a two dimensional integer array into rows
    pub fn int_rows_vec(&self) -> Option<Vec<Vec<i64>>> {
        let [_, columns] = self.size[..] else {
            return None;
        };
        let values = self.to_i64_vec()?;
        Some(values.chunks(columns.max(1)).map(<[i64]>::to_vec).collect())
    }

    /// Interpret an `[n, 3]` numeric array as points
    pub fn to_vectors(&self) -> Option<Vec<Vector3<f64>>> {
        match self.size[..] {
            [_, 3] => (),
            [3] => (),
            _ => return None,
        }
        let values = self.to_f64_vec()?;
        Some(
            values
                .chunks_exact(3)
                .map(|c| Vector3::new(c[0], c[1], c[2]))
                .collect(),
        )
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if let (true, Some(text)) = (self.is_scalar(), self.as_str()) {
            return write!(f, "{text}");
        }

        let body = match &self.data {
            Data::Int(v) => f!("{v:?}"),
            Data::UInt(v) => f!("{v:?}"),
            Data::Float(v) => f!("{v:?}"),
            Data::Text(v) => f!("{v:?}"),
        };

        if self.is_scalar() {
            write!(f, "{}", body.trim_matches(['[', ']']))
        } else {
            write!(f, "{body} ({}, {:?})", self.dtype, self.size)
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self {
            dtype: DType::Float64,
            size: vec![1],
            data: Data::Float(vec![value]),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self {
            dtype: DType::Int64,
            size: vec![1],
            data: Data::Int(vec![value]),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self {
            dtype: DType::String,
            size: vec![1],
            data: Data::Text(vec![value]),
        }
    }
}

impl From<Vec<f64>> for Value {
    fn from(values: Vec<f64>) -> Self {
        Self {
            dtype: DType::Float64,
            size: vec![values.len()],
            data: Data::Float(values),
        }
    }
}

impl From<Vec<i64>> for Value {
    fn from(values: Vec<i64>) -> Self {
        Self {
            dtype: DType::Int64,
            size: vec![values.len()],
            data: Data::Int(values),
        }
    }
}

impl From<Vec<String>> for Value {
    fn from(values: Vec<String>) -> Self {
        Self {
            dtype: DType::String,
            size: vec![values.len()],
            data: Data::Text(values),
        }
    }
}

impl From<Vector3<f64>> for Value {
    fn from(vector: Vector3<f64>) -> Self {
        Self::from(vec![vector.x, vector.y, vector.z])
    }
}
