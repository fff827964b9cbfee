// crate modules
use crate::node::{Attributes, Node};
use crate::value::{DType, Value};

/// Named array or scalar with attributes
///
/// Used for component fields and as the storage behind every
/// [Transformation](crate::Transformation).
///
/// ```rust
/// # use nxtools_model::{Dataset, Node};
/// let dataset = Dataset::new("radius", 0.35).with_attribute("units", "m");
///
/// assert_eq!(dataset.name(), "radius");
/// assert_eq!(dataset.values.as_f64(), Some(0.35));
/// assert_eq!(dataset.attributes().get_str("units"), Some("m"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Name within the parent
    pub name: String,
    /// Attributes of the dataset
    pub attributes: Attributes,
    /// Stored values
    pub values: Value,
}

impl Dataset {
    /// New dataset without attributes
    pub fn new(name: impl Into<String>, values: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            attributes: Attributes::new(),
            values: values.into(),
        }
    }

    /// Chained attribute setter
    pub fn with_attribute(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.attributes.set(key, value);
        self
    }

    /// Element type of the values
    pub fn dtype(&self) -> DType {
        self.values.dtype()
    }

    /// Dimension lengths of the values
    pub fn size(&self) -> &[usize] {
        self.values.size()
    }

    /// Units attribute, if any
    pub fn units(&self) -> Option<&str> {
        self.attributes.get_str("units")
    }
}

impl Node for Dataset {
    fn name(&self) -> &str {
        &self.name
    }

    fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }
}
