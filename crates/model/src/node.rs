// crate modules
use crate::value::Value;

// external crates
use indexmap::IndexMap;

/// Attribute holding the NeXus class of a group
pub const NX_CLASS: &str = "NX_class";

/// Ordered collection of named attributes
///
/// Keys are unique and keep the order they were first inserted in, which is
/// the order they are written out in.
///
/// ```rust
/// # use nxtools_model::Attributes;
/// let mut attributes = Attributes::new();
/// attributes.set("units", "m");
/// attributes.set("vector", vec![0.0, 0.0, 1.0]);
/// attributes.set("units", "mm");
///
/// assert_eq!(attributes.get_str("units"), Some("mm"));
/// assert_eq!(attributes.keys().collect::<Vec<_>>(), ["units", "vector"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes(IndexMap<String, Value>);

impl Attributes {
    /// Empty attribute set
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an attribute by name
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Look up a string attribute by name
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Insert or overwrite an attribute, keeping its original position
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Remove an attribute, preserving the order of the rest
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    /// True if the attribute exists
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Attribute names in order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Attributes in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of attributes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if there are no attributes
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Anything in the model with a name and attributes
pub trait Node {
    /// Name within the parent
    fn name(&self) -> &str;

    /// Attributes of the node
    fn attributes(&self) -> &Attributes;

    /// Mutable attributes of the node
    fn attributes_mut(&mut self) -> &mut Attributes;

    /// Look up a single attribute
    fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes().get(key)
    }

    /// Set a single attribute
    fn set_attribute(&mut self, key: &str, value: impl Into<Value>)
    where
        Self: Sized,
    {
        self.attributes_mut().set(key, value);
    }
}
