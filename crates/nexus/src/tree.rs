// crate modules
use crate::error::{Error, Result};

// nxtools modules
use nxtools_model::{Attributes, DType, Dataset, Node, Value, NX_CLASS};
use nxtools_utils::f;

/// Hierarchical storage that an instrument is written into
///
/// Nodes are addressed by absolute paths such as `/entry/instrument`, with
/// `/` for the root group. Implementations decide how the structure is kept,
/// the encoder only ever goes through these calls.
pub trait Storage {
    /// Create a child group, returning its path
    fn create_group(&mut self, parent: &str, name: &str, nx_class: Option<&str>) -> Result<String>;

    /// Create a child dataset stored as `dtype`, returning its path
    fn create_dataset(&mut self, parent: &str, name: &str, value: Value, dtype: DType)
        -> Result<String>;

    /// Attribute of any node
    fn attribute(&self, path: &str, key: &str) -> Result<Option<Value>>;

    /// Add or replace an attribute of any node
    fn set_attribute(&mut self, path: &str, key: &str, value: Value) -> Result<()>;

    /// Remove a node and everything below it
    fn delete_node(&mut self, path: &str) -> Result<()>;

    /// Rename a node in place, returning its new path
    fn rename_node(&mut self, path: &str, name: &str) -> Result<String>;

    /// True if a node exists at the path
    fn exists(&self, path: &str) -> bool;
}

/// Either kind of node in a [NexusTree]
#[derive(Debug, Clone, PartialEq)]
pub enum NexusNode {
    Group(NexusGroup),
    Dataset(Dataset),
}

impl NexusNode {
    /// Group, if this is one
    pub fn as_group(&self) -> Option<&NexusGroup> {
        match self {
            NexusNode::Group(group) => Some(group),
            NexusNode::Dataset(_) => None,
        }
    }

    /// Dataset, if this is one
    pub fn as_dataset(&self) -> Option<&Dataset> {
        match self {
            NexusNode::Group(_) => None,
            NexusNode::Dataset(dataset) => Some(dataset),
        }
    }

    fn set_name(&mut self, name: &str) {
        match self {
            NexusNode::Group(group) => group.name = name.to_string(),
            NexusNode::Dataset(dataset) => dataset.name = name.to_string(),
        }
    }
}

impl Node for NexusNode {
    fn name(&self) -> &str {
        match self {
            NexusNode::Group(group) => &group.name,
            NexusNode::Dataset(dataset) => &dataset.name,
        }
    }

    fn attributes(&self) -> &Attributes {
        match self {
            NexusNode::Group(group) => &group.attributes,
            NexusNode::Dataset(dataset) => &dataset.attributes,
        }
    }

    fn attributes_mut(&mut self) -> &mut Attributes {
        match self {
            NexusNode::Group(group) => &mut group.attributes,
            NexusNode::Dataset(dataset) => &mut dataset.attributes,
        }
    }
}

impl From<NexusGroup> for NexusNode {
    fn from(group: NexusGroup) -> Self {
        NexusNode::Group(group)
    }
}

impl From<Dataset> for NexusNode {
    fn from(dataset: Dataset) -> Self {
        NexusNode::Dataset(dataset)
    }
}

/// Named group of child nodes
///
/// Child names are unique within a group and children keep the order they
/// were added in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NexusGroup {
    /// Name within the parent
    pub name: String,
    /// Attributes of the group, including `NX_class`
    pub attributes: Attributes,
    /// Ordered children
    pub children: Vec<NexusNode>,
}

impl NexusGroup {
    /// Empty group without a class
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Empty group with an `NX_class` attribute
    pub fn with_class(name: impl Into<String>, nx_class: &str) -> Self {
        let mut group = Self::new(name);
        group.attributes.set(NX_CLASS, nx_class);
        group
    }

    /// NeXus class of the group
    pub fn nx_class(&self) -> Option<&str> {
        self.attributes.get_str(NX_CLASS)
    }

    /// Child by name
    pub fn child(&self, name: &str) -> Option<&NexusNode> {
        self.children.iter().find(|c| c.name() == name)
    }

    /// Child group by name
    pub fn group(&self, name: &str) -> Option<&NexusGroup> {
        self.child(name).and_then(NexusNode::as_group)
    }

    /// Child dataset by name
    pub fn dataset(&self, name: &str) -> Option<&Dataset> {
        self.child(name).and_then(NexusNode::as_dataset)
    }

    /// Child groups in order
    pub fn groups(&self) -> impl Iterator<Item = &NexusGroup> {
        self.children.iter().filter_map(NexusNode::as_group)
    }

    /// Child datasets in order
    pub fn datasets(&self) -> impl Iterator<Item = &Dataset> {
        self.children.iter().filter_map(NexusNode::as_dataset)
    }

    /// First child group of a NeXus class
    pub fn find_class(&self, nx_class: &str) -> Option<&NexusGroup> {
        self.groups().find(|g| g.nx_class() == Some(nx_class))
    }

    /// Append a child, keeping names unique
    pub fn push(&mut self, node: impl Into<NexusNode>) -> Result<()> {
        let node = node.into();
        check_name(node.name())?;

        if self.child(node.name()).is_some() {
            return Err(Error::NameExists {
                parent: self.name.clone(),
                name: node.name().to_string(),
            });
        }

        self.children.push(node);
        Ok(())
    }

    fn child_mut(&mut self, name: &str) -> Option<&mut NexusNode> {
        self.children.iter_mut().find(|c| c.name() == name)
    }
}

impl Node for NexusGroup {
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

/// In-memory [Storage]
///
/// ```rust
/// # use nxtools_nexus::{NexusTree, Storage};
/// # use nxtools_model::{DType, Value};
/// let mut tree = NexusTree::new();
/// let entry = tree.create_group("/", "entry", Some("NXentry")).unwrap();
/// tree.create_dataset(&entry, "title", Value::from("test"), DType::String).unwrap();
///
/// assert!(tree.exists("/entry/title"));
/// assert_eq!(
///     tree.attribute("/entry", "NX_class").unwrap(),
///     Some(Value::from("NXentry"))
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NexusTree {
    root: NexusGroup,
}

impl NexusTree {
    /// Tree with an empty root group
    pub fn new() -> Self {
        Self::default()
    }

    /// Tree around an existing root group
    pub fn from_root(root: NexusGroup) -> Self {
        Self { root }
    }

    /// Root group
    pub fn root(&self) -> &NexusGroup {
        &self.root
    }

    /// Consume the tree, keeping the root group
    pub fn into_root(self) -> NexusGroup {
        self.root
    }

    /// Node at an absolute path, `None` for the root itself
    pub fn node(&self, path: &str) -> Option<&NexusNode> {
        let (parent, name) = split_last(path)?;
        self.group(parent)?.child(name)
    }

    /// Group at an absolute path, including the root
    pub fn group(&self, path: &str) -> Option<&NexusGroup> {
        segments(path).try_fold(&self.root, |group, name| group.group(name))
    }

    fn group_mut(&mut self, path: &str) -> Result<&mut NexusGroup> {
        let mut group = &mut self.root;
        for name in segments(path) {
            group = match group.child_mut(name) {
                Some(NexusNode::Group(child)) => child,
                Some(NexusNode::Dataset(_)) => return Err(Error::NotAGroup(path.to_string())),
                None => return Err(Error::NodeNotFound(path.to_string())),
            };
        }
        Ok(group)
    }

    fn attributes_mut(&mut self, path: &str) -> Result<&mut Attributes> {
        match split_last(path) {
            None => Ok(&mut self.root.attributes),
            Some((parent, name)) => self
                .group_mut(parent)?
                .child_mut(name)
                .map(|node| node.attributes_mut())
                .ok_or_else(|| Error::NodeNotFound(path.to_string())),
        }
    }
}

impl Storage for NexusTree {
    fn create_group(&mut self, parent: &str, name: &str, nx_class: Option<&str>) -> Result<String> {
        let group = match nx_class {
            Some(nx_class) => NexusGroup::with_class(name, nx_class),
            None => NexusGroup::new(name),
        };
        self.group_mut(parent)?.push(group)?;
        Ok(join(parent, name))
    }

    fn create_dataset(
        &mut self,
        parent: &str,
        name: &str,
        value: Value,
        dtype: DType,
    ) -> Result<String> {
        let value = value.with_dtype(dtype)?;
        self.group_mut(parent)?.push(Dataset::new(name, value))?;
        Ok(join(parent, name))
    }

    fn attribute(&self, path: &str, key: &str) -> Result<Option<Value>> {
        let attributes = match split_last(path) {
            None => &self.root.attributes,
            Some(_) => self
                .node(path)
                .map(|node| node.attributes())
                .ok_or_else(|| Error::NodeNotFound(path.to_string()))?,
        };
        Ok(attributes.get(key).cloned())
    }

    fn set_attribute(&mut self, path: &str, key: &str, value: Value) -> Result<()> {
        self.attributes_mut(path)?.set(key, value);
        Ok(())
    }

    fn delete_node(&mut self, path: &str) -> Result<()> {
        let (parent, name) = split_last(path).ok_or_else(|| Error::InvalidName(path.to_string()))?;
        let group = self.group_mut(parent)?;
        let before = group.children.len();
        group.children.retain(|c| c.name() != name);

        if group.children.len() == before {
            return Err(Error::NodeNotFound(path.to_string()));
        }
        Ok(())
    }

    fn rename_node(&mut self, path: &str, name: &str) -> Result<String> {
        check_name(name)?;
        let (parent, old) = split_last(path).ok_or_else(|| Error::InvalidName(path.to_string()))?;
        let group = self.group_mut(parent)?;

        if old != name && group.child(name).is_some() {
            return Err(Error::NameExists {
                parent: parent.to_string(),
                name: name.to_string(),
            });
        }

        group
            .child_mut(old)
            .ok_or_else(|| Error::NodeNotFound(path.to_string()))?
            .set_name(name);
        Ok(join(parent, name))
    }

    fn exists(&self, path: &str) -> bool {
        match split_last(path) {
            None => true,
            Some(_) => self.node(path).is_some(),
        }
    }
}

/// Absolute path of a child
pub fn join(parent: &str, name: &str) -> String {
    f!("{}/{name}", parent.trim_end_matches('/'))
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Parent path and final name, `None` for the root
fn split_last(path: &str) -> Option<(&str, &str)> {
    let trimmed = path.trim_end_matches('/');
    let (parent, name) = trimmed.rsplit_once('/').unwrap_or(("", trimmed));
    if name.is_empty() {
        return None;
    }
    Some((if parent.is_empty() { "/" } else { parent }, name))
}

fn check_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains('/') {
        return Err(Error::InvalidName(name.to_string()));
    }
    Ok(())
}
