//! JSON description of a NeXus tree
//!
//! The layout follows the NeXus file-writer templates, where the whole tree
//! sits under `{"nexus_structure": {"children": [...]}}` and every node is
//! either a group with children or a dataset with values.
//!
//! ```json
//! {
//!   "type": "dataset",
//!   "name": "depends_on",
//!   "dataset": { "type": "string", "size": [1] },
//!   "values": "."
//! }
//! ```

// standard library
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

// crate modules
use crate::decode::decode_with;
use crate::encode::encode;
use crate::error::{Error, Result};
use crate::layout::{NX_ENTRY, NX_INSTRUMENT};
use crate::options::DecodeOptions;
use crate::tree::{NexusGroup, NexusNode, NexusTree};
use crate::warnings::{Context, Severity, Warnings};

// nxtools modules
use nxtools_model::{Attributes, DType, Data, Dataset, Instrument, Value};
use nxtools_utils::f;

// external crates
use log::{debug, info};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value as JsonValue};

const NEXUS_STRUCTURE: &str = "nexus_structure";
const GROUP: &str = "group";
const DATASET: &str = "dataset";

/// Declared element type and shape of a dataset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct JsonDatasetInfo {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    dtype: Option<String>,
    #[serde(
        default,
        deserialize_with = "size_or_list",
        skip_serializing_if = "Option::is_none"
    )]
    size: Option<Vec<usize>>,
}

/// A size is either a list of dimensions or a single length
fn size_or_list<'de, D>(deserializer: D) -> core::result::Result<Option<Vec<usize>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Size {
        Length(usize),
        Dimensions(Vec<usize>),
    }

    Ok(Option::<Size>::deserialize(deserializer)?.map(|size| match size {
        Size::Length(length) => vec![length],
        Size::Dimensions(dimensions) => dimensions,
    }))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct JsonAttribute {
    name: String,
    values: JsonValue,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    dtype: Option<String>,
}

/// Attributes come either as a list of named entries or as a plain map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
enum JsonAttributes {
    List(Vec<JsonAttribute>),
    Map(serde_json::Map<String, JsonValue>),
}

/// Any node of the tree
///
/// Children are kept raw so that one malformed child does not take its
/// siblings down with it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct JsonNode {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    attributes: Option<JsonAttributes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    children: Option<Vec<JsonValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dataset: Option<JsonDatasetInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    values: Option<JsonValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Group,
    Dataset,
}

impl JsonNode {
    /// Explicit type, or whatever the fields present suggest
    fn node_kind(&self) -> Option<NodeKind> {
        match self.kind.as_deref() {
            Some(GROUP) => Some(NodeKind::Group),
            Some(DATASET) => Some(NodeKind::Dataset),
            Some(_) => None,
            None if self.values.is_some() || self.dataset.is_some() => Some(NodeKind::Dataset),
            None if self.children.is_some() => Some(NodeKind::Group),
            None => None,
        }
    }
}

/// Encode an instrument and serialise it as pretty JSON
pub fn to_json_string(instrument: &Instrument) -> Result<String> {
    let json = tree_to_json(&encode(instrument)?)?;
    Ok(serde_json::to_string_pretty(&json)?)
}

/// Parse JSON text and decode the instrument it describes
///
/// Invalid JSON, or JSON without a `nexus_structure`, is fatal. Everything
/// else ends up in the returned [Warnings].
///
/// ```rust
/// # use nxtools_model::{ComponentType, Instrument};
/// # use nxtools_nexus::{from_json_str, to_json_string, DecodeOptions};
/// let mut instrument = Instrument::new();
/// instrument.add_component("monitor", ComponentType::Monitor).unwrap();
///
/// let text = to_json_string(&instrument).unwrap();
/// let (decoded, warnings) = from_json_str(&text, &DecodeOptions::default()).unwrap();
///
/// assert!(warnings.is_empty());
/// assert!(decoded.component_by_name("monitor").is_some());
/// ```
pub fn from_json_str(text: &str, options: &DecodeOptions) -> Result<(Instrument, Warnings)> {
    let json: JsonValue = serde_json::from_str(text)?;
    load(&json, options)
}

/// Write an instrument to a JSON file
pub fn write_json_file<P: AsRef<Path>>(instrument: &Instrument, path: P) -> Result<()> {
    let path = path.as_ref();
    info!("Writing {}", path.display());

    let json = tree_to_json(&encode(instrument)?)?;
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, &json)?;
    writer.flush()?;
    Ok(())
}

/// Read an instrument from a JSON file
pub fn read_json_file<P: AsRef<Path>>(
    path: P,
    options: &DecodeOptions,
) -> Result<(Instrument, Warnings)> {
    let path = path.as_ref();
    info!("Reading {}", path.display());

    let reader = BufReader::new(File::open(path)?);
    let json: JsonValue = serde_json::from_reader(reader)?;
    load(&json, options)
}

fn load(json: &JsonValue, options: &DecodeOptions) -> Result<(Instrument, Warnings)> {
    let mut warnings = Warnings::new();
    let tree = tree_from_json(json, options, &mut warnings)?;
    decode_with(&tree, options, warnings)
}

/// JSON layout of a whole tree
pub fn tree_to_json(tree: &NexusTree) -> Result<JsonValue> {
    let children = tree
        .root()
        .children
        .iter()
        .map(node_to_json)
        .collect::<Result<Vec<_>>>()?;
    Ok(json!({ NEXUS_STRUCTURE: { "children": children } }))
}

/// Tree described by a JSON layout
///
/// Nodes that cannot be read are skipped, and datasets whose values fail a
/// check are kept or dropped depending on `options`.
pub fn tree_from_json(
    json: &JsonValue,
    options: &DecodeOptions,
    warnings: &mut Warnings,
) -> Result<NexusTree> {
    let children = json
        .get(NEXUS_STRUCTURE)
        .and_then(|structure| structure.get("children"))
        .and_then(JsonValue::as_array)
        .ok_or_else(|| Error::NotAnInstrument(f!("no children found in \"{NEXUS_STRUCTURE}\"")))?;

    let mut root = NexusGroup::default();
    let mut reader = JsonReader { options, warnings };
    let context = Context::new(NEXUS_STRUCTURE, NEXUS_STRUCTURE);
    reader.read_children(children, &mut root, NEXUS_STRUCTURE, None, None, context);

    Ok(NexusTree::from_root(root))
}

fn node_to_json(node: &NexusNode) -> Result<JsonValue> {
    let json_node = match node {
        NexusNode::Group(group) => JsonNode {
            kind: Some(GROUP.to_string()),
            name: Some(group.name.clone()),
            attributes: attributes_to_json(&group.attributes),
            children: Some(
                group
                    .children
                    .iter()
                    .map(node_to_json)
                    .collect::<Result<_>>()?,
            ),
            ..Default::default()
        },
        NexusNode::Dataset(dataset) => JsonNode {
            kind: Some(DATASET.to_string()),
            name: Some(dataset.name.clone()),
            attributes: attributes_to_json(&dataset.attributes),
            dataset: Some(JsonDatasetInfo {
                dtype: Some(dataset.dtype().name().to_string()),
                size: Some(dataset.size().to_vec()),
            }),
            values: Some(value_to_json(&dataset.values)),
            ..Default::default()
        },
    };
    Ok(serde_json::to_value(json_node)?)
}

fn attributes_to_json(attributes: &Attributes) -> Option<JsonAttributes> {
    if attributes.is_empty() {
        return None;
    }

    let list = attributes
        .iter()
        .map(|(name, value)| JsonAttribute {
            name: name.to_string(),
            values: value_to_json(value),
            dtype: Some(value.dtype().name().to_string()),
        })
        .collect();
    Some(JsonAttributes::List(list))
}

/// Bare value for a scalar, nested arrays following the size otherwise
fn value_to_json(value: &Value) -> JsonValue {
    let leaves: Vec<JsonValue> = match value.data() {
        Data::Int(v) => v.iter().map(|x| JsonValue::from(*x)).collect(),
        Data::UInt(v) => v.iter().map(|x| JsonValue::from(*x)).collect(),
        Data::Float(v) => v.iter().map(|x| JsonValue::from(*x)).collect(),
        Data::Text(v) => v.iter().map(|x| JsonValue::from(x.as_str())).collect(),
    };

    match value.is_scalar() {
        true => leaves.into_iter().next().unwrap_or(JsonValue::Null),
        false => nest(&leaves, value.size()),
    }
}

fn nest(leaves: &[JsonValue], size: &[usize]) -> JsonValue {
    match size {
        [] | [_] => JsonValue::Array(leaves.to_vec()),
        [length, rest @ ..] => {
            let stride = rest.iter().product::<usize>();
            let items = match stride {
                0 => vec![nest(&[], rest); *length],
                _ => leaves.chunks(stride).map(|chunk| nest(chunk, rest)).collect(),
            };
            JsonValue::Array(items)
        }
    }
}

/// Shape of a regular nested array, `None` if it is ragged
///
/// Anything that is not an array is a single element with no dimensions.
fn regular_shape(json: &JsonValue) -> Option<Vec<usize>> {
    let JsonValue::Array(items) = json else {
        return Some(Vec::new());
    };

    let mut shapes = items.iter().map(regular_shape);
    let inner = match shapes.next() {
        Some(shape) => shape?,
        None => return Some(vec![0]),
    };
    for shape in shapes {
        if shape? != inner {
            return None;
        }
    }

    Some(std::iter::once(items.len()).chain(inner).collect())
}

fn leaves(json: &JsonValue) -> Vec<&JsonValue> {
    match json {
        JsonValue::Array(items) => items.iter().flat_map(leaves).collect(),
        leaf => vec![leaf],
    }
}

/// Narrowest kind of data every element fits
fn infer_data(leaves: &[&JsonValue]) -> Option<Data> {
    if leaves.iter().all(|l| l.is_i64()) {
        Some(Data::Int(leaves.iter().filter_map(|l| l.as_i64()).collect()))
    } else if leaves.iter().all(|l| l.is_u64()) {
        Some(Data::UInt(leaves.iter().filter_map(|l| l.as_u64()).collect()))
    } else if leaves.iter().all(|l| l.is_number()) {
        Some(Data::Float(leaves.iter().filter_map(|l| l.as_f64()).collect()))
    } else if leaves.iter().all(|l| l.is_string()) {
        Some(Data::Text(
            leaves
                .iter()
                .filter_map(|l| l.as_str())
                .map(str::to_string)
                .collect(),
        ))
    } else {
        None
    }
}

/// No elements, of the kind a declared dtype asks for
fn empty_data(dtype: Option<DType>) -> Data {
    match dtype {
        Some(d) if d.is_text() => Data::Text(Vec::new()),
        Some(d) if d.is_float() => Data::Float(Vec::new()),
        Some(d) if d.is_unsigned() => Data::UInt(Vec::new()),
        _ => Data::Int(Vec::new()),
    }
}

/// Data converted to a declared dtype, `None` if it does not fit
fn coerce(data: &Data, dtype: DType) -> Option<Data> {
    let as_float = |v: &[f64]| Some(Data::Float(v.to_vec()));
    match data {
        Data::Int(v) if dtype.is_signed() => Some(Data::Int(v.clone())),
        Data::Int(v) if dtype.is_unsigned() => v
            .iter()
            .map(|x| u64::try_from(*x).ok())
            .collect::<Option<_>>()
            .map(Data::UInt),
        Data::Int(v) if dtype.is_float() => as_float(&v.iter().map(|x| *x as f64).collect::<Vec<_>>()),
        Data::UInt(v) if dtype.is_unsigned() => Some(Data::UInt(v.clone())),
        Data::UInt(v) if dtype.is_signed() => v
            .iter()
            .map(|x| i64::try_from(*x).ok())
            .collect::<Option<_>>()
            .map(Data::Int),
        Data::UInt(v) if dtype.is_float() => as_float(&v.iter().map(|x| *x as f64).collect::<Vec<_>>()),
        Data::Float(v) if dtype.is_float() => as_float(v),
        Data::Float(v) if dtype.is_signed() && v.iter().all(|x| x.fract() == 0.0) => {
            Some(Data::Int(v.iter().map(|x| *x as i64).collect()))
        }
        Data::Text(v) if dtype.is_text() => Some(Data::Text(v.clone())),
        _ => None,
    }
}

/// What a node says about its own values
#[derive(Debug, Clone, Copy)]
struct Declared<'a> {
    dtype: Option<&'a str>,
    size: Option<&'a [usize]>,
    /// Datasets are checked for a size and dtype, attributes are not
    is_dataset: bool,
}

struct JsonReader<'a> {
    options: &'a DecodeOptions,
    warnings: &'a mut Warnings,
}

impl JsonReader<'_> {
    /// Record a failed check, returning whether the values are kept
    fn check(&mut self, context: Context, severity: Severity, detail: &str) -> bool {
        context.record(self.warnings, severity, detail);
        severity == Severity::Issue
    }

    fn read_children(
        &mut self,
        children: &[JsonValue],
        parent: &mut NexusGroup,
        parent_name: &str,
        parent_class: Option<&str>,
        component: Option<&str>,
        context: Context,
    ) {
        for child in children {
            let Some(node) = self.read_node(child, parent_name, parent_class, component, context)
            else {
                continue;
            };
            if let Err(e) = parent.push(node) {
                context.record(self.warnings, Severity::Error, &f!("{e}."));
            }
        }
    }

    fn read_node(
        &mut self,
        json: &JsonValue,
        parent_name: &str,
        parent_class: Option<&str>,
        component: Option<&str>,
        context: Context,
    ) -> Option<NexusNode> {
        let node = match JsonNode::deserialize(json) {
            Ok(node) => node,
            Err(e) => {
                let detail = f!("Unable to read child of {parent_name}: {e}.");
                context.record(self.warnings, Severity::Error, &detail);
                return None;
            }
        };

        let Some(name) = node.name.clone() else {
            self.warnings.push(
                Severity::Error,
                f!("Unable to find object name for child of {parent_name}."),
            );
            return None;
        };

        match node.node_kind() {
            Some(NodeKind::Group) => self
                .read_group(name, &node, parent_class, component, context)
                .map(NexusNode::from),
            Some(NodeKind::Dataset) => self.read_dataset(name, &node, context).map(NexusNode::from),
            None => {
                let kind = node.kind.as_deref().unwrap_or("untyped");
                debug!("Skipping {kind} node \"{name}\" in {parent_name}");
                None
            }
        }
    }

    fn read_group(
        &mut self,
        name: String,
        node: &JsonNode,
        parent_class: Option<&str>,
        component: Option<&str>,
        context: Context,
    ) -> Option<NexusGroup> {
        let mut group = NexusGroup::new(name.as_str());
        self.read_attributes(node.attributes.as_ref(), &mut group.attributes, &name, context);

        // groups directly below the entry or instrument are components
        let class = group.nx_class().unwrap_or(GROUP).to_string();
        let component = match (parent_class, component) {
            (Some(NX_ENTRY | NX_INSTRUMENT) | None, _) | (_, None) => group.name.clone(),
            (_, Some(component)) => component.to_string(),
        };

        let children = node.children.as_deref().unwrap_or_default();
        let child_context = Context::new(&class, &component);
        self.read_children(
            children,
            &mut group,
            &name,
            group_class(&class),
            Some(component.as_str()),
            child_context,
        );

        Some(group)
    }

    fn read_dataset(&mut self, name: String, node: &JsonNode, context: Context) -> Option<Dataset> {
        let Some(values) = node.values.as_ref() else {
            let detail = f!("Unable to find values for {name}.");
            context.record(self.warnings, Severity::Error, &detail);
            return None;
        };

        let info = node.dataset.clone().unwrap_or_default();
        let declared = Declared {
            dtype: info.dtype.as_deref(),
            size: info.size.as_deref(),
            is_dataset: true,
        };
        let value = self.read_values(values, declared, &name, context)?;

        let mut attributes = Attributes::new();
        self.read_attributes(node.attributes.as_ref(), &mut attributes, &name, context);
        Some(Dataset {
            name,
            attributes,
            values: value,
        })
    }

    fn read_attributes(
        &mut self,
        json: Option<&JsonAttributes>,
        attributes: &mut Attributes,
        owner: &str,
        context: Context,
    ) {
        let entries: Vec<(&str, &JsonValue, Option<&str>)> = match json {
            None => return,
            Some(JsonAttributes::List(list)) => list
                .iter()
                .map(|a| (a.name.as_str(), &a.values, a.dtype.as_deref()))
                .collect(),
            Some(JsonAttributes::Map(map)) => {
                map.iter().map(|(k, v)| (k.as_str(), v, None)).collect()
            }
        };

        for (name, json, dtype) in entries {
            let declared = Declared {
                dtype,
                size: None,
                is_dataset: false,
            };
            let label = f!("{name} attribute of {owner}");
            if let Some(value) = self.read_values(json, declared, &label, context) {
                attributes.set(name, value);
            }
        }
    }

    /// Typed value from JSON, checked against what the node declares
    fn read_values(
        &mut self,
        json: &JsonValue,
        declared: Declared,
        name: &str,
        context: Context,
    ) -> Option<Value> {
        let options = self.options;
        let leaves = leaves(json);

        let mut shape = match regular_shape(json) {
            Some(shape) => shape,
            None => {
                let detail = f!("Values of {name} do not form a regular array.");
                if !self.check(context, options.value_type_mismatch, &detail) {
                    return None;
                }
                vec![leaves.len()]
            }
        };
        if shape.is_empty() {
            shape = vec![1];
        }

        let declared_dtype = declared.dtype.and_then(DType::from_name);
        let data = match infer_data(&leaves) {
            _ if leaves.is_empty() => empty_data(declared_dtype),
            Some(data) => data,
            None => {
                let detail = f!("Values in {name} do not all have the same type.");
                if !self.check(context, options.value_type_mismatch, &detail) {
                    return None;
                }
                Data::Text(
                    leaves
                        .iter()
                        .map(|l| l.as_str().map_or_else(|| l.to_string(), str::to_string))
                        .collect(),
                )
            }
        };

        if declared.is_dataset {
            match declared.size {
                None => {
                    let detail = f!("Unable to find size attribute for {name} dataset.");
                    if !self.check(context, options.missing_size, &detail) {
                        return None;
                    }
                }
                Some(size) => {
                    let size = if size.is_empty() { &[1][..] } else { size };
                    if size != shape.as_slice() {
                        if leaves.is_empty() && size.iter().product::<usize>() == 0 {
                            shape = size.to_vec();
                        } else {
                            let detail = f!(
                                "Mismatch between length of {name} list {shape:?} and size attribute from dataset {size:?}."
                            );
                            if !self.check(context, options.size_mismatch, &detail) {
                                return None;
                            }
                        }
                    }
                }
            }
        }

        let default = data.default_dtype();
        let (dtype, data) = match (declared.dtype, declared_dtype) {
            (None, _) => {
                let detail = f!("Unable to find type attribute for {name}.");
                if declared.is_dataset && !self.check(context, options.missing_dtype, &detail) {
                    return None;
                }
                (default, data)
            }
            (Some(found), None) => {
                let detail = f!("Type attribute for {name} is not a recognised type, found \"{found}\".");
                if !self.check(context, options.dtype_mismatch, &detail) {
                    return None;
                }
                (default, data)
            }
            (Some(found), Some(dtype)) => match coerce(&data, dtype) {
                Some(coerced) => (dtype, coerced),
                None => {
                    let detail = f!("Type attribute for {name} does not match its values, found \"{found}\".");
                    if !self.check(context, options.dtype_mismatch, &detail) {
                        return None;
                    }
                    (default, data)
                }
            },
        };

        match Value::new(dtype, shape, data) {
            Ok(value) => Some(value),
            Err(e) => {
                context.record(self.warnings, Severity::Error, &f!("{e}."));
                None
            }
        }
    }
}

/// Class handed to children, `None` for plain groups
fn group_class(class: &str) -> Option<&str> {
    (class != GROUP).then_some(class)
}
