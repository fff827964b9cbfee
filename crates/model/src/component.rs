// crate modules
use crate::component_type::ComponentType;
use crate::dataset::Dataset;
use crate::instrument::{ComponentId, TransformId};
use crate::node::{Attributes, Node};
use crate::pixel::PixelData;

// nxtools modules
use nxtools_geometry::Geometry;

// external crates
use indexmap::IndexMap;

/// Names used by the structure of a component, unavailable for fields
pub const RESERVED_FIELDS: [&str; 5] = [
    "depends_on",
    "description",
    "transforms",
    "shape",
    "pixel_shape",
];

/// A single part of an instrument
///
/// A component owns its local transformations, its shape, its pixel data and
/// any extra fields. The transform parent and dependent transform are
/// references into other components, and like every other edge in the model
/// they are changed through the [Instrument](crate::Instrument).
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub(crate) name: String,
    description: String,
    component_type: ComponentType,
    attributes: Attributes,
    pub(crate) transforms: Vec<TransformId>,
    pub(crate) depends_on: Option<TransformId>,
    pub(crate) transform_parent: Option<ComponentId>,
    pub(crate) dependent_transform: Option<TransformId>,
    pub(crate) geometry: Geometry,
    pub(crate) pixel_data: Option<PixelData>,
    pub(crate) fields: IndexMap<String, Dataset>,
}

impl Component {
    pub(crate) fn new(name: &str, component_type: ComponentType) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            component_type,
            attributes: Attributes::new(),
            transforms: Vec::new(),
            depends_on: None,
            transform_parent: None,
            dependent_transform: None,
            geometry: Geometry::NoShape,
            pixel_data: None,
            fields: IndexMap::new(),
        }
    }

    /// Free text description
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Replace the description
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Type of the component
    pub fn component_type(&self) -> ComponentType {
        self.component_type
    }

    /// NeXus class of the component group
    pub fn nx_class(&self) -> String {
        self.component_type.nx_class()
    }

    /// Local transformations in the order they were added
    pub fn transforms(&self) -> &[TransformId] {
        &self.transforms
    }

    /// Last transformation of the local chain, or `None` for no dependency
    pub fn depends_on(&self) -> Option<TransformId> {
        self.depends_on
    }

    /// Component whose chain this component's chain continues from
    pub fn transform_parent(&self) -> Option<ComponentId> {
        self.transform_parent
    }

    /// Transformation in the transform parent to attach to
    ///
    /// `None` means the parent's last transformation.
    pub fn dependent_transform(&self) -> Option<TransformId> {
        self.dependent_transform
    }

    /// Shape of the component
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Pixel layout, for detectors
    pub fn pixel_data(&self) -> Option<&PixelData> {
        self.pixel_data.as_ref()
    }

    /// Extra field by name
    pub fn field(&self, name: &str) -> Option<&Dataset> {
        self.fields.get(name)
    }

    /// Extra fields in the order they were added
    pub fn fields(&self) -> impl Iterator<Item = &Dataset> {
        self.fields.values()
    }
}

impl Node for Component {
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
