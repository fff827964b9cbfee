// standard library
use std::collections::HashSet;

// crate modules
use crate::chain::default_dependent_transform;
use crate::component::{Component, RESERVED_FIELDS};
use crate::component_type::ComponentType;
use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::node::Node;
use crate::pixel::{PixelData, PIXEL_FIELDS};
use crate::transformation::{Dependent, Transformation, TransformationType};
use crate::value::Value;

// nxtools modules
use nxtools_geometry::chopper::{
    edges_array_has_correct_shape, validate_chopper, ChopperDetails, DiskChopperGeometryCreator,
    RADIUS, SLITS, SLIT_EDGES, SLIT_HEIGHT,
};
use nxtools_geometry::{Geometry, OffGeometry};
use nxtools_utils::{f, VectorExt};

// external crates
use log::{debug, trace, warn};
use nalgebra::Vector3;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Handle to a [Component] in an [Instrument]
    pub struct ComponentId;

    /// Handle to a [Transformation] in an [Instrument]
    pub struct TransformId;
}

/// Arena of components and transformations
///
/// Components and transformations refer to each other by handle rather than
/// by reference. Every edge (`depends_on`, a component's `depends_on`, and a
/// component's `dependent_transform`) is mirrored by a [Dependent] entry on the
/// transformation it points at, and the two are only ever changed together.
///
/// ```rust
/// # use nxtools_model::{ComponentType, Dependent, Instrument};
/// # use nalgebra::Vector3;
/// let mut instrument = Instrument::new();
/// let sample = instrument.add_component("sample", ComponentType::Sample).unwrap();
///
/// let height = instrument
///     .add_translation(sample, Vector3::new(0.0, 0.5, 0.0), None, None)
///     .unwrap();
/// let spin = instrument
///     .add_rotation(sample, Vector3::y(), 45.0, Some("omega"), Some(height))
///     .unwrap();
///
/// // the newest transformation heads the component's chain
/// assert_eq!(instrument.component(sample).unwrap().depends_on(), Some(spin));
/// assert_eq!(
///     instrument.transform(height).unwrap().dependents(),
///     &[Dependent::Transform(spin)]
/// );
/// assert!(instrument.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Instrument {
    components: SlotMap<ComponentId, Component>,
    transforms: SlotMap<TransformId, Transformation>,
    order: Vec<ComponentId>,
}

// Components
impl Instrument {
    /// Empty instrument
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of components
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True if there are no components
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Add a component with a unique name
    pub fn add_component(&mut self, name: &str, component_type: ComponentType) -> Result<ComponentId> {
        self.check_component_name(name, None)?;
        let id = self.components.insert(Component::new(name, component_type));
        self.order.push(id);
        debug!("Added {component_type} component \"{name}\"");
        Ok(id)
    }

    /// Remove a component and all of its transformations
    ///
    /// Fails if anything outside the component still depends on one of its
    /// transformations, or if it is the transform parent of another component.
    pub fn remove_component(&mut self, id: ComponentId) -> Result<Component> {
        let component = self.component(id)?;

        if let Some((_, child)) = self
            .components()
            .find(|(other, c)| *other != id && c.transform_parent == Some(id))
        {
            return Err(Error::ComponentIsTransformParent {
                component: component.name.clone(),
                child: child.name.clone(),
            });
        }

        for tid in &component.transforms {
            let t = self.transform(*tid)?;
            let external = t
                .dependents
                .iter()
                .filter(|d| !self.is_internal_dependent(**d, id))
                .count();
            if external > 0 {
                return Err(Error::TransformHasDependents {
                    transform: t.name().to_string(),
                    count: external,
                });
            }
        }

        let local = component.transforms.clone();
        let depends_on = component.depends_on;
        let dependent_transform = component.dependent_transform;

        // drop the edges leaving the component before the arena entries
        for tid in &local {
            if let Some(target) = self.transform(*tid)?.depends_on {
                self.unlink(target, Dependent::Transform(*tid));
            }
        }
        if let Some(target) = depends_on {
            self.unlink(target, Dependent::Component(id));
        }
        if let Some(target) = dependent_transform {
            self.unlink(target, Dependent::Attachment(id));
        }

        for tid in local {
            self.transforms.remove(tid);
        }
        self.order.retain(|c| *c != id);
        let removed = self.components.remove(id).ok_or(Error::ComponentNotFound(id))?;
        debug!("Removed component \"{}\"", removed.name);
        Ok(removed)
    }

    /// Change the name of a component, keeping names unique
    pub fn rename_component(&mut self, id: ComponentId, name: &str) -> Result<()> {
        self.component(id)?;
        self.check_component_name(name, Some(id))?;
        self.component_entry(id)?.name = name.to_string();
        Ok(())
    }

    /// Component by handle
    pub fn component(&self, id: ComponentId) -> Result<&Component> {
        self.components.get(id).ok_or(Error::ComponentNotFound(id))
    }

    /// Mutable component by handle
    ///
    /// Only the description, attributes, and other non-structural properties
    /// can be changed this way.
    pub fn component_mut(&mut self, id: ComponentId) -> Result<&mut Component> {
        self.component_entry(id)
    }

    /// Find a component by name
    pub fn component_by_name(&self, name: &str) -> Option<ComponentId> {
        self.components().find(|(_, c)| c.name == name).map(|(id, _)| id)
    }

    /// Components in the order they were added
    pub fn components(&self) -> impl Iterator<Item = (ComponentId, &Component)> {
        self.order
            .iter()
            .filter_map(|id| self.components.get(*id).map(|c| (*id, c)))
    }

    /// Component handles in the order they were added
    pub fn component_ids(&self) -> &[ComponentId] {
        &self.order
    }

    /// Replace the shape and pixel data of a component
    ///
    /// Any pixel fields derived from the previous shape are dropped. Pixel
    /// data is only accepted for detector types, and a pixel mapping must
    /// cover every face of the new shape.
    pub fn set_shape(
        &mut self,
        id: ComponentId,
        geometry: Geometry,
        pixel_data: Option<PixelData>,
    ) -> Result<()> {
        let component = self.component(id)?;

        if let Some(pixels) = &pixel_data {
            if !component.component_type().supports_pixel_data() {
                return Err(Error::PixelDataNotSupported(
                    component.component_type().to_string(),
                ));
            }

            match pixels {
                PixelData::SinglePixel(_) => (),
                PixelData::Grid(grid) => grid.validate()?,
                PixelData::Mapping(mapping) if mapping.len() != geometry.face_count() => {
                    return Err(Error::PixelMappingLength {
                        expected: geometry.face_count(),
                        found: mapping.len(),
                    })
                }
                PixelData::Mapping(_) => (),
            }
        }

        let component = self.component_entry(id)?;
        component
            .fields
            .retain(|name, _| !PIXEL_FIELDS.contains(&name.as_str()));
        trace!("Setting shape of \"{}\" to {geometry}", component.name);
        component.geometry = geometry;
        component.pixel_data = pixel_data;
        Ok(())
    }

    /// Clear the shape and pixel data of a component
    pub fn remove_shape(&mut self, id: ComponentId) -> Result<()> {
        self.set_shape(id, Geometry::NoShape, None)
    }

    /// Add or replace an extra field of a component
    pub fn set_field(&mut self, id: ComponentId, field: Dataset) -> Result<()> {
        let component = self.component(id)?;

        if field.name.is_empty() {
            return Err(Error::EmptyName);
        }

        let is_pixel_field = PIXEL_FIELDS.contains(&field.name.as_str());
        if RESERVED_FIELDS.contains(&field.name.as_str())
            || (is_pixel_field && component.pixel_data.is_some())
        {
            return Err(Error::ReservedFieldName(field.name));
        }

        self.component_entry(id)?
            .fields
            .insert(field.name.clone(), field);
        Ok(())
    }

    /// Extra field of a component
    pub fn field(&self, id: ComponentId, name: &str) -> Result<Option<&Dataset>> {
        Ok(self.component(id)?.field(name))
    }

    /// Remove an extra field, keeping the order of the rest
    pub fn remove_field(&mut self, id: ComponentId, name: &str) -> Result<Option<Dataset>> {
        Ok(self.component_entry(id)?.fields.shift_remove(name))
    }

    /// Mesh a disk chopper from its `slits`, `slit_edges`, `radius` and
    /// `slit_height` fields
    ///
    /// Slit edges are in degrees and lengths in metres unless the fields carry
    /// a `units` attribute.
    pub fn generate_chopper_geometry(&self, id: ComponentId) -> Result<OffGeometry> {
        let component = self.component(id)?;
        let field = |name: &str| {
            component
                .field(name)
                .ok_or_else(|| Error::MissingChopperField(name.to_string()))
        };
        let invalid = |name: &str| Error::InvalidChopperField(name.to_string());

        let slits = field(SLITS)?
            .values
            .as_i64()
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| invalid(SLITS))?;

        let edges = field(SLIT_EDGES)?;
        edges_array_has_correct_shape(edges.size())?;
        let edge_values = edges.values.to_f64_vec().ok_or_else(|| invalid(SLIT_EDGES))?;

        let radius = field(RADIUS)?;
        let slit_height = field(SLIT_HEIGHT)?;

        let units = |dataset: &Dataset, default: &'static str| {
            dataset.units().map(str::to_string).unwrap_or_else(|| {
                warn!(
                    "No units on {} of \"{}\", assuming {default}",
                    dataset.name, component.name
                );
                default.to_string()
            })
        };

        let details = ChopperDetails::new(
            slits,
            &edge_values,
            radius.values.as_f64().ok_or_else(|| invalid(RADIUS))?,
            slit_height.values.as_f64().ok_or_else(|| invalid(SLIT_HEIGHT))?,
            &units(edges, "deg"),
            &units(slit_height, "m"),
            &units(radius, "m"),
        )?;

        validate_chopper(&details)?;
        Ok(DiskChopperGeometryCreator::new(&details).create_disk_chopper_geometry())
    }
}

// Transformations
impl Instrument {
    /// Transformation by handle
    pub fn transform(&self, id: TransformId) -> Result<&Transformation> {
        self.transforms.get(id).ok_or(Error::TransformNotFound(id))
    }

    /// Mutable transformation by handle
    ///
    /// Dependency edges are not reachable this way.
    pub fn transform_mut(&mut self, id: TransformId) -> Result<&mut Transformation> {
        self.transforms.get_mut(id).ok_or(Error::TransformNotFound(id))
    }

    /// Find a local transformation of a component by name
    pub fn transform_by_name(&self, component: ComponentId, name: &str) -> Option<TransformId> {
        self.components.get(component)?.transforms.iter().copied().find(|tid| {
            self.transforms
                .get(*tid)
                .is_some_and(|t| t.name() == name)
        })
    }

    /// Add a translation in metres to a component
    ///
    /// The vector is split into a unit direction and a magnitude. Without a
    /// name one is generated, e.g. `Translation_1`, and clashing names are
    /// made unique. If the new transformation depends on whatever the
    /// component currently depends on, it becomes the head of the component's
    /// chain.
    pub fn add_translation(
        &mut self,
        component: ComponentId,
        vector: Vector3<f64>,
        name: Option<&str>,
        depends_on: Option<TransformId>,
    ) -> Result<TransformId> {
        let (direction, magnitude) = vector.split_magnitude();
        self.create_transform(
            component,
            name,
            TransformationType::Translation,
            magnitude,
            "m",
            direction,
            depends_on,
        )
    }

    /// Add a rotation in degrees to a component
    ///
    /// Naming and chaining follow [add_translation()](Self::add_translation).
    pub fn add_rotation(
        &mut self,
        component: ComponentId,
        axis: Vector3<f64>,
        angle: f64,
        name: Option<&str>,
        depends_on: Option<TransformId>,
    ) -> Result<TransformId> {
        self.create_transform(
            component,
            name,
            TransformationType::Rotation,
            angle,
            "degrees",
            axis,
            depends_on,
        )
    }

    /// Add a transformation exactly as stored in a file
    ///
    /// Unlike [add_translation()](Self::add_translation) the vector is kept
    /// as given and the values may be anything, e.g. an array or a string
    /// placeholder. The new transformation depends on nothing.
    pub fn insert_transformation(
        &mut self,
        component: ComponentId,
        name: &str,
        kind: TransformationType,
        values: Value,
        units: &str,
        vector: Vector3<f64>,
    ) -> Result<TransformId> {
        let magnitude = values.as_f64().unwrap_or_default();
        let id = self.create_transform(
            component,
            Some(name),
            kind,
            magnitude,
            units,
            vector,
            None,
        )?;
        self.transform_entry(id)?.set_values(values);
        Ok(id)
    }

    /// Change the name of a transformation, keeping sibling names unique
    pub fn rename_transformation(&mut self, id: TransformId, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(Error::EmptyName);
        }

        let owner = self.transform(id)?.owner();
        if let Some(existing) = self.transform_by_name(owner, name) {
            if existing != id {
                return Err(Error::DuplicateTransformName {
                    component: self.component(owner)?.name.clone(),
                    name: name.to_string(),
                });
            }
        }

        self.transform_mut(id)?.set_name(name);
        Ok(())
    }

    /// Remove a transformation from the component that owns it
    ///
    /// Fails with a permission error if the component does not own the
    /// transformation, and with a dependency error if anything still depends
    /// on it. Nothing is changed on failure.
    pub fn remove_transformation(&mut self, component: ComponentId, id: TransformId) -> Result<()> {
        let owner = self.component(component)?;
        let t = self.transform(id)?;

        if t.owner() != component {
            return Err(Error::TransformNotOwned {
                transform: t.name().to_string(),
                component: owner.name.clone(),
            });
        }

        if t.has_dependents() {
            return Err(Error::TransformHasDependents {
                transform: t.name().to_string(),
                count: t.dependents.len(),
            });
        }

        let depends_on = t.depends_on;

        // children attached by default move to the new last transformation
        let before = self.component(component)?.transforms.clone();
        self.component_entry(component)?.transforms.retain(|t| *t != id);
        if let Err(error) = self.check_chains() {
            self.component_entry(component)?.transforms = before;
            return Err(error);
        }

        if let Some(target) = depends_on {
            self.unlink(target, Dependent::Transform(id));
        }
        if let Some(removed) = self.transforms.remove(id) {
            debug!("Removed transformation \"{}\"", removed.name());
        }
        Ok(())
    }

    fn create_transform(
        &mut self,
        component: ComponentId,
        name: Option<&str>,
        kind: TransformationType,
        magnitude: f64,
        units: &str,
        vector: Vector3<f64>,
        depends_on: Option<TransformId>,
    ) -> Result<TransformId> {
        let head = self.component(component)?.depends_on;
        if let Some(target) = depends_on {
            self.transform(target)?;
        }

        let name = self.unique_transform_name(component, name, kind)?;
        let id = self.transforms.insert(Transformation::new(
            &name, kind, magnitude, units, vector, component,
        ));
        self.component_entry(component)?.transforms.push(id);

        let linked = match depends_on {
            Some(target) => self.register_dependent(target, Dependent::Transform(id)),
            None => self.check_chains(),
        };
        if let Err(error) = linked {
            self.component_entry(component)?.transforms.retain(|t| *t != id);
            self.transforms.remove(id);
            return Err(error);
        }
        trace!("Added {kind} \"{name}\" with value {magnitude} {units}");

        if head == depends_on {
            self.register_dependent(id, Dependent::Component(component))?;
        }

        Ok(id)
    }

    fn unique_transform_name(
        &self,
        component: ComponentId,
        name: Option<&str>,
        kind: TransformationType,
    ) -> Result<String> {
        let taken = |candidate: &str| self.transform_by_name(component, candidate).is_some();

        let base = match name {
            Some("") => return Err(Error::EmptyName),
            Some(name) if !taken(name) => return Ok(name.to_string()),
            Some(name) => name.to_string(),
            None => kind.to_string(),
        };

        Ok((1..)
            .map(|n| f!("{base}_{n}"))
            .find(|candidate| !taken(candidate))
            .unwrap_or(base))
    }
}

// Dependency edges
impl Instrument {
    /// Make `dependent` depend on `transform`
    ///
    /// The dependent's existing edge, if any, is moved off its old target. This
    /// is a no-op if the edge already points at `transform`. Fails without
    /// changing anything if the new edge would form a cycle, or if an
    /// attachment names a transformation outside the component's transform
    /// parent.
    pub fn register_dependent(&mut self, transform: TransformId, dependent: Dependent) -> Result<()> {
        self.transform(transform)?;
        let current = self.edge_of(dependent)?;

        if current == Some(transform) {
            let target = self.transform_entry(transform)?;
            if !target.dependents.contains(&dependent) {
                target.dependents.push(dependent);
            }
            return Ok(());
        }

        self.check_new_edge(transform, dependent)?;
        self.relink(dependent, current, Some(transform))
    }

    /// Drop the edge from `dependent` to `transform`
    ///
    /// A no-op if `dependent` does not currently depend on `transform`.
    pub fn deregister_dependent(&mut self, transform: TransformId, dependent: Dependent) -> Result<()> {
        self.transform(transform)?;

        match self.edge_of(dependent) {
            Ok(Some(current)) if current == transform => {
                self.relink(dependent, Some(transform), None)
            }
            _ => {
                self.unlink(transform, dependent);
                Ok(())
            }
        }
    }

    /// Point a transformation at a new target, or at the origin with `None`
    pub fn set_depends_on(&mut self, id: TransformId, target: Option<TransformId>) -> Result<()> {
        let dependent = Dependent::Transform(id);
        match (target, self.transform(id)?.depends_on) {
            (Some(target), _) => self.register_dependent(target, dependent),
            (None, Some(old)) => self.deregister_dependent(old, dependent),
            (None, None) => Ok(()),
        }
    }

    /// Point a component's `depends_on` at a new target, or `None`
    pub fn set_component_depends_on(
        &mut self,
        id: ComponentId,
        target: Option<TransformId>,
    ) -> Result<()> {
        let dependent = Dependent::Component(id);
        match (target, self.component(id)?.depends_on) {
            (Some(target), _) => self.register_dependent(target, dependent),
            (None, Some(old)) => self.deregister_dependent(old, dependent),
            (None, None) => Ok(()),
        }
    }

    /// Continue a component's chain from another component
    ///
    /// `dependent_transform` picks the transformation in the parent to attach
    /// to, or the parent's last transformation when `None`. A parent of
    /// `None`, or the component itself, makes the component a root.
    pub fn set_transform_parent(
        &mut self,
        id: ComponentId,
        parent: Option<ComponentId>,
        dependent_transform: Option<TransformId>,
    ) -> Result<()> {
        let component = self.component(id)?;
        let name = component.name.clone();
        let old_attachment = component.dependent_transform;
        let parent = parent.filter(|p| *p != id);

        match parent {
            Some(parent) => {
                let parent_component = self.component(parent)?;

                if let Some(tid) = dependent_transform {
                    let t = self.transform(tid)?;
                    if t.owner() != parent {
                        return Err(Error::DependentTransformNotFound {
                            transform: t.name().to_string(),
                            parent: parent_component.name.clone(),
                        });
                    }
                }

                if self.parent_chain_reaches(parent, id)? {
                    return Err(Error::CyclicTransformParent(name));
                }

                let attach = dependent_transform
                    .or_else(|| default_dependent_transform(parent_component));
                let onward = self.walk(parent, attach, false)?;
                let loops_back = onward
                    .iter()
                    .any(|tid| self.transforms.get(*tid).is_some_and(|t| t.owner() == id));
                if loops_back {
                    return Err(Error::CyclicDependsOn(name));
                }
            }
            None if dependent_transform.is_some() => {
                warn!("Ignoring dependent transform of \"{name}\" without a transform parent");
            }
            None => (),
        }

        if let Some(old) = old_attachment {
            self.unlink(old, Dependent::Attachment(id));
        }

        let entry = self.component_entry(id)?;
        entry.transform_parent = parent;
        entry.dependent_transform = None;

        if let (Some(_), Some(tid)) = (parent, dependent_transform) {
            self.component_entry(id)?.dependent_transform = Some(tid);
            self.transform_entry(tid)?
                .dependents
                .push(Dependent::Attachment(id));
        }

        Ok(())
    }

    /// Check that every edge is mirrored by a dependent and that every chain
    /// resolves
    pub fn validate(&self) -> Result<()> {
        let inconsistent = |message: String| Err(Error::InconsistentDependents(message));

        for (tid, t) in &self.transforms {
            let owner = self.component(t.owner())?;
            if !owner.transforms.contains(&tid) {
                return inconsistent(f!("\"{}\" is missing from \"{}\"", t.name(), owner.name));
            }

            for dependent in &t.dependents {
                if self.edge_of(*dependent)? != Some(tid) {
                    return inconsistent(f!(
                        "{dependent:?} is listed on \"{}\" but does not depend on it",
                        t.name()
                    ));
                }
            }

            if let Some(target) = t.depends_on {
                if !self.transform(target)?.dependents.contains(&Dependent::Transform(tid)) {
                    return inconsistent(f!("\"{}\" is not registered on its target", t.name()));
                }
            }
        }

        for (cid, c) in self.components() {
            if let Some(target) = c.depends_on {
                if !self.transform(target)?.dependents.contains(&Dependent::Component(cid)) {
                    return inconsistent(f!("\"{}\" is not registered on its target", c.name));
                }
            }

            if let Some(target) = c.dependent_transform {
                let t = self.transform(target)?;
                if Some(t.owner()) != c.transform_parent {
                    return inconsistent(f!(
                        "\"{}\" attaches to \"{}\" outside its transform parent",
                        c.name,
                        t.name()
                    ));
                }
                if !t.dependents.contains(&Dependent::Attachment(cid)) {
                    return inconsistent(f!("\"{}\" is not registered on its attachment", c.name));
                }
            }

            self.resolve_chain(cid, false)?;
        }

        Ok(())
    }
}

// Internal helpers
impl Instrument {
    fn component_entry(&mut self, id: ComponentId) -> Result<&mut Component> {
        self.components.get_mut(id).ok_or(Error::ComponentNotFound(id))
    }

    fn transform_entry(&mut self, id: TransformId) -> Result<&mut Transformation> {
        self.transforms.get_mut(id).ok_or(Error::TransformNotFound(id))
    }

    fn check_component_name(&self, name: &str, except: Option<ComponentId>) -> Result<()> {
        if name.is_empty() {
            return Err(Error::EmptyName);
        }

        match self.component_by_name(name) {
            Some(existing) if Some(existing) != except => {
                Err(Error::DuplicateComponentName(name.to_string()))
            }
            _ => Ok(()),
        }
    }

    /// Current target of the edge a dependent stands for
    fn edge_of(&self, dependent: Dependent) -> Result<Option<TransformId>> {
        match dependent {
            Dependent::Transform(id) => Ok(self.transform(id)?.depends_on),
            Dependent::Component(id) => Ok(self.component(id)?.depends_on),
            Dependent::Attachment(id) => Ok(self.component(id)?.dependent_transform),
        }
    }

    fn set_edge(&mut self, dependent: Dependent, target: Option<TransformId>) -> Result<()> {
        match dependent {
            Dependent::Transform(id) => self.transform_entry(id)?.depends_on = target,
            Dependent::Component(id) => self.component_entry(id)?.depends_on = target,
            Dependent::Attachment(id) => self.component_entry(id)?.dependent_transform = target,
        }
        Ok(())
    }

    /// Remove a dependent from a target's list, ignoring stale handles
    fn unlink(&mut self, target: TransformId, dependent: Dependent) {
        if let Some(t) = self.transforms.get_mut(target) {
            t.dependents.retain(|d| *d != dependent);
        }
    }

    /// Move the edge of `dependent` from `from` to `to`, putting it back if
    /// the move makes a chain loop
    fn relink(
        &mut self,
        dependent: Dependent,
        from: Option<TransformId>,
        to: Option<TransformId>,
    ) -> Result<()> {
        let position = from.and_then(|old| {
            self.transforms
                .get(old)?
                .dependents
                .iter()
                .position(|d| *d == dependent)
        });

        if let Some(old) = from {
            self.unlink(old, dependent);
        }
        self.set_edge(dependent, to)?;
        if let Some(new) = to {
            self.transform_entry(new)?.dependents.push(dependent);
        }

        if let Err(error) = self.check_chains() {
            if let Some(new) = to {
                self.unlink(new, dependent);
            }
            self.set_edge(dependent, from)?;
            if let (Some(old), Some(i)) = (from, position) {
                self.transform_entry(old)?.dependents.insert(i, dependent);
            }
            return Err(error);
        }

        Ok(())
    }

    /// Walk the chain from every transformation
    ///
    /// Without transform parents a loop can only come from a new
    /// `depends_on`, which [check_new_edge()](Self::check_new_edge) already
    /// rejects, so the walk is skipped.
    fn check_chains(&self) -> Result<()> {
        if self.components.values().all(|c| c.transform_parent.is_none()) {
            return Ok(());
        }

        for (tid, t) in &self.transforms {
            self.walk(t.owner(), Some(tid), false)?;
        }
        Ok(())
    }

    fn check_new_edge(&self, transform: TransformId, dependent: Dependent) -> Result<()> {
        let target = self.transform(transform)?;

        match dependent {
            Dependent::Transform(id) => {
                // the new edge closes a loop if the target's chain already
                // passes through the dependent
                if self.walk(target.owner(), Some(transform), false)?.contains(&id) {
                    return Err(Error::CyclicDependsOn(self.transform(id)?.name().to_string()));
                }
            }
            Dependent::Component(_) => (),
            Dependent::Attachment(id) => {
                let component = self.component(id)?;
                if component.transform_parent != Some(target.owner()) {
                    return Err(Error::DependentTransformNotFound {
                        transform: target.name().to_string(),
                        parent: component
                            .transform_parent
                            .and_then(|p| self.components.get(p))
                            .map_or("none".to_string(), |p| p.name.clone()),
                    });
                }
            }
        }

        Ok(())
    }

    /// True if following transform parents up from `start` reaches `target`
    fn parent_chain_reaches(&self, start: ComponentId, target: ComponentId) -> Result<bool> {
        let mut visited = HashSet::new();
        let mut current = Some(start);

        while let Some(id) = current {
            if id == target {
                return Ok(true);
            }
            if !visited.insert(id) {
                return Err(Error::CyclicTransformParent(self.component(id)?.name.clone()));
            }
            current = self.component(id)?.transform_parent.filter(|p| *p != id);
        }

        Ok(false)
    }

    fn is_internal_dependent(&self, dependent: Dependent, component: ComponentId) -> bool {
        match dependent {
            Dependent::Transform(id) => self
                .transforms
                .get(id)
                .is_some_and(|t| t.owner() == component),
            Dependent::Component(id) => id == component,
            Dependent::Attachment(_) => false,
        }
    }
}
