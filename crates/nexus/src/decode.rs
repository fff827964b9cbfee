//! Rebuilding an instrument from a NeXus tree

// crate modules
use crate::error::{Error, Result};
use crate::layout::*;
use crate::options::DecodeOptions;
use crate::pixels::{decode_grid, decode_mapping, GridArrays};
use crate::shapes::ShapeReader;
use crate::tree::{NexusGroup, NexusTree};
use crate::warnings::{Context, Severity, Warnings};

// nxtools modules
use nxtools_geometry::chopper::{RADIUS, SLITS, SLIT_EDGES, SLIT_HEIGHT};
use nxtools_geometry::Geometry;
use nxtools_model::{
    default_dependent_transform, ComponentId, ComponentType, Dataset, Instrument, Node, PixelData,
    TransformId, TransformationType, Value, DEPENDS_ON, NX_CLASS, PIXEL_FIELDS, RESERVED_FIELDS,
    TRANSFORMATION_TYPE, UNITS, VECTOR,
};
use nxtools_units::{validate_angle_units, validate_length_units};
use nxtools_utils::f;

// external crates
use log::{debug, trace};

/// Rebuild an instrument from a tree laid out by [encode](crate::encode)
///
/// A missing `NXentry` or `NXinstrument` group is fatal. Anything wrong with
/// a single component is recorded in the returned [Warnings] and as much of
/// the component as possible is kept.
///
/// ```rust
/// # use nxtools_model::{ComponentType, Instrument};
/// # use nxtools_nexus::{decode, encode, DecodeOptions};
/// let mut instrument = Instrument::new();
/// instrument.add_component("sample", ComponentType::Sample).unwrap();
///
/// let tree = encode(&instrument).unwrap();
/// let (decoded, warnings) = decode(&tree, &DecodeOptions::default()).unwrap();
///
/// assert!(warnings.is_empty());
/// assert!(decoded.component_by_name("sample").is_some());
/// ```
pub fn decode(tree: &NexusTree, options: &DecodeOptions) -> Result<(Instrument, Warnings)> {
    decode_with(tree, options, Warnings::new())
}

/// [decode] continuing from warnings already found while parsing
pub(crate) fn decode_with(
    tree: &NexusTree,
    options: &DecodeOptions,
    warnings: Warnings,
) -> Result<(Instrument, Warnings)> {
    let root = tree.root();
    let entry = root
        .find_class(NX_ENTRY)
        .or_else(|| root.group(ENTRY))
        .ok_or_else(|| Error::NotAnInstrument(f!("no {NX_ENTRY} group found")))?;
    let instrument_group = entry
        .find_class(NX_INSTRUMENT)
        .or_else(|| entry.group(INSTRUMENT))
        .ok_or_else(|| {
            Error::NotAnInstrument(f!("no {NX_INSTRUMENT} group found in \"{}\"", entry.name))
        })?;

    let mut decoder = Decoder {
        options,
        warnings,
        instrument: Instrument::new(),
        links: Vec::new(),
    };

    // samples and anything else outside the instrument come first
    for group in entry.groups().filter(|g| g.name != instrument_group.name) {
        decoder.read_component(group, false);
    }
    for group in instrument_group.groups() {
        decoder.read_component(group, true);
    }

    decoder.link();
    decoder.instrument.validate()?;

    Ok((decoder.instrument, decoder.warnings))
}

/// A `depends_on` path waiting for every component to exist
#[derive(Debug)]
struct Link {
    component: ComponentId,
    /// `None` for the component's own `depends_on`
    transform: Option<TransformId>,
    path: String,
    class: String,
    name: String,
}

struct Decoder<'a> {
    options: &'a DecodeOptions,
    warnings: Warnings,
    instrument: Instrument,
    links: Vec<Link>,
}

impl Decoder<'_> {
    fn read_component(&mut self, group: &NexusGroup, in_instrument: bool) {
        let Some(nx_class) = group.nx_class() else {
            if in_instrument {
                self.warnings.push(
                    Severity::Error,
                    f!("Unable to determine NXclass of component {}.", group.name),
                );
            }
            return;
        };
        let Some(component_type) = ComponentType::from_nx_class(nx_class) else {
            debug!("Skipping {nx_class} group \"{}\"", group.name);
            return;
        };

        let context = Context::new(nx_class, &group.name);
        let id = match self.instrument.add_component(&group.name, component_type) {
            Ok(id) => id,
            Err(e) => {
                context.record(&mut self.warnings, Severity::Error, &f!("{e}."));
                return;
            }
        };
        debug!("Reading {component_type} \"{}\"", group.name);

        if let Ok(component) = self.instrument.component_mut(id) {
            for (key, value) in group.attributes.iter() {
                if key != NX_CLASS {
                    component.attributes_mut().set(key, value.clone());
                }
            }
            if let Some(description) = group.dataset(DESCRIPTION).and_then(|d| d.values.as_str()) {
                component.set_description(description);
            }
        }

        if let Some(transforms) = group
            .find_class(NX_TRANSFORMATIONS)
            .or_else(|| group.group(TRANSFORMS))
        {
            self.read_transforms(id, transforms, &group.name);
        }

        // the chain is rebuilt from the stored paths once every component exists
        let reset = self.instrument.set_component_depends_on(id, None);
        self.check(context, reset);
        let depends_on = group
            .dataset(DEPENDS_ON)
            .and_then(|d| d.values.as_str())
            .unwrap_or(".");
        self.links.push(Link {
            component: id,
            transform: None,
            path: depends_on.to_string(),
            class: nx_class.to_string(),
            name: group.name.clone(),
        });

        self.read_shape(id, component_type, group, context);
        self.read_fields(id, component_type, group, context);

        if component_type == ComponentType::DiskChopper {
            self.mesh_chopper(id, context);
        }

        for other in group.groups() {
            if ![TRANSFORMS, SHAPE, PIXEL_SHAPE].contains(&other.name.as_str())
                && other.nx_class() != Some(NX_TRANSFORMATIONS)
            {
                debug!("Ignoring group \"{}\" of \"{}\"", other.name, group.name);
            }
        }
    }

    fn read_transforms(&mut self, id: ComponentId, group: &NexusGroup, component: &str) {
        let context = Context::new(NX_TRANSFORMATIONS, component);

        for dataset in group.datasets() {
            let name = dataset.name.as_str();
            let kind = match dataset
                .attributes
                .get(TRANSFORMATION_TYPE)
                .map(TransformationType::try_from)
            {
                Some(Ok(kind)) => kind,
                Some(Err(_)) => {
                    let detail = f!("Unrecognised transformation_type for {name}.");
                    context.record(&mut self.warnings, Severity::Error, &detail);
                    continue;
                }
                None => {
                    let detail = f!("Unable to find transformation_type attribute for {name}.");
                    context.record(&mut self.warnings, Severity::Error, &detail);
                    continue;
                }
            };

            let vector = dataset
                .attributes
                .get(VECTOR)
                .and_then(Value::to_vectors)
                .and_then(|v| v.first().copied());
            let Some(vector) = vector else {
                let detail = f!("Unable to find a three component vector attribute for {name}.");
                context.record(&mut self.warnings, Severity::Error, &detail);
                continue;
            };

            let units = match dataset.units() {
                Some(units) => units.to_string(),
                None => {
                    let default = match kind {
                        TransformationType::Translation => "m",
                        TransformationType::Rotation => "degrees",
                    };
                    let detail = f!("Unable to find units attribute for {name}, assuming {default}.");
                    context.record(&mut self.warnings, Severity::Issue, &detail);
                    default.to_string()
                }
            };
            let recognised = match kind {
                TransformationType::Translation => validate_length_units(&units),
                TransformationType::Rotation => validate_angle_units(&units),
            };
            if recognised.is_err() {
                let detail = f!("Units of {name} are not recognised for a {}, found \"{units}\".", kind.name());
                context.record(&mut self.warnings, Severity::Issue, &detail);
            }

            let tid = match self.instrument.insert_transformation(
                id,
                name,
                kind,
                dataset.values.clone(),
                &units,
                vector,
            ) {
                Ok(tid) => tid,
                Err(e) => {
                    context.record(&mut self.warnings, Severity::Error, &f!("{e}."));
                    continue;
                }
            };
            trace!("Read {kind} \"{name}\" of \"{component}\"");

            if let Ok(t) = self.instrument.transform_mut(tid) {
                for (key, value) in dataset.attributes.iter() {
                    if ![TRANSFORMATION_TYPE, VECTOR, UNITS, DEPENDS_ON].contains(&key) {
                        t.attributes_mut().set(key, value.clone());
                    }
                }
            }

            if let Some(path) = dataset.attributes.get_str(DEPENDS_ON) {
                self.links.push(Link {
                    component: id,
                    transform: Some(tid),
                    path: path.to_string(),
                    class: NX_TRANSFORMATIONS.to_string(),
                    name: component.to_string(),
                });
            }
        }
    }

    fn read_shape(
        &mut self,
        id: ComponentId,
        component_type: ComponentType,
        group: &NexusGroup,
        context: Context,
    ) {
        let (shape_group, is_grid) = match (group.group(PIXEL_SHAPE), group.group(SHAPE)) {
            (Some(shape), _) => (shape, true),
            (None, Some(shape)) => (shape, false),
            (None, None) => return,
        };

        let reader = ShapeReader::new(shape_group, &group.name, self.options, &mut self.warnings);
        let Some(geometry) = reader.read() else {
            return;
        };

        let pixel_data = match component_type.supports_pixel_data() {
            true => self.read_pixel_data(group, shape_group, is_grid, &geometry, context),
            false => None,
        };

        let had_pixels = pixel_data.is_some();
        if let Err(e) = self.instrument.set_shape(id, geometry.clone(), pixel_data) {
            context.record(&mut self.warnings, Severity::Error, &f!("{e}."));
            if had_pixels {
                let result = self.instrument.set_shape(id, geometry, None);
                self.check(context, result);
            }
        }
    }

    fn read_pixel_data(
        &mut self,
        group: &NexusGroup,
        shape_group: &NexusGroup,
        is_grid: bool,
        geometry: &Geometry,
        context: Context,
    ) -> Option<PixelData> {
        if is_grid {
            return self.read_grid(group, context);
        }

        if let Some(faces) = shape_group
            .dataset(DETECTOR_FACES)
            .or_else(|| group.dataset(DETECTOR_FACES))
        {
            return self.read_mapping(faces, geometry, context);
        }

        group
            .dataset(DETECTOR_NUMBER)
            .filter(|d| d.values.is_scalar())
            .and_then(|d| d.values.as_i64())
            .map(PixelData::SinglePixel)
    }

    fn read_grid(&mut self, group: &NexusGroup, context: Context) -> Option<PixelData> {
        let x_offsets = self.float_rows(group, X_PIXEL_OFFSET, context)?;
        let y_offsets = self.float_rows(group, Y_PIXEL_OFFSET, context)?;
        let detector_ids = self.int_rows(group, DETECTOR_NUMBER, context)?;
        let z_offsets = match group.dataset(Z_PIXEL_OFFSET) {
            Some(_) => self.float_rows(group, Z_PIXEL_OFFSET, context)?,
            None => x_offsets.iter().map(|row| vec![0.0; row.len()]).collect(),
        };

        let arrays = GridArrays {
            x_offsets,
            y_offsets,
            z_offsets,
            detector_ids,
        };
        match decode_grid(&arrays) {
            Ok(grid) => Some(PixelData::Grid(grid)),
            Err(e) => {
                context.record(&mut self.warnings, Severity::Error, &f!("Invalid pixel grid: {e}."));
                None
            }
        }
    }

    fn read_mapping(
        &mut self,
        faces: &Dataset,
        geometry: &Geometry,
        context: Context,
    ) -> Option<PixelData> {
        let values = faces.values.to_i64_vec().filter(|v| v.len() % 2 == 0);
        let Some(values) = values else {
            let detail = f!("{DETECTOR_FACES} should hold pairs of integers, found {:?}.", faces.size());
            context.record(&mut self.warnings, Severity::Error, &detail);
            return None;
        };

        let pairs = values.chunks_exact(2).map(|p| [p[0], p[1]]).collect::<Vec<_>>();
        match decode_mapping(&pairs, geometry.face_count()) {
            Ok(mapping) => Some(PixelData::Mapping(mapping)),
            Err(e) => {
                context.record(&mut self.warnings, Severity::Error, &f!("Invalid pixel mapping: {e}."));
                None
            }
        }
    }

    /// Dataset needed for pixel data, recording its absence
    fn pixel_dataset<'g>(
        &mut self,
        group: &'g NexusGroup,
        name: &str,
        context: Context,
    ) -> Option<&'g Dataset> {
        let dataset = group.dataset(name);
        if dataset.is_none() {
            let detail = f!("Couldn't find {name} attribute.");
            context.record(&mut self.warnings, Severity::Error, &detail);
        }
        dataset
    }

    fn float_rows(&mut self, group: &NexusGroup, name: &str, context: Context) -> Option<Vec<Vec<f64>>> {
        let dataset = self.pixel_dataset(group, name, context)?;
        let rows = match dataset.size() {
            [_, _] => dataset.values.float_rows_vec(),
            [_] => dataset.values.to_f64_vec().map(|row| vec![row]),
            _ => None,
        };
        if rows.is_none() {
            self.shape_error(dataset, context);
        }
        rows
    }

    fn int_rows(&mut self, group: &NexusGroup, name: &str, context: Context) -> Option<Vec<Vec<i64>>> {
        let dataset = self.pixel_dataset(group, name, context)?;
        let rows = match dataset.size() {
            [_, _] => dataset.values.int_rows_vec(),
            [_] => dataset.values.to_i64_vec().map(|row| vec![row]),
            _ => None,
        };
        if rows.is_none() {
            self.shape_error(dataset, context);
        }
        rows
    }

    fn shape_error(&mut self, dataset: &Dataset, context: Context) {
        let detail = f!(
            "Incorrect array shape or type for {} dataset, found {:?} {}.",
            dataset.name,
            dataset.size(),
            dataset.dtype()
        );
        context.record(&mut self.warnings, Severity::Error, &detail);
    }

    fn read_fields(
        &mut self,
        id: ComponentId,
        component_type: ComponentType,
        group: &NexusGroup,
        context: Context,
    ) {
        for dataset in group.datasets() {
            let name = dataset.name.as_str();
            let is_pixel_field = PIXEL_FIELDS.contains(&name);
            if RESERVED_FIELDS.contains(&name)
                || (is_pixel_field && component_type.supports_pixel_data())
            {
                continue;
            }

            if let Err(e) = self.instrument.set_field(id, dataset.clone()) {
                context.record(&mut self.warnings, Severity::Issue, &f!("{e}."));
            }
        }
    }

    /// Mesh a disk chopper without a stored shape from its fields
    fn mesh_chopper(&mut self, id: ComponentId, context: Context) {
        let Ok(component) = self.instrument.component(id) else {
            return;
        };
        let has_fields = [SLITS, SLIT_EDGES, RADIUS, SLIT_HEIGHT]
            .iter()
            .any(|name| component.field(name).is_some());
        if !component.geometry().is_none() || !has_fields {
            return;
        }

        match self.instrument.generate_chopper_geometry(id) {
            Ok(mesh) => {
                debug!("Generated a chopper mesh of {} faces", mesh.face_count());
                let result = self.instrument.set_shape(id, Geometry::Off(mesh), None);
                self.check(context, result);
            }
            Err(e) => {
                let detail = f!("Unable to create chopper mesh: {e}.");
                context.record(&mut self.warnings, Severity::Issue, &detail);
            }
        }
    }

    /// Record a failed model operation as an error
    fn check(&mut self, context: Context, result: nxtools_model::Result<()>) {
        if let Err(e) = result {
            context.record(&mut self.warnings, Severity::Error, &f!("{e}."));
        }
    }

    /// Resolve every stored `depends_on` path into model edges
    fn link(&mut self) {
        for link in std::mem::take(&mut self.links) {
            if let Err(detail) = self.resolve(&link) {
                let context = Context::new(&link.class, &link.name);
                context.record(&mut self.warnings, Severity::Issue, &detail);
            }
        }
    }

    fn resolve(&mut self, link: &Link) -> core::result::Result<(), String> {
        let (component_name, transform_name) = extract_dependency_names(&link.path);
        let Some(transform_name) = transform_name else {
            // the origin, nothing to point at
            return Ok(());
        };

        let owner = match component_name {
            Some(ref name) => self.instrument.component_by_name(name),
            None => Some(link.component),
        };
        let target = owner.and_then(|c| self.instrument.transform_by_name(c, &transform_name));
        let (Some(owner), Some(target)) = (owner, target) else {
            return Err(f!("Unable to find transformation {} for depends_on.", link.path));
        };

        let fail = |e: nxtools_model::Error| f!("{e}.");

        if owner == link.component {
            return match link.transform {
                Some(tid) => self.instrument.set_depends_on(tid, Some(target)),
                None => self.instrument.set_component_depends_on(link.component, Some(target)),
            }
            .map_err(fail);
        }

        // the chain carries on in another component
        let component = self.instrument.component(link.component).map_err(fail)?;
        if let Some(existing) = component.transform_parent().filter(|p| *p != owner) {
            let existing = self.instrument.component(existing).map_err(fail)?;
            return Err(f!(
                "Chain continues in both {} and {}, keeping {}.",
                existing.name(),
                component_name.as_deref().unwrap_or_default(),
                existing.name()
            ));
        }

        let parent = self.instrument.component(owner).map_err(fail)?;
        let dependent = (default_dependent_transform(parent) != Some(target)).then_some(target);
        trace!("\"{}\" continues from \"{}\"", link.name, parent.name());
        self.instrument
            .set_transform_parent(link.component, Some(owner), dependent)
            .map_err(fail)
    }
}

#[cfg(test)]
mod decode_tests {
    use super::*;
    use crate::encode;
    use crate::tree::Storage;
    use nalgebra::Vector3;
    use nxtools_model::DType;

    fn tree() -> NexusTree {
        let mut tree = NexusTree::new();
        let entry = tree.create_group("/", ENTRY, Some(NX_ENTRY)).unwrap();
        tree.create_group(&entry, INSTRUMENT, Some(NX_INSTRUMENT))
            .unwrap();
        tree
    }

    #[test]
    fn missing_instrument_is_fatal() {
        let mut tree = NexusTree::new();
        tree.create_group("/", ENTRY, Some(NX_ENTRY)).unwrap();

        let result = decode(&tree, &DecodeOptions::default());
        assert!(matches!(result, Err(Error::NotAnInstrument(_))));
        assert!(matches!(
            decode(&NexusTree::new(), &DecodeOptions::default()),
            Err(Error::NotAnInstrument(_))
        ));
    }

    #[test]
    fn unclassed_and_unknown_groups() {
        let mut tree = tree();
        tree.create_group("/entry/instrument", "mystery", None).unwrap();
        tree.create_group("/entry/instrument", "logs", Some("NXlog"))
            .unwrap();

        let (instrument, warnings) = decode(&tree, &DecodeOptions::default()).unwrap();
        assert!(instrument.is_empty());
        assert_eq!(warnings.len(), 1);
        assert!(warnings.contains("Unable to determine NXclass of component mystery."));
    }

    #[test]
    fn missing_depends_on_target() {
        let mut tree = tree();
        let slit = tree
            .create_group("/entry/instrument", "slit", Some("NXslit"))
            .unwrap();
        tree.create_dataset(
            &slit,
            DEPENDS_ON,
            Value::from("/entry/instrument/nowhere/transforms/x"),
            DType::String,
        )
        .unwrap();

        let (instrument, warnings) = decode(&tree, &DecodeOptions::default()).unwrap();
        let slit = instrument.component_by_name("slit").unwrap();
        assert_eq!(instrument.component(slit).unwrap().depends_on(), None);
        assert!(warnings.contains("Unable to find transformation /entry/instrument/nowhere/transforms/x"));
    }

    #[test]
    fn transforms_without_a_type_are_dropped() {
        let mut tree = tree();
        let slit = tree
            .create_group("/entry/instrument", "slit", Some("NXslit"))
            .unwrap();
        let transforms = tree
            .create_group(&slit, TRANSFORMS, Some(NX_TRANSFORMATIONS))
            .unwrap();
        tree.create_dataset(&transforms, "x", Value::from(1.0), DType::Float64)
            .unwrap();

        let (instrument, warnings) = decode(&tree, &DecodeOptions::default()).unwrap();
        let slit = instrument.component_by_name("slit").unwrap();
        assert!(instrument.component(slit).unwrap().transforms().is_empty());
        assert!(warnings.contains(
            "Error encountered when constructing NXtransformations for component slit: Unable to find transformation_type attribute for x."
        ));
    }

    #[test]
    fn foreign_depends_on_becomes_a_transform_parent() {
        let mut instrument = Instrument::new();
        let source = instrument.add_component("source", ComponentType::Source).unwrap();
        let monitor = instrument.add_component("monitor", ComponentType::Monitor).unwrap();
        let lift = instrument.add_translation(source, Vector3::y(), None, None).unwrap();
        let turn = instrument
            .add_rotation(source, Vector3::z(), 90.0, None, Some(lift))
            .unwrap();
        instrument.set_component_depends_on(source, Some(turn)).unwrap();
        // attach to the first transformation rather than the default
        instrument.set_transform_parent(monitor, Some(source), Some(lift)).unwrap();

        let tree = encode(&instrument).unwrap();
        let (decoded, warnings) = decode(&tree, &DecodeOptions::default()).unwrap();
        assert!(warnings.is_empty(), "{warnings}");

        let source = decoded.component_by_name("source").unwrap();
        let monitor = decoded.component_by_name("monitor").unwrap();
        let lift = decoded.transform_by_name(source, "Translation_1").unwrap();
        let component = decoded.component(monitor).unwrap();

        assert_eq!(component.transform_parent(), Some(source));
        assert_eq!(component.dependent_transform(), Some(lift));
        assert_eq!(decoded.resolve_chain(monitor, false).unwrap(), vec![lift]);
    }

    #[test]
    fn chopper_mesh_is_generated() {
        let mut tree = tree();
        let chopper = tree
            .create_group("/entry/instrument", "chopper", Some("NXdisk_chopper"))
            .unwrap();
        tree.create_dataset(&chopper, SLITS, Value::from(2_i64), DType::Int32)
            .unwrap();
        tree.create_dataset(
            &chopper,
            SLIT_EDGES,
            Value::from(vec![10.0, 50.0, 190.0, 230.0]),
            DType::Float64,
        )
        .unwrap();
        tree.create_dataset(&chopper, RADIUS, Value::from(0.35), DType::Float64)
            .unwrap();
        tree.create_dataset(&chopper, SLIT_HEIGHT, Value::from(0.05), DType::Float64)
            .unwrap();

        let (instrument, warnings) = decode(&tree, &DecodeOptions::default()).unwrap();
        let chopper = instrument.component_by_name("chopper").unwrap();
        assert!(matches!(
            instrument.component(chopper).unwrap().geometry(),
            Geometry::Off(_)
        ));
        assert!(!warnings.contains("chopper mesh"));
    }

    #[test]
    fn incomplete_chopper_is_an_issue() {
        let mut tree = tree();
        let chopper = tree
            .create_group("/entry/instrument", "chopper", Some("NXdisk_chopper"))
            .unwrap();
        tree.create_dataset(&chopper, SLITS, Value::from(2_i64), DType::Int32)
            .unwrap();

        let (instrument, warnings) = decode(&tree, &DecodeOptions::default()).unwrap();
        let chopper = instrument.component_by_name("chopper").unwrap();
        assert!(instrument.component(chopper).unwrap().geometry().is_none());
        assert!(warnings.contains("Unable to create chopper mesh"));
        assert_eq!(warnings.error_count(), 0);
    }
}
