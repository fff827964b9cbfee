//! Writing an instrument into NeXus storage

// crate modules
use crate::error::Result;
use crate::layout::*;
use crate::pixels::{encode_grid, encode_mapping};
use crate::tree::{NexusTree, Storage};

// nxtools modules
use nxtools_geometry::Geometry;
use nxtools_model::{
    Component, ComponentId, DType, Instrument, Node, PixelData, TransformId, Value, DEPENDS_ON,
    NX_CLASS, TRANSFORMATION_TYPE, UNITS, VECTOR,
};
use nxtools_utils::OptionExt;

// external crates
use log::{debug, trace};

/// Attributes of a transformation that are always written from the model
const TRANSFORM_ATTRIBUTES: [&str; 4] = [TRANSFORMATION_TYPE, VECTOR, UNITS, DEPENDS_ON];

/// Encode an instrument into a new in-memory tree
///
/// ```rust
/// # use nxtools_model::{ComponentType, Instrument};
/// # use nxtools_nexus::encode;
/// # use nalgebra::Vector3;
/// let mut instrument = Instrument::new();
/// let slit = instrument.add_component("slit", ComponentType::Slit).unwrap();
/// instrument.add_translation(slit, Vector3::new(0.0, 0.0, 2.0), None, None).unwrap();
///
/// let tree = encode(&instrument).unwrap();
/// assert!(tree.group("/entry/instrument/slit/transforms").is_some());
/// ```
pub fn encode(instrument: &Instrument) -> Result<NexusTree> {
    let mut tree = NexusTree::new();
    encode_into(instrument, &mut tree)?;
    Ok(tree)
}

/// Write an instrument into any [Storage]
///
/// Creates `/entry` and `/entry/instrument`, then one group per component
/// holding its description, transformations, `depends_on`, extra fields,
/// shape and pixel data.
pub fn encode_into<S: Storage>(instrument: &Instrument, storage: &mut S) -> Result<()> {
    let entry = storage.create_group("/", ENTRY, Some(NX_ENTRY))?;
    let instrument_path = storage.create_group(&entry, INSTRUMENT, Some(NX_INSTRUMENT))?;

    for (id, component) in instrument.components() {
        let parent = match component.component_type().is_sample() {
            true => &entry,
            false => &instrument_path,
        };
        debug!("Writing {} \"{}\"", component.component_type(), component.name());

        let path = storage.create_group(parent, component.name(), Some(&component.nx_class()))?;
        for (key, value) in component.attributes().iter() {
            if key != NX_CLASS {
                storage.set_attribute(&path, key, value.clone())?;
            }
        }

        if !component.description().is_empty() {
            storage.create_dataset(
                &path,
                DESCRIPTION,
                Value::from(component.description()),
                DType::String,
            )?;
        }

        write_transforms(instrument, id, &path, storage)?;
        write_fields(component, &path, storage)?;
        write_shape(component, &path, storage)?;
        write_pixel_data(component, &path, storage)?;
    }

    Ok(())
}

/// Path a transformation is written to
fn path_of(instrument: &Instrument, id: TransformId) -> Result<String> {
    let t = instrument.transform(id)?;
    let owner = instrument.component(t.owner())?;
    Ok(transform_path(owner, t.name()))
}

fn write_transforms<S: Storage>(
    instrument: &Instrument,
    id: ComponentId,
    path: &str,
    storage: &mut S,
) -> Result<()> {
    let component = instrument.component(id)?;

    // where the local chain joins the rest of the instrument
    let origin = instrument
        .ancestral_dependent_transform(id)?
        .map(|ancestor| path_of(instrument, ancestor))
        .transpose()?
        .display_or(".");

    if !component.transforms().is_empty() {
        let group = storage.create_group(path, TRANSFORMS, Some(NX_TRANSFORMATIONS))?;
        let local = instrument.resolve_chain(id, true)?;

        for tid in component.transforms() {
            let t = instrument.transform(*tid)?;
            let depends_on = match t.depends_on() {
                Some(target) => path_of(instrument, target)?,
                None if local.last() == Some(tid) => origin.clone(),
                None => ".".to_string(),
            };
            trace!("\"{}\" depends on {depends_on}", t.name());

            let values = t.values().clone();
            let dtype = values.dtype();
            let dataset = storage.create_dataset(&group, t.name(), values, dtype)?;
            for (key, value) in t.attributes().iter() {
                if !TRANSFORM_ATTRIBUTES.contains(&key) {
                    storage.set_attribute(&dataset, key, value.clone())?;
                }
            }
            storage.set_attribute(&dataset, TRANSFORMATION_TYPE, Value::from(t.kind()))?;
            storage.set_attribute(&dataset, VECTOR, Value::from(t.vector()))?;
            storage.set_attribute(&dataset, UNITS, Value::from(t.units()))?;
            storage.set_attribute(&dataset, DEPENDS_ON, Value::from(depends_on))?;
        }
    }

    let depends_on = match component.depends_on() {
        Some(target) => path_of(instrument, target)?,
        None => origin,
    };
    storage.create_dataset(path, DEPENDS_ON, Value::from(depends_on), DType::String)?;

    Ok(())
}

fn write_fields<S: Storage>(component: &Component, path: &str, storage: &mut S) -> Result<()> {
    for field in component.fields() {
        let dataset = storage.create_dataset(path, &field.name, field.values.clone(), field.dtype())?;
        for (key, value) in field.attributes.iter() {
            storage.set_attribute(&dataset, key, value.clone())?;
        }
    }
    Ok(())
}

fn write_shape<S: Storage>(component: &Component, path: &str, storage: &mut S) -> Result<()> {
    let Some(nx_class) = component.geometry().nx_class() else {
        return Ok(());
    };
    let name = match component.pixel_data() {
        Some(PixelData::Grid(_)) => PIXEL_SHAPE,
        _ => SHAPE,
    };
    let group = storage.create_group(path, name, Some(nx_class))?;

    match component.geometry() {
        Geometry::NoShape => (),
        Geometry::Off(off) => {
            let points = Value::from_vectors(&off.vertices);
            let vertices = storage.create_dataset(&group, VERTICES, points, DType::Float64)?;
            storage.set_attribute(&vertices, UNITS, Value::from(off.units.as_str()))?;

            storage.create_dataset(&group, WINDING_ORDER, indices(off.winding_order()), DType::Int32)?;
            storage.create_dataset(&group, FACES, indices(off.winding_order_indices()), DType::Int32)?;

            if let Some(PixelData::Mapping(mapping)) = component.pixel_data() {
                let pairs = encode_mapping(mapping);
                let flat = pairs.iter().flatten().copied().collect::<Vec<_>>();
                let faces = Value::int_array(flat, vec![pairs.len(), 2])?;
                storage.create_dataset(&group, DETECTOR_FACES, faces, DType::Int32)?;
            }
        }
        Geometry::Cylindrical(cylinder) => {
            let points = Value::from_vectors(&cylinder.calculate_vertices());
            let vertices = storage.create_dataset(&group, VERTICES, points, DType::Float64)?;
            storage.set_attribute(&vertices, UNITS, Value::from(cylinder.units()))?;

            let cylinders = Value::int_array(vec![0, 1, 2], vec![1, 3])?;
            storage.create_dataset(&group, CYLINDERS, cylinders, DType::Int32)?;
        }
    }

    Ok(())
}

fn write_pixel_data<S: Storage>(component: &Component, path: &str, storage: &mut S) -> Result<()> {
    match component.pixel_data() {
        None => (),
        Some(PixelData::SinglePixel(id)) => {
            storage.create_dataset(path, DETECTOR_NUMBER, Value::from(*id), DType::Int64)?;
        }
        Some(PixelData::Grid(grid)) => {
            let arrays = encode_grid(grid);
            for (name, offsets) in [
                (X_PIXEL_OFFSET, &arrays.x_offsets),
                (Y_PIXEL_OFFSET, &arrays.y_offsets),
                (Z_PIXEL_OFFSET, &arrays.z_offsets),
            ] {
                let value = Value::float_rows(DType::Float64, offsets)?;
                storage.create_dataset(path, name, value, DType::Float64)?;
            }
            let ids = Value::int_rows(DType::Int64, &arrays.detector_ids)?;
            storage.create_dataset(path, DETECTOR_NUMBER, ids, DType::Int64)?;
        }
        Some(PixelData::Mapping(mapping)) => {
            // the faces themselves live with the shape
            let ids = mapping.pixel_ids.iter().flatten().copied().collect::<Vec<_>>();
            storage.create_dataset(path, DETECTOR_NUMBER, Value::from(ids), DType::Int64)?;
        }
    }
    Ok(())
}

fn indices(values: Vec<usize>) -> Value {
    Value::from(values.into_iter().map(|i| i as i64).collect::<Vec<_>>())
}

#[cfg(test)]
mod encode_tests {
    use super::*;
    use nalgebra::Vector3;
    use nxtools_geometry::OffGeometry;
    use nxtools_model::{ComponentType, PixelGrid, PixelMapping};

    fn attribute(tree: &NexusTree, path: &str, key: &str) -> String {
        tree.attribute(path, key)
            .unwrap()
            .unwrap()
            .as_str()
            .unwrap()
            .to_string()
    }

    fn dataset_str(tree: &NexusTree, path: &str) -> String {
        tree.node(path)
            .and_then(|n| n.as_dataset())
            .and_then(|d| d.values.as_str())
            .unwrap()
            .to_string()
    }

    #[test]
    fn empty_instrument() {
        let tree = encode(&Instrument::new()).unwrap();
        assert_eq!(tree.group("/entry").unwrap().nx_class(), Some(NX_ENTRY));
        assert_eq!(
            tree.group("/entry/instrument").unwrap().nx_class(),
            Some(NX_INSTRUMENT)
        );
    }

    #[test]
    fn depends_on_paths() {
        let mut instrument = Instrument::new();
        let source = instrument.add_component("source", ComponentType::Source).unwrap();
        let sample = instrument.add_component("sample", ComponentType::Sample).unwrap();

        let lift = instrument.add_translation(source, Vector3::y(), None, None).unwrap();
        instrument.set_component_depends_on(source, Some(lift)).unwrap();
        instrument.set_transform_parent(sample, Some(source), None).unwrap();
        let omega = instrument
            .add_rotation(sample, Vector3::y(), 30.0, Some("omega"), None)
            .unwrap();
        instrument.set_component_depends_on(sample, Some(omega)).unwrap();

        let tree = encode(&instrument).unwrap();

        assert_eq!(
            dataset_str(&tree, "/entry/sample/depends_on"),
            "/entry/sample/transforms/omega"
        );
        // the end of the local chain continues in the parent
        assert_eq!(
            attribute(&tree, "/entry/sample/transforms/omega", DEPENDS_ON),
            "/entry/instrument/source/transforms/Translation_1"
        );
        assert_eq!(
            attribute(&tree, "/entry/instrument/source/transforms/Translation_1", DEPENDS_ON),
            "."
        );
        assert_eq!(
            attribute(&tree, "/entry/sample/transforms/omega", TRANSFORMATION_TYPE),
            "rotation"
        );
    }

    #[test]
    fn component_without_transforms_points_at_its_parent() {
        let mut instrument = Instrument::new();
        let source = instrument.add_component("source", ComponentType::Source).unwrap();
        let monitor = instrument.add_component("monitor", ComponentType::Monitor).unwrap();
        instrument.add_translation(source, Vector3::z(), None, None).unwrap();
        instrument.set_transform_parent(monitor, Some(source), None).unwrap();

        let tree = encode(&instrument).unwrap();
        assert_eq!(
            dataset_str(&tree, "/entry/instrument/monitor/depends_on"),
            "/entry/instrument/source/transforms/Translation_1"
        );
        assert!(tree.group("/entry/instrument/monitor/transforms").is_none());
    }

    #[test]
    fn grid_detector() {
        let mut instrument = Instrument::new();
        let detector = instrument.add_component("detector", ComponentType::Detector).unwrap();
        let grid = PixelGrid::builder().rows(2).columns(3).first_id(10).build();
        instrument
            .set_shape(detector, Geometry::Off(OffGeometry::cube()), Some(grid.into()))
            .unwrap();

        let tree = encode(&instrument).unwrap();
        let group = tree.group("/entry/instrument/detector").unwrap();

        assert!(group.group(SHAPE).is_none());
        assert_eq!(group.group(PIXEL_SHAPE).unwrap().nx_class(), Some("NXoff_geometry"));
        assert_eq!(group.dataset(X_PIXEL_OFFSET).unwrap().size(), &[2, 3]);
        assert_eq!(group.dataset(DETECTOR_NUMBER).unwrap().dtype(), DType::Int64);
    }

    #[test]
    fn mapped_detector() {
        let mut instrument = Instrument::new();
        let detector = instrument.add_component("detector", ComponentType::Detector).unwrap();
        let mapping = PixelMapping::new(vec![Some(5), None, None, Some(7), None, None]);
        instrument
            .set_shape(detector, Geometry::Off(OffGeometry::cube()), Some(mapping.into()))
            .unwrap();

        let tree = encode(&instrument).unwrap();
        let shape = tree.group("/entry/instrument/detector/shape").unwrap();

        let faces = shape.dataset(DETECTOR_FACES).unwrap();
        assert_eq!(faces.size(), &[2, 2]);
        assert_eq!(faces.values.to_i64_vec().unwrap(), vec![0, 5, 3, 7]);
        assert_eq!(shape.dataset(FACES).unwrap().size(), &[6]);
        assert_eq!(shape.dataset(VERTICES).unwrap().units(), Some("m"));
    }
}
