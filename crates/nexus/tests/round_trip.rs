//! Whole instruments survive encoding to a tree and to JSON text

use nalgebra::{Point3, Vector3};
use nxtools_geometry::{CylindricalGeometry, Geometry, OffGeometry};
use nxtools_model::{
    ComponentId, ComponentType, Dataset, Instrument, Node, PixelData, PixelGrid, PixelMapping,
    Value,
};
use nxtools_nexus::{
    decode, encode, from_json_str, read_json_file, to_json_string, write_json_file,
    DecodeOptions,
};
use rstest::{fixture, rstest};

/// sample, source, a grid detector on a rotated arm, a mapped detector and a
/// cylindrical monitor hanging off the source
#[fixture]
fn beamline() -> Instrument {
    let mut instrument = Instrument::new();

    let sample = instrument.add_component("sample", ComponentType::Sample).unwrap();
    instrument
        .add_translation(sample, Vector3::new(0.0, 0.0, 0.1), Some("height"), None)
        .unwrap();

    let source = instrument.add_component("source", ComponentType::Source).unwrap();
    instrument
        .add_translation(source, Vector3::new(0.0, 0.0, -10.0), Some("position"), None)
        .unwrap();
    instrument
        .component_mut(source)
        .unwrap()
        .set_description("moderator face");

    let arm = instrument.add_component("arm", ComponentType::Detector).unwrap();
    let distance = instrument
        .add_translation(arm, Vector3::new(0.0, 0.0, 2.0), Some("distance"), None)
        .unwrap();
    instrument
        .add_rotation(arm, Vector3::y(), 30.0, Some("two_theta"), Some(distance))
        .unwrap();
    let grid = PixelGrid::builder()
        .rows(3)
        .columns(4)
        .row_height(0.1)
        .col_width(0.2)
        .first_id(100)
        .build();
    instrument
        .set_shape(arm, Geometry::Off(OffGeometry::cube()), Some(grid.into()))
        .unwrap();

    let panel = instrument.add_component("panel", ComponentType::Detector).unwrap();
    instrument
        .add_translation(panel, Vector3::new(1.0, 0.0, 0.0), Some("offset"), None)
        .unwrap();
    let mapping = PixelMapping::new(vec![Some(1), None, Some(3), Some(4), None, Some(6)]);
    instrument
        .set_shape(panel, Geometry::Off(OffGeometry::cube()), Some(mapping.into()))
        .unwrap();
    instrument.set_transform_parent(panel, Some(arm), None).unwrap();

    let monitor = instrument.add_component("monitor", ComponentType::Monitor).unwrap();
    instrument
        .add_translation(monitor, Vector3::new(0.0, 0.5, 0.0), Some("lift"), None)
        .unwrap();
    let cylinder = CylindricalGeometry::new("cm", Vector3::new(0.0, 0.0, 1.0), 5.0, 2.0).unwrap();
    instrument
        .set_shape(monitor, Geometry::Cylindrical(cylinder), None)
        .unwrap();
    instrument.set_transform_parent(monitor, Some(source), None).unwrap();
    instrument
        .set_field(monitor, Dataset::new("efficiency", Value::from(0.25)))
        .unwrap();
    instrument
        .component_mut(monitor)
        .unwrap()
        .set_attribute("long_name", "upstream monitor");

    let pixel = instrument.add_component("tube", ComponentType::Detector).unwrap();
    let tube = CylindricalGeometry::new("m", Vector3::new(1.0, 0.0, 0.0), 1.0, 0.01).unwrap();
    instrument
        .set_shape(pixel, Geometry::Cylindrical(tube), Some(PixelData::SinglePixel(42)))
        .unwrap();

    instrument.validate().unwrap();
    instrument
}

fn id(instrument: &Instrument, name: &str) -> ComponentId {
    instrument
        .component_by_name(name)
        .unwrap_or_else(|| panic!("{name} is missing"))
}

fn position(instrument: &Instrument, name: &str) -> Point3<f64> {
    instrument
        .absolute_transform(id(instrument, name))
        .unwrap()
        .transform_point(&Point3::origin())
}

fn chain_names(instrument: &Instrument, name: &str) -> Vec<String> {
    instrument
        .resolve_chain(id(instrument, name), false)
        .unwrap()
        .into_iter()
        .map(|t| instrument.transform(t).unwrap().name().to_string())
        .collect()
}

/// Compare everything a reader of the file would care about
fn assert_equivalent(before: &Instrument, after: &Instrument) {
    assert_eq!(before.len(), after.len());

    for (_, expected) in before.components() {
        let name = expected.name();
        let actual = after.component(id(after, name)).unwrap();

        assert_eq!(actual.component_type(), expected.component_type(), "{name}");
        assert_eq!(actual.description(), expected.description(), "{name}");
        assert_eq!(actual.pixel_data(), expected.pixel_data(), "{name}");
        assert_eq!(chain_names(after, name), chain_names(before, name), "{name}");

        let p = position(after, name) - position(before, name);
        assert!(p.norm() < 1e-9, "{name} moved by {p}");

        match (expected.geometry(), actual.geometry()) {
            (Geometry::Cylindrical(a), Geometry::Cylindrical(b)) => {
                assert!(a.is_close(b), "{name}: {a} != {b}")
            }
            (a, b) => assert_eq!(a, b, "{name}"),
        }

        for field in expected.fields() {
            assert_eq!(actual.field(&field.name), Some(field), "{name}");
        }
        for (key, value) in expected.attributes().iter() {
            assert_eq!(actual.attribute(key), Some(value), "{name}.{key}");
        }

        for (&a, &b) in expected.transforms().iter().zip(actual.transforms()) {
            let a = before.transform(a).unwrap();
            let b = after.transform(b).unwrap();
            assert_eq!(a.name(), b.name());
            assert_eq!(a.kind(), b.kind());
            assert_eq!(a.units(), b.units());
            assert_eq!(a.values(), b.values());
            assert!((a.vector() - b.vector()).norm() < 1e-12);
        }
        assert_eq!(actual.transforms().len(), expected.transforms().len());
    }
}

#[rstest]
fn tree_round_trip(beamline: Instrument) {
    let tree = encode(&beamline).unwrap();
    let (decoded, warnings) = decode(&tree, &DecodeOptions::strict()).unwrap();

    assert!(warnings.is_empty(), "{warnings:?}");
    assert_equivalent(&beamline, &decoded);
}

#[rstest]
fn json_round_trip(beamline: Instrument) {
    let text = to_json_string(&beamline).unwrap();
    let (decoded, warnings) = from_json_str(&text, &DecodeOptions::strict()).unwrap();

    assert!(warnings.is_empty(), "{warnings:?}");
    assert_equivalent(&beamline, &decoded);
}

#[rstest]
fn file_round_trip(beamline: Instrument) {
    let path = std::env::temp_dir().join(format!("nxtools_round_trip_{}.json", std::process::id()));

    write_json_file(&beamline, &path).unwrap();
    let (decoded, warnings) = read_json_file(&path, &DecodeOptions::default()).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert!(warnings.is_empty(), "{warnings:?}");
    assert_equivalent(&beamline, &decoded);
}

#[rstest]
fn positions_follow_transform_parents(beamline: Instrument) {
    let (decoded, _) = decode(&encode(&beamline).unwrap(), &DecodeOptions::default()).unwrap();

    // the panel is offset from the rotated end of the arm
    let angle = 30_f64.to_radians();
    let expected = Point3::new(angle.cos(), 0.0, 2.0 - angle.sin());
    let p = position(&decoded, "panel");
    assert!((p - expected).norm() < 1e-9, "{p}");

    let p = position(&decoded, "monitor");
    assert!((p - Point3::new(0.0, 0.5, -10.0)).norm() < 1e-9, "{p}");
}
