//! How problems in a JSON layout are reported and what is kept

use nalgebra::Point3;
use nxtools_geometry::Geometry;
use nxtools_model::{DType, Instrument};
use nxtools_nexus::{from_json_str, DecodeOptions, Severity, Warnings};
use rstest::rstest;
use serde_json::{json, Value as JsonValue};

const DEPENDS_ON: &str = "/entry/instrument/panel/transforms/distance";

fn group(name: &str, nx_class: &str, children: Vec<JsonValue>) -> JsonValue {
    json!({
        "type": "group",
        "name": name,
        "attributes": [{ "name": "NX_class", "values": nx_class }],
        "children": children
    })
}

fn vertices() -> JsonValue {
    json!({
        "type": "dataset",
        "name": "vertices",
        "dataset": { "type": "double", "size": [4, 3] },
        "attributes": [{ "name": "units", "values": "m" }],
        "values": [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]]
    })
}

fn winding_order() -> JsonValue {
    json!({
        "type": "dataset",
        "name": "winding_order",
        "dataset": { "type": "int32", "size": [6] },
        "values": [0, 1, 2, 0, 2, 3]
    })
}

fn faces() -> JsonValue {
    json!({
        "type": "dataset",
        "name": "faces",
        "dataset": { "type": "int32", "size": [2] },
        "values": [0, 3]
    })
}

fn distance() -> JsonValue {
    json!({
        "type": "dataset",
        "name": "distance",
        "dataset": { "type": "double", "size": 1 },
        "values": 2.0,
        "attributes": [
            { "name": "transformation_type", "values": "translation" },
            { "name": "vector", "values": [0.0, 0.0, 1.0] },
            { "name": "units", "values": "m" },
            { "name": "depends_on", "values": "." }
        ]
    })
}

/// A detector with a two face mesh, 2 m along z
fn document(shape: Vec<JsonValue>, transform: JsonValue, extra: Vec<JsonValue>) -> String {
    let depends_on = json!({
        "type": "dataset",
        "name": "depends_on",
        "dataset": { "type": "string", "size": 1 },
        "values": DEPENDS_ON
    });

    let mut children = vec![
        group("shape", "NXoff_geometry", shape),
        group("transforms", "NXtransformations", vec![transform]),
        depends_on,
    ];
    children.extend(extra);

    let panel = group("panel", "NXdetector", children);
    let instrument = group("instrument", "NXinstrument", vec![panel]);
    let entry = group("entry", "NXentry", vec![instrument]);

    json!({ "nexus_structure": { "children": [entry] } }).to_string()
}

fn read(text: &str, options: &DecodeOptions) -> (Instrument, Warnings) {
    from_json_str(text, options).unwrap()
}

fn panel_position(instrument: &Instrument) -> Point3<f64> {
    let panel = instrument.component_by_name("panel").unwrap();
    instrument
        .absolute_transform(panel)
        .unwrap()
        .transform_point(&Point3::origin())
}

fn panel_geometry(instrument: &Instrument) -> &Geometry {
    let panel = instrument.component_by_name("panel").unwrap();
    instrument.component(panel).unwrap().geometry()
}

#[rstest]
fn clean_document(
    #[values(DecodeOptions::default(), DecodeOptions::strict(), DecodeOptions::lenient())]
    options: DecodeOptions,
) {
    let text = document(vec![vertices(), winding_order(), faces()], distance(), vec![]);
    let (instrument, warnings) = read(&text, &options);

    assert!(warnings.is_empty(), "{warnings}");
    assert_eq!(panel_geometry(&instrument).face_count(), 2);
    assert!((panel_position(&instrument) - Point3::new(0.0, 0.0, 2.0)).norm() < 1e-12);
}

#[test]
fn missing_faces_drop_the_shape() {
    let text = document(vec![vertices(), winding_order()], distance(), vec![]);
    let (instrument, warnings) = read(&text, &DecodeOptions::default());

    assert!(panel_geometry(&instrument).is_none());
    assert_eq!(warnings.len(), 1);
    assert!(warnings.contains(
        "Error encountered when constructing NXoff_geometry for component panel: Couldn't find faces attribute."
    ));

    // the rest of the component is still there
    assert!((panel_position(&instrument) - Point3::new(0.0, 0.0, 2.0)).norm() < 1e-12);
}

#[rstest]
#[case::kept(Severity::Issue, 2, 0)]
#[case::dropped(Severity::Error, 0, 2)]
fn vertex_size_mismatch(
    #[case] severity: Severity,
    #[case] face_count: usize,
    #[case] error_count: usize,
) {
    let mut bad = vertices();
    bad["dataset"]["size"] = json!([3, 3]);
    let text = document(vec![bad, winding_order(), faces()], distance(), vec![]);

    let options = DecodeOptions::builder().size_mismatch(severity).build();
    let (instrument, warnings) = read(&text, &options);

    assert_eq!(panel_geometry(&instrument).face_count(), face_count);
    assert_eq!(warnings.error_count(), error_count);
    assert!(warnings.contains(
        "constructing NXoff_geometry for component panel: Mismatch between length of vertices list [4, 3] and size attribute from dataset [3, 3]."
    ));
}

#[test]
fn missing_dtype_on_a_transformation() {
    let mut untyped = distance();
    untyped["dataset"] = json!({ "size": 1 });
    let text = document(vec![vertices(), winding_order(), faces()], untyped, vec![]);

    // kept with the dtype the values imply
    let (instrument, warnings) = read(&text, &DecodeOptions::default());
    assert_eq!(warnings.len(), 1);
    assert!(warnings.contains("Unable to find type attribute for distance."));
    assert!((panel_position(&instrument) - Point3::new(0.0, 0.0, 2.0)).norm() < 1e-12);

    // dropped, which leaves the depends_on dangling
    let (instrument, warnings) = read(&text, &DecodeOptions::strict());
    assert_eq!(warnings.len(), 2);
    assert_eq!(warnings.error_count(), 1);
    assert!(warnings.contains(&format!("Unable to find transformation {DEPENDS_ON} for depends_on.")));
    assert_eq!(panel_position(&instrument), Point3::origin());
}

#[test]
fn missing_transformation_units_default_to_metres() {
    let mut unitless = distance();
    unitless["attributes"] = json!([
        { "name": "transformation_type", "values": "translation" },
        { "name": "vector", "values": [0.0, 0.0, 1.0] },
        { "name": "depends_on", "values": "." }
    ]);
    let text = document(vec![vertices(), winding_order(), faces()], unitless, vec![]);

    let (instrument, warnings) = read(&text, &DecodeOptions::default());
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings.error_count(), 0);
    assert!(warnings.contains("Unable to find units attribute for distance, assuming m."));
    assert!((panel_position(&instrument) - Point3::new(0.0, 0.0, 2.0)).norm() < 1e-12);
}

#[test]
fn mixed_field_values() {
    let gain = json!({
        "type": "dataset",
        "name": "gain",
        "dataset": { "type": "double", "size": [2] },
        "values": [1.5, "high"]
    });
    let text = document(vec![vertices(), winding_order(), faces()], distance(), vec![gain]);

    // dropped by default
    let (instrument, warnings) = read(&text, &DecodeOptions::default());
    let panel = instrument.component_by_name("panel").unwrap();
    assert_eq!(instrument.field(panel, "gain").unwrap(), None);
    assert_eq!(warnings.error_count(), 1);
    assert!(warnings.contains("Values in gain do not all have the same type."));

    // kept as text when lenient, with the declared dtype reported as wrong
    let (instrument, warnings) = read(&text, &DecodeOptions::lenient());
    let panel = instrument.component_by_name("panel").unwrap();
    let gain = instrument.field(panel, "gain").unwrap().unwrap();
    assert_eq!(gain.dtype(), DType::String);
    assert_eq!(warnings.len(), 2);
    assert_eq!(warnings.error_count(), 0);
}

#[test]
fn unreadable_documents_are_errors() {
    assert!(from_json_str("not json", &DecodeOptions::default()).is_err());
    assert!(from_json_str("{}", &DecodeOptions::default()).is_err());

    let no_instrument = json!({ "nexus_structure": { "children": [group("entry", "NXentry", vec![])] } });
    assert!(from_json_str(&no_instrument.to_string(), &DecodeOptions::default()).is_err());
}
