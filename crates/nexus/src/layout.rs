//! Names and paths of the groups an instrument is laid out in

// nxtools modules
use nxtools_model::{Component, Node};
use nxtools_utils::f;

/// Name of the entry group
pub const ENTRY: &str = "entry";

/// Name of the instrument group inside the entry
pub const INSTRUMENT: &str = "instrument";

/// Group holding the transformations of a component
pub const TRANSFORMS: &str = "transforms";

/// Shape group of a component
pub const SHAPE: &str = "shape";

/// Shape group of a single pixel, repeated over a grid
pub const PIXEL_SHAPE: &str = "pixel_shape";

/// Free text description of a component
pub const DESCRIPTION: &str = "description";

pub const NX_ENTRY: &str = "NXentry";
pub const NX_INSTRUMENT: &str = "NXinstrument";
pub const NX_TRANSFORMATIONS: &str = "NXtransformations";

// shape datasets
pub(crate) const VERTICES: &str = "vertices";
pub(crate) const FACES: &str = "faces";
pub(crate) const WINDING_ORDER: &str = "winding_order";
pub(crate) const CYLINDERS: &str = "cylinders";

// pixel datasets
pub(crate) const X_PIXEL_OFFSET: &str = "x_pixel_offset";
pub(crate) const Y_PIXEL_OFFSET: &str = "y_pixel_offset";
pub(crate) const Z_PIXEL_OFFSET: &str = "z_pixel_offset";
pub(crate) const DETECTOR_NUMBER: &str = "detector_number";
pub(crate) const DETECTOR_FACES: &str = "detector_faces";

/// Absolute path of a component group
///
/// Samples sit directly in the entry, everything else in the instrument.
pub fn component_path(component: &Component) -> String {
    match component.component_type().is_sample() {
        true => f!("/{ENTRY}/{}", component.name()),
        false => f!("/{ENTRY}/{INSTRUMENT}/{}", component.name()),
    }
}

/// Absolute path of a transformation dataset
pub fn transform_path(component: &Component, transform: &str) -> String {
    f!("{}/{TRANSFORMS}/{transform}", component_path(component))
}

/// Component and transformation named by a `depends_on` path
///
/// The transformation is the last segment and the component the third from
/// last, so relative paths inside a component give no component at all. The
/// origin `"."` names neither.
///
/// ```rust
/// # use nxtools_nexus::extract_dependency_names;
/// assert_eq!(
///     extract_dependency_names("/entry/instrument/slit/transforms/offset"),
///     (Some("slit".to_string()), Some("offset".to_string()))
/// );
/// assert_eq!(
///     extract_dependency_names("transforms/offset"),
///     (None, Some("offset".to_string()))
/// );
/// assert_eq!(extract_dependency_names("."), (None, None));
/// ```
pub fn extract_dependency_names(path: &str) -> (Option<String>, Option<String>) {
    let path = path.trim();
    if path.is_empty() || path == "." {
        return (None, None);
    }

    let segments = path.split('/').collect::<Vec<_>>();
    let transform = segments
        .last()
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string());
    let component = segments
        .len()
        .checked_sub(3)
        .and_then(|i| segments.get(i))
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string());

    (component, transform)
}

#[cfg(test)]
mod layout_tests {
    use super::*;
    use nxtools_model::{ComponentType, Instrument};

    #[test]
    fn samples_sit_in_the_entry() {
        let mut instrument = Instrument::new();
        let sample = instrument.add_component("sample", ComponentType::Sample).unwrap();
        let slit = instrument.add_component("slit", ComponentType::Slit).unwrap();

        let sample = instrument.component(sample).unwrap();
        let slit = instrument.component(slit).unwrap();
        assert_eq!(component_path(sample), "/entry/sample");
        assert_eq!(component_path(slit), "/entry/instrument/slit");
        assert_eq!(transform_path(slit, "x"), "/entry/instrument/slit/transforms/x");
    }

    #[test]
    fn dependency_names() {
        assert_eq!(
            extract_dependency_names("/entry/sample/transforms/omega"),
            (Some("sample".into()), Some("omega".into()))
        );
        assert_eq!(extract_dependency_names("omega"), (None, Some("omega".into())));
        assert_eq!(extract_dependency_names("/entry/"), (None, None));
        assert_eq!(extract_dependency_names(""), (None, None));
    }
}
