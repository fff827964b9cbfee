//! Reading shape groups back into geometry

// crate modules
use crate::layout::*;
use crate::options::DecodeOptions;
use crate::tree::NexusGroup;
use crate::warnings::{Context, Severity, Warnings};

// nxtools modules
use nxtools_geometry::{
    CylindricalGeometry, Geometry, OffGeometry, CYLINDRICAL_GEOMETRY_CLASS, OFF_GEOMETRY_CLASS,
};
use nxtools_model::Dataset;
use nxtools_units::validate_length_units;
use nxtools_utils::f;

// external crates
use nalgebra::Vector3;

/// Kind of element a shape dataset is expected to hold
#[derive(Debug, Clone, Copy)]
enum Expected {
    Integer,
    Float,
}

impl Expected {
    fn accepts(&self, dataset: &Dataset) -> bool {
        match self {
            Expected::Integer => dataset.dtype().is_integer(),
            Expected::Float => dataset.dtype().is_float(),
        }
    }

    fn names(&self) -> &'static str {
        match self {
            Expected::Integer => "[int8, int16, int32, int64, uint8, uint16, uint32, uint64]",
            Expected::Float => "[float, double]",
        }
    }
}

/// Reads one `shape` or `pixel_shape` group, recording what is wrong with it
pub(crate) struct ShapeReader<'a> {
    group: &'a NexusGroup,
    component: &'a str,
    context: Context<'a>,
    options: &'a DecodeOptions,
    warnings: &'a mut Warnings,
}

impl<'a> ShapeReader<'a> {
    pub fn new(
        group: &'a NexusGroup,
        component: &'a str,
        options: &'a DecodeOptions,
        warnings: &'a mut Warnings,
    ) -> Self {
        let class = group.nx_class().unwrap_or(group.name.as_str());
        Self {
            group,
            component,
            context: Context::new(class, component),
            options,
            warnings,
        }
    }

    /// Geometry described by the group, `None` if it cannot be built
    pub fn read(mut self) -> Option<Geometry> {
        let group = self.group;
        match group.nx_class() {
            Some(OFF_GEOMETRY_CLASS) => self.read_off().map(Geometry::Off),
            Some(CYLINDRICAL_GEOMETRY_CLASS) => self.read_cylinder().map(Geometry::Cylindrical),
            other => {
                self.warnings.push(
                    Severity::Error,
                    f!(
                        "Unrecognised shape type for component {}. Expected '{OFF_GEOMETRY_CLASS}' or '{CYLINDRICAL_GEOMETRY_CLASS}' but found '{}'.",
                        self.component,
                        other.unwrap_or_default()
                    ),
                );
                None
            }
        }
    }

    fn error<T>(&mut self, detail: &str) -> Option<T> {
        self.context.record(self.warnings, Severity::Error, detail);
        None
    }

    fn dataset(&mut self, name: &str, expected: Expected) -> Option<&'a Dataset> {
        let group = self.group;
        let Some(dataset) = group.dataset(name) else {
            return self.error(&f!("Couldn't find {name} attribute."));
        };

        if !expected.accepts(dataset) {
            let severity = self.options.dtype_mismatch;
            let detail = f!(
                "Type attribute for {name} does not match expected type(s) {}, found {}.",
                expected.names(),
                dataset.dtype()
            );
            self.context.record(self.warnings, severity, &detail);
            if severity == Severity::Error {
                return None;
            }
        }

        Some(dataset)
    }

    fn vertices(&mut self) -> Option<(Vec<Vector3<f64>>, String)> {
        let dataset = self.dataset(VERTICES, Expected::Float)?;

        let Some(units) = dataset.units() else {
            return self.error("Unable to find units attribute in vertices dataset.");
        };
        if validate_length_units(units).is_err() {
            return self.error(&f!("Vertices units are not recognised as a length, found \"{units}\"."));
        }

        match dataset.values.to_vectors() {
            Some(points) => Some((points, units.to_string())),
            None => self.error(&f!(
                "Incorrect array shape for vertices dataset, found {:?}.",
                dataset.size()
            )),
        }
    }

    fn indices(&mut self, dataset: &Dataset) -> Option<Vec<usize>> {
        let indices = dataset
            .values
            .to_i64_vec()
            .and_then(|v| v.into_iter().map(|i| usize::try_from(i).ok()).collect());

        if indices.is_none() {
            return self.error(&f!(
                "Values in {} are not all non-negative integers.",
                dataset.name
            ));
        }
        indices
    }

    fn read_off(&mut self) -> Option<OffGeometry> {
        let faces = self.dataset(FACES, Expected::Integer)?;
        let (vertices, units) = self.vertices()?;
        let winding_order = self.dataset(WINDING_ORDER, Expected::Integer)?;

        let face_starts = self.indices(faces)?;
        let winding_order = self.indices(winding_order)?;

        match OffGeometry::from_winding_order(vertices, &winding_order, &face_starts) {
            Ok(off) => Some(off.with_units(units)),
            Err(e) => self.error(&f!("Invalid mesh: {e}.")),
        }
    }

    fn read_cylinder(&mut self) -> Option<CylindricalGeometry> {
        let (vertices, units) = self.vertices()?;
        let cylinders = self.dataset(CYLINDERS, Expected::Integer)?;
        let indices = self.indices(cylinders)?;

        if indices.len() < 3 {
            return self.error(&f!(
                "Cylinders dataset should hold three vertex indices, found {}.",
                indices.len()
            ));
        }
        if indices.len() > 3 {
            let detail = f!("Only the first of {} cylinders is used.", indices.len() / 3);
            self.context.record(self.warnings, Severity::Issue, &detail);
        }

        let point = |i: usize| vertices.get(indices[i]).copied();
        let (Some(base), Some(edge), Some(top)) = (point(0), point(1), point(2)) else {
            return self.error("Cylinder vertex index is out of range.");
        };

        match CylindricalGeometry::from_vertices(&units, base, edge, top) {
            Ok(cylinder) => Some(cylinder),
            Err(e) => self.error(&f!("Invalid cylinder: {e}.")),
        }
    }
}

#[cfg(test)]
mod shapes_tests {
    use super::*;
    use nxtools_model::{DType, Value};

    fn off_group() -> NexusGroup {
        let vertices = Value::float_array(
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0],
            vec![4, 3],
        )
        .unwrap();

        let mut group = NexusGroup::with_class(SHAPE, OFF_GEOMETRY_CLASS);
        group
            .push(Dataset::new(VERTICES, vertices).with_attribute("units", "mm"))
            .unwrap();
        group
            .push(Dataset::new(WINDING_ORDER, Value::from(vec![0_i64, 1, 2, 0, 2, 3])))
            .unwrap();
        group
            .push(Dataset::new(FACES, Value::from(vec![0_i64, 3])))
            .unwrap();
        group
    }

    fn read(group: &NexusGroup, options: &DecodeOptions) -> (Option<Geometry>, Warnings) {
        let mut warnings = Warnings::new();
        let geometry = ShapeReader::new(group, "panel", options, &mut warnings).read();
        (geometry, warnings)
    }

    #[test]
    fn off_mesh() {
        let (geometry, warnings) = read(&off_group(), &DecodeOptions::default());
        let Some(Geometry::Off(off)) = geometry else {
            panic!("expected a mesh");
        };
        assert!(warnings.is_empty());
        assert_eq!(off.faces, vec![vec![0, 1, 2], vec![0, 2, 3]]);
        assert_eq!(off.units, "mm");
    }

    #[test]
    fn missing_faces() {
        let mut group = off_group();
        group.children.retain(|c| c.as_dataset().map_or(true, |d| d.name != FACES));

        let (geometry, warnings) = read(&group, &DecodeOptions::default());
        assert!(geometry.is_none());
        assert!(warnings.contains(
            "Error encountered when constructing NXoff_geometry for component panel: Couldn't find faces attribute."
        ));
    }

    #[test]
    fn bad_units() {
        let mut group = off_group();
        group.children.retain(|c| c.as_dataset().map_or(true, |d| d.name != VERTICES));
        let vertices = Value::float_array(vec![0.0; 12], vec![4, 3]).unwrap();
        group
            .push(Dataset::new(VERTICES, vertices).with_attribute("units", "seconds"))
            .unwrap();

        let (geometry, warnings) = read(&group, &DecodeOptions::default());
        assert!(geometry.is_none());
        assert!(warnings.contains("Vertices units are not recognised"));
    }

    #[test]
    fn integer_vertices() {
        let mut group = off_group();
        group.children.retain(|c| c.as_dataset().map_or(true, |d| d.name != VERTICES));
        let vertices = Value::int_array(vec![0, 0, 0, 1, 0, 0, 1, 1, 0, 0, 1, 0], vec![4, 3]).unwrap();
        group
            .push(Dataset::new(VERTICES, vertices).with_attribute("units", "m"))
            .unwrap();

        // kept as an issue by default
        let (geometry, warnings) = read(&group, &DecodeOptions::default());
        assert!(geometry.is_some());
        assert_eq!(warnings.len(), 1);

        let (geometry, warnings) = read(&group, &DecodeOptions::strict());
        assert!(geometry.is_none());
        assert_eq!(warnings.error_count(), 1);
    }

    #[test]
    fn cylinder() {
        let vertices = Value::float_array(
            vec![0.0, 0.0, 0.0, 0.5, 0.0, 0.0, 0.0, 0.0, 2.0],
            vec![3, 3],
        )
        .unwrap();
        let cylinders = Value::int_array(vec![0, 1, 2], vec![1, 3])
            .unwrap()
            .with_dtype(DType::Int32)
            .unwrap();

        let mut group = NexusGroup::with_class(SHAPE, CYLINDRICAL_GEOMETRY_CLASS);
        group
            .push(Dataset::new(VERTICES, vertices).with_attribute("units", "m"))
            .unwrap();
        group.push(Dataset::new(CYLINDERS, cylinders)).unwrap();

        let (geometry, warnings) = read(&group, &DecodeOptions::default());
        let Some(Geometry::Cylindrical(cylinder)) = geometry else {
            panic!("expected a cylinder");
        };
        assert!(warnings.is_empty());
        assert!((cylinder.height() - 2.0).abs() < 1e-12);
        assert!((cylinder.radius() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn unknown_shape_class() {
        let group = NexusGroup::with_class(SHAPE, "NXbox");
        let (geometry, warnings) = read(&group, &DecodeOptions::default());
        assert!(geometry.is_none());
        assert!(warnings.contains("Unrecognised shape type for component panel"));
    }
}
