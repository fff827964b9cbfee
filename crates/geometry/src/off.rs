// crate modules
use crate::error::{Error, Result};

// external crates
use itertools::Itertools;
use nalgebra::Vector3;

/// Arbitrary polygon mesh geometry
///
/// The mesh is a list of vertices plus a list of faces, where every face is an
/// ordered list of indices into the vertices. The order of the indices is the
/// winding order, which decides the direction of the outward normal.
///
/// On disk the faces are flattened into a single `winding_order` array, with a
/// second array holding the offset at which each face starts.
///
/// ```rust
/// # use nxtools_geometry::OffGeometry;
/// # use nalgebra::Vector3;
/// let mut off = OffGeometry::cube();
/// off.faces.truncate(2);
///
/// assert_eq!(off.winding_order(), vec![0, 1, 3, 2, 2, 3, 5, 4]);
/// assert_eq!(off.winding_order_indices(), vec![0, 4]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct OffGeometry {
    /// Ordered vertex positions
    pub vertices: Vec<Vector3<f64>>,
    /// Vertex indices of each face in winding order
    pub faces: Vec<Vec<usize>>,
    /// Length units of the vertex positions
    pub units: String,
    /// File the mesh was loaded from, if any
    pub file_path: String,
}

impl OffGeometry {
    /// Create a mesh in metres with no source file
    pub fn new(vertices: Vec<Vector3<f64>>, faces: Vec<Vec<usize>>) -> Self {
        Self {
            vertices,
            faces,
            units: "m".to_string(),
            file_path: String::new(),
        }
    }

    /// Unit cube centred on the origin
    ///
    /// Used as the placeholder mesh for components without a shape.
    pub fn cube() -> Self {
        let vertices = [
            [-0.5, -0.5, 0.5],
            [0.5, -0.5, 0.5],
            [-0.5, 0.5, 0.5],
            [0.5, 0.5, 0.5],
            [-0.5, 0.5, -0.5],
            [0.5, 0.5, -0.5],
            [-0.5, -0.5, -0.5],
            [0.5, -0.5, -0.5],
        ]
        .into_iter()
        .map(Vector3::from)
        .collect();

        let faces = vec![
            vec![0, 1, 3, 2],
            vec![2, 3, 5, 4],
            vec![4, 5, 7, 6],
            vec![6, 7, 1, 0],
            vec![1, 7, 5, 3],
            vec![6, 0, 2, 4],
        ];

        Self::new(vertices, faces)
    }

    /// Rebuild a mesh from the flattened on-disk face encoding
    ///
    /// `face_starts` holds the offset of each face into `winding_order`, so
    /// each face runs up to the start of the next one, and the last face runs
    /// to the end.
    ///
    /// ```rust
    /// # use nxtools_geometry::OffGeometry;
    /// # use nalgebra::Vector3;
    /// let vertices = vec![Vector3::zeros(); 6];
    /// let off = OffGeometry::from_winding_order(
    ///     vertices,
    ///     &[0, 1, 3, 2, 2, 3, 5, 4],
    ///     &[0, 4],
    /// ).unwrap();
    ///
    /// assert_eq!(off.faces, vec![vec![0, 1, 3, 2], vec![2, 3, 5, 4]]);
    /// ```
    pub fn from_winding_order(
        vertices: Vec<Vector3<f64>>,
        winding_order: &[usize],
        face_starts: &[usize],
    ) -> Result<Self> {
        let ascending = face_starts.iter().tuple_windows().all(|(a, b)| a <= b);
        let in_range = face_starts.iter().all(|s| *s <= winding_order.len());
        let starts_at_zero = face_starts.first().map_or(true, |s| *s == 0);

        if !(ascending && in_range && starts_at_zero) {
            return Err(Error::InvalidFaceStarts(face_starts.to_vec()));
        }

        let faces = face_starts
            .iter()
            .enumerate()
            .map(|(i, start)| {
                let end = face_starts.get(i + 1).copied().unwrap_or(winding_order.len());
                winding_order[*start..end].to_vec()
            })
            .collect();

        let off = Self::new(vertices, faces);
        off.validate()?;
        Ok(off)
    }

    /// All face vertex indices concatenated in order
    pub fn winding_order(&self) -> Vec<usize> {
        self.faces.iter().flatten().copied().collect()
    }

    /// Offset of each face into the [winding_order](OffGeometry::winding_order)
    pub fn winding_order_indices(&self) -> Vec<usize> {
        self.faces
            .iter()
            .scan(0, |offset, face| {
                let start = *offset;
                *offset += face.len();
                Some(start)
            })
            .collect()
    }

    /// Number of faces in the mesh
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Number of vertices in the mesh
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Check every face only references vertices that exist
    pub fn validate(&self) -> Result<()> {
        let vertices = self.vertices.len();
        for (face, indices) in self.faces.iter().enumerate() {
            if let Some(index) = indices.iter().find(|i| **i >= vertices) {
                return Err(Error::VertexIndexOutOfRange {
                    face,
                    index: *index,
                    vertices,
                });
            }
        }
        Ok(())
    }

    /// Set the length units
    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = units.into();
        self
    }

    /// Set the source file path
    pub fn with_file_path(mut self, file_path: impl Into<String>) -> Self {
        self.file_path = file_path.into();
        self
    }
}

impl Default for OffGeometry {
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new())
    }
}

impl std::fmt::Display for OffGeometry {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "OFF mesh of {} vertices and {} faces ({})",
            self.vertex_count(),
            self.face_count(),
            self.units
        )
    }
}

#[cfg(test)]
mod off_tests {
    use super::*;

    #[test]
    fn flatten_cube() {
        let cube = OffGeometry::cube();
        assert_eq!(cube.winding_order().len(), 24);
        assert_eq!(cube.winding_order_indices(), vec![0, 4, 8, 12, 16, 20]);
        assert!(cube.validate().is_ok());
    }

    #[test]
    fn unwind_mixed_face_sizes() {
        let off = OffGeometry::from_winding_order(
            vec![Vector3::zeros(); 5],
            &[0, 1, 2, 1, 2, 3, 4],
            &[0, 3],
        )
        .unwrap();

        assert_eq!(off.faces, vec![vec![0, 1, 2], vec![1, 2, 3, 4]]);
        assert_eq!(off.winding_order_indices(), vec![0, 3]);
    }

    #[test]
    fn reject_bad_face_starts() {
        let vertices = vec![Vector3::zeros(); 4];
        assert!(OffGeometry::from_winding_order(vertices.clone(), &[0, 1, 2], &[2, 0]).is_err());
        assert!(OffGeometry::from_winding_order(vertices.clone(), &[0, 1, 2], &[0, 4]).is_err());
        assert!(OffGeometry::from_winding_order(vertices, &[0, 1, 2], &[1]).is_err());
    }

    #[test]
    fn reject_out_of_range_vertex() {
        let result = OffGeometry::from_winding_order(vec![Vector3::zeros(); 3], &[0, 1, 3], &[0]);
        assert!(matches!(
            result,
            Err(Error::VertexIndexOutOfRange {
                face: 0,
                index: 3,
                vertices: 3
            })
        ));
    }
}
