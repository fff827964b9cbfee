// crate modules
use crate::off::OffGeometry;

// internal modules
use crate::vtk::OffToVtkBuilder;

// external crates
use vtkio::model::{
    Attribute, Attributes, ByteOrder, DataArray, DataSet, ElementType, IOBuffer, PolyDataPiece,
    Version, VertexNumbers, Vtk,
};

/// Convert polygon meshes to VTK poly data
///
/// Every face becomes a polygon cell. Optional cell data can tag each cell with
/// its face index or with a detector id from a pixel mapping.
///
/// ```rust
/// # use nxtools_geometry::vtk::OffToVtk;
/// # use nxtools_geometry::OffGeometry;
/// let vtk = OffToVtk::new().convert(&OffGeometry::cube());
/// assert_eq!(vtk.title, "nxtools geometry");
/// ```
#[derive(Debug, PartialEq)]
pub struct OffToVtk {
    /// Title written into the file header
    pub title: String,
    /// Byte ordering as big or little endian
    pub byte_order: ByteOrder,
    /// Attach the index of every face as cell data
    pub include_face_ids: bool,
}

// Public API
impl OffToVtk {
    /// Start with the default configuration
    pub fn new() -> OffToVtk {
        Default::default()
    }

    /// Get an instance of the [OffToVtkBuilder]
    pub fn builder() -> OffToVtkBuilder {
        OffToVtkBuilder::default()
    }

    /// Convert an [OffGeometry] to a vtkio::Vtk object
    pub fn convert(&self, off: &OffGeometry) -> Vtk {
        self.poly_data(off, self.collect_attributes(off, None))
    }

    /// Convert an [OffGeometry] with a detector id for every face
    ///
    /// Faces without a detector are given an id of `-1`. Extra ids beyond the
    /// number of faces are ignored.
    pub fn convert_with_detector_ids(&self, off: &OffGeometry, ids: &[Option<i64>]) -> Vtk {
        self.poly_data(off, self.collect_attributes(off, Some(ids)))
    }
}

impl Default for OffToVtk {
    fn default() -> Self {
        OffToVtkBuilder::default().build()
    }
}

impl OffToVtk {
    fn poly_data(&self, off: &OffGeometry, data: Attributes) -> Vtk {
        Vtk {
            version: Version::Auto,
            title: self.title.clone(),
            byte_order: self.byte_order,
            file_path: None,
            data: DataSet::inline(PolyDataPiece {
                points: Self::points(off).into(),
                verts: None,
                lines: None,
                polys: Some(Self::polygons(off)),
                strips: None,
                data,
            }),
        }
    }

    /// Flattened xyz coordinates of every vertex
    fn points(off: &OffGeometry) -> Vec<f64> {
        off.vertices.iter().flat_map(|v| [v.x, v.y, v.z]).collect()
    }

    /// Faces as polygon connectivity with an end offset for each cell
    fn polygons(off: &OffGeometry) -> VertexNumbers {
        let connectivity = off.winding_order().into_iter().map(|i| i as u64).collect();
        let offsets = off
            .faces
            .iter()
            .scan(0u64, |end, face| {
                *end += face.len() as u64;
                Some(*end)
            })
            .collect();

        VertexNumbers::XML {
            connectivity,
            offsets,
        }
    }

    fn collect_attributes(&self, off: &OffGeometry, ids: Option<&[Option<i64>]>) -> Attributes {
        let mut attributes = Attributes::new();

        if self.include_face_ids {
            let face_ids = (0..off.face_count() as i64).collect();
            attributes.cell.push(Self::cell_array("face_id", face_ids));
        }

        if let Some(ids) = ids {
            let detector_ids = (0..off.face_count())
                .map(|face| ids.get(face).copied().flatten().unwrap_or(-1))
                .collect();
            attributes.cell.push(Self::cell_array("detector_id", detector_ids));
        }

        attributes
    }

    fn cell_array(name: &str, values: Vec<i64>) -> Attribute {
        Attribute::DataArray(DataArray {
            name: name.to_string(),
            elem: ElementType::Scalars {
                num_comp: 1,
                lookup_table: None,
            },
            data: IOBuffer::I64(values),
        })
    }
}
