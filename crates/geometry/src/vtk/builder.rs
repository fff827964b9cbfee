// internal modules
use crate::vtk::OffToVtk;

// external crates
use vtkio::model::ByteOrder;

/// Builder implementation for OffToVtk configuration
///
/// The fields of [OffToVtk] are left public for direct use, but chained
/// setters are often more readable. Any number of parameters can be set this
/// way (including none), then call [build()](OffToVtkBuilder::build).
///
/// ```rust
/// # use nxtools_geometry::vtk::OffToVtk;
/// # use vtkio::model::ByteOrder;
/// let converter = OffToVtk::builder()
///     .title("sample can")
///     .byte_order(ByteOrder::LittleEndian)
///     .include_face_ids(true)
///     .build();
///
/// assert_eq!(converter.title, "sample can");
/// ```
#[derive(Debug)]
pub struct OffToVtkBuilder {
    /// Title written into the file header
    title: String,
    /// Byte ordering as big or little endian
    byte_order: ByteOrder,
    /// Attach the index of every face as cell data
    include_face_ids: bool,
}

impl OffToVtkBuilder {
    /// Create a new instance of the builder with default parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the [OffToVtk] type
    pub fn build(self) -> OffToVtk {
        OffToVtk {
            title: self.title,
            byte_order: self.byte_order,
            include_face_ids: self.include_face_ids,
        }
    }

    /// Title written into the file header
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the byte ordering
    ///
    /// Defaults to big endian, which every VTK reader accepts for the legacy
    /// binary format.
    pub fn byte_order(mut self, order: ByteOrder) -> Self {
        self.byte_order = order;
        self
    }

    /// Attach a `face_id` cell array with the index of every face
    ///
    /// Handy for checking a pixel mapping against the mesh in a viewer.
    pub fn include_face_ids(mut self, include: bool) -> Self {
        self.include_face_ids = include;
        self
    }
}

impl Default for OffToVtkBuilder {
    fn default() -> Self {
        Self {
            title: "nxtools geometry".to_string(),
            byte_order: ByteOrder::BigEndian,
            include_face_ids: false,
        }
    }
}
