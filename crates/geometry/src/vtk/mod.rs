//! Conversion of polygon meshes to VTK poly data
//!
//! Any shape can be exported by first turning it into an
//! [OffGeometry](crate::OffGeometry), which keeps plotting independent of the
//! shape variant.
//!
//! ```rust, no_run
//! # use nxtools_geometry::vtk::{write_vtk, OffToVtk, VtkFormat};
//! # use nxtools_geometry::Geometry;
//! # let geometry = Geometry::NoShape;
//! let converter = OffToVtk::builder()
//!     .title("detector bank")
//!     .include_face_ids(true)
//!     .build();
//!
//! let vtk = converter.convert(&geometry.off_geometry());
//! write_vtk(vtk, "detector.vtp", VtkFormat::Xml).unwrap();
//! ```

mod builder;
mod convert;

// standard library
use std::path::Path;

// crate modules
use crate::error::Result;
use crate::off::OffGeometry;

// external crates
use vtkio::model::{ByteOrder, Vtk};

#[doc(inline)]
pub use builder::OffToVtkBuilder;

#[doc(inline)]
pub use convert::OffToVtk;

/// Output file formats supported by [write_vtk()]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VtkFormat {
    /// XML poly data, the file extension should be `.vtp`
    Xml,
    /// Legacy ASCII text
    LegacyAscii,
    /// Legacy binary in the byte order of the [Vtk]
    LegacyBinary,
}

/// Convert a mesh with the default configuration
pub fn off_to_vtk(off: &OffGeometry) -> Vtk {
    OffToVtk::default().convert(off)
}

/// Write a [Vtk] to disk in the chosen format
pub fn write_vtk<P: AsRef<Path>>(vtk: Vtk, path: P, format: VtkFormat) -> Result<()> {
    match format {
        VtkFormat::Xml => vtk.export(path)?,
        VtkFormat::LegacyAscii => vtk.export_ascii(path)?,
        VtkFormat::LegacyBinary => {
            if vtk.byte_order == ByteOrder::LittleEndian {
                vtk.export_le(path)?
            } else {
                vtk.export_be(path)?
            }
        }
    }
    Ok(())
}
