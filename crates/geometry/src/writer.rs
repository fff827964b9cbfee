// standard library
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

// crate modules
use crate::error::Result;
use crate::off::OffGeometry;

// nxtools modules
use nxtools_utils::f;

/// Write a mesh to an OFF file
///
/// Coordinates are written with full precision so a written file reads back
/// to the same vertices.
pub fn write_off<P: AsRef<Path>>(off: &OffGeometry, path: P) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(off_to_string(off).as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Render a mesh as OFF text
///
/// ```rust
/// # use nxtools_geometry::{off_to_string, parse_off, OffGeometry};
/// let cube = OffGeometry::cube();
/// let text = off_to_string(&cube);
/// assert!(text.starts_with("OFF\n8 6 12\n"));
/// assert_eq!(parse_off(&text).unwrap(), cube);
/// ```
pub fn off_to_string(off: &OffGeometry) -> String {
    let edges = off.faces.iter().map(Vec::len).sum::<usize>() / 2;

    let mut text = String::from("OFF\n");
    text += &f!("{} {} {}\n", off.vertex_count(), off.face_count(), edges);

    for v in &off.vertices {
        text += &f!("{} {} {}\n", v.x, v.y, v.z);
    }

    for face in &off.faces {
        text += &face.len().to_string();
        for index in face {
            text += &f!(" {index}");
        }
        text.push('\n');
    }

    text
}
