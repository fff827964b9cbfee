//! Reading polygon meshes from OFF files
//!
//! The Object File Format is a plain text mesh format:
//!
//! ```text
//! OFF
//! # vertices faces edges
//! 4 1 0
//! 0.0 0.0 0.0
//! 1.0 0.0 0.0
//! 1.0 1.0 0.0
//! 0.0 1.0 0.0
//! 4 0 1 2 3
//! ```
//!
//! Comments and blank lines are ignored, the counts may share a line with the
//! `OFF` keyword, and any colour values after a face are dropped.
//!
//! ```rust, no_run
//! # use nxtools_geometry::read_off;
//! let off = read_off("/path/to/detector.off", "mm").unwrap();
//! println!("{off}");
//! ```

pub mod parsers;

// standard library
use std::path::Path;

// crate modules
use crate::error::{Error, Result};
use crate::off::OffGeometry;

// nxtools modules
use nxtools_utils::f;

// external crates
use log::{debug, warn};

/// Read an OFF file with vertices in the given length `units`
pub fn read_off<P: AsRef<Path>>(path: P, units: &str) -> Result<OffGeometry> {
    let path = path.as_ref();
    debug!("Reading OFF file {}", path.display());

    let text = std::fs::read_to_string(path)?;
    Ok(parse_off(&text)?
        .with_units(units)
        .with_file_path(path.to_string_lossy()))
}

/// Parse the text of an OFF file
///
/// ```rust
/// # use nxtools_geometry::parse_off;
/// let off = parse_off("OFF\n3 1 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1 2\n").unwrap();
/// assert_eq!(off.vertices.len(), 3);
/// assert_eq!(off.faces, vec![vec![0, 1, 2]]);
/// ```
pub fn parse_off(text: &str) -> Result<OffGeometry> {
    let mut lines = text.lines().filter(|l| !parsers::is_ignored(l));

    let header = lines
        .next()
        .ok_or_else(|| Error::ParseError("empty OFF file".to_string()))?;
    let (rest, _) = parsers::off_header(header)
        .map_err(|_| Error::ParseError(f!("expected OFF keyword, found \"{header}\"")))?;

    // counts are allowed on the header line
    let counts_line = if rest.trim().is_empty() {
        lines
            .next()
            .ok_or_else(|| Error::ParseError("missing OFF counts".to_string()))?
    } else {
        rest
    };
    let (_, (n_vertices, n_faces, _)) = parsers::counts(counts_line)
        .map_err(|_| Error::ParseError(f!("invalid OFF counts \"{counts_line}\"")))?;

    let vertices = (0..n_vertices)
        .map(|i| {
            let line = lines
                .next()
                .ok_or_else(|| Error::ParseError(f!("missing vertex {i}")))?;
            parsers::vertex(line)
                .map(|(_, v)| v)
                .map_err(|_| Error::ParseError(f!("invalid vertex \"{line}\"")))
        })
        .collect::<Result<Vec<_>>>()?;

    let faces = (0..n_faces)
        .map(|i| {
            let line = lines
                .next()
                .ok_or_else(|| Error::ParseError(f!("missing face {i}")))?;
            parsers::face(line)
                .map(|(_, face)| face)
                .map_err(|_| Error::ParseError(f!("invalid face \"{line}\"")))
        })
        .collect::<Result<Vec<_>>>()?;

    if lines.next().is_some() {
        warn!("Ignoring trailing lines after {n_faces} OFF faces");
    }

    let off = OffGeometry::new(vertices, faces);
    off.validate()?;
    Ok(off)
}
