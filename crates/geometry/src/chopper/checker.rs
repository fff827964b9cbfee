// crate modules
use crate::chopper::ChopperDetails;
use crate::error::{Error, Result};

// external crates
use itertools::Itertools;

/// Check that chopper details describe a buildable disk
///
/// The conditions are checked in order and the first failure is returned:
///
/// 1. there are exactly two slit edges per slit
/// 2. the slit height is smaller than the radius
/// 3. the slit edges are sorted
/// 4. no slit edge is repeated
/// 5. wrapping the edges into `[0, 2π)` does not make the last slit overlap
///    the first
///
/// ```rust
/// # use nxtools_geometry::chopper::{validate_chopper, ChopperDetails};
/// # use nxtools_geometry::Error;
/// let details = ChopperDetails::from_radians(1, &[0.5, 0.5], 1.0, 0.2);
/// assert!(matches!(validate_chopper(&details), Err(Error::RepeatedSlitEdges(_))));
/// ```
pub fn validate_chopper(details: &ChopperDetails) -> Result<()> {
    let edges = details.slit_edges();
    let raw_edges = details.raw_slit_edges();

    if edges.len() != 2 * details.slits() {
        return Err(Error::SlitEdgeCount {
            slits: details.slits(),
            edges: edges.len(),
        });
    }

    if details.slit_height() >= details.radius() {
        return Err(Error::SlitHeightTooLarge {
            slit_height: details.slit_height(),
            radius: details.radius(),
        });
    }

    if !raw_edges.iter().tuple_windows().all(|(a, b)| a <= b) {
        return Err(Error::UnsortedSlitEdges(raw_edges.to_vec()));
    }

    // already sorted, so any repeat is adjacent
    if raw_edges.iter().tuple_windows().any(|(a, b)| a == b) {
        return Err(Error::RepeatedSlitEdges(raw_edges.to_vec()));
    }

    let wrapped_sorted = edges.iter().tuple_windows().all(|(a, b)| a <= b);
    if let (Some(first), Some(last)) = (edges.first(), edges.last()) {
        if !wrapped_sorted && last >= first {
            return Err(Error::OverlappingSlits(raw_edges.to_vec()));
        }
    }

    Ok(())
}

/// Check that a slit edges array is a single row or column
pub fn edges_array_has_correct_shape(shape: &[usize]) -> Result<()> {
    match shape {
        [_] => Ok(()),
        [rows, columns] if *rows == 1 || *columns == 1 => Ok(()),
        _ => Err(Error::SlitEdgesNotOneDimensional(shape.to_vec())),
    }
}
