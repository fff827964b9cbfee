//! Flattened array encodings of pixel grids and pixel mappings

// crate modules
use crate::error::{Error, Result};

// nxtools modules
use nxtools_model::{Corner, CountDirection, PixelGrid, PixelMapping};

// external crates
use itertools::Itertools;

/// Per-pixel arrays of a [PixelGrid]
///
/// Every array is indexed `[row][column]` with `rows × columns` entries,
/// row `0` being the bottom of the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridArrays {
    /// Offset of each pixel along x
    pub x_offsets: Vec<Vec<f64>>,
    /// Offset of each pixel along y
    pub y_offsets: Vec<Vec<f64>>,
    /// Offset of each pixel along z, always zero for a flat grid
    pub z_offsets: Vec<Vec<f64>>,
    /// Detector id of each pixel
    pub detector_ids: Vec<Vec<i64>>,
}

/// Row and column of the pixel `offset` steps from the first id
///
/// Ids run along a row (or column) first, starting from the initial count
/// corner, so the row is mirrored for top corners and the column for right
/// corners.
///
/// ```rust
/// # use nxtools_model::{Corner, CountDirection, PixelGrid};
/// # use nxtools_nexus::pixel_position;
/// let grid = PixelGrid::builder()
///     .rows(2)
///     .columns(3)
///     .count_direction(CountDirection::Column)
///     .initial_count_corner(Corner::TopRight)
///     .build();
///
/// assert_eq!(pixel_position(&grid, 0), (1, 2));
/// assert_eq!(pixel_position(&grid, 1), (0, 2));
/// assert_eq!(pixel_position(&grid, 2), (1, 1));
/// ```
pub fn pixel_position(grid: &PixelGrid, offset: usize) -> (usize, usize) {
    let (row, column) = match grid.count_direction {
        CountDirection::Row => (offset / grid.columns, offset % grid.columns),
        CountDirection::Column => (offset % grid.rows, offset / grid.rows),
    };

    let row = match grid.initial_count_corner.is_top() {
        true => grid.rows - 1 - row,
        false => row,
    };
    let column = match grid.initial_count_corner.is_right() {
        true => grid.columns - 1 - column,
        false => column,
    };

    (row, column)
}

/// Flatten a grid into per-pixel offsets and detector ids
pub fn encode_grid(grid: &PixelGrid) -> GridArrays {
    let (rows, columns) = (grid.rows, grid.columns);

    let x_offsets = (0..rows)
        .map(|_| (0..columns).map(|c| c as f64 * grid.col_width).collect())
        .collect();
    let y_offsets = (0..rows)
        .map(|r| vec![r as f64 * grid.row_height; columns])
        .collect();
    let z_offsets = vec![vec![0.0; columns]; rows];

    let mut detector_ids = vec![vec![0; columns]; rows];
    for offset in 0..grid.pixel_count() {
        let (row, column) = pixel_position(grid, offset);
        detector_ids[row][column] = grid.first_id + offset as i64;
    }

    GridArrays {
        x_offsets,
        y_offsets,
        z_offsets,
        detector_ids,
    }
}

/// Recover the grid parameters from per-pixel arrays
///
/// The spacing comes from the first row and column of the offsets, the first
/// id from the smallest corner, and the direction from the neighbour of that
/// corner in the next row. Grids with a single row or column cannot tell
/// their direction apart and decode as [CountDirection::Row], with a spacing
/// of 1 along the missing axis. Their first id sits in two corners at once,
/// and the later of bottom left, bottom right, top left, top right is kept,
/// so a single row starts from a top corner and a single column from a right
/// corner.
///
/// ```rust
/// # use nxtools_model::{Corner, PixelGrid};
/// # use nxtools_nexus::{decode_grid, encode_grid};
/// let row = PixelGrid::builder().rows(1).columns(3).first_id(7).build();
/// let decoded = decode_grid(&encode_grid(&row)).unwrap();
/// assert_eq!(decoded.initial_count_corner, Corner::TopLeft);
/// ```
pub fn decode_grid(arrays: &GridArrays) -> Result<PixelGrid> {
    let (rows, columns) = common_shape(arrays)?;
    let ids = &arrays.detector_ids;

    let row_height = match rows {
        1 => 1.0,
        _ => arrays.y_offsets[1][0] - arrays.y_offsets[0][0],
    };
    let col_width = match columns {
        1 => 1.0,
        _ => arrays.x_offsets[0][1] - arrays.x_offsets[0][0],
    };

    let cell = |corner: Corner| {
        let row = if corner.is_top() { rows - 1 } else { 0 };
        let column = if corner.is_right() { columns - 1 } else { 0 };
        (row, column)
    };

    // ties go to the later corner in this order
    let mut corner = Corner::BottomLeft;
    for candidate in [Corner::BottomRight, Corner::TopLeft, Corner::TopRight] {
        let (r, c) = cell(candidate);
        let (best_r, best_c) = cell(corner);
        if ids[r][c] <= ids[best_r][best_c] {
            corner = candidate;
        }
    }

    let (first_row, first_column) = cell(corner);
    let first_id = ids[first_row][first_column];

    let count_direction = if rows == 1 || columns == 1 {
        CountDirection::Row
    } else {
        let next_row = if corner.is_top() { rows - 2 } else { 1 };
        match ids[next_row][first_column] == first_id + 1 {
            true => CountDirection::Column,
            false => CountDirection::Row,
        }
    };

    Ok(PixelGrid {
        rows,
        columns,
        row_height,
        col_width,
        first_id,
        count_direction,
        initial_count_corner: corner,
    })
}

/// `[face, detector id]` pairs for every mapped face, in face order
///
/// ```rust
/// # use nxtools_model::PixelMapping;
/// # use nxtools_nexus::{decode_mapping, encode_mapping};
/// let mapping = PixelMapping::new(vec![None, Some(7), None, Some(3)]);
/// let pairs = encode_mapping(&mapping);
///
/// assert_eq!(pairs, vec![[1, 7], [3, 3]]);
/// assert_eq!(decode_mapping(&pairs, 4).unwrap(), mapping);
/// ```
pub fn encode_mapping(mapping: &PixelMapping) -> Vec<[i64; 2]> {
    mapping
        .pixel_ids
        .iter()
        .enumerate()
        .filter_map(|(face, id)| id.map(|id| [face as i64, id]))
        .collect()
}

/// Rebuild a mapping over `face_count` faces from `[face, detector id]` pairs
///
/// Faces without a pair are unmapped. A face outside the mesh is an error.
pub fn decode_mapping(pairs: &[[i64; 2]], face_count: usize) -> Result<PixelMapping> {
    let mut pixel_ids = vec![None; face_count];

    for [face, id] in pairs {
        let index = usize::try_from(*face)
            .ok()
            .filter(|index| *index < face_count)
            .ok_or(Error::FaceOutOfRange {
                face: *face,
                face_count,
            })?;
        pixel_ids[index] = Some(*id);
    }

    Ok(PixelMapping::new(pixel_ids))
}

/// Shared `(rows, columns)` of all four arrays
fn common_shape(arrays: &GridArrays) -> Result<(usize, usize)> {
    fn shape<T>(array: &[Vec<T>]) -> Result<(usize, usize)> {
        let columns = array.first().map_or(0, Vec::len);
        if array.iter().any(|row| row.len() != columns) {
            return Err(Error::RaggedPixelArray(array.iter().map(Vec::len).collect()));
        }
        Ok((array.len(), columns))
    }

    let shapes = [
        shape(&arrays.x_offsets)?,
        shape(&arrays.y_offsets)?,
        shape(&arrays.z_offsets)?,
        shape(&arrays.detector_ids)?,
    ];

    if !shapes.iter().all_equal() {
        return Err(Error::PixelArrayShape(shapes.to_vec()));
    }

    match shapes[0] {
        (0, _) | (_, 0) => Err(Error::EmptyPixelArrays),
        shape => Ok(shape),
    }
}

#[cfg(test)]
mod pixels_tests {
    use super::*;

    #[test]
    fn row_counting_from_bottom_left() {
        let grid = PixelGrid::builder()
            .rows(2)
            .columns(3)
            .row_height(0.5)
            .col_width(0.2)
            .first_id(10)
            .build();
        let arrays = encode_grid(&grid);

        assert_eq!(arrays.detector_ids, vec![vec![10, 11, 12], vec![13, 14, 15]]);
        assert_eq!(arrays.x_offsets[1], vec![0.0, 0.2, 0.4]);
        assert_eq!(arrays.y_offsets, vec![vec![0.0; 3], vec![0.5; 3]]);
        assert_eq!(arrays.z_offsets, vec![vec![0.0; 3]; 2]);
    }

    #[test]
    fn column_counting_from_top_right() {
        let grid = PixelGrid::builder()
            .rows(2)
            .columns(3)
            .count_direction(CountDirection::Column)
            .initial_count_corner(Corner::TopRight)
            .build();

        assert_eq!(
            encode_grid(&grid).detector_ids,
            vec![vec![5, 3, 1], vec![4, 2, 0]]
        );
    }

    #[test]
    fn single_line_corners() {
        let line = |rows: usize, columns: usize, ids: Vec<Vec<i64>>| GridArrays {
            x_offsets: vec![vec![0.0; columns]; rows],
            y_offsets: vec![vec![0.0; columns]; rows],
            z_offsets: vec![vec![0.0; columns]; rows],
            detector_ids: ids,
        };
        let corner = |arrays: GridArrays| decode_grid(&arrays).unwrap().initial_count_corner;

        assert_eq!(corner(line(1, 3, vec![vec![7, 8, 9]])), Corner::TopLeft);
        assert_eq!(corner(line(1, 3, vec![vec![9, 8, 7]])), Corner::TopRight);
        assert_eq!(corner(line(3, 1, vec![vec![7], vec![8], vec![9]])), Corner::BottomRight);
        assert_eq!(corner(line(3, 1, vec![vec![9], vec![8], vec![7]])), Corner::TopRight);
        assert_eq!(corner(line(1, 1, vec![vec![7]])), Corner::TopRight);
    }

    #[test]
    fn mismatched_shapes() {
        let grid = PixelGrid::builder().rows(2).columns(2).build();
        let mut arrays = encode_grid(&grid);
        arrays.z_offsets.pop();
        assert!(matches!(decode_grid(&arrays), Err(Error::PixelArrayShape(_))));

        let mut arrays = encode_grid(&grid);
        arrays.detector_ids[1].push(9);
        assert!(matches!(decode_grid(&arrays), Err(Error::RaggedPixelArray(_))));
    }

    #[test]
    fn empty_arrays() {
        let arrays = GridArrays {
            x_offsets: vec![],
            y_offsets: vec![],
            z_offsets: vec![],
            detector_ids: vec![],
        };
        assert!(matches!(decode_grid(&arrays), Err(Error::EmptyPixelArrays)));
    }

    #[test]
    fn mapping_face_out_of_range() {
        assert!(decode_mapping(&[[4, 1]], 4).is_err());
        assert!(decode_mapping(&[[-1, 1]], 4).is_err());
        assert_eq!(decode_mapping(&[], 2).unwrap().pixel_ids, vec![None, None]);
    }
}
