// crate modules
use crate::error::{Error, Result};

// nxtools modules
use nxtools_utils::f;

/// Pixel fields written next to a detector shape
pub const PIXEL_FIELDS: [&str; 5] = [
    "x_pixel_offset",
    "y_pixel_offset",
    "z_pixel_offset",
    "detector_number",
    "detector_faces",
];

/// Order in which consecutive detector ids are assigned
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CountDirection {
    /// Fill a row before moving on to the next
    #[default]
    Row,
    /// Fill a column before moving on to the next
    Column,
}

/// Corner of a grid holding the first detector id
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Corner {
    TopLeft,
    TopRight,
    #[default]
    BottomLeft,
    BottomRight,
}

impl Corner {
    /// Every corner
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    /// Counting starts from the last row
    pub fn is_top(&self) -> bool {
        matches!(self, Corner::TopLeft | Corner::TopRight)
    }

    /// Counting starts from the last column
    pub fn is_right(&self) -> bool {
        matches!(self, Corner::TopRight | Corner::BottomRight)
    }
}

/// Regular grid of identical pixels
///
/// Row `0` is the bottom of the grid and column `0` the left, so offsets
/// grow with the row and column index.
///
/// ```rust
/// # use nxtools_model::{Corner, CountDirection, PixelGrid};
/// let grid = PixelGrid::builder()
///     .rows(3)
///     .columns(4)
///     .first_id(100)
///     .count_direction(CountDirection::Column)
///     .initial_count_corner(Corner::TopRight)
///     .build();
///
/// assert_eq!(grid.pixel_count(), 12);
/// assert!(grid.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PixelGrid {
    /// Number of rows
    pub rows: usize,
    /// Number of columns
    pub columns: usize,
    /// Distance between row centres
    pub row_height: f64,
    /// Distance between column centres
    pub col_width: f64,
    /// Detector id of the first pixel
    pub first_id: i64,
    /// Order in which ids are assigned
    pub count_direction: CountDirection,
    /// Corner holding `first_id`
    pub initial_count_corner: Corner,
}

impl PixelGrid {
    /// Get an instance of the [PixelGridBuilder]
    pub fn builder() -> PixelGridBuilder {
        PixelGridBuilder::default()
    }

    /// Total number of pixels
    pub fn pixel_count(&self) -> usize {
        self.rows * self.columns
    }

    /// Check the grid has pixels and positive spacing
    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.columns == 0 {
            return Err(Error::InvalidPixelGrid(f!(
                "found {} rows and {} columns",
                self.rows,
                self.columns
            )));
        }

        for (name, value) in [("row_height", self.row_height), ("col_width", self.col_width)] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(Error::InvalidPixelGrid(f!(
                    "{name} must be positive, found {value}"
                )));
            }
        }

        Ok(())
    }
}

impl Default for PixelGrid {
    fn default() -> Self {
        PixelGridBuilder::default().build()
    }
}

/// Builder implementation for a [PixelGrid]
#[derive(Debug)]
pub struct PixelGridBuilder {
    rows: usize,
    columns: usize,
    row_height: f64,
    col_width: f64,
    first_id: i64,
    count_direction: CountDirection,
    initial_count_corner: Corner,
}

impl PixelGridBuilder {
    /// Create a new instance of the builder with default parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the [PixelGrid] type
    pub fn build(self) -> PixelGrid {
        PixelGrid {
            rows: self.rows,
            columns: self.columns,
            row_height: self.row_height,
            col_width: self.col_width,
            first_id: self.first_id,
            count_direction: self.count_direction,
            initial_count_corner: self.initial_count_corner,
        }
    }

    /// Number of rows
    pub fn rows(mut self, rows: usize) -> Self {
        self.rows = rows;
        self
    }

    /// Number of columns
    pub fn columns(mut self, columns: usize) -> Self {
        self.columns = columns;
        self
    }

    /// Distance between row centres
    pub fn row_height(mut self, row_height: f64) -> Self {
        self.row_height = row_height;
        self
    }

    /// Distance between column centres
    pub fn col_width(mut self, col_width: f64) -> Self {
        self.col_width = col_width;
        self
    }

    /// Detector id of the first pixel
    pub fn first_id(mut self, first_id: i64) -> Self {
        self.first_id = first_id;
        self
    }

    /// Order in which ids are assigned
    pub fn count_direction(mut self, direction: CountDirection) -> Self {
        self.count_direction = direction;
        self
    }

    /// Corner holding the first id
    pub fn initial_count_corner(mut self, corner: Corner) -> Self {
        self.initial_count_corner = corner;
        self
    }
}

impl Default for PixelGridBuilder {
    fn default() -> Self {
        Self {
            rows: 1,
            columns: 1,
            row_height: 1.0,
            col_width: 1.0,
            first_id: 0,
            count_direction: CountDirection::Row,
            initial_count_corner: Corner::BottomLeft,
        }
    }
}

/// Detector id for every face of a mesh
///
/// Indexed by face, with `None` for faces that are not part of a detector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PixelMapping {
    /// Detector id of each face
    pub pixel_ids: Vec<Option<i64>>,
}

impl PixelMapping {
    /// Mapping from a list of optional ids
    pub fn new(pixel_ids: Vec<Option<i64>>) -> Self {
        Self { pixel_ids }
    }

    /// Number of faces covered
    pub fn len(&self) -> usize {
        self.pixel_ids.len()
    }

    /// True if no faces are covered
    pub fn is_empty(&self) -> bool {
        self.pixel_ids.is_empty()
    }

    /// Number of faces with a detector id
    pub fn mapped_count(&self) -> usize {
        self.pixel_ids.iter().flatten().count()
    }
}

/// Pixel layout of a detector
#[derive(Debug, Clone, PartialEq)]
pub enum PixelData {
    /// The whole shape is one pixel with this id
    SinglePixel(i64),
    /// The shape is one pixel of a regular grid
    Grid(PixelGrid),
    /// Faces of the shape are mapped to detector ids
    Mapping(PixelMapping),
}

impl From<PixelGrid> for PixelData {
    fn from(grid: PixelGrid) -> Self {
        PixelData::Grid(grid)
    }
}

impl From<PixelMapping> for PixelData {
    fn from(mapping: PixelMapping) -> Self {
        PixelData::Mapping(mapping)
    }
}
