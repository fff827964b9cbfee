// standard library
use std::f64::consts::TAU;

// crate modules
use crate::chopper::ChopperDetails;
use crate::off::OffGeometry;

// external crates
use log::debug;
use nalgebra::Vector3;

/// Number of angular steps around a full disk
pub const RESOLUTION: usize = 20;

/// Half the thickness of the disk in metres
pub const HALF_THICKNESS: f64 = 0.025;

/// Size of the top dead centre arrow in metres
pub const ARROW_SIZE: f64 = 0.02;

/// Point ids of one slit boundary face
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointSet {
    /// Front point at the disk radius
    pub upper_front: usize,
    /// Back point at the disk radius
    pub upper_back: usize,
    /// Front point at the bottom of the slit
    pub lower_front: usize,
    /// Back point at the bottom of the slit
    pub lower_back: usize,
}

/// Builds the polygon mesh of a disk chopper
///
/// The disk lies in the XY plane with its front face at `+HALF_THICKNESS` and
/// its back face at `-HALF_THICKNESS`. Every point is given an id equal to its
/// position in the vertex list, and the faces reference those ids directly.
///
/// The front and back centre points always have ids `0` and `1`.
///
/// ```rust
/// # use nxtools_geometry::chopper::{ChopperDetails, DiskChopperGeometryCreator};
/// let details = ChopperDetails::from_radians(1, &[0.0, 1.0], 1.0, 0.3);
/// let mesh = DiskChopperGeometryCreator::new(&details)
///     .resolution(50)
///     .create_disk_chopper_geometry();
///
/// assert_eq!(mesh.vertices[0].z, 0.025);
/// assert_eq!(mesh.vertices[1].z, -0.025);
/// ```
#[derive(Debug, Clone)]
pub struct DiskChopperGeometryCreator {
    /// Mesh vertices, indexed by point id
    pub points: Vec<Vector3<f64>>,
    /// Faces as lists of point ids
    pub faces: Vec<Vec<usize>>,
    /// Half thickness of the disk
    pub z: f64,
    /// Size of the top dead centre arrow
    pub arrow_size: f64,
    /// Angles available for points between slit edges
    pub resolution_angles: Vec<f64>,
    /// Id of the front centre point
    pub front_centre: usize,
    /// Id of the back centre point
    pub back_centre: usize,
    radius: f64,
    slit_edges: Vec<f64>,
    slit_height: f64,
}

impl DiskChopperGeometryCreator {
    /// Start a new mesh for the given chopper
    pub fn new(details: &ChopperDetails) -> Self {
        let mut creator = Self {
            points: Vec::new(),
            faces: Vec::new(),
            z: HALF_THICKNESS,
            arrow_size: ARROW_SIZE,
            resolution_angles: Self::create_resolution_angles(RESOLUTION),
            front_centre: 0,
            back_centre: 1,
            radius: details.radius(),
            slit_edges: details.slit_edges().to_vec(),
            slit_height: details.slit_height(),
        };

        creator.front_centre = creator.add_point(Vector3::new(0.0, 0.0, HALF_THICKNESS));
        creator.back_centre = creator.add_point(Vector3::new(0.0, 0.0, -HALF_THICKNESS));
        creator
    }

    /// Number of angular steps around the full disk
    pub fn resolution(mut self, resolution: usize) -> Self {
        self.resolution_angles = Self::create_resolution_angles(resolution);
        self
    }

    /// Size of the top dead centre arrow
    pub fn arrow_size(mut self, arrow_size: f64) -> Self {
        self.arrow_size = arrow_size;
        self
    }

    /// Evenly spaced angles on `[0, 2π)`
    pub fn create_resolution_angles(resolution: usize) -> Vec<f64> {
        let resolution = resolution.max(1);
        (0..resolution)
            .map(|i| i as f64 * (TAU / resolution as f64))
            .collect()
    }

    /// Generate the full chopper mesh
    ///
    /// Each slit edge gets a boundary face. Between edges the disk is filled in
    /// with cake slices, at the disk radius for solid blade and at the bottom
    /// of the slit for slit openings.
    pub fn create_disk_chopper_geometry(mut self) -> OffGeometry {
        let radius = self.radius;
        let centre_to_slit_bottom = self.radius - self.slit_height;
        let edges = self.slit_edges.clone();

        let Some(first_edge) = edges.first().copied() else {
            return OffGeometry::new(self.points, self.faces);
        };

        let first = self.create_and_add_point_set(radius, centre_to_slit_bottom, first_edge, false);
        let mut prev = first;

        for (i, edge) in edges.iter().enumerate().skip(1) {
            let right_facing = i % 2 == 1;
            let current =
                self.create_and_add_point_set(radius, centre_to_slit_bottom, *edge, right_facing);

            if right_facing {
                // inside a slit, so the disk only reaches the slit bottom
                self.create_intermediate_points_and_faces(
                    edges[i - 1],
                    *edge,
                    (prev.lower_front, prev.lower_back),
                    (current.lower_front, current.lower_back),
                    centre_to_slit_bottom,
                );
            } else {
                self.create_intermediate_points_and_faces(
                    edges[i - 1],
                    *edge,
                    (prev.upper_front, prev.upper_back),
                    (current.upper_front, current.upper_back),
                    radius,
                );
            }
            prev = current;
        }

        // close the disk from the last edge back round to the first
        if let Some(last_edge) = edges.last().copied() {
            self.create_intermediate_points_and_faces(
                last_edge,
                first_edge,
                (prev.upper_front, prev.upper_back),
                (first.upper_front, first.upper_back),
                radius,
            );
        }

        debug!(
            "Created disk chopper mesh with {} points and {} faces",
            self.points.len(),
            self.faces.len()
        );
        OffGeometry::new(self.points, self.faces)
    }

    /// Add a point and return its id
    pub fn add_point(&mut self, point: Vector3<f64>) -> usize {
        self.points.push(point);
        self.points.len() - 1
    }

    /// Front and back points at polar coordinates `(r, theta)`
    pub fn create_mirrored_points(&self, r: f64, theta: f64) -> (Vector3<f64>, Vector3<f64>) {
        let (x, y) = (r * theta.cos(), r * theta.sin());
        (Vector3::new(x, y, self.z), Vector3::new(x, y, -self.z))
    }

    /// Add mirrored points and return the `(front, back)` ids
    pub fn create_and_add_mirrored_points(&mut self, r: f64, theta: f64) -> (usize, usize) {
        let (front, back) = self.create_mirrored_points(r, theta);
        (self.add_point(front), self.add_point(back))
    }

    /// Add the boundary face of a slit edge
    ///
    /// The face spans from the bottom of the slit up to the disk radius. Its
    /// winding flips with `right_facing` so the normal points into the slit.
    pub fn create_and_add_point_set(
        &mut self,
        radius: f64,
        centre_to_slit_start: f64,
        slit_edge: f64,
        right_facing: bool,
    ) -> PointSet {
        let (upper_front, upper_back) = self.create_and_add_mirrored_points(radius, slit_edge);
        let (lower_front, lower_back) =
            self.create_and_add_mirrored_points(centre_to_slit_start, slit_edge);

        let mut face = vec![lower_front, upper_front, upper_back, lower_back];
        if right_facing {
            face.reverse();
        }
        self.faces.push(face);

        PointSet {
            upper_front,
            upper_back,
            lower_front,
            lower_back,
        }
    }

    /// Add a triangle from the front centre through two points
    pub fn add_face_connected_to_front_centre(&mut self, first: usize, second: usize) {
        self.faces.push(vec![self.front_centre, first, second]);
    }

    /// Add a triangle from the back centre through two points
    pub fn add_face_connected_to_back_centre(&mut self, first: usize, second: usize) {
        self.faces.push(vec![self.back_centre, first, second]);
    }

    /// Add one slice of the disk at `theta`, joined to the previous points
    ///
    /// Adds an outer quad plus front and back triangles, and returns the new
    /// `(back, front)` ids.
    pub fn create_cake_slice(
        &mut self,
        theta: f64,
        prev_back: usize,
        prev_front: usize,
        r: f64,
    ) -> (usize, usize) {
        let (current_front, current_back) = self.create_and_add_mirrored_points(r, theta);

        self.faces
            .push(vec![prev_front, prev_back, current_back, current_front]);
        self.add_face_connected_to_front_centre(prev_front, current_front);
        self.add_face_connected_to_back_centre(current_back, prev_back);

        (current_back, current_front)
    }

    /// Resolution angles strictly between two edges
    ///
    /// If the range wraps through zero the angles above `first` come first,
    /// followed by those below `second`.
    pub fn intermediate_angles(&self, first: f64, second: f64) -> Vec<f64> {
        if first > second {
            let above = self.resolution_angles.iter().filter(|a| **a > first);
            let below = self.resolution_angles.iter().filter(|a| **a < second);
            above.chain(below).copied().collect()
        } else {
            self.resolution_angles
                .iter()
                .filter(|a| **a > first && **a < second)
                .copied()
                .collect()
        }
    }

    /// Fill the disk between two edges with cake slices
    ///
    /// `first` and `second` are `(front, back)` point ids at the two edges. The
    /// top dead centre arrow is added if the range wraps through zero.
    pub fn create_intermediate_points_and_faces(
        &mut self,
        first_angle: f64,
        second_angle: f64,
        first: (usize, usize),
        second: (usize, usize),
        r: f64,
    ) {
        let (mut prev_front, mut prev_back) = first;
        let (second_front, second_back) = second;

        for angle in self.intermediate_angles(first_angle, second_angle) {
            (prev_back, prev_front) = self.create_cake_slice(angle, prev_back, prev_front, r);
        }

        self.faces
            .push(vec![prev_front, prev_back, second_back, second_front]);
        self.add_face_connected_to_front_centre(prev_front, second_front);
        self.add_face_connected_to_back_centre(second_back, prev_back);

        if first_angle > second_angle {
            self.add_top_dead_centre_arrow(r);
        }
    }

    /// Add a triangular arrow on the front face pointing along +Z at angle 0
    pub fn add_top_dead_centre_arrow(&mut self, r: f64) {
        let centre = self.add_point(Vector3::new(r, 0.0, self.z));
        let right = self.add_point(Vector3::new(r + self.arrow_size, 0.0, self.z + self.arrow_size));
        let left = self.add_point(Vector3::new(r - self.arrow_size, 0.0, self.z + self.arrow_size));
        self.faces.push(vec![centre, right, left]);
    }
}

#[cfg(test)]
mod creator_tests {
    use super::*;
    use nxtools_utils::VectorExt;
    use std::f64::consts::PI;

    fn creator() -> DiskChopperGeometryCreator {
        let details = ChopperDetails::from_radians(
            3,
            &[0.0, 0.757, 1.431, 2.62, 3.84, 4.37],
            0.3,
            0.07,
        );
        DiskChopperGeometryCreator::new(&details).resolution(100)
    }

    #[test]
    fn starts_with_centre_points() {
        let creator = creator();
        assert!(creator.faces.is_empty());
        assert_eq!(creator.points.len(), 2);
        assert_eq!(creator.points[0], Vector3::new(0.0, 0.0, HALF_THICKNESS));
        assert_eq!(creator.points[1], Vector3::new(0.0, 0.0, -HALF_THICKNESS));
    }

    #[test]
    fn mirrored_points() {
        let creator = creator();
        let (front, back) = creator.create_mirrored_points(2.0_f64.sqrt(), PI / 4.0);
        assert!(front.is_close(&Vector3::new(1.0, 1.0, HALF_THICKNESS)));
        assert!(back.is_close(&Vector3::new(1.0, 1.0, -HALF_THICKNESS)));
    }

    #[test]
    fn point_set_winding() {
        let mut creator = creator();

        let left = creator.create_and_add_point_set(1.0, 0.5, 0.0, false);
        assert_eq!(creator.points[left.upper_front], Vector3::new(1.0, 0.0, HALF_THICKNESS));
        assert_eq!(creator.points[left.lower_back], Vector3::new(0.5, 0.0, -HALF_THICKNESS));
        assert_eq!(
            creator.faces.last().unwrap(),
            &vec![left.lower_front, left.upper_front, left.upper_back, left.lower_back]
        );

        let right = creator.create_and_add_point_set(1.0, 0.5, 0.0, true);
        assert_eq!(
            creator.faces.last().unwrap(),
            &vec![right.lower_back, right.upper_back, right.upper_front, right.lower_front]
        );
    }

    #[test]
    fn cake_slice_faces() {
        let mut creator = creator();
        let (prev_front, prev_back) = creator.create_and_add_mirrored_points(10.0, PI);
        let (current_back, current_front) = creator.create_cake_slice(PI, prev_back, prev_front, 10.0);

        assert!(creator.points[current_front].is_close(&Vector3::new(-10.0, 0.0, HALF_THICKNESS)));
        let n = creator.faces.len();
        assert_eq!(creator.faces[n - 3], vec![prev_front, prev_back, current_back, current_front]);
        assert_eq!(creator.faces[n - 2], vec![0, prev_front, current_front]);
        assert_eq!(creator.faces[n - 1], vec![1, current_back, prev_back]);
    }

    #[test]
    fn intermediate_points_between_edges() {
        let mut creator = creator();
        let (first, second) = (80.0_f64.to_radians(), 100.0_f64.to_radians());
        creator.resolution_angles = vec![first, PI / 2.0, second];

        let first_points = creator.create_and_add_mirrored_points(10.0, first);
        let second_points = creator.create_and_add_mirrored_points(10.0, second);
        creator.create_intermediate_points_and_faces(first, second, first_points, second_points, 10.0);

        let n = creator.points.len();
        assert!(creator.points[n - 2].is_close(&Vector3::new(0.0, 10.0, HALF_THICKNESS)));
        assert!(creator.points[n - 1].is_close(&Vector3::new(0.0, 10.0, -HALF_THICKNESS)));

        let (front, back) = (n - 2, n - 1);
        let faces = &creator.faces[creator.faces.len() - 6..];
        assert_eq!(faces[0], vec![first_points.0, first_points.1, back, front]);
        assert_eq!(faces[3], vec![front, back, second_points.1, second_points.0]);
        assert_eq!(faces[4], vec![0, front, second_points.0]);
        assert_eq!(faces[5], vec![1, second_points.1, back]);
    }

    #[test]
    fn arrow_added_when_wrapping_through_zero() {
        let mut creator = creator();
        let (first, second) = (350.0_f64.to_radians(), 10.0_f64.to_radians());
        creator.resolution_angles = vec![0.0, second, first];

        let first_points = creator.create_and_add_mirrored_points(10.0, first);
        let second_points = creator.create_and_add_mirrored_points(10.0, second);
        creator.create_intermediate_points_and_faces(first, second, first_points, second_points, 10.0);

        let n = creator.points.len();
        assert_eq!(creator.points[n - 3], Vector3::new(10.0, 0.0, HALF_THICKNESS));
        assert_eq!(
            creator.points[n - 2],
            Vector3::new(10.0 + ARROW_SIZE, 0.0, HALF_THICKNESS + ARROW_SIZE)
        );
        assert_eq!(creator.faces.last().unwrap(), &vec![n - 3, n - 2, n - 1]);
    }

    #[test]
    fn wrapped_intermediate_angles() {
        let creator = creator();
        let angles = creator.intermediate_angles(1.5, 0.5);
        let split = angles.iter().position(|a| *a < 1.5).unwrap();

        assert!(angles[..split].iter().all(|a| *a > 1.5));
        assert!(angles[split..].iter().all(|a| *a < 0.5));
    }

    #[test]
    fn resolution_angles() {
        assert_eq!(DiskChopperGeometryCreator::create_resolution_angles(1), vec![0.0]);
        let angles = DiskChopperGeometryCreator::create_resolution_angles(5);
        assert_eq!(angles.len(), 5);
        assert_eq!(angles[1], TAU / 5.0);
    }
}
