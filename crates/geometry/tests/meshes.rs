//! Integration tests for shape meshing and OFF files

use nalgebra::Vector3;
use nxtools_geometry::{
    off_to_string, parse_off, read_off, write_off, CylindricalGeometry, Geometry, OffGeometry,
};
use rstest::{fixture, rstest};

#[fixture]
fn cylinder() -> CylindricalGeometry {
    CylindricalGeometry::new("m", Vector3::new(1.0, 0.0, 0.0), 3.0, 4.0).unwrap()
}

fn close(a: &Vector3<f64>, b: &Vector3<f64>) -> bool {
    (a - b).norm() < 1e-9
}

#[rstest]
fn cylinder_derived_points(cylinder: CylindricalGeometry) {
    assert!(close(&cylinder.base_center_point(), &Vector3::zeros()));
    assert!(close(&cylinder.top_center_point(), &Vector3::new(3.0, 0.0, 0.0)));
    assert!((cylinder.base_edge_point().norm() - 4.0).abs() < 1e-9);
    assert!(cylinder.base_edge_point().x.abs() < 1e-9);
}

#[rstest]
#[case(3)]
#[case(4)]
#[case(20)]
#[case(64)]
fn cylinder_mesh_shape(cylinder: CylindricalGeometry, #[case] steps: usize) {
    let off = cylinder.off_geometry(steps);
    let axis = cylinder.axis_direction().normalize();

    assert_eq!(off.faces.len(), steps + 2);
    assert_eq!(off.vertices.len(), 2 * steps);

    // every base vertex sits on the circle around the axis at the base
    for v in &off.vertices[..steps] {
        let along = v.dot(&axis);
        let distance = (v - axis * along).norm();
        assert!(along.abs() < 1e-9);
        assert!((distance - 4.0).abs() < 1e-9);
    }

    // and every top vertex at the far end
    for v in &off.vertices[steps..] {
        assert!((v.dot(&axis) - 3.0).abs() < 1e-9);
    }
}

#[rstest]
#[case(Vector3::new(0.0, 0.0, 1.0))]
#[case(Vector3::new(0.0, 0.0, -1.0))]
#[case(Vector3::new(0.0, 2.0, 0.0))]
#[case(Vector3::new(1.0, -1.0, 3.0))]
fn cylinder_mesh_follows_axis(#[case] axis: Vector3<f64>) {
    let cylinder = CylindricalGeometry::new("m", axis, 2.0, 1.0).unwrap();
    let off = cylinder.off_geometry(10);
    let direction = axis.normalize();

    let top_centre = off.vertices[10..].iter().sum::<Vector3<f64>>() / 10.0;
    assert!(close(&top_centre, &(direction * 2.0)));
    assert!(close(&cylinder.top_center_point(), &(direction * 2.0)));
}

#[test]
fn cylinder_units_scale_mesh() {
    let cylinder = CylindricalGeometry::new("mm", Vector3::z(), 100.0, 50.0).unwrap();
    let off = cylinder.off_geometry(8);
    assert!((off.vertices[0].norm() - 0.05).abs() < 1e-12);
    assert!((off.vertices[8].z - 0.1).abs() < 1e-12);
}

#[test]
fn off_winding_flattening() {
    let off = OffGeometry::new(vec![Vector3::zeros(); 6], vec![vec![0, 1, 3, 2], vec![2, 3, 5, 4]]);

    assert_eq!(off.winding_order(), vec![0, 1, 3, 2, 2, 3, 5, 4]);
    assert_eq!(off.winding_order_indices(), vec![0, 4]);

    let rebuilt = OffGeometry::from_winding_order(
        off.vertices.clone(),
        &off.winding_order(),
        &off.winding_order_indices(),
    )
    .unwrap();
    assert_eq!(rebuilt, off);
}

#[test]
fn no_shape_is_a_cube() {
    let off = Geometry::NoShape.off_geometry();
    assert_eq!(off.vertices.len(), 8);
    assert_eq!(off.faces.len(), 6);
    assert_eq!(Geometry::NoShape.face_count(), 0);
}

#[test]
fn off_text_with_comments_and_colours() {
    let text = "\
# triangle and square
OFF 5 2 0
0 0 0
1 0 0
1 1 0
0 1 0
# apex
0.5 0.5 1
3 0 1 4 255 0 0
4 0 1 2 3
";
    let off = parse_off(text).unwrap();
    assert_eq!(off.vertices[4], Vector3::new(0.5, 0.5, 1.0));
    assert_eq!(off.faces, vec![vec![0, 1, 4], vec![0, 1, 2, 3]]);
}

#[rstest]
#[case("")]
#[case("PLY\n3 1 0\n")]
#[case("OFF\n3 1 0\n0 0 0\n1 0 0\n")]
#[case("OFF\n3 1 0\n0 0 0\n1 0 0\n0 1 0\n3 0 1 7\n")]
fn bad_off_text(#[case] text: &str) {
    assert!(parse_off(text).is_err());
}

#[test]
fn off_file_round_trip() {
    let path = std::env::temp_dir().join("nxtools_geometry_round_trip.off");
    let cylinder = CylindricalGeometry::new("m", Vector3::new(0.3, 0.2, 1.0), 1.5, 0.25).unwrap();
    let mesh = cylinder.off_geometry(12);

    write_off(&mesh, &path).unwrap();
    let read = read_off(&path, "m").unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(read.vertices, mesh.vertices);
    assert_eq!(read.faces, mesh.faces);
    assert_eq!(read.file_path, path.to_string_lossy());
    assert_eq!(off_to_string(&read), off_to_string(&mesh));
}
