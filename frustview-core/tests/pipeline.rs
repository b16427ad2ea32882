/// End-to-end tests: OBJ text to interleaved buffer, and camera matrices to
/// frustum corners.
use std::path::PathBuf;

use frustview_core::{
    load_obj_file, parse_obj, perspective, Attribute, Camera, Error, Frustum, MatrixRole,
    MeshBuffer, NDC_CUBE,
};
use nalgebra::{Matrix4, Point3};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

const QUAD: &str = "\
v 0 0 0
v 1 0 0
v 0 1 0
v 1 1 0
vn 0 0 1
f 1//1 2//1 3//1 4//1
";

#[test]
fn quad_becomes_two_triangles() {
    let model = parse_obj(QUAD).unwrap();

    let positions: Vec<[u32; 3]> = model
        .triangles()
        .map(|t| t.corners.map(|c| c.position.unwrap().get()))
        .collect();
    assert_eq!(positions, vec![[1, 2, 3], [1, 3, 4]]);

    let buffer = MeshBuffer::assemble(&model).unwrap();
    assert_eq!(buffer.triangle_count(), 2);
    assert_eq!(buffer.vertex_count(), 6);
    assert_eq!(buffer.as_slice().len(), 36);
    for vertex in buffer.vertices() {
        assert_eq!(vertex.components().len(), 6);
        assert_eq!(vertex.normal(), &[0.0, 0.0, 1.0]);
    }

    let expected_positions = [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [1.0, 1.0, 0.0],
    ];
    for (vertex, expected) in buffer.vertices().zip(expected_positions.iter()) {
        assert_eq!(vertex.position(), expected);
    }
}

#[test]
fn cube_fixture_loads() {
    let model = load_obj_file(fixture("cube.obj")).unwrap();
    assert_eq!(model.positions.len(), 8);
    assert_eq!(model.normals.len(), 6);
    assert_eq!(model.polygons.len(), 6);

    let buffer = MeshBuffer::load(fixture("cube.obj")).unwrap();
    assert_eq!(buffer.triangle_count(), 12);
    assert_eq!(buffer.vertex_count(), 3 * buffer.triangle_count());
    assert_eq!(buffer.stride(), 6);
    assert!(buffer.validate().is_ok());

    let (min, max) = buffer.bounds().unwrap();
    assert_eq!(min, Point3::new(-0.5, -0.5, -0.5));
    assert_eq!(max, Point3::new(0.5, 0.5, 0.5));

    // Every corner of a triangle carries its face's normal
    for run in buffer.triangles() {
        assert_eq!(run[0].normal(), run[1].normal());
        assert_eq!(run[1].normal(), run[2].normal());
    }
}

#[test]
fn missing_file_is_io_error() {
    let err = load_obj_file(fixture("does-not-exist.obj")).unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
}

#[test]
fn n_gon_fans_into_n_minus_two_triangles() {
    let mut text = String::new();
    for i in 0..7 {
        let angle = i as f32 / 7.0 * std::f32::consts::TAU;
        text.push_str(&format!("v {} {} 0\n", angle.cos(), angle.sin()));
    }
    text.push_str("vn 0 0 1\nf");
    for i in 1..=7 {
        text.push_str(&format!(" {i}//1"));
    }
    text.push('\n');

    let model = parse_obj(&text).unwrap();
    let buffer = MeshBuffer::assemble(&model).unwrap();
    assert_eq!(buffer.triangle_count(), 5);

    let anchor = [1.0, 0.0, 0.0];
    for run in buffer.triangles() {
        assert_eq!(run[0].position(), &anchor);
    }
}

#[test]
fn two_corner_face_fails_whole_load() {
    let err = parse_obj("v 0 0 0\nv 1 0 0\nvn 0 0 1\nf 1//1 2//1\n").unwrap_err();
    assert!(matches!(err, Error::MalformedFace { corners: 2, .. }));
}

#[test]
fn position_past_end_is_out_of_range() {
    let model = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 4//1\n").unwrap();
    let err = MeshBuffer::assemble(&model).unwrap_err();
    assert!(matches!(
        err,
        Error::IndexOutOfRange {
            attribute: Attribute::Position,
            index: 4,
            len: 3
        }
    ));
}

fn prop_camera() -> (Matrix4<f32>, Matrix4<f32>) {
    let camera = Camera {
        fov: 45f32.to_radians(),
        aspect: 1.0,
        near: 1.0,
        far: 8.0,
        ..Camera::looking_at(Point3::new(-10.0, 0.0, 0.0), Point3::origin())
    };
    (camera.projection_matrix(), camera.view_matrix())
}

#[test]
fn frustum_round_trips_to_ndc() {
    let (projection, view) = prop_camera();
    let frustum = Frustum::from_matrices(&projection, &view).unwrap();

    for (world, ndc) in frustum.corners().iter().zip(NDC_CUBE.corners.iter()) {
        let eye = view.transform_point(world);
        let back = projection.transform_point(&eye);
        assert!((back.x - ndc[0]).abs() < 1e-3, "{back:?} vs {ndc:?}");
        assert!((back.y - ndc[1]).abs() < 1e-3, "{back:?} vs {ndc:?}");
        assert!((back.z - ndc[2]).abs() < 1e-3, "{back:?} vs {ndc:?}");
    }
}

#[test]
fn prop_camera_frustum_sits_between_eye_and_target() {
    let (projection, view) = prop_camera();
    let frustum = Frustum::from_matrices(&projection, &view).unwrap();

    // Looking down +x from x = -10: near plane at x = -9, far plane at x = -2
    for corner in frustum.near_corners() {
        assert!((corner.x + 9.0).abs() < 1e-3, "{corner:?}");
    }
    for corner in frustum.far_corners() {
        assert!((corner.x + 2.0).abs() < 1e-2, "{corner:?}");
    }
}

#[test]
fn identity_view_gives_distinct_finite_corners() {
    let projection = perspective(16.0 / 9.0, 30f32.to_radians(), 1.0, 500.0);
    let frustum = Frustum::from_matrices(&projection, &Matrix4::identity()).unwrap();
    let corners = frustum.corners();

    for corner in corners {
        assert!(corner.iter().all(|c| c.is_finite()));
    }
    for i in 0..8 {
        for j in (i + 1)..8 {
            assert!((corners[i] - corners[j]).norm() > 1e-3, "{i} and {j} coincide");
        }
    }

    // Camera looks down -z: near corners are closer along the view direction
    let nearest_far = frustum
        .far_corners()
        .iter()
        .map(|c| -c.z)
        .fold(f32::INFINITY, f32::min);
    for corner in frustum.near_corners() {
        assert!(-corner.z < nearest_far);
        assert!(corner.coords.norm() < corners[7].coords.norm());
    }
}

#[test]
fn near_equal_far_is_singular() {
    let projection = perspective(1.0, 45f32.to_radians(), 5.0, 5.0);
    let err = Frustum::from_matrices(&projection, &Matrix4::identity()).unwrap_err();
    assert!(matches!(
        err,
        Error::SingularMatrix {
            which: MatrixRole::Projection
        }
    ));

    let camera = Camera {
        near: 3.0,
        far: 3.0,
        ..Camera::default()
    };
    assert!(camera.frustum().is_err());
}
