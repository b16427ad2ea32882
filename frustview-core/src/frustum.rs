/// World-space reconstruction of a camera's view volume
use nalgebra::{Matrix4, Point3};
use tracing::debug;

use crate::error::{Error, MatrixRole, Result};

/// Determinants at or below this magnitude are treated as singular
const SINGULAR_EPSILON: f32 = 1e-12;

/// Homogeneous `w` values at or below this magnitude cannot be divided out
const W_EPSILON: f32 = 1e-12;

/// The NDC cube as a corner table plus the edge list that joins it.
///
/// The two arrays are co-dependent: edge `(a, b)` refers to slots in
/// `corners`, so the enumeration order must never change on its own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubeTopology {
    pub corners: [[f32; 3]; 8],
    pub edges: [(usize, usize); 12],
}

/// Corner `i` takes x from bit 2, y from bit 1 and z from bit 0 of `i`
/// (0 maps to -1, 1 to +1). Even slots lie on the near plane (z = -1).
pub const NDC_CUBE: CubeTopology = CubeTopology {
    corners: [
        [-1.0, -1.0, -1.0], // 0
        [-1.0, -1.0, 1.0],  // 1
        [-1.0, 1.0, -1.0],  // 2
        [-1.0, 1.0, 1.0],   // 3
        [1.0, -1.0, -1.0],  // 4
        [1.0, -1.0, 1.0],   // 5
        [1.0, 1.0, -1.0],   // 6
        [1.0, 1.0, 1.0],    // 7
    ],
    edges: [
        (0, 1),
        (0, 2),
        (0, 4),
        (3, 1),
        (3, 2),
        (3, 7),
        (5, 1),
        (5, 4),
        (5, 7),
        (6, 2),
        (6, 4),
        (6, 7),
    ],
};

const NEAR_SLOTS: [usize; 4] = [0, 2, 4, 6];
const FAR_SLOTS: [usize; 4] = [1, 3, 5, 7];

/// The eight world-space corners of a view frustum.
///
/// Corner slots follow [`NDC_CUBE`]. Recomputed from the camera matrices
/// every frame; holds no other state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    corners: [Point3<f32>; 8],
}

impl Frustum {
    /// Unproject the NDC cube through the inverse projection and then the
    /// inverse view, dividing by `w` after each step.
    ///
    /// Fails with `SingularMatrix` instead of producing non-finite corners.
    pub fn from_matrices(projection: &Matrix4<f32>, view: &Matrix4<f32>) -> Result<Self> {
        let inv_projection = invert(projection, MatrixRole::Projection)?;
        let inv_view = invert(view, MatrixRole::View)?;

        let mut corners = [Point3::origin(); 8];
        for (corner, ndc) in corners.iter_mut().zip(NDC_CUBE.corners.iter()) {
            let ndc = Point3::new(ndc[0], ndc[1], ndc[2]);
            let eye = dehomogenize(&inv_projection, &ndc, MatrixRole::Projection)?;
            *corner = dehomogenize(&inv_view, &eye, MatrixRole::View)?;
        }

        debug!(near = ?corners[0], far = ?corners[7], "Rebuilt frustum corners");
        Ok(Self { corners })
    }

    pub fn corners(&self) -> &[Point3<f32>; 8] {
        &self.corners
    }

    /// Corners on the near plane, in slot order
    pub fn near_corners(&self) -> [Point3<f32>; 4] {
        NEAR_SLOTS.map(|slot| self.corners[slot])
    }

    /// Corners on the far plane, in slot order
    pub fn far_corners(&self) -> [Point3<f32>; 4] {
        FAR_SLOTS.map(|slot| self.corners[slot])
    }

    /// The twelve cube edges as world-space line segments
    pub fn segments(&self) -> impl Iterator<Item = (Point3<f32>, Point3<f32>)> + '_ {
        NDC_CUBE
            .edges
            .iter()
            .map(move |&(a, b)| (self.corners[a], self.corners[b]))
    }
}

fn invert(matrix: &Matrix4<f32>, which: MatrixRole) -> Result<Matrix4<f32>> {
    let singular = Error::SingularMatrix { which };

    let det = matrix.determinant();
    if !det.is_finite() || det.abs() <= SINGULAR_EPSILON {
        return Err(singular);
    }

    let inverse = matrix.try_inverse().ok_or(Error::SingularMatrix { which })?;
    if inverse.iter().any(|v| !v.is_finite()) {
        return Err(singular);
    }
    Ok(inverse)
}

fn dehomogenize(matrix: &Matrix4<f32>, point: &Point3<f32>, which: MatrixRole) -> Result<Point3<f32>> {
    let h = matrix * point.to_homogeneous();
    if !h.w.is_finite() || h.w.abs() <= W_EPSILON {
        return Err(Error::SingularMatrix { which });
    }

    Point3::from_homogeneous(h)
        .filter(|p| p.iter().all(|c| c.is_finite()))
        .ok_or(Error::SingularMatrix { which })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::perspective;

    #[test]
    fn test_corner_table_matches_bit_order() {
        for (i, corner) in NDC_CUBE.corners.iter().enumerate() {
            let sign = |bit: usize| if i & (1 << bit) != 0 { 1.0 } else { -1.0 };
            assert_eq!(*corner, [sign(2), sign(1), sign(0)]);
        }
    }

    #[test]
    fn test_edges_are_the_cube_graph() {
        let mut degree = [0; 8];
        for &(a, b) in &NDC_CUBE.edges {
            // Cube edges join corners that differ in exactly one axis
            assert_eq!((a ^ b).count_ones(), 1, "({a}, {b})");
            degree[a] += 1;
            degree[b] += 1;
        }
        assert_eq!(degree, [3; 8]);

        let mut sorted: Vec<_> = NDC_CUBE
            .edges
            .iter()
            .map(|&(a, b)| (a.min(b), a.max(b)))
            .collect();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), 12);
    }

    #[test]
    fn test_identity_view_perspective() {
        let projection = perspective(1.0, 60f32.to_radians(), 1.0, 10.0);
        let frustum = Frustum::from_matrices(&projection, &Matrix4::identity()).unwrap();

        for corner in frustum.near_corners() {
            assert!((corner.z + 1.0).abs() < 1e-4, "{corner:?}");
        }
        for corner in frustum.far_corners() {
            assert!((corner.z + 10.0).abs() < 1e-3, "{corner:?}");
        }
    }

    #[test]
    fn test_zero_view_is_singular() {
        let projection = perspective(1.0, 1.0, 1.0, 10.0);
        let err = Frustum::from_matrices(&projection, &Matrix4::zeros()).unwrap_err();
        assert!(matches!(
            err,
            Error::SingularMatrix {
                which: MatrixRole::View
            }
        ));
    }

    #[test]
    fn test_segments_follow_edge_table() {
        let projection = perspective(1.0, 1.0, 1.0, 10.0);
        let frustum = Frustum::from_matrices(&projection, &Matrix4::identity()).unwrap();
        let segments: Vec<_> = frustum.segments().collect();
        assert_eq!(segments.len(), 12);
        assert_eq!(segments[5], (frustum.corners()[3], frustum.corners()[7]));
    }
}
