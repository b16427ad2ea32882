/// Face records: corner references, polygons and triangles
use std::num::NonZeroU32;

use crate::error::{Attribute, Error, Result};

/// One face corner as written in the file: `pos[/tex][/norm]`.
///
/// Every slot is 1-based and may be absent. Only the position and normal
/// slots are ever dereferenced; the texture slot is kept for completeness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CornerRef {
    pub position: Option<NonZeroU32>,
    pub texcoord: Option<NonZeroU32>,
    pub normal: Option<NonZeroU32>,
}

/// A corner with both required slots present, converted to 0-based indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedCorner {
    pub position: usize,
    pub normal: usize,
}

impl CornerRef {
    /// Build a corner from raw 1-based slot values, where 0 means absent.
    pub fn from_slots(position: u32, texcoord: u32, normal: u32) -> Self {
        Self {
            position: NonZeroU32::new(position),
            texcoord: NonZeroU32::new(texcoord),
            normal: NonZeroU32::new(normal),
        }
    }

    /// Convert to 0-based position and normal indices.
    ///
    /// Bounds are not checked here, only slot presence.
    pub fn resolve(&self) -> Result<ResolvedCorner> {
        let position = self.position.ok_or(Error::MissingAttribute {
            attribute: Attribute::Position,
        })?;
        let normal = self.normal.ok_or(Error::MissingAttribute {
            attribute: Attribute::Normal,
        })?;

        Ok(ResolvedCorner {
            position: position.get() as usize - 1,
            normal: normal.get() as usize - 1,
        })
    }
}

/// A face with at least three corners in file winding order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Polygon {
    corners: Vec<CornerRef>,
}

impl Polygon {
    /// Create a polygon from the corners of the face on `line`.
    pub fn new(corners: Vec<CornerRef>, line: usize) -> Result<Self> {
        if corners.len() < 3 {
            return Err(Error::MalformedFace {
                line,
                corners: corners.len(),
            });
        }
        Ok(Self { corners })
    }

    pub fn corners(&self) -> &[CornerRef] {
        &self.corners
    }

    /// Number of triangles the fan split produces
    pub fn triangle_count(&self) -> usize {
        self.corners.len() - 2
    }

    /// Fan-triangulate around the first corner.
    ///
    /// Yields `(c0, ci, ci+1)` for `i` in `1..n-1`. Only correct for convex,
    /// planar polygons; anything else still produces well-formed triangles.
    pub fn triangulate(&self) -> impl Iterator<Item = Triangle> + '_ {
        let anchor = self.corners[0];
        self.corners[1..]
            .windows(2)
            .map(move |pair| Triangle::new(anchor, pair[0], pair[1]))
    }
}

/// A triangle defined by three face corners
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triangle {
    pub corners: [CornerRef; 3],
}

impl Triangle {
    pub fn new(c0: CornerRef, c1: CornerRef, c2: CornerRef) -> Self {
        Self {
            corners: [c0, c1, c2],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corner(position: u32, normal: u32) -> CornerRef {
        CornerRef::from_slots(position, 0, normal)
    }

    fn ngon(n: u32) -> Polygon {
        Polygon::new((1..=n).map(|i| corner(i, 1)).collect(), 1).unwrap()
    }

    #[test]
    fn test_fan_triangle_counts() {
        for n in 3..=12 {
            let polygon = ngon(n);
            let triangles: Vec<_> = polygon.triangulate().collect();
            assert_eq!(triangles.len(), n as usize - 2);
            assert_eq!(polygon.triangle_count(), n as usize - 2);
            for triangle in &triangles {
                assert_eq!(triangle.corners[0], polygon.corners()[0]);
            }
        }
    }

    #[test]
    fn test_fan_preserves_winding() {
        let polygon = ngon(5);
        let order: Vec<[u32; 3]> = polygon
            .triangulate()
            .map(|t| t.corners.map(|c| c.position.unwrap().get()))
            .collect();
        assert_eq!(order, vec![[1, 2, 3], [1, 3, 4], [1, 4, 5]]);
    }

    #[test]
    fn test_polygon_needs_three_corners() {
        let err = Polygon::new(vec![corner(1, 1), corner(2, 1)], 4).unwrap_err();
        assert!(matches!(err, Error::MalformedFace { line: 4, corners: 2 }));
        assert!(Polygon::new(vec![corner(1, 1), corner(2, 1), corner(3, 1)], 4).is_ok());
    }

    #[test]
    fn test_resolve_is_zero_based() {
        let resolved = CornerRef::from_slots(3, 7, 2).resolve().unwrap();
        assert_eq!(resolved, ResolvedCorner { position: 2, normal: 1 });
    }

    #[test]
    fn test_resolve_rejects_absent_slots() {
        let err = CornerRef::from_slots(3, 1, 0).resolve().unwrap_err();
        assert!(matches!(
            err,
            Error::MissingAttribute {
                attribute: Attribute::Normal
            }
        ));

        let err = CornerRef::from_slots(0, 0, 1).resolve().unwrap_err();
        assert!(matches!(
            err,
            Error::MissingAttribute {
                attribute: Attribute::Position
            }
        ));
    }
}
