/// Interleaved vertex buffer assembly
use std::mem::size_of;
use std::path::Path;

use nalgebra::Point3;
use tracing::info;

use crate::error::{Attribute, Error, Result};
use crate::geometry::Triangle;
use crate::obj::{load_obj_file, ObjModel};

/// Attribute layout of one interleaved vertex, position first.
///
/// Offsets and sizes are in `f32` components; the `*_bytes` helpers give
/// the values a GPU attribute binding expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexLayout {
    pub stride: usize,
    pub position_offset: usize,
    pub position_size: usize,
    pub normal_offset: usize,
    pub normal_size: usize,
}

impl VertexLayout {
    pub fn stride_bytes(&self) -> usize {
        self.stride * size_of::<f32>()
    }

    pub fn position_offset_bytes(&self) -> usize {
        self.position_offset * size_of::<f32>()
    }

    pub fn normal_offset_bytes(&self) -> usize {
        self.normal_offset * size_of::<f32>()
    }
}

/// One vertex record borrowed from a [`MeshBuffer`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterleavedVertex<'a> {
    components: &'a [f32],
    position_dim: usize,
}

impl<'a> InterleavedVertex<'a> {
    pub fn components(&self) -> &'a [f32] {
        self.components
    }

    pub fn position(&self) -> &'a [f32] {
        &self.components[..self.position_dim]
    }

    pub fn normal(&self) -> &'a [f32] {
        &self.components[self.position_dim..]
    }
}

/// Flat, non-indexed vertex stream ready for upload.
///
/// Every triangle owns three consecutive vertices; nothing is shared or
/// deduplicated. Once assembled the buffer is never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshBuffer {
    data: Vec<f32>,
    position_dim: usize,
    normal_dim: usize,
    vertex_count: usize,
    triangle_count: usize,
}

impl MeshBuffer {
    /// Load an OBJ file and assemble it in one step
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let model = load_obj_file(path)?;
        Self::assemble(&model)
    }

    /// Assemble the fan-triangulated faces of a parsed model
    pub fn assemble(model: &ObjModel) -> Result<Self> {
        Self::assemble_triangles(&model.positions, &model.normals, model.triangles())
    }

    /// Resolve each triangle corner against the raw arrays and interleave
    /// position and normal, in triangle order then corner order.
    ///
    /// The per-attribute widths are fixed by the first position and first
    /// normal; a corner whose position or normal has another width is a
    /// `ShapeMismatch`.
    pub fn assemble_triangles<I>(
        positions: &[Vec<f32>],
        normals: &[Vec<f32>],
        triangles: I,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = Triangle>,
    {
        let position_dim = positions.first().map_or(0, Vec::len);
        let normal_dim = normals.first().map_or(0, Vec::len);
        let stride = position_dim + normal_dim;

        let triangles = triangles.into_iter();
        let mut data = Vec::with_capacity(triangles.size_hint().0 * 3 * stride);
        let mut vertex_count = 0;
        let mut triangle_count = 0;

        for triangle in triangles {
            for corner in &triangle.corners {
                let resolved = corner.resolve()?;
                let position = lookup(positions, resolved.position, Attribute::Position)?;
                let normal = lookup(normals, resolved.normal, Attribute::Normal)?;

                check_width(Attribute::Position, position, position_dim, vertex_count)?;
                check_width(Attribute::Normal, normal, normal_dim, vertex_count)?;

                data.extend_from_slice(position);
                data.extend_from_slice(normal);
                vertex_count += 1;
            }
            triangle_count += 1;
        }

        let buffer = Self {
            data,
            position_dim,
            normal_dim,
            vertex_count,
            triangle_count,
        };
        buffer.validate()?;

        info!(
            triangles = buffer.triangle_count,
            vertices = buffer.vertex_count,
            stride = stride,
            "Assembled mesh buffer"
        );
        Ok(buffer)
    }

    /// Check the count and shape invariants of the assembled buffer.
    pub fn validate(&self) -> Result<()> {
        if self.vertex_count != 3 * self.triangle_count {
            return Err(Error::ShapeMismatch {
                expected: format!("{} vertices", 3 * self.triangle_count),
                found: format!("{} vertices", self.vertex_count),
            });
        }
        if self.data.len() != self.vertex_count * self.stride() {
            return Err(Error::ShapeMismatch {
                expected: format!("{} components", self.vertex_count * self.stride()),
                found: format!("{} components", self.data.len()),
            });
        }
        Ok(())
    }

    /// The whole buffer as one flat slice of components
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn triangle_count(&self) -> usize {
        self.triangle_count
    }

    pub fn is_empty(&self) -> bool {
        self.vertex_count == 0
    }

    /// Components per vertex
    pub fn stride(&self) -> usize {
        self.position_dim + self.normal_dim
    }

    pub fn position_dim(&self) -> usize {
        self.position_dim
    }

    pub fn normal_dim(&self) -> usize {
        self.normal_dim
    }

    pub fn layout(&self) -> VertexLayout {
        VertexLayout {
            stride: self.stride(),
            position_offset: 0,
            position_size: self.position_dim,
            normal_offset: self.position_dim,
            normal_size: self.normal_dim,
        }
    }

    pub fn vertices(&self) -> impl Iterator<Item = InterleavedVertex<'_>> + '_ {
        let position_dim = self.position_dim;
        // Empty buffers may have a zero stride
        self.data
            .chunks_exact(self.stride().max(1))
            .map(move |components| InterleavedVertex {
                components,
                position_dim,
            })
    }

    /// Vertices grouped by the triangle that owns them
    pub fn triangles(&self) -> impl Iterator<Item = [InterleavedVertex<'_>; 3]> + '_ {
        let position_dim = self.position_dim;
        self.data
            .chunks_exact((self.stride() * 3).max(1))
            .map(move |run| {
                let stride = run.len() / 3;
                [0, 1, 2].map(|i| InterleavedVertex {
                    components: &run[i * stride..(i + 1) * stride],
                    position_dim,
                })
            })
    }

    /// Axis-aligned bounds of the first three position components
    pub fn bounds(&self) -> Option<(Point3<f32>, Point3<f32>)> {
        if self.position_dim < 3 {
            return None;
        }

        self.vertices().fold(None, |bounds, vertex| {
            let p = vertex.position();
            let point = Point3::new(p[0], p[1], p[2]);
            Some(match bounds {
                None => (point, point),
                Some((min, max)) => (min.inf(&point), max.sup(&point)),
            })
        })
    }
}

fn lookup(array: &[Vec<f32>], index: usize, attribute: Attribute) -> Result<&[f32]> {
    array
        .get(index)
        .map(Vec::as_slice)
        .ok_or(Error::IndexOutOfRange {
            attribute,
            index: index + 1,
            len: array.len(),
        })
}

fn check_width(attribute: Attribute, record: &[f32], expected: usize, vertex: usize) -> Result<()> {
    if record.len() == expected {
        return Ok(());
    }
    Err(Error::ShapeMismatch {
        expected: format!("{expected} {attribute} components"),
        found: format!("{} {attribute} components at vertex {vertex}", record.len()),
    })
}
