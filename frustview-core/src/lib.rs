/// frustview core library - mesh ingestion and frustum reconstruction
///
/// Turns a Wavefront OBJ file into a flat interleaved position + normal
/// vertex stream, and rebuilds a camera's view volume in world space from
/// its projection and view matrices. Nothing here touches a terminal or GPU.

pub mod buffer;
pub mod error;
pub mod frustum;
pub mod geometry;
pub mod obj;
pub mod projection;
pub mod transform;

// Re-export commonly used types
pub use buffer::{InterleavedVertex, MeshBuffer, VertexLayout};
pub use error::{Attribute, Error, MatrixRole, Result};
pub use frustum::{CubeTopology, Frustum, NDC_CUBE};
pub use geometry::{CornerRef, Polygon, ResolvedCorner, Triangle};
pub use obj::{load_obj_file, parse_obj, ObjModel};
pub use projection::{perspective, Camera};
pub use transform::ModelTransform;
