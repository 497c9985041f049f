pub mod culling_bvh;
mod obj;
mod random;

pub use culling_bvh::{CullingBvh, QueryStack};
pub use obj::ObjOpenError;
pub use random::TriangleSet;
