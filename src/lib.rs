mod camera;
pub mod frustum;
pub mod geometry;
pub mod mirror;
pub mod scene;
mod util;

pub use camera::Camera;
pub use frustum::{DepthRange, Frustum};
pub use scene::{CullingBvh, QueryStack, TriangleSet};
pub use util::Stats;
