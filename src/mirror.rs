//! Views of the scene as seen in planar mirrors, including mirrors seen in other mirrors.

use arrayvec::ArrayVec;
use assert2::assert;
use nalgebra::{Matrix3, Matrix4};

use crate::{
    camera::Camera,
    frustum::{DepthRange, Frustum, MAX_POLYGON_VERTICES, near_far_planes},
    geometry::{EPSILON, FloatType, Plane, WorldPoint},
    scene::{CullingBvh, QueryStack, culling_bvh::SourceId},
};

/// Flat convex mirror.
#[derive(Clone, Debug)]
pub struct Mirror {
    polygon: ArrayVec<WorldPoint, MAX_POLYGON_VERTICES>,
    /// Reflective side is inside
    plane: Plane,
}

impl Mirror {
    /// The reflective side is the one from which the vertices appear clockwise.
    /// Panics if the polygon has less than 3 or more than `MAX_POLYGON_VERTICES` vertices,
    /// or if its first three vertices are collinear.
    pub fn new(polygon: &[WorldPoint]) -> Mirror {
        assert!(polygon.len() >= 3);
        assert!(polygon.len() <= MAX_POLYGON_VERTICES);

        let (v0, v1, v2) = (polygon[0], polygon[1], polygon[2]);
        let normal = (v2 - v0).cross(&(v1 - v0));
        assert!(normal.norm() > EPSILON, "Mirror vertices must not be collinear");

        Mirror {
            polygon: polygon.iter().copied().collect(),
            plane: Plane::through_point(normal, &v0),
        }
    }

    pub fn polygon(&self) -> &[WorldPoint] {
        &self.polygon
    }

    pub fn plane(&self) -> &Plane {
        &self.plane
    }

    /// Affine transformation that mirrors the space across the mirror plane.
    pub fn reflection(&self) -> Matrix4<FloatType> {
        let n = self.plane.normal;
        let linear = Matrix3::identity() - n * n.transpose() * 2.0;
        Matrix4::new_translation(&(n * (-2.0 * self.plane.offset))) * linear.to_homogeneous()
    }

    pub fn reflect_point(&self, point: &WorldPoint) -> WorldPoint {
        *point - self.plane.normal * (2.0 * self.plane.signed_distance(point))
    }
}

/// Camera matrices and culling frustum of a single view, either a camera or its
/// reflection in a mirror.
#[derive(Clone, Debug)]
pub struct View {
    pub eye: WorldPoint,
    pub view: Matrix4<FloatType>,
    pub projection: Matrix4<FloatType>,
    pub depth: DepthRange,
    pub frustum: Frustum,
}

impl From<&Camera> for View {
    fn from(camera: &Camera) -> Self {
        View {
            eye: camera.center(),
            view: camera.view(),
            projection: camera.projection(),
            depth: DepthRange::NegativeOneToOne,
            frustum: camera.frustum(),
        }
    }
}

impl View {
    pub fn view_projection(&self) -> Matrix4<FloatType> {
        self.projection * self.view
    }

    /// View of the scene as seen in a mirror, or None if the mirror faces away from
    /// the eye or is outside of the frustum.
    ///
    /// The eye is reflected across the mirror plane and the mirror plane becomes the
    /// near plane, so nothing behind the mirror is visible. The far plane is the
    /// reflection of this view's far plane, the remaining planes go through the edges
    /// of the part of the mirror that is inside this view's frustum.
    pub fn reflected(&self, mirror: &Mirror) -> Option<View> {
        if mirror.plane().signed_distance(&self.eye) <= 0.0 {
            return None;
        }

        let visible_part = self.frustum.clip_polygon(mirror.polygon());
        if visible_part.len() < 3 {
            return None;
        }

        let view = self.view * mirror.reflection();
        let eye = mirror.reflect_point(&self.eye);
        let [_, far] = near_far_planes(&(self.projection * view), self.depth);

        let mut frustum = Frustum::with_planes([*mirror.plane(), far]);
        frustum.push_edge_planes(&eye, &visible_part);

        Some(View {
            eye,
            view,
            projection: self.projection,
            depth: self.depth,
            frustum,
        })
    }
}

/// Node of the tree of views through mirrors.
#[derive(Clone, Debug)]
pub struct MirrorView {
    pub view: View,
    /// Index of the parent view in the tree, None for the root
    pub parent: Option<usize>,
    /// Index of the mirror this view is seen through, None for the root
    pub mirror: Option<usize>,
    /// Number of reflections, 0 for the root
    pub depth: usize,
}

/// Static set of mirrors with a culling BVH over them, one source per mirror.
#[derive(Clone, Debug)]
pub struct MirrorSet {
    mirrors: Vec<Mirror>,
    bvh: CullingBvh,
}

impl MirrorSet {
    pub fn new(mirrors: Vec<Mirror>) -> MirrorSet {
        let vertices: Vec<WorldPoint> = mirrors
            .iter()
            .flat_map(|m| m.polygon().iter().copied())
            .collect();

        // Triangle fan for every mirror
        let mut indices = Vec::new();
        let mut source_ids = Vec::new();
        let mut first = 0u32;
        for (source, mirror) in mirrors.iter().enumerate() {
            let count = mirror.polygon().len() as u32;
            for i in 1..count - 1 {
                indices.extend([first, first + i, first + i + 1]);
                source_ids.push(source as SourceId);
            }
            first += count;
        }

        MirrorSet {
            bvh: CullingBvh::build(&vertices, &indices, &source_ids),
            mirrors,
        }
    }

    pub fn mirrors(&self) -> &[Mirror] {
        &self.mirrors
    }

    /// Tree of the root view and all views through mirrors visible from it, up to
    /// `max_depth` reflections deep. Stored depth first, the root at index 0.
    ///
    /// A view never looks into the mirror it is seen through.
    pub fn gather_views(&self, root: View, max_depth: usize) -> Vec<MirrorView> {
        let mut tree = vec![MirrorView {
            view: root,
            parent: None,
            mirror: None,
            depth: 0,
        }];
        let mut stack = QueryStack::default();
        self.gather_recursive(&mut tree, 0, max_depth, &mut stack);

        log::debug!("Gathered {} views through mirrors", tree.len() - 1);
        tree
    }

    fn gather_recursive(
        &self,
        tree: &mut Vec<MirrorView>,
        parent: usize,
        max_depth: usize,
        stack: &mut QueryStack,
    ) {
        if tree[parent].depth >= max_depth {
            return;
        }

        let mut visible = vec![false; self.mirrors.len()];
        self.bvh
            .find_visible_sources(&tree[parent].view.frustum, &mut visible, stack);

        for (index, mirror) in self.mirrors.iter().enumerate() {
            if !visible[index] || tree[parent].mirror == Some(index) {
                continue;
            }
            let Some(view) = tree[parent].view.reflected(mirror) else {
                continue;
            };

            let depth = tree[parent].depth + 1;
            tree.push(MirrorView {
                view,
                parent: Some(parent),
                mirror: Some(index),
                depth,
            });
            self.gather_recursive(tree, tree.len() - 1, max_depth, stack);
        }
    }
}
