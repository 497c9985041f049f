use rand::Rng;

use crate::geometry::{WorldPoint, WorldVector};

use super::culling_bvh::{CullingBvh, SourceId};

/// Indexed triangle set in the layout `CullingBvh::build` takes.
#[derive(Clone, Debug, Default)]
pub struct TriangleSet {
    pub vertices: Vec<WorldPoint>,
    pub indices: Vec<u32>,
    pub source_ids: Vec<SourceId>,
}

impl TriangleSet {
    /// Scene of `object_count` small clusters of triangles scattered in a cube of
    /// side `extent` centered at the origin. Every cluster is one source.
    pub fn random(
        rng: &mut impl Rng,
        object_count: u32,
        triangles_per_object: u32,
        extent: f32,
    ) -> TriangleSet {
        let mut set = TriangleSet::default();
        let half = extent / 2.0;

        for source in 0..object_count {
            let object_center = WorldPoint::new(
                rng.random_range(-half..=half),
                rng.random_range(-half..=half),
                rng.random_range(-half..=half),
            );
            let object_size = rng.random_range(0.1..=1.0f32);

            for _ in 0..triangles_per_object {
                for _ in 0..3 {
                    let offset = WorldVector::new(
                        rng.random_range(-1.0..=1.0),
                        rng.random_range(-1.0..=1.0),
                        rng.random_range(-1.0..=1.0),
                    );
                    set.indices.push(set.vertices.len() as u32);
                    set.vertices.push(object_center + offset * object_size);
                }
                set.source_ids.push(source);
            }
        }

        set
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn build(&self) -> CullingBvh {
        CullingBvh::build(&self.vertices, &self.indices, &self.source_ids)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::{SeedableRng, rngs::SmallRng};

    use assert2::assert;

    #[test]
    fn random_scene_shape() {
        let mut rng = SmallRng::seed_from_u64(1);
        let set = TriangleSet::random(&mut rng, 10, 5, 100.0);

        assert!(set.triangle_count() == 50);
        assert!(set.source_ids.len() == 50);
        assert!(set.vertices.len() == 150);
        assert!(set.vertices.iter().all(|v| v.coords.amax() <= 51.0));

        let bvh = set.build();
        assert!(bvh.source_count() == 10);
        assert!(bvh.leaves().count() == 50);
    }

    #[test]
    fn same_seed_same_scene() {
        let a = TriangleSet::random(&mut SmallRng::seed_from_u64(7), 3, 3, 10.0);
        let b = TriangleSet::random(&mut SmallRng::seed_from_u64(7), 3, 3, 10.0);
        assert!(a.vertices == b.vertices);
    }
}
