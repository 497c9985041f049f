use std::{fs, path::Path};

use indexmap::IndexMap;
use thiserror::Error;
use wavefront_obj::obj::{ObjSet, Primitive};

use crate::geometry::WorldPoint;

use super::culling_bvh::{CullingBvh, SourceId};

impl CullingBvh {
    /// Loads triangles from a Wavefront OBJ file, every object of the file
    /// becomes one source (in file order).
    pub fn with_obj(p: impl AsRef<Path>) -> Result<CullingBvh, ObjOpenError> {
        let content = fs::read_to_string(p)?;
        let parsed = wavefront_obj::obj::parse(content)?;

        Ok(Self::from_obj_set(parsed))
    }

    fn from_obj_set(obj: ObjSet) -> CullingBvh {
        // Keyed by (object, vertex within the object)
        let mut vertices = IndexMap::new();
        let mut indices = Vec::new();
        let mut source_ids = Vec::new();
        let mut skipped = 0usize;

        for (object_index, o) in obj.objects.iter().enumerate() {
            for geometry in &o.geometry {
                for shape in &geometry.shapes {
                    let Primitive::Triangle(a, b, c) = &shape.primitive else {
                        skipped += 1;
                        continue;
                    };

                    for &(vertex_index, _, _) in [a, b, c] {
                        let entry = vertices.entry((object_index, vertex_index));
                        indices.push(entry.index() as u32);
                        entry.or_insert_with(|| {
                            let vertex = &o.vertices[vertex_index];
                            WorldPoint::new(vertex.x as f32, vertex.y as f32, vertex.z as f32)
                        });
                    }
                    source_ids.push(object_index as SourceId);
                }
            }
        }

        if skipped > 0 {
            log::warn!("Skipped {skipped} non-triangle primitives");
        }

        let vertices: Vec<WorldPoint> = vertices.into_values().collect();
        CullingBvh::build(&vertices, &indices, &source_ids)
    }
}

#[derive(Debug, Error)]
pub enum ObjOpenError {
    #[error("Failed to read file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse file: {0}")]
    ParseError(#[from] wavefront_obj::ParseError),
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        frustum::Frustum,
        geometry::{Plane, WorldBox, WorldVector},
    };

    use assert2::{assert, let_assert};

    const TWO_OBJECTS: &str = "\
o first
v 0 0 0
v 1 0 0
v 0 1 0
v 1 1 0
f 1 2 3
f 2 4 3
o second
v 10 0 0
v 11 0 0
v 10 1 0
f 1 2 3
l 1 2
";

    fn parse(content: &str) -> CullingBvh {
        let_assert!(Ok(parsed) = wavefront_obj::obj::parse(content.to_string()));
        CullingBvh::from_obj_set(parsed)
    }

    #[test]
    fn one_source_per_object() {
        let bvh = parse(TWO_OBJECTS);
        assert!(bvh.source_count() == 2);
        assert!(bvh.node_count() == 5);
        assert!(
            bvh.bounding_box()
                == WorldBox::new(WorldPoint::new(0.0, 0.0, 0.0), WorldPoint::new(11.0, 1.0, 0.0))
        );
    }

    #[test]
    fn vertex_indices_are_per_object() {
        let bvh = parse(TWO_OBJECTS);
        let second: Vec<_> = bvh.leaves().filter(|leaf| leaf.source == 1).collect();
        let_assert!([leaf] = second.as_slice());
        assert!(leaf.bounds == WorldBox::new(WorldPoint::new(10.0, 0.0, 0.0), WorldPoint::new(11.0, 1.0, 0.0)));
    }

    #[test]
    fn query_loaded_scene() {
        let bvh = parse(TWO_OBJECTS);
        let frustum = Frustum::with_planes([Plane::new(WorldVector::x(), -5.0)]);
        assert!(bvh.visible_sources(&frustum) == vec![false, true]);
    }

    #[test]
    fn missing_file() {
        let_assert!(
            Err(ObjOpenError::ReadError(_)) = CullingBvh::with_obj("this/file/does/not/exist.obj")
        );
    }

    #[test]
    fn invalid_file() {
        let path = std::env::temp_dir().join(format!("minicull-invalid-{}.obj", std::process::id()));
        fs::write(&path, "f this is not a number\n").unwrap();
        let result = CullingBvh::with_obj(&path);
        fs::remove_file(&path).unwrap();
        let_assert!(Err(ObjOpenError::ParseError(_)) = result);
    }
}
