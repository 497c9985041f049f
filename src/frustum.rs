use arrayvec::ArrayVec;
use assert2::assert;
use nalgebra::{Matrix4, Vector4};

use crate::geometry::{
    FloatType, FrustumStatus, PackedPlane, Plane, WorldBox, WorldPoint, WorldPoint8,
    classify_corners,
};

/// Six view planes plus room for custom clip planes.
pub const MAX_PLANE_COUNT: usize = 10;

/// Largest polygon that still fits a frustum as edge planes next to a near and far plane.
pub const MAX_POLYGON_VERTICES: usize = MAX_PLANE_COUNT - 2;

/// Clip space depth convention of a projection matrix.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DepthRange {
    /// OpenGL style, `-w <= z <= w`
    NegativeOneToOne,
    /// Direct3D / Vulkan style, `0 <= z <= w`
    ZeroToOne,
}

impl DepthRange {
    fn min_z(self) -> FloatType {
        match self {
            DepthRange::NegativeOneToOne => -1.0,
            DepthRange::ZeroToOne => 0.0,
        }
    }
}

/// Convex volume given as an intersection of half-spaces.
/// A point is inside iff it is on the non-negative side of every plane.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frustum {
    planes: ArrayVec<Plane, MAX_PLANE_COUNT>,
}

impl Frustum {
    pub fn new() -> Frustum {
        Frustum::default()
    }

    /// Panics if there are more than `MAX_PLANE_COUNT` planes.
    pub fn with_planes(planes: impl IntoIterator<Item = Plane>) -> Frustum {
        let mut frustum = Frustum::new();
        for plane in planes {
            frustum.push(plane);
        }
        frustum
    }

    /// Panics if the frustum already has `MAX_PLANE_COUNT` planes.
    pub fn push(&mut self, plane: Plane) {
        assert!(
            !self.planes.is_full(),
            "Frustum can have at most {MAX_PLANE_COUNT} planes"
        );
        self.planes.push(plane);
    }

    pub fn planes(&self) -> &[Plane] {
        &self.planes
    }

    pub fn contains_point(&self, point: &WorldPoint) -> bool {
        self.planes.iter().all(|p| p.signed_distance(point) >= 0.0)
    }

    /// Splats the planes for 8-wide box tests.
    pub fn packed(&self) -> PackedFrustum {
        PackedFrustum {
            planes: self.planes.iter().map(PackedPlane::from).collect(),
        }
    }

    /// Extracts the six view planes (near, far, left, right, bottom, top) from a
    /// view-projection matrix using the Gribb-Hartmann method.
    pub fn from_view_projection(view_projection: &Matrix4<FloatType>, depth: DepthRange) -> Frustum {
        let [r0, r1, _, r3] = rows(view_projection);
        let [near, far] = near_far_planes(view_projection, depth);
        Frustum::with_planes([
            near,
            far,
            Plane::from_coefficients(&(r3 + r0)),
            Plane::from_coefficients(&(r3 - r0)),
            Plane::from_coefficients(&(r3 + r1)),
            Plane::from_coefficients(&(r3 - r1)),
        ])
    }

    /// Clips a convex polygon to the frustum, Sutherland-Hodgman style.
    ///
    /// Vertices within a small tolerance of a plane are kept as they are. If clipping
    /// by some plane would need more than `MAX_POLYGON_VERTICES` vertices, the result
    /// clipped by the previous planes is returned, which is larger than the exact one.
    /// Fewer than 3 vertices in the result means the polygon is outside.
    /// Panics if the polygon has more than `MAX_POLYGON_VERTICES` vertices.
    pub fn clip_polygon(&self, polygon: &[WorldPoint]) -> ArrayVec<WorldPoint, MAX_POLYGON_VERTICES> {
        assert!(polygon.len() <= MAX_POLYGON_VERTICES);

        let mut clipped: ArrayVec<_, MAX_POLYGON_VERTICES> = polygon.iter().copied().collect();
        for plane in &self.planes {
            if clipped.len() < 3 {
                break;
            }
            let Some(next) = clip_by_plane(&clipped, plane) else {
                break;
            };
            clipped = next;
        }
        clipped
    }

    /// Adds one plane per edge of a convex polygon, each through the edge and `eye`.
    ///
    /// Polygon winding doesn't matter, every edge plane is oriented so that the
    /// polygon is inside.
    pub(crate) fn push_edge_planes(&mut self, eye: &WorldPoint, polygon: &[WorldPoint]) {
        let polygon_center = WorldPoint::from(
            polygon.iter().map(|p| p.coords).sum::<nalgebra::Vector3<FloatType>>()
                / (polygon.len() as FloatType),
        );

        let mut prev = polygon[polygon.len() - 1];
        for curr in polygon {
            let normal = (eye - curr).cross(&(curr - prev));
            let plane = Plane::through_point(normal, curr);
            self.push(if plane.signed_distance(&polygon_center) < 0.0 {
                plane.flipped()
            } else {
                plane
            });
            prev = *curr;
        }
    }
}

/// Distance from a plane under which a polygon vertex counts as lying on it.
const CLIP_EPSILON: FloatType = 1e-3;

/// One Sutherland-Hodgman step, None if the result doesn't fit.
fn clip_by_plane(
    polygon: &[WorldPoint],
    plane: &Plane,
) -> Option<ArrayVec<WorldPoint, MAX_POLYGON_VERTICES>> {
    let mut clipped = ArrayVec::new();
    let mut entering_cuts = 0;

    let mut prev = polygon[polygon.len() - 1];
    let mut prev_distance = plane.signed_distance(&prev);
    for &curr in polygon {
        let distance = plane.signed_distance(&curr);
        let crossing = || prev + (curr - prev) * (prev_distance / (prev_distance - distance));

        if distance > CLIP_EPSILON {
            if prev_distance < -CLIP_EPSILON {
                entering_cuts += 1;
                if entering_cuts == 1 {
                    clipped.try_push(crossing()).ok()?;
                } else {
                    // Degenerate polygon crossing the plane inwards a second time,
                    // the crossing replaces the previous vertex
                    *clipped.last_mut()? = crossing();
                }
            }
            clipped.try_push(curr).ok()?;
        } else if distance < -CLIP_EPSILON {
            if prev_distance > CLIP_EPSILON {
                clipped.try_push(crossing()).ok()?;
            }
        } else {
            clipped.try_push(curr).ok()?;
        }

        prev = curr;
        prev_distance = distance;
    }

    Some(clipped)
}

fn rows(m: &Matrix4<FloatType>) -> [Vector4<FloatType>; 4] {
    std::array::from_fn(|i| m.row(i).transpose())
}

pub(crate) fn near_far_planes(view_projection: &Matrix4<FloatType>, depth: DepthRange) -> [Plane; 2] {
    let [_, _, r2, r3] = rows(view_projection);
    [
        Plane::from_coefficients(&(r2 - r3 * depth.min_z())),
        Plane::from_coefficients(&(r3 - r2)),
    ]
}

/// Frustum planes splatted across SIMD lanes, built once per query.
#[derive(Clone, Debug)]
pub struct PackedFrustum {
    planes: ArrayVec<PackedPlane, MAX_PLANE_COUNT>,
}

impl PackedFrustum {
    pub fn classify(&self, corners: &WorldPoint8) -> FrustumStatus {
        classify_corners(&self.planes, corners)
    }

    pub fn classify_box(&self, bounds: &WorldBox) -> FrustumStatus {
        self.classify(&bounds.corners())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geometry::WorldVector;

    use assert2::assert;
    use nalgebra::{Isometry3, Perspective3};
    use test_case::test_case;

    /// Camera at origin looking along -z, 90 degree vertical and horizontal fov,
    /// near 1, far 100.
    fn gl_view_projection() -> Matrix4<FloatType> {
        let projection = Perspective3::new(1.0, std::f32::consts::FRAC_PI_2, 1.0, 100.0);
        let view = Isometry3::look_at_rh(
            &WorldPoint::origin(),
            &WorldPoint::new(0.0, 0.0, -1.0),
            &WorldVector::y(),
        );
        projection.as_matrix() * view.to_homogeneous()
    }

    /// Same camera with clip depth remapped to [0, 1].
    fn zero_to_one_view_projection() -> Matrix4<FloatType> {
        #[rustfmt::skip]
        let remap = Matrix4::new(
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 0.5, 0.5,
            0.0, 0.0, 0.0, 1.0,
        );
        remap * gl_view_projection()
    }

    #[test_case( 0.0,  0.0,  -10.0, true  ; "center")]
    #[test_case( 9.0,  0.0,  -10.0, true  ; "near_right_edge")]
    #[test_case(11.0,  0.0,  -10.0, false ; "right_of_view")]
    #[test_case(-11.0, 0.0,  -10.0, false ; "left_of_view")]
    #[test_case( 0.0,  11.0, -10.0, false ; "above_view")]
    #[test_case( 0.0, -11.0, -10.0, false ; "below_view")]
    #[test_case( 0.0,  0.0,   10.0, false ; "behind_camera")]
    #[test_case( 0.0,  0.0,   -0.5, false ; "before_near")]
    #[test_case( 0.0,  0.0, -200.0, false ; "after_far")]
    #[test_case( 0.0,  0.0,  -99.0, true  ; "before_far")]
    fn view_projection_planes(x: FloatType, y: FloatType, z: FloatType, inside: bool) {
        let p = WorldPoint::new(x, y, z);
        for frustum in [
            Frustum::from_view_projection(&gl_view_projection(), DepthRange::NegativeOneToOne),
            Frustum::from_view_projection(&zero_to_one_view_projection(), DepthRange::ZeroToOne),
        ] {
            assert!(frustum.planes().len() == 6);
            assert!(frustum.contains_point(&p) == inside);
        }
    }

    #[test]
    fn extracted_planes_are_normalized() {
        let frustum =
            Frustum::from_view_projection(&gl_view_projection(), DepthRange::NegativeOneToOne);
        for plane in frustum.planes() {
            assert!((plane.normal.norm() - 1.0).abs() < 1e-5);
        }
        // Near plane is at distance 1 from the camera
        let near = frustum.planes()[0];
        assert!((near.signed_distance(&WorldPoint::new(0.0, 0.0, -3.0)) - 2.0).abs() < 1e-3);
    }

    fn square(clockwise: bool) -> Vec<WorldPoint> {
        let mut square = vec![
            WorldPoint::new(-1.0, -1.0, -5.0),
            WorldPoint::new(1.0, -1.0, -5.0),
            WorldPoint::new(1.0, 1.0, -5.0),
            WorldPoint::new(-1.0, 1.0, -5.0),
        ];
        if clockwise {
            square.reverse();
        }
        square
    }

    #[test_case(0.0, 0.0, -10.0, true ; "center")]
    #[test_case(1.5, 1.5, -10.0, true ; "corner")]
    #[test_case(3.0, 0.0, -10.0, false ; "beside")]
    #[test_case(0.0, -3.0, -10.0, false ; "below")]
    fn edge_planes(x: FloatType, y: FloatType, z: FloatType, inside: bool) {
        let p = WorldPoint::new(x, y, z);
        for clockwise in [false, true] {
            let mut frustum = Frustum::new();
            frustum.push_edge_planes(&WorldPoint::origin(), &square(clockwise));
            assert!(frustum.planes().len() == 4);
            assert!(frustum.contains_point(&p) == inside, "clockwise: {clockwise}");
        }
    }

    /// Slab `-1 <= x <= 1`
    fn x_slab() -> Frustum {
        Frustum::with_planes([
            Plane::new(WorldVector::x(), 1.0),
            Plane::new(-WorldVector::x(), 1.0),
        ])
    }

    fn quad(min: [FloatType; 2], max: [FloatType; 2]) -> Vec<WorldPoint> {
        vec![
            WorldPoint::new(min[0], min[1], 0.0),
            WorldPoint::new(max[0], min[1], 0.0),
            WorldPoint::new(max[0], max[1], 0.0),
            WorldPoint::new(min[0], max[1], 0.0),
        ]
    }

    #[test]
    fn clip_polygon_inside_is_unchanged() {
        let polygon = quad([-0.5, 0.0], [0.5, 1.0]);
        assert!(x_slab().clip_polygon(&polygon).as_slice() == polygon.as_slice());
    }

    #[test]
    fn clip_polygon_outside_is_empty() {
        assert!(x_slab().clip_polygon(&quad([2.0, 0.0], [3.0, 1.0])).len() < 3);
    }

    #[test]
    fn clip_polygon_cuts_both_sides() {
        let clipped = x_slab().clip_polygon(&quad([-4.0, 0.0], [4.0, 1.0]));
        assert!(clipped.len() == 4);
        for p in &clipped {
            assert!(p.x.abs() <= 1.0 + 1e-6);
            assert!(p.y == 0.0 || p.y == 1.0);
        }
        let has_x = |x: FloatType| clipped.iter().any(|p| (p.x - x).abs() < 1e-6);
        assert!(has_x(-1.0));
        assert!(has_x(1.0));
    }

    #[test]
    fn clip_polygon_corner_adds_vertex() {
        // Triangle with one vertex sticking out through x = 1
        let triangle = [
            WorldPoint::new(0.0, 0.0, 0.0),
            WorldPoint::new(2.0, 0.0, 0.0),
            WorldPoint::new(0.0, 2.0, 0.0),
        ];
        let clipped = x_slab().clip_polygon(&triangle);
        assert!(clipped.len() == 4);
        assert!(clipped.contains(&WorldPoint::new(1.0, 0.0, 0.0)));
        assert!(clipped.contains(&WorldPoint::new(1.0, 1.0, 0.0)));
    }

    #[test]
    #[should_panic]
    fn too_many_planes() {
        Frustum::with_planes(
            (0..=MAX_PLANE_COUNT).map(|_| Plane::new(WorldVector::x(), 0.0)),
        );
    }

    #[test]
    #[should_panic]
    fn polygon_too_large() {
        let polygon: Vec<_> = (0..=MAX_POLYGON_VERTICES)
            .map(|i| {
                let angle = i as FloatType;
                WorldPoint::new(angle.cos(), angle.sin(), -5.0)
            })
            .collect();
        x_slab().clip_polygon(&polygon);
    }

    #[test]
    fn packed_classification() {
        let frustum =
            Frustum::from_view_projection(&gl_view_projection(), DepthRange::NegativeOneToOne);
        let packed = frustum.packed();

        let inside = WorldBox::new(WorldPoint::new(-1.0, -1.0, -11.0), WorldPoint::new(1.0, 1.0, -9.0));
        let straddling = WorldBox::new(WorldPoint::new(5.0, -1.0, -11.0), WorldPoint::new(15.0, 1.0, -9.0));
        let outside = WorldBox::new(WorldPoint::new(-1.0, -1.0, 5.0), WorldPoint::new(1.0, 1.0, 6.0));

        assert!(packed.classify_box(&inside) == FrustumStatus::In);
        assert!(packed.classify_box(&straddling) == FrustumStatus::Intersecting);
        assert!(packed.classify_box(&outside) == FrustumStatus::Out);
    }
}
