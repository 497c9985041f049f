use assert2::assert;
use bon::bon;
use nalgebra::{Isometry3, Matrix4, Perspective3, Unit};

use crate::{
    frustum::{DepthRange, Frustum},
    geometry::{EPSILON, FloatType, WorldPoint, WorldVector},
};

/// Perspective camera, OpenGL conventions (looks along -z in view space, depth in `[-1, 1]`).
#[derive(Copy, Clone, Debug)]
pub struct Camera {
    center: WorldPoint,
    forward: Unit<WorldVector>,
    up: Unit<WorldVector>,

    projection: Perspective3<FloatType>,
}

#[bon]
impl Camera {
    /// `fov_y` is the vertical field of view in radians, `aspect` is width / height.
    #[builder]
    pub fn new(
        center: WorldPoint,
        forward: WorldVector,
        up: WorldVector,
        fov_y: FloatType,
        aspect: FloatType,
        near: FloatType,
        far: FloatType,
    ) -> Self {
        let forward = Unit::try_new(forward, EPSILON).expect("Forward vector must be non-zero");
        let up = Unit::try_new(up, EPSILON).expect("Up vector must be non-zero");
        let right = Unit::try_new(forward.cross(&up), EPSILON)
            .expect("`up` and `forward` must be linearly independent");
        let up = Unit::new_normalize(right.cross(&forward));

        assert!(fov_y > 0.0);
        assert!(fov_y < std::f32::consts::PI);
        assert!(aspect > 0.0);
        assert!(near > 0.0);
        assert!(far > near);

        Camera {
            center,
            forward,
            up,
            projection: Perspective3::new(aspect, fov_y, near, far),
        }
    }
}

impl Camera {
    pub fn center(&self) -> WorldPoint {
        self.center
    }

    pub fn view(&self) -> Matrix4<FloatType> {
        let target = self.center + self.forward.into_inner();
        Isometry3::look_at_rh(&self.center, &target, self.up.as_ref()).to_homogeneous()
    }

    pub fn projection(&self) -> Matrix4<FloatType> {
        *self.projection.as_matrix()
    }

    pub fn view_projection(&self) -> Matrix4<FloatType> {
        self.projection() * self.view()
    }

    /// View frustum of the camera: left, right, bottom, top, near and far planes.
    pub fn frustum(&self) -> Frustum {
        Frustum::from_view_projection(&self.view_projection(), DepthRange::NegativeOneToOne)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert2::assert;
    use test_case::test_case;

    /// X goes right, Y goes away, Z goes up
    fn camera() -> Camera {
        Camera::builder()
            .center(WorldPoint::new(0.0, 0.0, 0.0))
            .forward(WorldVector::new(0.0, 1.0, 0.0))
            .up(WorldVector::new(0.0, 0.0, 1.0))
            .fov_y(std::f32::consts::FRAC_PI_2)
            .aspect(1.0)
            .near(1.0)
            .far(100.0)
            .build()
    }

    #[test]
    fn six_planes() {
        assert!(camera().frustum().planes().len() == 6);
    }

    #[test_case([0.0, 10.0, 0.0], true ; "ahead")]
    #[test_case([5.0, 10.0, -5.0], true ; "ahead_off_center")]
    #[test_case([0.0, -10.0, 0.0], false ; "behind")]
    #[test_case([0.0, 0.5, 0.0], false ; "before_near")]
    #[test_case([0.0, 150.0, 0.0], false ; "after_far")]
    #[test_case([20.0, 10.0, 0.0], false ; "right")]
    #[test_case([-20.0, 10.0, 0.0], false ; "left")]
    #[test_case([0.0, 10.0, 20.0], false ; "above")]
    #[test_case([0.0, 10.0, -20.0], false ; "below")]
    fn point_in_frustum(point: [FloatType; 3], expected: bool) {
        assert!(camera().frustum().contains_point(&WorldPoint::from(point)) == expected);
    }

    #[test]
    fn view_moves_center_to_origin() {
        let camera = Camera::builder()
            .center(WorldPoint::new(1.0, 2.0, 3.0))
            .forward(WorldVector::new(1.0, 0.0, 0.0))
            .up(WorldVector::new(0.0, 1.0, 0.0))
            .fov_y(1.0)
            .aspect(1.5)
            .near(0.1)
            .far(10.0)
            .build();
        let in_view = camera.view().transform_point(&camera.center());
        assert!(in_view.coords.norm() < 1e-6);

        // Forward maps to -z in view space
        let ahead = camera
            .view()
            .transform_point(&(camera.center() + WorldVector::new(2.0, 0.0, 0.0)));
        assert!((ahead.z + 2.0).abs() < 1e-5);
    }

    #[test]
    #[should_panic]
    fn collinear_up() {
        Camera::builder()
            .center(WorldPoint::new(0.0, 0.0, 0.0))
            .forward(WorldVector::new(0.0, 1.0, 0.0))
            .up(WorldVector::new(0.0, 2.0, 0.0))
            .fov_y(1.0)
            .aspect(1.0)
            .near(1.0)
            .far(10.0)
            .build();
    }

    #[test]
    #[should_panic]
    fn far_before_near() {
        Camera::builder()
            .center(WorldPoint::new(0.0, 0.0, 0.0))
            .forward(WorldVector::new(0.0, 1.0, 0.0))
            .up(WorldVector::new(0.0, 0.0, 1.0))
            .fov_y(1.0)
            .aspect(1.0)
            .near(10.0)
            .far(1.0)
            .build();
    }
}
