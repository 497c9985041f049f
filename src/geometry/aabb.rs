use std::{array, ops::Sub};

use nalgebra::{ClosedAddAssign, ClosedDivAssign, Point, Scalar};
use num_traits::One;
use simba::simd::SimdValue as _;

use super::{Axis, FloatType, SimdFloatType, WorldBox, WorldPoint, WorldPoint8};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AABB<Point> {
    pub min: Point,
    pub max: Point,
}

impl<Point> AABB<Point> {
    pub fn new(min: Point, max: Point) -> AABB<Point> {
        AABB { min, max }
    }
}

impl<Point: Sub + Copy> AABB<Point> {
    pub fn size(&self) -> Point::Output {
        self.max - self.min
    }
}

impl<T: Scalar + ClosedAddAssign + ClosedDivAssign + One, const D: usize> AABB<Point<T, D>> {
    pub fn center(&self) -> Point<T, D> {
        let two = T::one() + T::one();
        let avg_coords = (&self.min.coords + &self.max.coords) / two;
        Point::from(avg_coords)
    }
}

impl WorldBox {
    /// Box that contains nothing, expanding it by anything results in that thing.
    pub fn empty() -> WorldBox {
        AABB {
            min: WorldPoint::from([FloatType::INFINITY; 3]),
            max: WorldPoint::from([FloatType::NEG_INFINITY; 3]),
        }
    }

    /// Smallest box containing all the given boxes, or the empty box if there are none.
    pub fn from_boxes<'a>(boxes: impl IntoIterator<Item = &'a WorldBox>) -> WorldBox {
        boxes.into_iter().fold(WorldBox::empty(), |mut acc, b| {
            acc.expand(b);
            acc
        })
    }

    /// Smallest box containing all the given points, or the empty box if there are none.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a WorldPoint>) -> WorldBox {
        points.into_iter().fold(WorldBox::empty(), |acc, p| AABB {
            min: acc.min.inf(p),
            max: acc.max.sup(p),
        })
    }

    pub fn expand(&mut self, other: &WorldBox) {
        self.min = self.min.inf(&other.min);
        self.max = self.max.sup(&other.max);
    }

    pub fn is_empty(&self) -> bool {
        (0..3).any(|i| self.min[i] > self.max[i])
    }

    pub fn contains(&self, other: &WorldBox) -> bool {
        (0..3).all(|i| self.min[i] <= other.min[i] && other.max[i] <= self.max[i])
    }

    /// Axis with the largest extent.
    /// Y and Z only win if they are strictly larger than both other axes, X wins ties.
    pub fn widest_axis(&self) -> Axis {
        let size = self.size();
        if size.y > size.x.max(size.z) {
            Axis::Y
        } else if size.z > size.x.max(size.y) {
            Axis::Z
        } else {
            Axis::X
        }
    }

    /// All 8 corners of the box, one per lane.
    /// Bit 0 of the lane index selects max x, bit 1 max y and bit 2 max z,
    /// so lane 0 is the min corner and lane 7 the max corner.
    pub fn corners(&self) -> WorldPoint8 {
        let axis_lanes = |axis: usize| {
            SimdFloatType::from(array::from_fn::<FloatType, 8, _>(|lane| {
                if lane & (1 << axis) == 0 {
                    self.min[axis]
                } else {
                    self.max[axis]
                }
            }))
        };
        WorldPoint8::new(axis_lanes(0), axis_lanes(1), axis_lanes(2))
    }

    /// Inverse of `corners`.
    pub fn from_corners(corners: &WorldPoint8) -> WorldBox {
        AABB {
            min: WorldPoint::new(
                corners.x.extract(0),
                corners.y.extract(0),
                corners.z.extract(0),
            ),
            max: WorldPoint::new(
                corners.x.extract(7),
                corners.y.extract(7),
                corners.z.extract(7),
            ),
        }
    }
}
