// Copyright 2025 the Stratum Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive box type and the scalar abstraction the backends measure with.

use core::cmp::Ordering;
use core::fmt::Debug;

/// Axis-aligned bounding box in 2D.
///
/// Boxes are closed: a box whose edge touches another box's edge intersects it,
/// and a zero-sized box (a point) is a valid, non-empty box.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Aabb2D<T> {
    /// Minimum x (left)
    pub min_x: T,
    /// Minimum y (top)
    pub min_y: T,
    /// Maximum x (right)
    pub max_x: T,
    /// Maximum y (bottom)
    pub max_y: T,
}

impl<T> Aabb2D<T> {
    /// Create a new AABB from already ordered min/max corners.
    pub const fn new(min_x: T, min_y: T, max_x: T, max_y: T) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }
}

impl<T: Copy + PartialOrd> Aabb2D<T> {
    /// Create an AABB from two arbitrary corners, ordering each axis.
    ///
    /// ```
    /// use stratum_index::Aabb2D;
    /// assert_eq!(Aabb2D::from_corners(10, 4, 2, 8), Aabb2D::new(2, 4, 10, 8));
    /// ```
    pub fn from_corners(x0: T, y0: T, x1: T, y1: T) -> Self {
        Self {
            min_x: min_t(x0, x1),
            min_y: min_t(y0, y1),
            max_x: max_t(x0, x1),
            max_y: max_t(y0, y1),
        }
    }

    /// A degenerate box covering exactly one point.
    pub const fn point(x: T, y: T) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }

    /// Whether this AABB contains the point (edges included).
    pub fn contains_point(&self, x: T, y: T) -> bool {
        le(self.min_x, x) && le(self.min_y, y) && le(x, self.max_x) && le(y, self.max_y)
    }

    /// Whether `other` lies entirely inside this box (edges included).
    pub fn contains(&self, other: &Self) -> bool {
        le(self.min_x, other.min_x)
            && le(self.min_y, other.min_y)
            && le(other.max_x, self.max_x)
            && le(other.max_y, self.max_y)
    }

    /// Whether the two boxes share at least one point.
    pub fn intersects(&self, other: &Self) -> bool {
        le(other.min_x, self.max_x)
            && le(other.min_y, self.max_y)
            && le(self.min_x, other.max_x)
            && le(self.min_y, other.max_y)
    }

    /// The smallest box covering both inputs.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min_x: min_t(self.min_x, other.min_x),
            min_y: min_t(self.min_y, other.min_y),
            max_x: max_t(self.max_x, other.max_x),
            max_y: max_t(self.max_y, other.max_y),
        }
    }

    /// The overlapping region of two boxes; inverted when they don't meet.
    pub fn intersect(&self, other: &Self) -> Self {
        Self {
            min_x: max_t(self.min_x, other.min_x),
            min_y: max_t(self.min_y, other.min_y),
            max_x: min_t(self.max_x, other.max_x),
            max_y: min_t(self.max_y, other.max_y),
        }
    }

    /// Return true if the box is inverted. Assumes no NaN.
    pub fn is_empty(&self) -> bool {
        lt(self.max_x, self.min_x) || lt(self.max_y, self.min_y)
    }
}

impl<T: Scalar> Aabb2D<T> {
    /// Create an AABB from origin and size. Negative sizes are normalized.
    pub fn from_xywh(x: T, y: T, w: T, h: T) -> Self {
        Self::from_corners(x, y, T::add(x, w), T::add(y, h))
    }

    /// Width of the box (zero when inverted).
    pub fn width(&self) -> T {
        T::max_zero(T::sub(self.max_x, self.min_x))
    }

    /// Height of the box (zero when inverted).
    pub fn height(&self) -> T {
        T::max_zero(T::sub(self.max_y, self.min_y))
    }
}

/// Numeric scalar abstraction for the backends.
///
/// Area and margin metrics are computed in a widened accumulator type
/// (`f32` to `f64`, `i64` to `i128`) so split decisions stay stable for large
/// coordinates.
pub trait Scalar: Copy + PartialOrd + Debug {
    /// Widened accumulator type for area/margin metrics.
    type Acc: Copy
        + PartialOrd
        + core::ops::Add<Output = Self::Acc>
        + core::ops::Sub<Output = Self::Acc>
        + core::ops::Mul<Output = Self::Acc>
        + Debug;

    /// Add two scalar values.
    fn add(a: Self, b: Self) -> Self;

    /// Subtract two scalar values: a - b.
    fn sub(a: Self, b: Self) -> Self;

    /// Zero value for the scalar type.
    fn zero() -> Self;

    /// Max of the scalar value and zero.
    fn max_zero(v: Self) -> Self;

    /// Convert a scalar to the accumulator type.
    fn widen(v: Self) -> Self::Acc;
}

macro_rules! float_scalar {
    ($t:ty, $acc:ty) => {
        impl Scalar for $t {
            type Acc = $acc;

            #[inline]
            fn add(a: Self, b: Self) -> Self {
                a + b
            }

            #[inline]
            fn sub(a: Self, b: Self) -> Self {
                a - b
            }

            #[inline]
            fn zero() -> Self {
                0.0
            }

            #[inline]
            fn max_zero(v: Self) -> Self {
                if v > 0.0 { v } else { 0.0 }
            }

            #[inline]
            fn widen(v: Self) -> Self::Acc {
                <$acc>::from(v)
            }
        }
    };
}

float_scalar!(f32, f64);
float_scalar!(f64, f64);

impl Scalar for i64 {
    type Acc = i128;

    #[inline]
    fn add(a: Self, b: Self) -> Self {
        a.saturating_add(b)
    }

    #[inline]
    fn sub(a: Self, b: Self) -> Self {
        a.saturating_sub(b)
    }

    #[inline]
    fn zero() -> Self {
        0
    }

    #[inline]
    fn max_zero(v: Self) -> Self {
        v.max(0)
    }

    #[inline]
    fn widen(v: Self) -> Self::Acc {
        i128::from(v)
    }
}

/// Helper alias for the widened accumulator type associated with a scalar `T`.
pub type ScalarAcc<T> = <T as Scalar>::Acc;

/// Area of a box in the widened accumulator type.
#[inline]
pub fn area<T: Scalar>(a: &Aabb2D<T>) -> T::Acc {
    T::widen(a.width()) * T::widen(a.height())
}

/// Half perimeter of a box; the R-tree split picks the axis minimizing it.
#[inline]
pub fn margin<T: Scalar>(a: &Aabb2D<T>) -> T::Acc {
    T::widen(a.width()) + T::widen(a.height())
}

/// Area of the overlap between two boxes (zero when disjoint).
#[inline]
pub fn intersection_area<T: Scalar>(a: &Aabb2D<T>, b: &Aabb2D<T>) -> T::Acc {
    area(&a.intersect(b))
}

/// How much `a` grows in area when extended to cover `b`.
#[inline]
pub fn enlargement<T: Scalar>(a: &Aabb2D<T>, b: &Aabb2D<T>) -> T::Acc {
    area(&a.union(b)) - area(a)
}

pub(crate) fn min_t<T: PartialOrd + Copy>(a: T, b: T) -> T {
    match a.partial_cmp(&b) {
        Some(Ordering::Greater) => b,
        _ => a,
    }
}

pub(crate) fn max_t<T: PartialOrd + Copy>(a: T, b: T) -> T {
    match a.partial_cmp(&b) {
        Some(Ordering::Less) => b,
        _ => a,
    }
}

pub(crate) fn le<T: PartialOrd>(a: T, b: T) -> bool {
    matches!(a.partial_cmp(&b), Some(Ordering::Less | Ordering::Equal))
}

pub(crate) fn lt<T: PartialOrd>(a: T, b: T) -> bool {
    matches!(a.partial_cmp(&b), Some(Ordering::Less))
}

pub(crate) fn cmp_t<T: PartialOrd>(a: &T, b: &T) -> Ordering {
    a.partial_cmp(b).unwrap_or(Ordering::Equal)
}
