//! Operations on vectors of balls.
//!
//! The functions are generic over a [BallRing], so that they apply to real and complex
//! balls alike. All vectors must have the same length.

use super::{
    ball::{Ball, RealBallField},
    complex_ball::{ComplexBall, ComplexBallField},
    Ring,
};

/// A ring whose elements are balls, that supports enclosure predicates.
pub trait BallRing: Ring {
    /// The working precision of the ring.
    fn get_precision(&self) -> u32;
    /// Return true iff the two elements have a point in common.
    fn overlaps(a: &Self::Element, b: &Self::Element) -> bool;
    /// Return true iff `b` is a subset of `a`.
    fn contains(a: &Self::Element, b: &Self::Element) -> bool;
    fn is_finite(a: &Self::Element) -> bool;
    /// An element that contains everything.
    fn indeterminate(&self) -> Self::Element;
}

impl BallRing for RealBallField {
    #[inline]
    fn get_precision(&self) -> u32 {
        RealBallField::get_precision(self)
    }

    #[inline]
    fn overlaps(a: &Ball, b: &Ball) -> bool {
        a.overlaps(b)
    }

    #[inline]
    fn contains(a: &Ball, b: &Ball) -> bool {
        a.contains(b)
    }

    #[inline]
    fn is_finite(a: &Ball) -> bool {
        a.is_finite()
    }

    #[inline]
    fn indeterminate(&self) -> Ball {
        Ball::indeterminate()
    }
}

impl BallRing for ComplexBallField {
    #[inline]
    fn get_precision(&self) -> u32 {
        ComplexBallField::get_precision(self)
    }

    #[inline]
    fn overlaps(a: &ComplexBall, b: &ComplexBall) -> bool {
        a.overlaps(b)
    }

    #[inline]
    fn contains(a: &ComplexBall, b: &ComplexBall) -> bool {
        a.contains(b)
    }

    #[inline]
    fn is_finite(a: &ComplexBall) -> bool {
        a.is_finite()
    }

    #[inline]
    fn indeterminate(&self) -> ComplexBall {
        ComplexBall::indeterminate()
    }
}

pub fn vec_zero<R: Ring>(ring: &R, len: usize) -> Vec<R::Element> {
    vec![ring.zero(); len]
}

pub fn vec_add<R: Ring>(ring: &R, a: &[R::Element], b: &[R::Element]) -> Vec<R::Element> {
    assert_eq!(a.len(), b.len(), "Vector lengths differ");
    a.iter().zip(b).map(|(x, y)| ring.add(x, y)).collect()
}

pub fn vec_sub<R: Ring>(ring: &R, a: &[R::Element], b: &[R::Element]) -> Vec<R::Element> {
    assert_eq!(a.len(), b.len(), "Vector lengths differ");
    a.iter().zip(b).map(|(x, y)| ring.sub(x, y)).collect()
}

pub fn vec_neg<R: Ring>(ring: &R, a: &[R::Element]) -> Vec<R::Element> {
    a.iter().map(|x| ring.neg(x)).collect()
}

/// Add `b` to `a` in place.
pub fn vec_add_assign<R: Ring>(ring: &R, a: &mut [R::Element], b: &[R::Element]) {
    assert_eq!(a.len(), b.len(), "Vector lengths differ");
    for (x, y) in a.iter_mut().zip(b) {
        ring.add_assign(x, y);
    }
}

pub fn vec_scalar_mul<R: Ring>(ring: &R, a: &[R::Element], c: &R::Element) -> Vec<R::Element> {
    a.iter().map(|x| ring.mul(x, c)).collect()
}

/// Compute `sum_i a_i * b_i`.
pub fn vec_dot<R: Ring>(ring: &R, a: &[R::Element], b: &[R::Element]) -> R::Element {
    assert_eq!(a.len(), b.len(), "Vector lengths differ");
    let mut r = ring.zero();
    for (x, y) in a.iter().zip(b) {
        ring.add_mul_assign(&mut r, x, y);
    }
    r
}

/// Return true iff every pair of corresponding entries overlaps.
pub fn vec_overlaps<R: BallRing>(a: &[R::Element], b: &[R::Element]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| R::overlaps(x, y))
}

/// Return true iff every entry of `b` is contained in the corresponding entry of `a`.
pub fn vec_contains<R: BallRing>(a: &[R::Element], b: &[R::Element]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| R::contains(x, y))
}

pub fn vec_is_finite<R: BallRing>(a: &[R::Element]) -> bool {
    a.iter().all(|x| R::is_finite(x))
}

/// Set every entry to an element that contains everything.
pub fn vec_indeterminate<R: BallRing>(ring: &R, a: &mut [R::Element]) {
    for x in a {
        *x = ring.indeterminate();
    }
}
