//! Defines core algebraic traits and the numerical domains.
//!
//! The core trait is [Ring], which has two binary operations, addition and multiplication.
//! Each ring has an associated element type, that should not be confused with the ring type itself.
//! For example:
//! - The ring of rational numbers [Q](type@rational::Q) has elements of type [Rational](rational::Rational).
//! - The real ball field [RealBallField](ball::RealBallField) has elements of type [Ball](ball::Ball).
//! - The complex ball field [ComplexBallField](complex_ball::ComplexBallField) has elements of type [ComplexBall](complex_ball::ComplexBall).
//!
//! In general, the ring elements do not implement operations such as addition or multiplication,
//! but rather the ring itself does. For the ball fields, the ring carries the working precision,
//! so that generic algorithms such as [Matrix](crate::tensors::matrix::Matrix) or the
//! [parallel reducers](crate::parallel) never have to know about precision.
//!
//! An extension of the ring trait is the [`Field`] trait, which adds the ability to divide and invert elements.
pub mod ball;
pub mod complex_ball;
pub mod elementary;
pub mod float;
pub mod integer;
pub mod magnitude;
pub mod rational;
pub mod vector;

use std::fmt::{Debug, Display, Error, Formatter};
use std::hash::Hash;

/// The internal ordering trait is used to compare elements of a ring.
/// This ordering is defined even for rings that do not have a total ordering, such
/// as complex numbers or balls.
pub trait InternalOrdering {
    /// Compare two elements using an internal ordering.
    fn internal_cmp(&self, other: &Self) -> std::cmp::Ordering;
}

macro_rules! impl_internal_ordering {
    ($($t:ty),*) => {
        $(
            impl InternalOrdering for $t {
                fn internal_cmp(&self, other: &Self) -> std::cmp::Ordering {
                    self.cmp(other)
                }
            }
        )*
    };
}

impl_internal_ordering!(u32, u64, i64);

/// A ring is a set with two binary operations, addition and multiplication.
///
/// Each ring has an element type, that should not be confused with the ring type itself.
/// Algorithms that are generic over the ring, such as matrix multiplication or
/// parallel summation, only use the operations below.
pub trait Ring: Clone + PartialEq + Eq + Hash + Debug + Display {
    /// The element of a ring. For example, the elements of [RealBallField](ball::RealBallField) are [Ball](ball::Ball)s.
    type Element: Clone + PartialEq + Eq + Hash + InternalOrdering + Debug;

    fn add(&self, a: &Self::Element, b: &Self::Element) -> Self::Element;
    fn sub(&self, a: &Self::Element, b: &Self::Element) -> Self::Element;
    fn mul(&self, a: &Self::Element, b: &Self::Element) -> Self::Element;
    fn add_assign(&self, a: &mut Self::Element, b: &Self::Element);
    fn sub_assign(&self, a: &mut Self::Element, b: &Self::Element);
    fn mul_assign(&self, a: &mut Self::Element, b: &Self::Element);
    /// Compute `a += b * c`.
    fn add_mul_assign(&self, a: &mut Self::Element, b: &Self::Element, c: &Self::Element);
    /// Compute `a -= b * c`.
    fn sub_mul_assign(&self, a: &mut Self::Element, b: &Self::Element, c: &Self::Element);
    fn neg(&self, a: &Self::Element) -> Self::Element;
    fn zero(&self) -> Self::Element;
    fn one(&self) -> Self::Element;
    /// Return the nth element by computing `n * 1`.
    fn nth(&self, n: i64) -> Self::Element;
    fn pow(&self, b: &Self::Element, e: u64) -> Self::Element;
    fn is_zero(a: &Self::Element) -> bool;
    fn is_one(&self, a: &Self::Element) -> bool;

    /// Return the result of dividing `a` by `b`, if possible and if the result is unique.
    fn try_div(&self, a: &Self::Element, b: &Self::Element) -> Option<Self::Element>;

    /// Sample an element whose value is an integer in `range`.
    fn sample(&self, rng: &mut impl rand::RngCore, range: (i64, i64)) -> Self::Element;

    /// Format a ring element.
    fn format<W: std::fmt::Write>(&self, element: &Self::Element, f: &mut W) -> Result<(), Error>;

    /// Create a new printer for the given ring element that
    /// can be used in a [format!] macro.
    fn printer<'a>(&'a self, element: &'a Self::Element) -> RingPrinter<'a, Self> {
        RingPrinter::new(self, element)
    }
}

/// A field is a ring that supports division and inversion.
pub trait Field: Ring {
    fn div(&self, a: &Self::Element, b: &Self::Element) -> Self::Element;
    fn div_assign(&self, a: &mut Self::Element, b: &Self::Element);
    fn inv(&self, a: &Self::Element) -> Self::Element;
}

/// Provides an interface for printing elements of a ring,
/// suitable as an argument to [format!]. Internally, it will call [Ring::format].
pub struct RingPrinter<'a, R: Ring> {
    pub ring: &'a R,
    pub element: &'a R::Element,
}

impl<'a, R: Ring> RingPrinter<'a, R> {
    pub fn new(ring: &'a R, element: &'a R::Element) -> RingPrinter<'a, R> {
        RingPrinter { ring, element }
    }
}

impl<'a, R: Ring> Display for RingPrinter<'a, R> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        self.ring.format(self.element, f)
    }
}
