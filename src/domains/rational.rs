//! The field of rational numbers, used as the exact reference domain.
//!
//! Ball results are cross-checked against exact rational computations,
//! for example with [Ball::contains_rational](super::ball::Ball::contains_rational).

use std::fmt::{Display, Formatter};

use rand::Rng;
use rug::Complete;

use super::{Field, InternalOrdering, Ring};

/// An exact rational number.
pub type Rational = rug::Rational;

/// The field of rational numbers.
pub type Q = RationalField;
/// The field of rational numbers.
pub const Q: RationalField = RationalField::new();

/// The field of rational numbers.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct RationalField;

impl Default for RationalField {
    fn default() -> Self {
        Self::new()
    }
}

impl RationalField {
    pub const fn new() -> RationalField {
        RationalField
    }
}

impl Display for RationalField {
    fn fmt(&self, _: &mut Formatter<'_>) -> std::fmt::Result {
        Ok(())
    }
}

impl InternalOrdering for Rational {
    fn internal_cmp(&self, other: &Self) -> std::cmp::Ordering {
        Ord::cmp(self, other)
    }
}

impl Ring for RationalField {
    type Element = Rational;

    #[inline]
    fn add(&self, a: &Self::Element, b: &Self::Element) -> Self::Element {
        (a + b).complete()
    }

    #[inline]
    fn sub(&self, a: &Self::Element, b: &Self::Element) -> Self::Element {
        (a - b).complete()
    }

    #[inline]
    fn mul(&self, a: &Self::Element, b: &Self::Element) -> Self::Element {
        (a * b).complete()
    }

    #[inline]
    fn add_assign(&self, a: &mut Self::Element, b: &Self::Element) {
        *a += b;
    }

    #[inline]
    fn sub_assign(&self, a: &mut Self::Element, b: &Self::Element) {
        *a -= b;
    }

    #[inline]
    fn mul_assign(&self, a: &mut Self::Element, b: &Self::Element) {
        *a *= b;
    }

    #[inline]
    fn add_mul_assign(&self, a: &mut Self::Element, b: &Self::Element, c: &Self::Element) {
        *a += (b * c).complete();
    }

    #[inline]
    fn sub_mul_assign(&self, a: &mut Self::Element, b: &Self::Element, c: &Self::Element) {
        *a -= (b * c).complete();
    }

    #[inline]
    fn neg(&self, a: &Self::Element) -> Self::Element {
        (-a).complete()
    }

    #[inline]
    fn zero(&self) -> Self::Element {
        Rational::new()
    }

    #[inline]
    fn one(&self) -> Self::Element {
        Rational::from(1)
    }

    #[inline]
    fn nth(&self, n: i64) -> Self::Element {
        Rational::from(n)
    }

    fn pow(&self, b: &Self::Element, e: u64) -> Self::Element {
        let mut r = self.one();
        for _ in 0..e {
            r *= b;
        }
        r
    }

    #[inline]
    fn is_zero(a: &Self::Element) -> bool {
        a.cmp0() == std::cmp::Ordering::Equal
    }

    #[inline]
    fn is_one(&self, a: &Self::Element) -> bool {
        *a == 1
    }

    fn try_div(&self, a: &Self::Element, b: &Self::Element) -> Option<Self::Element> {
        if Self::is_zero(b) {
            None
        } else {
            Some((a / b).complete())
        }
    }

    fn sample(&self, rng: &mut impl rand::RngCore, range: (i64, i64)) -> Self::Element {
        Rational::from(rng.gen_range(range.0..range.1))
    }

    fn format<W: std::fmt::Write>(
        &self,
        element: &Self::Element,
        f: &mut W,
    ) -> Result<(), std::fmt::Error> {
        write!(f, "{}", element)
    }
}

impl Field for RationalField {
    #[inline]
    fn div(&self, a: &Self::Element, b: &Self::Element) -> Self::Element {
        (a / b).complete()
    }

    #[inline]
    fn div_assign(&self, a: &mut Self::Element, b: &Self::Element) {
        *a /= b;
    }

    #[inline]
    fn inv(&self, a: &Self::Element) -> Self::Element {
        a.clone().recip()
    }
}
