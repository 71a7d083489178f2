//! Complex ball arithmetic, using a rectangular representation.
//!
//! A [ComplexBall] is a pair of real [Ball]s for the real and imaginary part. It contains
//! a complex number iff both parts contain the corresponding component.

use std::{
    cmp::Ordering,
    fmt::{self, Display, Formatter},
};

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{
    ball::Ball, float::BigFloat, integer::Integer, rational::Rational, Field, InternalOrdering,
    Ring,
};

/// A complex number `re + im*i` with ball components.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct ComplexBall {
    pub re: Ball,
    pub im: Ball,
}

impl From<Ball> for ComplexBall {
    fn from(re: Ball) -> Self {
        ComplexBall::new(re, Ball::zero())
    }
}

impl From<i64> for ComplexBall {
    fn from(value: i64) -> Self {
        ComplexBall::from(Ball::from(value))
    }
}

impl From<(i64, i64)> for ComplexBall {
    fn from((re, im): (i64, i64)) -> Self {
        ComplexBall::new(Ball::from(re), Ball::from(im))
    }
}

impl ComplexBall {
    #[inline]
    pub fn new(re: Ball, im: Ball) -> ComplexBall {
        ComplexBall { re, im }
    }

    #[inline]
    pub const fn zero() -> ComplexBall {
        ComplexBall {
            re: Ball::zero(),
            im: Ball::zero(),
        }
    }

    #[inline]
    pub fn one() -> ComplexBall {
        ComplexBall::from(Ball::one())
    }

    /// The imaginary unit.
    #[inline]
    pub fn i() -> ComplexBall {
        ComplexBall::new(Ball::zero(), Ball::one())
    }

    /// A complex ball that contains everything.
    #[inline]
    pub const fn indeterminate() -> ComplexBall {
        ComplexBall {
            re: Ball::indeterminate(),
            im: Ball::indeterminate(),
        }
    }

    /// Create a ball containing `re + im*i`.
    pub fn from_rational(re: &Rational, im: &Rational, prec: u32) -> ComplexBall {
        ComplexBall::new(Ball::from_rational(re, prec), Ball::from_rational(im, prec))
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R, bits: u32, exp_bits: u32) -> ComplexBall {
        ComplexBall::new(
            Ball::random(rng, bits, exp_bits),
            Ball::random(rng, bits, exp_bits),
        )
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.re.is_zero() && self.im.is_zero()
    }

    #[inline]
    pub fn is_one(&self) -> bool {
        self.re.is_one() && self.im.is_zero()
    }

    #[inline]
    pub fn is_exact(&self) -> bool {
        self.re.is_exact() && self.im.is_exact()
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.re.is_finite() && self.im.is_finite()
    }

    /// Return true iff the imaginary part is exactly zero.
    #[inline]
    pub fn is_real(&self) -> bool {
        self.im.is_zero()
    }

    pub fn contains_zero(&self) -> bool {
        self.re.contains_zero() && self.im.contains_zero()
    }

    pub fn contains_float(&self, re: &BigFloat, im: &BigFloat) -> bool {
        self.re.contains_float(re) && self.im.contains_float(im)
    }

    pub fn contains_rational(&self, re: &Rational, im: &Rational) -> bool {
        self.re.contains_rational(re) && self.im.contains_rational(im)
    }

    /// Return true iff `other` is a subset of `self`.
    pub fn contains(&self, other: &ComplexBall) -> bool {
        self.re.contains(&other.re) && self.im.contains(&other.im)
    }

    pub fn overlaps(&self, other: &ComplexBall) -> bool {
        self.re.overlaps(&other.re) && self.im.overlaps(&other.im)
    }

    pub fn set_round(&self, prec: u32) -> ComplexBall {
        ComplexBall::new(self.re.set_round(prec), self.im.set_round(prec))
    }

    pub fn neg(&self) -> ComplexBall {
        ComplexBall::new(self.re.neg(), self.im.neg())
    }

    pub fn conj(&self) -> ComplexBall {
        ComplexBall::new(self.re.clone(), self.im.neg())
    }

    /// Multiply by `2^e`. This operation is exact.
    pub fn mul_2exp(&self, e: &Integer) -> ComplexBall {
        ComplexBall::new(self.re.mul_2exp(e), self.im.mul_2exp(e))
    }

    pub fn add(&self, other: &ComplexBall, prec: u32) -> ComplexBall {
        ComplexBall::new(self.re.add(&other.re, prec), self.im.add(&other.im, prec))
    }

    pub fn sub(&self, other: &ComplexBall, prec: u32) -> ComplexBall {
        ComplexBall::new(self.re.sub(&other.re, prec), self.im.sub(&other.im, prec))
    }

    pub fn mul_real(&self, other: &Ball, prec: u32) -> ComplexBall {
        ComplexBall::new(self.re.mul(other, prec), self.im.mul(other, prec))
    }

    pub fn mul(&self, other: &ComplexBall, prec: u32) -> ComplexBall {
        if self.is_real() {
            return other.mul_real(&self.re, prec);
        }
        if other.is_real() {
            return self.mul_real(&other.re, prec);
        }

        let re = self
            .re
            .mul(&other.re, prec)
            .sub(&self.im.mul(&other.im, prec), prec);
        let im = self
            .re
            .mul(&other.im, prec)
            .add(&self.im.mul(&other.re, prec), prec);
        ComplexBall::new(re, im)
    }

    pub fn sqr(&self, prec: u32) -> ComplexBall {
        let re = self.re.sqr(prec).sub(&self.im.sqr(prec), prec);
        let im = self.re.mul(&self.im, prec).mul_2exp_si(1);
        ComplexBall::new(re, im)
    }

    /// Compute `re^2 + im^2`.
    pub fn norm_squared(&self, prec: u32) -> Ball {
        self.re.sqr(prec).add(&self.im.sqr(prec), prec)
    }

    /// Divide by a real ball.
    pub fn div_real(&self, other: &Ball, prec: u32) -> ComplexBall {
        ComplexBall::new(self.re.div(other, prec), self.im.div(other, prec))
    }

    /// Compute `1 / self`. The result is indeterminate if the ball may contain zero.
    pub fn inv(&self, prec: u32) -> ComplexBall {
        if self.is_real() {
            return ComplexBall::from(self.re.inv(prec));
        }

        let wp = prec + 10;
        let d = self.norm_squared(wp);
        if d.contains_zero() {
            return ComplexBall::indeterminate();
        }
        self.conj().div_real(&d, prec)
    }

    /// Divide by `other`. The result is indeterminate if `other` may contain zero.
    pub fn div(&self, other: &ComplexBall, prec: u32) -> ComplexBall {
        if other.is_real() {
            return self.div_real(&other.re, prec);
        }

        let wp = prec + 10;
        let d = other.norm_squared(wp);
        if d.contains_zero() {
            return ComplexBall::indeterminate();
        }
        self.mul(&other.conj(), wp).div_real(&d, prec)
    }

    /// Compute `self^e` by repeated squaring.
    pub fn pow_ui(&self, mut e: u64, prec: u32) -> ComplexBall {
        if e == 0 {
            return ComplexBall::one();
        }

        let wp = prec + 2 * (64 - e.leading_zeros());
        let mut base = self.clone();
        let mut r = ComplexBall::one();
        while e > 0 {
            if e & 1 == 1 {
                r = r.mul(&base, wp);
            }
            e >>= 1;
            if e > 0 {
                base = base.sqr(wp);
            }
        }
        r.set_round(prec)
    }

    pub fn add_assign(&mut self, other: &ComplexBall, prec: u32) {
        *self = self.add(other, prec);
    }

    pub fn sub_assign(&mut self, other: &ComplexBall, prec: u32) {
        *self = self.sub(other, prec);
    }

    pub fn mul_assign(&mut self, other: &ComplexBall, prec: u32) {
        *self = self.mul(other, prec);
    }

    pub fn div_assign(&mut self, other: &ComplexBall, prec: u32) {
        *self = self.div(other, prec);
    }
}

impl InternalOrdering for ComplexBall {
    fn internal_cmp(&self, other: &Self) -> Ordering {
        self.re
            .internal_cmp(&other.re)
            .then_with(|| self.im.internal_cmp(&other.im))
    }
}

impl std::fmt::Debug for ComplexBall {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} + {:?}*i", self.re, self.im)
    }
}

impl Display for ComplexBall {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_real() {
            return Display::fmt(&self.re, f);
        }

        write!(f, "{} + {}*i", self.re, self.im)
    }
}

/// The field of complex balls with a given working precision.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ComplexBallField {
    prec: u32,
}

impl ComplexBallField {
    pub fn new(prec: u32) -> ComplexBallField {
        assert!(prec > 0, "Precision must be positive");
        ComplexBallField { prec }
    }

    #[inline]
    pub fn get_precision(&self) -> u32 {
        self.prec
    }
}

impl Display for ComplexBallField {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "CB{}", self.prec)
    }
}

impl Ring for ComplexBallField {
    type Element = ComplexBall;

    #[inline]
    fn add(&self, a: &Self::Element, b: &Self::Element) -> Self::Element {
        a.add(b, self.prec)
    }

    #[inline]
    fn sub(&self, a: &Self::Element, b: &Self::Element) -> Self::Element {
        a.sub(b, self.prec)
    }

    #[inline]
    fn mul(&self, a: &Self::Element, b: &Self::Element) -> Self::Element {
        a.mul(b, self.prec)
    }

    #[inline]
    fn add_assign(&self, a: &mut Self::Element, b: &Self::Element) {
        a.add_assign(b, self.prec);
    }

    #[inline]
    fn sub_assign(&self, a: &mut Self::Element, b: &Self::Element) {
        a.sub_assign(b, self.prec);
    }

    #[inline]
    fn mul_assign(&self, a: &mut Self::Element, b: &Self::Element) {
        a.mul_assign(b, self.prec);
    }

    fn add_mul_assign(&self, a: &mut Self::Element, b: &Self::Element, c: &Self::Element) {
        a.add_assign(&b.mul(c, self.prec), self.prec);
    }

    fn sub_mul_assign(&self, a: &mut Self::Element, b: &Self::Element, c: &Self::Element) {
        a.sub_assign(&b.mul(c, self.prec), self.prec);
    }

    #[inline]
    fn neg(&self, a: &Self::Element) -> Self::Element {
        a.neg()
    }

    #[inline]
    fn zero(&self) -> Self::Element {
        ComplexBall::zero()
    }

    #[inline]
    fn one(&self) -> Self::Element {
        ComplexBall::one()
    }

    fn nth(&self, n: i64) -> Self::Element {
        ComplexBall::from(n).set_round(self.prec)
    }

    fn pow(&self, b: &Self::Element, e: u64) -> Self::Element {
        b.pow_ui(e, self.prec)
    }

    #[inline]
    fn is_zero(a: &Self::Element) -> bool {
        a.is_zero()
    }

    #[inline]
    fn is_one(&self, a: &Self::Element) -> bool {
        a.is_one()
    }

    fn try_div(&self, a: &Self::Element, b: &Self::Element) -> Option<Self::Element> {
        if b.contains_zero() {
            None
        } else {
            let r = a.div(b, self.prec);
            if r.re.is_nan() {
                None
            } else {
                Some(r)
            }
        }
    }

    fn sample(&self, rng: &mut impl rand::RngCore, range: (i64, i64)) -> Self::Element {
        ComplexBall::from((
            rng.gen_range(range.0..range.1),
            rng.gen_range(range.0..range.1),
        ))
        .set_round(self.prec)
    }

    fn format<W: std::fmt::Write>(
        &self,
        element: &Self::Element,
        f: &mut W,
    ) -> Result<(), std::fmt::Error> {
        write!(f, "{}", element)
    }
}

impl Field for ComplexBallField {
    #[inline]
    fn div(&self, a: &Self::Element, b: &Self::Element) -> Self::Element {
        a.div(b, self.prec)
    }

    #[inline]
    fn div_assign(&self, a: &mut Self::Element, b: &Self::Element) {
        a.div_assign(b, self.prec);
    }

    #[inline]
    fn inv(&self, a: &Self::Element) -> Self::Element {
        a.inv(self.prec)
    }
}
