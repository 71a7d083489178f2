//! Real ball arithmetic.
//!
//! A [Ball] `m ± r` represents the set of real numbers `x` with `|x - m| <= r`. Every
//! operation returns a ball that contains the exact result of the operation applied to every
//! pair of numbers in the input balls. A ball with an infinite radius represents
//! the whole extended real line, and a ball with a NaN midpoint is indeterminate and contains
//! everything.
//!
//! The precision is passed to every operation and applies to the midpoint. Radii are
//! [Magnitude]s with a small fixed precision. The [RealBallField] carries a precision, so that
//! balls can be used in generic algorithms.
//!
//! ```
//! use ballistica::domains::ball::Ball;
//!
//! let x = Ball::from_fraction(1, 3, 64);
//! let y = x.mul(&Ball::from(3), 64);
//! assert!(y.contains_float(&1i64.into()));
//! assert!(!y.is_exact());
//! ```

use std::{
    cmp::Ordering,
    fmt::{self, Display, Formatter},
};

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{
    float::{BigFloat, Round},
    integer::Integer,
    magnitude::{Magnitude, MAG_BITS},
    rational::Rational,
    Field, InternalOrdering, Ring,
};

/// A real ball `mid ± rad`.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ball {
    mid: BigFloat,
    rad: Magnitude,
}

impl Default for Ball {
    fn default() -> Self {
        Ball::zero()
    }
}

impl From<i64> for Ball {
    fn from(value: i64) -> Self {
        Ball::exact(BigFloat::from(value))
    }
}

impl From<i32> for Ball {
    fn from(value: i32) -> Self {
        Ball::exact(BigFloat::from(value))
    }
}

impl From<BigFloat> for Ball {
    fn from(value: BigFloat) -> Self {
        Ball::exact(value)
    }
}

/// An upper bound on the error of rounding to `prec` bits, given the rounded result.
#[inline]
pub(crate) fn rounding_error(x: &BigFloat, prec: u32) -> Magnitude {
    match x.exponent() {
        Some(e) => Magnitude::from_2exp(&(e - prec as i64)),
        None => Magnitude::zero(),
    }
}

/// Return true iff the exact sum of the finite `terms` is at most zero.
fn sum_is_nonpositive(terms: &[BigFloat]) -> bool {
    matches!(
        BigFloat::sum_sign(terms),
        Some(Ordering::Less | Ordering::Equal)
    )
}

impl Ball {
    /// Create a new ball. A NaN midpoint forces an infinite radius.
    pub fn new(mid: BigFloat, rad: Magnitude) -> Ball {
        if mid.is_nan() {
            Ball::indeterminate()
        } else {
            Ball { mid, rad }
        }
    }

    /// Create a ball with radius zero.
    #[inline]
    pub fn exact(mid: BigFloat) -> Ball {
        Ball::new(mid, Magnitude::zero())
    }

    #[inline]
    pub const fn zero() -> Ball {
        Ball {
            mid: BigFloat::zero(),
            rad: Magnitude::zero(),
        }
    }

    #[inline]
    pub fn one() -> Ball {
        Ball::exact(BigFloat::one())
    }

    /// The ball `NaN ± inf`, which contains everything.
    #[inline]
    pub const fn indeterminate() -> Ball {
        Ball {
            mid: BigFloat::nan(),
            rad: Magnitude::inf(),
        }
    }

    /// The ball `0 ± inf`, which is the whole extended real line.
    #[inline]
    pub const fn zero_pm_inf() -> Ball {
        Ball {
            mid: BigFloat::zero(),
            rad: Magnitude::inf(),
        }
    }

    #[inline]
    pub const fn pos_inf() -> Ball {
        Ball {
            mid: BigFloat::pos_inf(),
            rad: Magnitude::zero(),
        }
    }

    #[inline]
    pub const fn neg_inf() -> Ball {
        Ball {
            mid: BigFloat::neg_inf(),
            rad: Magnitude::zero(),
        }
    }

    /// Create a ball from a rounded midpoint.
    fn from_rounded(mid: (BigFloat, bool), mut rad: Magnitude, prec: u32) -> Ball {
        let (mid, inexact) = mid;
        if inexact {
            rad.add_assign(&rounding_error(&mid, prec));
        }
        Ball::new(mid, rad)
    }

    /// Create a ball that contains the float `x` rounded to `prec` bits.
    pub fn from_float(x: &BigFloat, prec: u32) -> Ball {
        Ball::from_rounded(x.round(prec, Round::Nearest), Magnitude::zero(), prec)
    }

    /// Create a ball that contains the rational `q`.
    pub fn from_rational(q: &Rational, prec: u32) -> Ball {
        Ball::from_rounded(
            BigFloat::from_rational(q, prec, Round::Nearest),
            Magnitude::zero(),
            prec,
        )
    }

    /// Create a ball that contains `num / den`.
    pub fn from_fraction(num: i64, den: i64, prec: u32) -> Ball {
        Ball::from_rational(&Rational::from((num, den)), prec)
    }

    /// Create a ball that contains the closed interval `[lo, hi]`. Infinite
    /// endpoints produce a ball with an infinite radius.
    pub fn from_interval(lo: &BigFloat, hi: &BigFloat, prec: u32) -> Ball {
        if lo.is_nan() || hi.is_nan() {
            return Ball::indeterminate();
        }
        if lo > hi {
            return Ball::from_interval(hi, lo, prec);
        }

        match (lo.is_inf(), hi.is_inf()) {
            (true, true) => {
                if lo == hi {
                    Ball::exact(lo.clone())
                } else {
                    Ball::zero_pm_inf()
                }
            }
            (true, false) => Ball::new(hi.round(prec, Round::Nearest).0, Magnitude::inf()),
            (false, true) => Ball::new(lo.round(prec, Round::Nearest).0, Magnitude::inf()),
            (false, false) => {
                let (sum, _) = lo.add(hi, prec, Round::Nearest);
                let mid = sum.mul_2exp_si(-1);
                let (above, _) = hi.sub(&mid, MAG_BITS, Round::Up);
                let (below, _) = mid.sub(lo, MAG_BITS, Round::Up);
                let rad = Magnitude::max(&Magnitude::from_float(&above), &Magnitude::from_float(&below));
                Ball::new(mid, rad)
            }
        }
    }

    /// Create a random ball with a midpoint of at most `bits` bits.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, bits: u32, exp_bits: u32) -> Ball {
        let mid = BigFloat::random(rng, bits, exp_bits);
        let rad = if rng.gen_range(0..4) == 0 {
            Magnitude::zero()
        } else {
            let r = Magnitude::random(rng, exp_bits.min(6));
            if r.is_inf() {
                Magnitude::zero()
            } else {
                r
            }
        };
        Ball::new(mid, rad)
    }

    /// Like [Ball::random], but also samples balls with infinite or NaN components.
    pub fn random_special<R: Rng + ?Sized>(rng: &mut R, bits: u32, exp_bits: u32) -> Ball {
        let mid = BigFloat::random_special(rng, bits, exp_bits);
        let rad = Magnitude::random(rng, exp_bits.min(6));
        Ball::new(mid, rad)
    }

    #[inline]
    pub fn mid(&self) -> &BigFloat {
        &self.mid
    }

    #[inline]
    pub fn rad(&self) -> &Magnitude {
        &self.rad
    }

    /// Decompose the ball into its midpoint and radius.
    pub fn into_parts(self) -> (BigFloat, Magnitude) {
        (self.mid, self.rad)
    }

    #[inline]
    pub fn is_exact(&self) -> bool {
        self.rad.is_zero()
    }

    /// Return true iff the ball is exactly zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.mid.is_zero() && self.rad.is_zero()
    }

    /// Return true iff the ball is exactly one.
    #[inline]
    pub fn is_one(&self) -> bool {
        self.mid.is_one() && self.rad.is_zero()
    }

    /// Return true iff the midpoint and radius are finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.mid.is_finite() && self.rad.is_finite()
    }

    #[inline]
    pub fn is_nan(&self) -> bool {
        self.mid.is_nan()
    }

    /// Return true iff the ball is `NaN ± inf`.
    #[inline]
    pub fn is_indeterminate(&self) -> bool {
        self.mid.is_nan()
    }

    /// Return true iff every element of the ball is strictly positive.
    pub fn is_positive(&self) -> bool {
        if !self.rad.is_finite() || self.mid.is_nan() {
            return false;
        }
        if self.mid.is_inf() {
            return self.mid.is_pos_inf();
        }
        self.mid.is_positive() && self.mid > self.rad.to_float()
    }

    /// Return true iff every element of the ball is strictly negative.
    pub fn is_negative(&self) -> bool {
        self.neg().is_positive()
    }

    /// Return true iff the ball does not contain zero.
    pub fn is_nonzero(&self) -> bool {
        !self.contains_zero()
    }

    pub fn contains_zero(&self) -> bool {
        self.contains_float(&BigFloat::zero())
    }

    /// Return true iff the float `x` lies in the ball.
    pub fn contains_float(&self, x: &BigFloat) -> bool {
        if self.mid.is_nan() {
            return true;
        }
        if x.is_nan() {
            return false;
        }
        if self.rad.is_inf() {
            return true;
        }
        if self.mid.is_inf() || x.is_inf() {
            return self.mid == *x;
        }

        let r = self.rad.to_float();
        sum_is_nonpositive(&[self.mid.clone(), x.neg(), r.neg()])
            && sum_is_nonpositive(&[x.clone(), self.mid.neg(), r.neg()])
    }

    /// Return true iff the rational `q` lies in the ball.
    pub fn contains_rational(&self, q: &Rational) -> bool {
        if self.mid.is_nan() || self.rad.is_inf() {
            return true;
        }
        if self.mid.is_inf() {
            return false;
        }

        // bracket q by floats until the bracket lies inside or outside the ball
        let r = self.rad.to_float();
        let mut prec = 64;
        loop {
            let (lo, inexact) = BigFloat::from_rational(q, prec, Round::Floor);
            if !inexact {
                return self.contains_float(&lo);
            }
            let (hi, _) = BigFloat::from_rational(q, prec, Round::Ceil);

            if sum_is_nonpositive(&[self.mid.clone(), r.neg(), lo.neg()])
                && sum_is_nonpositive(&[hi.clone(), self.mid.neg(), r.neg()])
            {
                return true;
            }
            if sum_is_nonpositive(&[hi.clone(), self.mid.neg(), r.clone()])
                || sum_is_nonpositive(&[self.mid.clone(), r.clone(), lo.neg()])
            {
                return false;
            }

            prec *= 2;
        }
    }

    /// Return true iff `other` is a subset of `self`.
    pub fn contains(&self, other: &Ball) -> bool {
        if self.mid.is_nan() {
            return true;
        }
        if other.mid.is_nan() {
            return false;
        }
        if self.rad.is_inf() {
            return true;
        }
        if other.rad.is_inf() {
            return false;
        }
        if self.mid.is_inf() || other.mid.is_inf() {
            return self.mid == other.mid;
        }

        let (r1, r2) = (self.rad.to_float(), other.rad.to_float());
        sum_is_nonpositive(&[self.mid.clone(), r1.neg(), other.mid.neg(), r2.clone()])
            && sum_is_nonpositive(&[other.mid.clone(), r2, self.mid.neg(), r1.neg()])
    }

    /// Return true iff the balls have at least one point in common.
    pub fn overlaps(&self, other: &Ball) -> bool {
        if self.mid.is_nan() || other.mid.is_nan() {
            return true;
        }
        if self.rad.is_inf() || other.rad.is_inf() {
            return true;
        }
        if self.mid.is_inf() || other.mid.is_inf() {
            return self.mid == other.mid;
        }

        let (r1, r2) = (self.rad.to_float().neg(), other.rad.to_float().neg());
        sum_is_nonpositive(&[self.mid.clone(), other.mid.neg(), r1.clone(), r2.clone()])
            && sum_is_nonpositive(&[other.mid.clone(), self.mid.neg(), r1, r2])
    }

    /// A lower bound of the ball, rounded to `prec` bits.
    pub fn lbound(&self, prec: u32) -> BigFloat {
        if self.mid.is_nan() {
            BigFloat::nan()
        } else if self.rad.is_inf() {
            BigFloat::neg_inf()
        } else {
            self.mid.sub(&self.rad.to_float(), prec, Round::Floor).0
        }
    }

    /// An upper bound of the ball, rounded to `prec` bits.
    pub fn ubound(&self, prec: u32) -> BigFloat {
        if self.mid.is_nan() {
            BigFloat::nan()
        } else if self.rad.is_inf() {
            BigFloat::pos_inf()
        } else {
            self.mid.add(&self.rad.to_float(), prec, Round::Ceil).0
        }
    }

    /// An upper bound of the absolute value of every element.
    pub fn abs_ubound(&self) -> Magnitude {
        Magnitude::from_float(&self.mid).add(&self.rad)
    }

    /// A lower bound of the absolute value of every element.
    pub fn abs_lbound(&self) -> Magnitude {
        if self.mid.is_nan() || self.rad.is_inf() {
            return Magnitude::zero();
        }
        let (d, _) = self
            .mid
            .abs()
            .sub(&self.rad.to_float(), MAG_BITS, Round::Floor);
        if d.is_positive() {
            Magnitude::from_float_lower(&d)
        } else {
            Magnitude::zero()
        }
    }

    /// The relative accuracy of the ball in bits. Exact balls have accuracy `i64::MAX`.
    pub fn rel_accuracy_bits(&self) -> i64 {
        if self.rad.is_zero() && !self.mid.is_nan() {
            return i64::MAX;
        }
        match (self.mid.exponent(), self.rad.exponent()) {
            (Some(m), Some(r)) => (m - r).to_i64().unwrap_or(if m > r { i64::MAX } else { -i64::MAX }),
            _ => -i64::MAX,
        }
    }

    /// Round the midpoint to `prec` bits, adding the error to the radius.
    pub fn set_round(&self, prec: u32) -> Ball {
        Ball::from_rounded(self.mid.round(prec, Round::Nearest), self.rad.clone(), prec)
    }

    /// Add `err` to the radius.
    pub fn add_error(&self, err: &Magnitude) -> Ball {
        Ball::new(self.mid.clone(), self.rad.add(err))
    }

    /// Add `2^e` to the radius.
    pub fn add_error_2exp(&self, e: &Integer) -> Ball {
        self.add_error(&Magnitude::from_2exp(e))
    }

    pub fn neg(&self) -> Ball {
        Ball {
            mid: self.mid.neg(),
            rad: self.rad.clone(),
        }
    }

    pub fn abs(&self) -> Ball {
        Ball {
            mid: self.mid.abs(),
            rad: self.rad.clone(),
        }
    }

    /// Multiply by `2^e`. This operation is exact.
    pub fn mul_2exp(&self, e: &Integer) -> Ball {
        Ball::new(self.mid.mul_2exp(e), self.rad.mul_2exp(e))
    }

    /// Multiply by `2^e`. This operation is exact.
    pub fn mul_2exp_si(&self, e: i64) -> Ball {
        self.mul_2exp(&Integer::new(e))
    }

    pub fn add(&self, other: &Ball, prec: u32) -> Ball {
        Ball::from_rounded(
            self.mid.add(&other.mid, prec, Round::Nearest),
            self.rad.add(&other.rad),
            prec,
        )
    }

    pub fn sub(&self, other: &Ball, prec: u32) -> Ball {
        Ball::from_rounded(
            self.mid.sub(&other.mid, prec, Round::Nearest),
            self.rad.add(&other.rad),
            prec,
        )
    }

    pub fn mul(&self, other: &Ball, prec: u32) -> Ball {
        let rad = if self.rad.is_zero() && other.rad.is_zero() {
            Magnitude::zero()
        } else {
            Magnitude::from_float(&self.mid)
                .mul(&other.rad)
                .add(&Magnitude::from_float(&other.mid).mul(&self.rad))
                .add(&self.rad.mul(&other.rad))
        };

        Ball::from_rounded(self.mid.mul(&other.mid, prec, Round::Nearest), rad, prec)
    }

    /// Compute `self^2`, which is tighter than `self * self`.
    pub fn sqr(&self, prec: u32) -> Ball {
        let rad = if self.rad.is_zero() {
            Magnitude::zero()
        } else {
            Magnitude::from_float(&self.mid)
                .mul(&self.rad)
                .mul_2exp(&Integer::one())
                .add(&self.rad.mul(&self.rad))
        };

        Ball::from_rounded(self.mid.mul(&self.mid, prec, Round::Nearest), rad, prec)
    }

    /// Divide by `other`. The result is indeterminate if `other` contains zero.
    pub fn div(&self, other: &Ball, prec: u32) -> Ball {
        if !self.is_finite() || !other.is_finite() || other.contains_zero() {
            return Ball::indeterminate();
        }

        let mid = self.mid.div(&other.mid, prec, Round::Nearest);
        if self.rad.is_zero() && other.rad.is_zero() {
            return Ball::from_rounded(mid, Magnitude::zero(), prec);
        }

        // |a/b - ma/mb| <= (|ma| rb + |mb| ra) / (|mb| (|mb| - rb))
        let mb = other.mid.abs();
        let num = Magnitude::from_float(&self.mid)
            .mul(&other.rad)
            .add(&Magnitude::from_float(&mb).mul(&self.rad));
        let (gap, _) = mb.sub(&other.rad.to_float(), MAG_BITS, Round::Down);
        let (den, _) = gap.mul(&mb, MAG_BITS, Round::Down);
        let rad = num.div(&Magnitude::from_float_lower(&den));

        Ball::from_rounded(mid, rad, prec)
    }

    pub fn inv(&self, prec: u32) -> Ball {
        Ball::one().div(self, prec)
    }

    /// Compute `self^e` by repeated squaring.
    pub fn pow(&self, mut e: u64, prec: u32) -> Ball {
        if e == 0 {
            return Ball::one();
        }

        let wp = prec + 2 * (64 - e.leading_zeros());
        let mut base = self.clone();
        let mut r = Ball::one();
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

    /// The smallest ball that contains both balls.
    pub fn union(&self, other: &Ball, prec: u32) -> Ball {
        if self.mid.is_nan() || other.mid.is_nan() {
            return Ball::indeterminate();
        }

        let lo = self.lbound(prec).min(&other.lbound(prec));
        let hi = self.ubound(prec).max(&other.ubound(prec));
        Ball::from_interval(&lo, &hi, prec)
    }

    /// A ball containing `max(x, y)` for every `x` in `self` and `y` in `other`.
    pub fn max(&self, other: &Ball, prec: u32) -> Ball {
        if self.mid.is_nan() || other.mid.is_nan() {
            return Ball::indeterminate();
        }

        let (l1, u1) = (self.lbound(prec), self.ubound(prec));
        let (l2, u2) = (other.lbound(prec), other.ubound(prec));
        if u1 < l2 {
            return other.set_round(prec);
        }
        if u2 < l1 {
            return self.set_round(prec);
        }

        Ball::from_interval(&l1.max(&l2), &u1.max(&u2), prec)
    }

    /// A ball containing `min(x, y)` for every `x` in `self` and `y` in `other`.
    pub fn min(&self, other: &Ball, prec: u32) -> Ball {
        self.neg().max(&other.neg(), prec).neg()
    }

    pub fn add_assign(&mut self, other: &Ball, prec: u32) {
        *self = self.add(other, prec);
    }

    pub fn sub_assign(&mut self, other: &Ball, prec: u32) {
        *self = self.sub(other, prec);
    }

    pub fn mul_assign(&mut self, other: &Ball, prec: u32) {
        *self = self.mul(other, prec);
    }

    pub fn div_assign(&mut self, other: &Ball, prec: u32) {
        *self = self.div(other, prec);
    }

    pub fn max_assign(&mut self, other: &Ball, prec: u32) {
        *self = self.max(other, prec);
    }

    pub fn min_assign(&mut self, other: &Ball, prec: u32) {
        *self = self.min(other, prec);
    }

    /// Compute `self += a * b`.
    pub fn add_mul_assign(&mut self, a: &Ball, b: &Ball, prec: u32) {
        *self = self.add(&a.mul(b, prec), prec);
    }

    /// Compute `self -= a * b`.
    pub fn sub_mul_assign(&mut self, a: &Ball, b: &Ball, prec: u32) {
        *self = self.sub(&a.mul(b, prec), prec);
    }
}

impl InternalOrdering for Ball {
    fn internal_cmp(&self, other: &Self) -> Ordering {
        self.mid
            .internal_cmp(&other.mid)
            .then_with(|| self.rad.cmp(&other.rad))
    }
}

impl std::fmt::Debug for Ball {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?} +/- {:?}]", self.mid, self.rad)
    }
}

impl Display for Ball {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.rad.is_zero() {
            Display::fmt(&self.mid, f)
        } else {
            f.write_str("[")?;
            Display::fmt(&self.mid, f)?;
            write!(f, " +/- {}]", self.rad)
        }
    }
}

/// The field of real balls with a given working precision.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct RealBallField {
    prec: u32,
}

impl RealBallField {
    /// Create a new ball field with `prec` bits of midpoint precision.
    pub fn new(prec: u32) -> RealBallField {
        assert!(prec > 0, "Precision must be positive");
        RealBallField { prec }
    }

    #[inline]
    pub fn get_precision(&self) -> u32 {
        self.prec
    }

    /// Convert a rational number to a ball in this field.
    pub fn element_from_rational(&self, q: &Rational) -> Ball {
        Ball::from_rational(q, self.prec)
    }
}

impl Display for RealBallField {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "RB{}", self.prec)
    }
}

impl Ring for RealBallField {
    type Element = Ball;

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

    #[inline]
    fn add_mul_assign(&self, a: &mut Self::Element, b: &Self::Element, c: &Self::Element) {
        a.add_mul_assign(b, c, self.prec);
    }

    #[inline]
    fn sub_mul_assign(&self, a: &mut Self::Element, b: &Self::Element, c: &Self::Element) {
        a.sub_mul_assign(b, c, self.prec);
    }

    #[inline]
    fn neg(&self, a: &Self::Element) -> Self::Element {
        a.neg()
    }

    #[inline]
    fn zero(&self) -> Self::Element {
        Ball::zero()
    }

    #[inline]
    fn one(&self) -> Self::Element {
        Ball::one()
    }

    fn nth(&self, n: i64) -> Self::Element {
        Ball::from(n).set_round(self.prec)
    }

    fn pow(&self, b: &Self::Element, e: u64) -> Self::Element {
        b.pow(e, self.prec)
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
            Some(a.div(b, self.prec))
        }
    }

    fn sample(&self, rng: &mut impl rand::RngCore, range: (i64, i64)) -> Self::Element {
        self.nth(rng.gen_range(range.0..range.1))
    }

    fn format<W: std::fmt::Write>(
        &self,
        element: &Self::Element,
        f: &mut W,
    ) -> Result<(), std::fmt::Error> {
        write!(f, "{}", element)
    }
}

impl Field for RealBallField {
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

#[cfg(test)]
mod test {
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;

    use super::{Ball, RealBallField};
    use crate::domains::{
        float::BigFloat, integer::Integer, magnitude::Magnitude, rational::Rational, Field, Ring,
    };

    #[test]
    fn exact_arithmetic() {
        let a = Ball::from(3);
        let b = Ball::from(-5);
        assert_eq!(a.add(&b, 10), Ball::from(-2));
        assert_eq!(a.mul(&b, 10), Ball::from(-15));
        assert_eq!(Ball::from(15).div(&a, 10), Ball::from(5));
        assert!(a.pow(4, 10).is_exact());
        assert_eq!(a.pow(4, 10), Ball::from(81));
    }

    #[test]
    fn rounding_enlarges_radius() {
        let third = Ball::from_fraction(1, 3, 53);
        assert!(!third.is_exact());
        assert!(third.contains_rational(&Rational::from((1, 3))));

        let one = third.mul(&Ball::from(3), 53);
        assert!(one.contains_float(&BigFloat::one()));
        assert!(one.rel_accuracy_bits() > 40);
    }

    #[test]
    fn division_by_ball_containing_zero() {
        let b = Ball::new(BigFloat::from(1), Magnitude::from(2));
        let r = Ball::one().div(&b, 64);
        assert!(r.is_nan());
        assert!(r.rad().is_inf());
        assert!(RealBallField::new(64).try_div(&Ball::one(), &b).is_none());
    }

    #[test]
    fn division_encloses() {
        let a = Ball::new(BigFloat::from(10), Magnitude::from(1));
        let b = Ball::new(BigFloat::from(4), Magnitude::from(1));
        let r = a.div(&b, 64);
        // 9/5 and 11/3 are the extremes
        assert!(r.contains_rational(&Rational::from((9, 5))));
        assert!(r.contains_rational(&Rational::from((11, 3))));
    }

    #[test]
    fn interval_conversion() {
        let lo = BigFloat::from(1);
        let hi = BigFloat::from(3);
        let b = Ball::from_interval(&lo, &hi, 64);
        assert_eq!(b, Ball::new(BigFloat::from(2), Magnitude::from(1)));

        let b = Ball::from_interval(&BigFloat::zero(), &BigFloat::pos_inf(), 64);
        assert!(b.mid().is_zero());
        assert!(b.rad().is_inf());

        let b = Ball::from_interval(&BigFloat::pos_inf(), &BigFloat::pos_inf(), 64);
        assert_eq!(b, Ball::pos_inf());
    }

    #[test]
    fn predicates() {
        let a = Ball::new(BigFloat::from(2), Magnitude::from(1));
        let b = Ball::new(BigFloat::from(5), Magnitude::from(1));
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&Ball::from(3)));
        assert!(a.contains(&Ball::new(BigFloat::from(2), Magnitude::from(1))));
        assert!(!a.contains(&Ball::new(BigFloat::from(2), Magnitude::from(2))));
        assert!(a.is_positive());
        assert!(!Ball::zero_pm_inf().is_positive());
        assert!(Ball::indeterminate().contains(&b));
        assert!(Ball::zero_pm_inf().contains_float(&BigFloat::neg_inf()));
    }

    #[test]
    fn max_min() {
        let a = Ball::new(BigFloat::from(2), Magnitude::from(1));
        let b = Ball::new(BigFloat::from(5), Magnitude::from(1));
        assert_eq!(a.max(&b, 64), b);
        assert_eq!(a.min(&b, 64), a);

        let c = Ball::new(BigFloat::from(3), Magnitude::from(2));
        let m = a.max(&c, 64);
        assert!(m.contains_float(&BigFloat::from(3)));
        assert!(m.contains_float(&BigFloat::from(5)));

        let special = Ball::new(BigFloat::neg_inf(), Magnitude::inf());
        let z = Ball::zero().max(&special, 64);
        assert!(z.mid().is_zero() && z.rad().is_inf());
    }

    #[test]
    fn random_operations_contain_exact_results() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(1);
        for _ in 0..500 {
            let x = Ball::random(&mut rng, 100, 8);
            let y = Ball::random(&mut rng, 100, 8);
            let (a, b) = (x.mid().clone(), y.mid().clone());
            let prec = rng_prec(&mut rng);

            assert!(x.add(&y, prec).contains_float(&a.add_exact(&b)));
            assert!(x.sub(&y, prec).contains_float(&a.sub_exact(&b)));
            assert!(x.mul(&y, prec).contains_float(&a.mul_exact(&b)));
            assert!(x.sqr(prec).contains_float(&a.mul_exact(&a)));

            if let (Some(qa), Some(qb)) = (a.to_rational(), b.to_rational()) {
                if qb.cmp0() != std::cmp::Ordering::Equal {
                    let q = Rational::from(&qa / &qb);
                    let r = x.div(&y, prec);
                    assert!(r.contains_rational(&q));
                }
            }
        }
    }

    #[test]
    fn far_apart_exponents() {
        let gap = Integer::new(1 << 33);
        let huge = BigFloat::one().mul_2exp(&gap);
        let tiny = BigFloat::one().mul_2exp(&-gap.clone());

        let unit = Ball::new(BigFloat::one(), Magnitude::one());
        assert!(unit.contains_float(&tiny));
        assert!(!unit.contains_float(&huge));
        assert!(unit.contains(&Ball::exact(tiny.clone())));
        assert!(!unit.overlaps(&Ball::exact(huge.clone())));
        assert!(unit.overlaps(&Ball::new(huge.clone(), Magnitude::from_2exp(&gap))));

        let tight = Ball::new(BigFloat::one(), Magnitude::from_2exp(&-gap.clone()));
        assert!(tight.contains_float(&BigFloat::one()));
        assert!(!tight.contains_float(&BigFloat::from(2)));
        assert!(unit.contains(&tight));
        assert!(!tight.contains(&unit));
        assert!(tight.contains(&Ball::new(
            BigFloat::one(),
            Magnitude::from_2exp(&(-gap.clone() - 1))
        )));
        assert!(tight.contains_rational(&Rational::from(1)));
        assert!(!tight.contains_rational(&Rational::from((1, 3))));

        assert!(!Ball::exact(huge.clone()).contains_rational(&Rational::from(1)));
        assert!(Ball::new(huge, Magnitude::from_2exp(&gap)).contains_rational(&Rational::from((1, 3))));
    }

    fn rng_prec(rng: &mut Xoshiro256StarStar) -> u32 {
        use rand::Rng;
        rng.gen_range(2..200)
    }

    #[test]
    fn field() {
        let f = RealBallField::new(64);
        let a = f.nth(7);
        let b = f.inv(&a);
        let c = f.mul(&a, &b);
        assert!(c.contains_float(&BigFloat::one()));
        assert_eq!(f.pow(&f.nth(2), 10), f.nth(1024));
        assert_eq!(
            Ball::one().mul_2exp(&Integer::new(-3)).mul_2exp_si(3),
            Ball::one()
        );
    }
}
