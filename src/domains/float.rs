//! Arbitrary-precision binary floating-point numbers.
//!
//! A [BigFloat] is either an exact zero, a signed finite value `m * 2^e` with an
//! odd integer mantissa `m` of unbounded size and an unbounded exponent,
//! a signed infinity, or NaN. Every arithmetic operation is computed exactly and then
//! rounded to a caller-specified number of significant bits in a caller-specified
//! [Round]ing mode, returning the result together with an inexactness flag.
//!
//! ```
//! use ballistica::domains::float::{BigFloat, Round};
//!
//! let a = BigFloat::from(1);
//! let b = BigFloat::from(3);
//! let (lo, inexact) = a.div(&b, 20, Round::Floor);
//! let (hi, _) = a.div(&b, 20, Round::Ceil);
//! assert!(inexact);
//! assert!(lo < hi);
//! ```

use std::{
    cmp::Ordering,
    f64::consts::LOG10_2,
    fmt::{self, Debug, Display, Formatter},
};

use rand::Rng;
use rug::{
    float::Special, integer::Order, Complete, Float as MultiPrecisionFloat,
    Integer as MultiPrecisionInteger,
};
use serde::{Deserialize, Serialize};

use super::{integer::Integer, rational::Rational, InternalOrdering};

/// The largest absolute binary exponent that is converted to an MPFR float.
const MULTI_PREC_FLOAT_MAX_EXP: i64 = 1 << 24;

/// A rounding mode.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Round {
    /// Round to the nearest representable value, ties to even.
    Nearest,
    /// Round toward zero.
    Down,
    /// Round away from zero.
    Up,
    /// Round toward negative infinity.
    Floor,
    /// Round toward positive infinity.
    Ceil,
}

impl Round {
    pub const TOWARD_ZERO: Round = Round::Down;
    pub const AWAY_FROM_ZERO: Round = Round::Up;

    /// Decide whether the truncated mantissa must be incremented. `half` is the value of
    /// the first discarded bit, `below` is true if any further discarded bit is set.
    #[inline]
    fn increments(self, negative: bool, odd: bool, half: bool, below: bool) -> bool {
        match self {
            Round::Nearest => half && (below || odd),
            Round::Down => false,
            Round::Up => true,
            Round::Floor => negative,
            Round::Ceil => !negative,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
enum Repr {
    Zero,
    /// The value `(-1)^negative * mantissa * 2^(exponent - bits(mantissa))`, with an odd
    /// mantissa, so that the magnitude lies in `[2^(exponent-1), 2^exponent)`.
    Normal {
        negative: bool,
        mantissa: MultiPrecisionInteger,
        exponent: Integer,
    },
    Infinity {
        negative: bool,
    },
    NaN,
}

/// An arbitrary-precision floating-point number with special values.
///
/// Finite non-zero values have a unique representation, so structural equality
/// is numerical equality. Unlike IEEE floats, `NaN == NaN`, which makes the type usable
/// as a ring element and as a key.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BigFloat(Repr);

impl Default for BigFloat {
    fn default() -> Self {
        BigFloat::new()
    }
}

impl BigFloat {
    /// Create a new zero.
    #[inline]
    pub const fn new() -> BigFloat {
        BigFloat(Repr::Zero)
    }

    #[inline]
    pub const fn zero() -> BigFloat {
        BigFloat(Repr::Zero)
    }

    #[inline]
    pub fn one() -> BigFloat {
        BigFloat::from(1)
    }

    #[inline]
    pub const fn pos_inf() -> BigFloat {
        BigFloat(Repr::Infinity { negative: false })
    }

    #[inline]
    pub const fn neg_inf() -> BigFloat {
        BigFloat(Repr::Infinity { negative: true })
    }

    #[inline]
    pub const fn inf(negative: bool) -> BigFloat {
        BigFloat(Repr::Infinity { negative })
    }

    #[inline]
    pub const fn nan() -> BigFloat {
        BigFloat(Repr::NaN)
    }

    /// Create `2^e`.
    pub fn from_2exp(e: &Integer) -> BigFloat {
        BigFloat(Repr::Normal {
            negative: false,
            mantissa: MultiPrecisionInteger::from(1),
            exponent: e + 1,
        })
    }

    /// Create the exact value `(-1)^negative * mantissa * 2^shift`.
    pub fn from_parts(negative: bool, mantissa: MultiPrecisionInteger, shift: Integer) -> BigFloat {
        if mantissa.cmp0() == Ordering::Less {
            return Self::from_parts(!negative, mantissa.abs(), shift);
        }

        Self::normalize(negative, mantissa, shift)
    }

    /// Normalize a non-negative `mantissa` scaled by `2^shift`.
    fn normalize(negative: bool, mut mantissa: MultiPrecisionInteger, mut shift: Integer) -> BigFloat {
        let Some(t) = mantissa.find_one(0) else {
            return BigFloat::zero();
        };

        if t > 0 {
            mantissa >>= t;
            shift += t as i64;
        }

        let exponent = shift + mantissa.significant_bits() as i64;
        BigFloat(Repr::Normal {
            negative,
            mantissa,
            exponent,
        })
    }

    /// Round the non-negative `mantissa` scaled by `2^shift` to `prec` bits.
    fn normalize_round(
        negative: bool,
        mantissa: MultiPrecisionInteger,
        shift: Integer,
        prec: u32,
        round: Round,
    ) -> (BigFloat, bool) {
        assert!(prec > 0, "Precision must be positive");

        let bits = mantissa.significant_bits();
        if bits <= prec {
            return (Self::normalize(negative, mantissa, shift), false);
        }

        let discard = bits - prec;
        let lowest = mantissa.find_one(0).unwrap_or(0);
        if lowest >= discard {
            return (Self::normalize(negative, mantissa, shift), false);
        }

        let half = mantissa.get_bit(discard - 1);
        let below = lowest + 1 < discard;
        let mut q = mantissa >> discard;
        if round.increments(negative, q.is_odd(), half, below) {
            q += 1;
        }

        (Self::normalize(negative, q, shift + discard as i64), true)
    }

    /// Return `(negative, mantissa, shift)` such that the value is `(-1)^negative * mantissa * 2^shift`,
    /// for finite non-zero numbers. The mantissa is odd.
    pub fn to_parts(&self) -> Option<(bool, &MultiPrecisionInteger, Integer)> {
        match &self.0 {
            Repr::Normal {
                negative,
                mantissa,
                exponent,
            } => Some((
                *negative,
                mantissa,
                exponent - mantissa.significant_bits() as i64,
            )),
            _ => None,
        }
    }

    /// The exponent `e` such that `2^(e-1) <= |x| < 2^e`, for finite non-zero numbers.
    #[inline]
    pub fn exponent(&self) -> Option<&Integer> {
        match &self.0 {
            Repr::Normal { exponent, .. } => Some(exponent),
            _ => None,
        }
    }

    /// The number of significant bits of the mantissa. Zero for special values.
    #[inline]
    pub fn bits(&self) -> u32 {
        match &self.0 {
            Repr::Normal { mantissa, .. } => mantissa.significant_bits(),
            _ => 0,
        }
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        matches!(self.0, Repr::Zero)
    }

    #[inline]
    pub fn is_one(&self) -> bool {
        match &self.0 {
            Repr::Normal {
                negative: false,
                mantissa,
                exponent,
            } => *mantissa == 1 && *exponent == 1,
            _ => false,
        }
    }

    /// Return true iff the number is zero or a normal number.
    #[inline]
    pub fn is_finite(&self) -> bool {
        matches!(self.0, Repr::Zero | Repr::Normal { .. })
    }

    #[inline]
    pub fn is_normal(&self) -> bool {
        matches!(self.0, Repr::Normal { .. })
    }

    #[inline]
    pub fn is_nan(&self) -> bool {
        matches!(self.0, Repr::NaN)
    }

    #[inline]
    pub fn is_inf(&self) -> bool {
        matches!(self.0, Repr::Infinity { .. })
    }

    #[inline]
    pub fn is_pos_inf(&self) -> bool {
        matches!(self.0, Repr::Infinity { negative: false })
    }

    #[inline]
    pub fn is_neg_inf(&self) -> bool {
        matches!(self.0, Repr::Infinity { negative: true })
    }

    /// Return true iff the number is strictly negative, including negative infinity.
    #[inline]
    pub fn is_negative(&self) -> bool {
        matches!(
            self.0,
            Repr::Normal { negative: true, .. } | Repr::Infinity { negative: true }
        )
    }

    /// Return true iff the number is strictly positive, including positive infinity.
    #[inline]
    pub fn is_positive(&self) -> bool {
        matches!(
            self.0,
            Repr::Normal {
                negative: false,
                ..
            } | Repr::Infinity { negative: false }
        )
    }

    pub fn neg(&self) -> BigFloat {
        let mut r = self.clone();
        r.neg_assign();
        r
    }

    pub fn neg_assign(&mut self) {
        match &mut self.0 {
            Repr::Normal { negative, .. } | Repr::Infinity { negative } => *negative = !*negative,
            Repr::Zero | Repr::NaN => {}
        }
    }

    pub fn abs(&self) -> BigFloat {
        let mut r = self.clone();
        match &mut r.0 {
            Repr::Normal { negative, .. } | Repr::Infinity { negative } => *negative = false,
            Repr::Zero | Repr::NaN => {}
        }
        r
    }

    /// Multiply by `2^e`. This operation is exact.
    pub fn mul_2exp(&self, e: &Integer) -> BigFloat {
        let mut r = self.clone();
        if let Repr::Normal { exponent, .. } = &mut r.0 {
            *exponent += e;
        }
        r
    }

    /// Multiply by `2^e`. This operation is exact.
    pub fn mul_2exp_si(&self, e: i64) -> BigFloat {
        let mut r = self.clone();
        if let Repr::Normal { exponent, .. } = &mut r.0 {
            *exponent += e;
        }
        r
    }

    /// Round to `prec` significant bits.
    pub fn round(&self, prec: u32, round: Round) -> (BigFloat, bool) {
        match &self.0 {
            Repr::Normal {
                negative,
                mantissa,
                exponent,
            } => {
                assert!(prec > 0, "Precision must be positive");
                let bits = mantissa.significant_bits();
                if bits <= prec {
                    (self.clone(), false)
                } else {
                    Self::normalize_round(
                        *negative,
                        mantissa.clone(),
                        exponent - bits as i64,
                        prec,
                        round,
                    )
                }
            }
            _ => (self.clone(), false),
        }
    }

    /// Return the signed mantissa and shift of a normal number.
    #[inline]
    fn signed_parts(&self) -> Option<(MultiPrecisionInteger, Integer)> {
        match &self.0 {
            Repr::Normal {
                negative,
                mantissa,
                exponent,
            } => {
                let shift = exponent - mantissa.significant_bits() as i64;
                if *negative {
                    Some(((-mantissa).complete(), shift))
                } else {
                    Some((mantissa.clone(), shift))
                }
            }
            _ => None,
        }
    }

    /// Handle the cases of addition where at least one operand is not a normal number.
    fn add_special(&self, other: &BigFloat) -> Option<BigFloat> {
        match (&self.0, &other.0) {
            (Repr::NaN, _) | (_, Repr::NaN) => Some(BigFloat::nan()),
            (Repr::Infinity { negative: n1 }, Repr::Infinity { negative: n2 }) => {
                if n1 == n2 {
                    Some(self.clone())
                } else {
                    Some(BigFloat::nan())
                }
            }
            (Repr::Infinity { .. }, _) => Some(self.clone()),
            (_, Repr::Infinity { .. }) => Some(other.clone()),
            _ => None,
        }
    }

    /// Compute `self + other` exactly.
    ///
    /// The size of the result grows with the distance between the exponents, and the
    /// call panics if the operands cannot be aligned with a `u32` shift. Use
    /// [BigFloat::sum_sign] to compare sums of numbers with unrelated exponents.
    pub fn add_exact(&self, other: &BigFloat) -> BigFloat {
        if let Some(r) = self.add_special(other) {
            return r;
        }
        if self.is_zero() {
            return other.clone();
        }
        if other.is_zero() {
            return self.clone();
        }

        let (Some((ma, sa)), Some((mb, sb))) = (self.signed_parts(), other.signed_parts()) else {
            unreachable!()
        };
        let (sum, shift) = Self::aligned_sum(ma, sa, mb, sb);
        Self::from_parts(false, sum, shift)
    }

    /// Compute `self - other` exactly.
    pub fn sub_exact(&self, other: &BigFloat) -> BigFloat {
        self.add_exact(&other.neg())
    }

    fn aligned_sum(
        ma: MultiPrecisionInteger,
        sa: Integer,
        mb: MultiPrecisionInteger,
        sb: Integer,
    ) -> (MultiPrecisionInteger, Integer) {
        if sa >= sb {
            let d = (&sa - &sb).to_shift();
            ((ma << d) + mb, sb)
        } else {
            let d = (&sb - &sa).to_shift();
            (ma + (mb << d), sa)
        }
    }

    /// Compute `self + other`, rounded to `prec` bits.
    /// Returns the result and whether it is inexact.
    pub fn add(&self, other: &BigFloat, prec: u32, round: Round) -> (BigFloat, bool) {
        if let Some(r) = self.add_special(other) {
            return (r, false);
        }
        if self.is_zero() {
            return other.round(prec, round);
        }
        if other.is_zero() {
            return self.round(prec, round);
        }

        let (big, small) = if self.exponent() >= other.exponent() {
            (self, other)
        } else {
            (other, self)
        };

        let (Some((mb, sb)), Some((ms, ss)), Some(big_exp), Some(small_exp)) = (
            big.signed_parts(),
            small.signed_parts(),
            big.exponent(),
            small.exponent(),
        ) else {
            unreachable!()
        };

        // An operand that lies entirely below the rounding position of the other
        // only affects the result through its sign, so it is replaced by a single
        // sticky bit to keep the exact sum small.
        let threshold = (big_exp - (prec as i64 + 2)).min(sb.clone());
        let (ms, ss) = if *small_exp < threshold {
            let unit = if small.is_negative() {
                MultiPrecisionInteger::from(-1)
            } else {
                MultiPrecisionInteger::from(1)
            };
            (unit, threshold - 2)
        } else {
            (ms, ss)
        };

        let (sum, shift) = Self::aligned_sum(mb, sb, ms, ss);
        let negative = sum.cmp0() == Ordering::Less;
        Self::normalize_round(negative, sum.abs(), shift, prec, round)
    }

    /// Determine the sign of the exact sum of finite numbers. Returns `None` if any
    /// term is not finite.
    ///
    /// Terms that are far below the largest term are only added exactly when the larger
    /// terms cancel, so the cost does not depend on the distance between the exponents.
    pub fn sum_sign(terms: &[BigFloat]) -> Option<Ordering> {
        if terms.iter().any(|x| !x.is_finite()) {
            return None;
        }

        let mut terms: Vec<BigFloat> = terms.iter().filter(|x| !x.is_zero()).cloned().collect();
        loop {
            let Some(top) = terms.iter().filter_map(|x| x.exponent()).max().cloned() else {
                return Some(Ordering::Equal);
            };

            // the terms at or below 2^low add up to less than 2^(top - 2)
            let window = (usize::BITS - terms.len().leading_zeros()) as i64 + 2;
            let low = &top - window;
            let (head, tail): (Vec<_>, Vec<_>) = terms
                .into_iter()
                .partition(|x: &BigFloat| x.exponent().map_or(false, |e| *e > low));

            let mut h = BigFloat::zero();
            for x in &head {
                h = h.add_exact(x);
            }

            if tail.is_empty() {
                return h.cmp(&BigFloat::zero());
            }

            match h.exponent().map(|e| *e >= &top - 1) {
                Some(true) => return h.cmp(&BigFloat::zero()),
                Some(false) => {
                    terms = tail;
                    terms.push(h);
                }
                None => terms = tail,
            }
        }
    }

    /// Compute `self - other`, rounded to `prec` bits.
    pub fn sub(&self, other: &BigFloat, prec: u32, round: Round) -> (BigFloat, bool) {
        self.add(&other.neg(), prec, round)
    }

    /// Compute `self * other`, rounded to `prec` bits.
    pub fn mul(&self, other: &BigFloat, prec: u32, round: Round) -> (BigFloat, bool) {
        match (&self.0, &other.0) {
            (Repr::NaN, _) | (_, Repr::NaN) => (BigFloat::nan(), false),
            (Repr::Infinity { .. }, Repr::Zero) | (Repr::Zero, Repr::Infinity { .. }) => {
                (BigFloat::nan(), false)
            }
            (Repr::Infinity { .. }, _) | (_, Repr::Infinity { .. }) => (
                BigFloat::inf(self.is_negative() != other.is_negative()),
                false,
            ),
            (Repr::Zero, _) | (_, Repr::Zero) => (BigFloat::zero(), false),
            (
                Repr::Normal {
                    negative: n1,
                    mantissa: m1,
                    exponent: e1,
                },
                Repr::Normal {
                    negative: n2,
                    mantissa: m2,
                    exponent: e2,
                },
            ) => {
                let shift = e1 + e2 - (m1.significant_bits() as i64 + m2.significant_bits() as i64);
                Self::normalize_round(n1 != n2, (m1 * m2).complete(), shift, prec, round)
            }
        }
    }

    /// Compute `self * other` exactly.
    pub fn mul_exact(&self, other: &BigFloat) -> BigFloat {
        let prec = (self.bits() + other.bits()).max(1);
        self.mul(other, prec, Round::Down).0
    }

    /// Compute `self / other`, rounded to `prec` bits.
    /// Division of a non-zero number by zero yields an infinity with the sign of the numerator.
    pub fn div(&self, other: &BigFloat, prec: u32, round: Round) -> (BigFloat, bool) {
        match (&self.0, &other.0) {
            (Repr::NaN, _) | (_, Repr::NaN) => (BigFloat::nan(), false),
            (Repr::Zero, Repr::Zero) | (Repr::Infinity { .. }, Repr::Infinity { .. }) => {
                (BigFloat::nan(), false)
            }
            (_, Repr::Zero) => (BigFloat::inf(self.is_negative()), false),
            (Repr::Infinity { .. }, _) => (
                BigFloat::inf(self.is_negative() != other.is_negative()),
                false,
            ),
            (_, Repr::Infinity { .. }) | (Repr::Zero, _) => (BigFloat::zero(), false),
            (
                Repr::Normal {
                    negative: n1,
                    mantissa: m1,
                    exponent: e1,
                },
                Repr::Normal {
                    negative: n2,
                    mantissa: m2,
                    exponent: e2,
                },
            ) => {
                assert!(prec > 0, "Precision must be positive");
                let (b1, b2) = (m1.significant_bits(), m2.significant_bits());

                // scale the numerator so that the quotient has at least prec + 2 bits
                let extra = (prec + 2 + b2).saturating_sub(b1);
                let num = (m1 << extra).complete();
                let (mut q, r) = num.div_rem(m2.clone());
                let mut shift = e1 - e2 - (b1 as i64 - b2 as i64) - extra as i64;

                if r.cmp0() != Ordering::Equal {
                    // append a sticky bit
                    q <<= 1;
                    q += 1;
                    shift -= 1;
                }

                Self::normalize_round(n1 != n2, q, shift, prec, round)
            }
        }
    }

    /// Compute `1 / self`, rounded to `prec` bits.
    pub fn inv(&self, prec: u32, round: Round) -> (BigFloat, bool) {
        BigFloat::one().div(self, prec, round)
    }

    /// Compute the square root, rounded to `prec` bits. The square root of a negative number is NaN.
    pub fn sqrt(&self, prec: u32, round: Round) -> (BigFloat, bool) {
        match &self.0 {
            Repr::NaN => (BigFloat::nan(), false),
            Repr::Zero => (BigFloat::zero(), false),
            Repr::Infinity { negative } => {
                if *negative {
                    (BigFloat::nan(), false)
                } else {
                    (self.clone(), false)
                }
            }
            Repr::Normal { negative: true, .. } => (BigFloat::nan(), false),
            Repr::Normal {
                negative: false,
                mantissa,
                exponent,
            } => {
                assert!(prec > 0, "Precision must be positive");
                let bits = mantissa.significant_bits();
                let mut shift = exponent - bits as i64;
                let mut m = mantissa.clone();

                // make the shift even and give the radicand at least 2 * (prec + 2) bits
                let mut extra = (2 * (prec + 2)).saturating_sub(bits);
                if shift.is_odd() != (extra % 2 == 1) {
                    extra += 1;
                }
                m <<= extra;
                shift -= extra as i64;

                let (mut root, rem) = m.sqrt_rem(MultiPrecisionInteger::new());
                let mut root_shift = shift.half_floor();
                if rem.cmp0() != Ordering::Equal {
                    root <<= 1;
                    root += 1;
                    root_shift -= 1;
                }

                Self::normalize_round(false, root, root_shift, prec, round)
            }
        }
    }

    /// Compare two numbers. Returns `None` if either is NaN.
    pub fn cmp(&self, other: &BigFloat) -> Option<Ordering> {
        match (&self.0, &other.0) {
            (Repr::NaN, _) | (_, Repr::NaN) => None,
            (Repr::Zero, Repr::Zero) => Some(Ordering::Equal),
            _ => {
                let (s1, s2) = (self.sign_rank(), other.sign_rank());
                if s1 != s2 {
                    return Some(s1.cmp(&s2));
                }

                let c = self.cmpabs(other)?;
                if self.is_negative() {
                    Some(c.reverse())
                } else {
                    Some(c)
                }
            }
        }
    }

    #[inline]
    fn sign_rank(&self) -> i8 {
        if self.is_negative() {
            -1
        } else if self.is_zero() {
            0
        } else {
            1
        }
    }

    /// Compare with `2^e`. Returns `None` if the number is NaN.
    pub fn cmp_2exp(&self, e: &Integer) -> Option<Ordering> {
        BigFloat::cmp(self, &BigFloat::from_2exp(e))
    }

    /// Return the sign as `-1`, `0` or `1`, or `None` for NaN.
    pub fn sgn(&self) -> Option<i8> {
        if self.is_nan() {
            None
        } else {
            Some(self.sign_rank())
        }
    }

    /// Compare the absolute values of two numbers. Returns `None` if either is NaN.
    pub fn cmpabs(&self, other: &BigFloat) -> Option<Ordering> {
        match (&self.0, &other.0) {
            (Repr::NaN, _) | (_, Repr::NaN) => None,
            (Repr::Infinity { .. }, Repr::Infinity { .. }) | (Repr::Zero, Repr::Zero) => {
                Some(Ordering::Equal)
            }
            (Repr::Infinity { .. }, _) | (_, Repr::Zero) => Some(Ordering::Greater),
            (_, Repr::Infinity { .. }) | (Repr::Zero, _) => Some(Ordering::Less),
            (
                Repr::Normal {
                    mantissa: m1,
                    exponent: e1,
                    ..
                },
                Repr::Normal {
                    mantissa: m2,
                    exponent: e2,
                    ..
                },
            ) => match e1.cmp(e2) {
                Ordering::Equal => {
                    let (b1, b2) = (m1.significant_bits(), m2.significant_bits());
                    if b1 >= b2 {
                        Some(m1.cmp(&(m2 << (b1 - b2)).complete()))
                    } else {
                        Some((m1 << (b2 - b1)).complete().cmp(m2))
                    }
                }
                o => Some(o),
            },
        }
    }

    /// Return the smallest of the two numbers. NaN propagates.
    pub fn min(&self, other: &BigFloat) -> BigFloat {
        match self.cmp(other) {
            None => BigFloat::nan(),
            Some(Ordering::Greater) => other.clone(),
            _ => self.clone(),
        }
    }

    /// Return the largest of the two numbers. NaN propagates.
    pub fn max(&self, other: &BigFloat) -> BigFloat {
        match self.cmp(other) {
            None => BigFloat::nan(),
            Some(Ordering::Less) => other.clone(),
            _ => self.clone(),
        }
    }

    /// Convert an `f64` exactly.
    pub fn from_f64(f: f64) -> BigFloat {
        if f.is_nan() {
            return BigFloat::nan();
        }
        if f.is_infinite() {
            return BigFloat::inf(f < 0.);
        }
        if f == 0. {
            return BigFloat::zero();
        }

        let bits = f.to_bits();
        let negative = bits >> 63 == 1;
        let biased = ((bits >> 52) & 0x7ff) as i64;
        let fraction = bits & ((1 << 52) - 1);
        let (m, e) = if biased == 0 {
            (fraction, -1074)
        } else {
            (fraction | (1 << 52), biased - 1075)
        };

        Self::normalize(negative, m.into(), e.into())
    }

    /// Convert to the nearest `f64`.
    pub fn to_f64(&self) -> f64 {
        match &self.0 {
            Repr::Zero => 0.,
            Repr::NaN => f64::NAN,
            Repr::Infinity { negative } => {
                if *negative {
                    f64::NEG_INFINITY
                } else {
                    f64::INFINITY
                }
            }
            Repr::Normal { .. } => {
                let (r, _) = self.round(53, Round::Nearest);
                let Some((negative, m, shift)) = r.to_parts() else {
                    unreachable!()
                };
                let m = m.to_f64();
                let v = match shift.to_i64() {
                    Some(s) if s > 1100 => f64::INFINITY,
                    Some(s) if s < -1200 => 0.,
                    Some(s) => {
                        let h = (s / 2) as i32;
                        m * 2f64.powi(h) * 2f64.powi(s as i32 - h)
                    }
                    None => {
                        if shift.is_negative() {
                            0.
                        } else {
                            f64::INFINITY
                        }
                    }
                };
                if negative {
                    -v
                } else {
                    v
                }
            }
        }
    }

    /// Convert an integer, rounded to `prec` bits.
    pub fn from_integer(n: &MultiPrecisionInteger, prec: u32, round: Round) -> (BigFloat, bool) {
        Self::normalize_round(
            n.cmp0() == Ordering::Less,
            n.clone().abs(),
            Integer::zero(),
            prec,
            round,
        )
    }

    /// Convert a rational number, rounded to `prec` bits.
    pub fn from_rational(q: &Rational, prec: u32, round: Round) -> (BigFloat, bool) {
        let num = BigFloat::from(q.numer());
        let den = BigFloat::from(q.denom());
        num.div(&den, prec, round)
    }

    /// Convert to an exact rational number, if the number is finite and its
    /// binary shift fits in a `u32`.
    pub fn to_rational(&self) -> Option<Rational> {
        match &self.0 {
            Repr::Zero => Some(Rational::new()),
            Repr::Normal { .. } => {
                let (negative, m, shift) = self.to_parts()?;
                let s = u32::try_from(shift.abs().to_i64()?).ok()?;
                let m = if negative { (-m).complete() } else { m.clone() };
                if shift.is_negative() {
                    let den = MultiPrecisionInteger::from(1) << s;
                    Some(Rational::from((m, den)))
                } else {
                    Some(Rational::from(m << s))
                }
            }
            _ => None,
        }
    }

    /// Convert to an MPFR float without rounding. Returns `None` if the exponent is
    /// outside the range that is supported by MPFR.
    pub(crate) fn to_multi_prec_float(&self) -> Option<MultiPrecisionFloat> {
        match &self.0 {
            Repr::Zero => Some(MultiPrecisionFloat::with_val(2, Special::Zero)),
            Repr::NaN => Some(MultiPrecisionFloat::with_val(2, Special::Nan)),
            Repr::Infinity { negative } => Some(MultiPrecisionFloat::with_val(
                2,
                if *negative {
                    Special::NegInfinity
                } else {
                    Special::Infinity
                },
            )),
            Repr::Normal {
                negative,
                mantissa,
                exponent,
            } => {
                let e = exponent.to_i64()?;
                if e.abs() > MULTI_PREC_FLOAT_MAX_EXP {
                    return None;
                }

                let bits = mantissa.significant_bits();
                let shift = i32::try_from(e - bits as i64).ok()?;
                let mut f = MultiPrecisionFloat::with_val(bits.max(2), mantissa);
                f <<= shift;
                if *negative {
                    f = -f;
                }
                Some(f)
            }
        }
    }

    /// Convert an MPFR float exactly.
    pub(crate) fn from_multi_prec_float(f: &MultiPrecisionFloat) -> BigFloat {
        if f.is_nan() {
            BigFloat::nan()
        } else if f.is_infinite() {
            BigFloat::inf(f.is_sign_negative())
        } else if f.is_zero() {
            BigFloat::zero()
        } else {
            match f.to_integer_exp() {
                Some((m, e)) => BigFloat::from_parts(false, m, e.into()),
                None => BigFloat::nan(),
            }
        }
    }

    /// Sample a random finite number with at most `bits` mantissa bits and an
    /// exponent of at most `exp_bits` bits. Zero and powers of two are sampled
    /// with increased probability.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, bits: u32, exp_bits: u32) -> BigFloat {
        if rng.gen_range(0..16) == 0 {
            return BigFloat::zero();
        }

        let nbits = rng.gen_range(1..=bits.max(1));
        let mantissa = match rng.gen_range(0..4) {
            0 => MultiPrecisionInteger::from(1) << (nbits - 1),
            1 => (MultiPrecisionInteger::from(1) << nbits) - 1u32,
            _ => {
                let words: Vec<u64> = (0..(nbits + 63) / 64).map(|_| rng.gen()).collect();
                let mut m = MultiPrecisionInteger::from_digits(&words, Order::Lsf);
                m.keep_bits_mut(nbits);
                m.set_bit(nbits - 1, true);
                m
            }
        };

        let max_exp = 1i64 << exp_bits.min(62);
        let e = rng.gen_range(-max_exp..=max_exp);
        Self::from_parts(rng.gen(), mantissa, Integer::from(e) - nbits as i64)
    }

    /// Like [BigFloat::random], but also samples infinities and NaN.
    pub fn random_special<R: Rng + ?Sized>(rng: &mut R, bits: u32, exp_bits: u32) -> BigFloat {
        match rng.gen_range(0..32) {
            0 => BigFloat::pos_inf(),
            1 => BigFloat::neg_inf(),
            2 => BigFloat::nan(),
            _ => Self::random(rng, bits, exp_bits),
        }
    }
}

impl From<i64> for BigFloat {
    fn from(value: i64) -> Self {
        BigFloat::from_parts(false, value.into(), Integer::zero())
    }
}

impl From<i32> for BigFloat {
    fn from(value: i32) -> Self {
        BigFloat::from(value as i64)
    }
}

impl From<u64> for BigFloat {
    fn from(value: u64) -> Self {
        BigFloat::from_parts(false, value.into(), Integer::zero())
    }
}

impl From<&MultiPrecisionInteger> for BigFloat {
    fn from(value: &MultiPrecisionInteger) -> Self {
        BigFloat::from_parts(false, value.clone(), Integer::zero())
    }
}

impl From<MultiPrecisionInteger> for BigFloat {
    fn from(value: MultiPrecisionInteger) -> Self {
        BigFloat::from_parts(false, value, Integer::zero())
    }
}

impl PartialOrd for BigFloat {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        BigFloat::cmp(self, other)
    }
}

impl InternalOrdering for BigFloat {
    /// A total order in which NaN is the largest element.
    fn internal_cmp(&self, other: &Self) -> Ordering {
        match (self.is_nan(), other.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => BigFloat::cmp(self, other).unwrap_or(Ordering::Equal),
        }
    }
}

impl Debug for BigFloat {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Repr::Zero => f.write_str("0"),
            Repr::NaN => f.write_str("nan"),
            Repr::Infinity { negative } => f.write_str(if *negative { "-inf" } else { "+inf" }),
            Repr::Normal { .. } => {
                let Some((negative, m, shift)) = self.to_parts() else {
                    unreachable!()
                };
                if negative {
                    write!(f, "-{}*2^{}", m, shift)
                } else {
                    write!(f, "{}*2^{}", m, shift)
                }
            }
        }
    }
}

impl Display for BigFloat {
    /// Print the number in decimal with as many digits as the mantissa
    /// supports. The value may not be reconstructible from this output.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Repr::Zero => f.write_str("0"),
            Repr::NaN => f.write_str("nan"),
            Repr::Infinity { negative } => f.write_str(if *negative { "-inf" } else { "+inf" }),
            Repr::Normal { mantissa, .. } => match self.to_multi_prec_float() {
                Some(mp) if f.precision().is_some() => Display::fmt(&mp, f),
                Some(mp) => {
                    let digits = ((mantissa.significant_bits() as f64 * LOG10_2).ceil() as usize)
                        .max(1);
                    write!(f, "{0:.1$e}", mp, digits - 1)
                }
                None => Debug::fmt(self, f),
            },
        }
    }
}

#[cfg(test)]
mod test {
    use std::cmp::Ordering;

    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoshiro256StarStar;
    use rug::Integer as MultiPrecisionInteger;

    use super::{BigFloat, Round};
    use crate::domains::{integer::Integer, rational::Rational};

    #[test]
    fn rounding_modes() {
        let a = BigFloat::from(11);
        assert_eq!(a.round(2, Round::Nearest), (BigFloat::from(12), true));
        assert_eq!(a.round(2, Round::Down), (BigFloat::from(8), true));
        assert_eq!(a.round(2, Round::Up), (BigFloat::from(12), true));
        assert_eq!(a.round(2, Round::Floor), (BigFloat::from(8), true));
        assert_eq!(a.round(2, Round::Ceil), (BigFloat::from(12), true));

        let b = BigFloat::from(-11);
        assert_eq!(b.round(2, Round::Floor), (BigFloat::from(-12), true));
        assert_eq!(b.round(2, Round::Ceil), (BigFloat::from(-8), true));
        assert_eq!(b.round(2, Round::TOWARD_ZERO), (BigFloat::from(-8), true));

        // ties to even
        assert_eq!(BigFloat::from(10).round(2, Round::Nearest).0, BigFloat::from(8));
        assert_eq!(BigFloat::from(14).round(2, Round::Nearest).0, BigFloat::from(16));
        assert_eq!(BigFloat::from(12).round(2, Round::Nearest), (BigFloat::from(12), false));
    }

    #[test]
    fn unique_representation() {
        let a = BigFloat::from(6);
        let b = BigFloat::from(3).mul_2exp_si(1);
        assert_eq!(a, b);
        assert_eq!(a.bits(), 2);
        assert_eq!(a.exponent(), Some(&Integer::new(3)));
        assert_eq!(BigFloat::from_2exp(&Integer::new(0)), BigFloat::one());
        assert!(BigFloat::one().is_one());
    }

    #[test]
    fn special_values() {
        let zero = BigFloat::zero();
        let one = BigFloat::one();
        let inf = BigFloat::pos_inf();
        let ninf = BigFloat::neg_inf();

        assert!(zero.mul(&inf, 10, Round::Nearest).0.is_nan());
        assert!(inf.add(&ninf, 10, Round::Nearest).0.is_nan());
        assert!(zero.div(&zero, 10, Round::Nearest).0.is_nan());
        assert_eq!(one.div(&zero, 10, Round::Nearest).0, inf);
        assert_eq!(one.neg().div(&zero, 10, Round::Nearest).0, ninf);
        assert_eq!(one.div(&inf, 10, Round::Nearest).0, zero);
        assert!(BigFloat::nan().add(&one, 10, Round::Nearest).0.is_nan());
        assert!(one.max(&BigFloat::nan()).is_nan());
        assert!(BigFloat::nan().min(&one).is_nan());
        assert_eq!(ninf.max(&one), one);
        assert_eq!(ninf.min(&one), ninf);
    }

    #[test]
    fn exact_then_round() {
        let a = BigFloat::one();
        let tiny = BigFloat::one().mul_2exp_si(-1000);

        let (r, inexact) = a.add(&tiny, 53, Round::Nearest);
        assert_eq!(r, a);
        assert!(inexact);

        let (r, _) = a.add(&tiny, 53, Round::Ceil);
        assert!(r > a);
        let (r, _) = a.sub(&tiny, 53, Round::Floor);
        assert!(r < a);
        let (r, _) = a.sub(&tiny, 53, Round::Nearest);
        assert_eq!(r, a);

        let exact = a.add_exact(&tiny);
        assert_eq!(exact.bits(), 1001);
        assert_eq!(exact.sub_exact(&tiny), a);
    }

    #[test]
    fn division() {
        let one = BigFloat::one();
        let three = BigFloat::from(3);
        let (lo, inexact) = one.div(&three, 30, Round::Floor);
        let (hi, _) = one.div(&three, 30, Round::Ceil);
        assert!(inexact);

        let third = Rational::from((1, 3));
        assert!(lo.to_rational().unwrap() < third);
        assert!(hi.to_rational().unwrap() > third);
        assert_eq!(lo.bits(), 30);

        let (q, inexact) = BigFloat::from(12).div(&three, 2, Round::Nearest);
        assert_eq!(q, BigFloat::from(4));
        assert!(!inexact);
    }

    #[test]
    fn square_root() {
        let (r, inexact) = BigFloat::from(16).sqrt(10, Round::Nearest);
        assert_eq!(r, BigFloat::from(4));
        assert!(!inexact);

        let (lo, _) = BigFloat::from(2).sqrt(100, Round::Floor);
        let (hi, _) = BigFloat::from(2).sqrt(100, Round::Ceil);
        assert!(lo.mul_exact(&lo) < BigFloat::from(2));
        assert!(hi.mul_exact(&hi) > BigFloat::from(2));

        let (r, _) = BigFloat::from(2).mul_2exp_si(-3).sqrt(10, Round::Nearest);
        assert!((r.to_f64() - 0.5f64.sqrt()).abs() < 1e-3);

        assert!(BigFloat::from(-1).sqrt(10, Round::Nearest).0.is_nan());
    }

    #[test]
    fn comparison() {
        let a = BigFloat::from(-5);
        let b = BigFloat::from(3);
        assert_eq!(a.cmp(&b), Some(Ordering::Less));
        assert_eq!(a.cmpabs(&b), Some(Ordering::Greater));
        assert_eq!(BigFloat::neg_inf().cmp(&a), Some(Ordering::Less));
        assert_eq!(BigFloat::pos_inf().cmp(&b), Some(Ordering::Greater));
        assert_eq!(BigFloat::nan().cmp(&b), None);
        assert_eq!(b.cmp_2exp(&Integer::new(1)), Some(Ordering::Greater));
        assert_eq!(BigFloat::from(4).cmp_2exp(&Integer::new(2)), Some(Ordering::Equal));
        assert_eq!(a.sgn(), Some(-1));
        assert_eq!(BigFloat::nan().sgn(), None);
        assert_eq!(
            BigFloat::from(5).cmp(&BigFloat::from(3).mul_2exp_si(1)),
            Some(Ordering::Less)
        );
        assert_eq!(
            BigFloat::from(7).cmp(&BigFloat::from(3).mul_2exp_si(1)),
            Some(Ordering::Greater)
        );
    }

    #[test]
    fn conversions() {
        for x in [0.1, -3.75, 1e300, 5e-324, -2.2250738585072014e-308] {
            let f = BigFloat::from_f64(x);
            assert_eq!(f.to_f64(), x);
        }

        let q = Rational::from((-7, 8));
        let (f, inexact) = BigFloat::from_rational(&q, 10, Round::Nearest);
        assert!(!inexact);
        assert_eq!(f.to_rational(), Some(q));

        let n = MultiPrecisionInteger::from(255);
        assert_eq!(
            BigFloat::from_integer(&n, 4, Round::Down),
            (BigFloat::from(240), true)
        );
    }

    #[test]
    fn sign_of_sums() {
        let one = BigFloat::one();
        let tiny = BigFloat::one().mul_2exp(&Integer::new(-(1 << 33)));

        assert_eq!(
            BigFloat::sum_sign(&[one.clone(), one.neg(), tiny.clone()]),
            Some(Ordering::Greater)
        );
        assert_eq!(
            BigFloat::sum_sign(&[tiny.clone(), one.clone()]),
            Some(Ordering::Greater)
        );
        assert_eq!(
            BigFloat::sum_sign(&[one.clone(), tiny.neg(), one.neg(), tiny.clone()]),
            Some(Ordering::Equal)
        );
        assert_eq!(BigFloat::sum_sign(&[]), Some(Ordering::Equal));
        assert_eq!(BigFloat::sum_sign(&[one.clone(), BigFloat::nan()]), None);
        assert!(tiny.to_rational().is_none());

        let mut rng = Xoshiro256StarStar::seed_from_u64(4);
        for _ in 0..1000 {
            let terms: Vec<_> = (0..rng.gen_range(1..6))
                .map(|_| BigFloat::random(&mut rng, 40, 5))
                .collect();
            let exact = terms
                .iter()
                .fold(BigFloat::zero(), |acc, x| acc.add_exact(x));
            assert_eq!(BigFloat::sum_sign(&terms), exact.cmp(&BigFloat::zero()));
        }
    }

    #[test]
    fn multi_prec_float_roundtrip() {
        let a = BigFloat::from(-12345).mul_2exp_si(-77);
        let mp = a.to_multi_prec_float().unwrap();
        assert_eq!(BigFloat::from_multi_prec_float(&mp), a);

        let huge = BigFloat::one().mul_2exp(&Integer::new(1 << 40));
        assert!(huge.to_multi_prec_float().is_none());
    }
}
