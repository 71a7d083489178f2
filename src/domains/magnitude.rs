//! Non-negative upper bounds with a fixed-size mantissa and an unbounded exponent.
//!
//! A [Magnitude] is used as the radius of a [Ball](super::ball::Ball). All operations
//! round away from zero, so that the result is always an upper bound for the exact result.

use std::{
    cmp::Ordering,
    fmt::{self, Debug, Display, Formatter},
};

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{
    float::{BigFloat, Round},
    integer::Integer,
};

/// The number of mantissa bits of a [Magnitude].
pub const MAG_BITS: u32 = 30;

const MAG_ONE_HALF: u32 = 1 << (MAG_BITS - 1);
const MAG_ONE: u64 = 1 << MAG_BITS;

#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
enum MagRepr {
    Zero,
    /// The value `man * 2^(exp - MAG_BITS)` with `2^(MAG_BITS - 1) <= man < 2^MAG_BITS`.
    Finite {
        man: u32,
        exp: Integer,
    },
    Inf,
}

/// A non-negative number with a [MAG_BITS]-bit mantissa, or positive infinity.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Magnitude(MagRepr);

impl Default for Magnitude {
    fn default() -> Self {
        Magnitude::zero()
    }
}

impl Magnitude {
    #[inline]
    pub const fn zero() -> Magnitude {
        Magnitude(MagRepr::Zero)
    }

    #[inline]
    pub const fn inf() -> Magnitude {
        Magnitude(MagRepr::Inf)
    }

    #[inline]
    pub fn one() -> Magnitude {
        Magnitude::from_2exp(&Integer::zero())
    }

    /// Create `2^e`.
    pub fn from_2exp(e: &Integer) -> Magnitude {
        Magnitude(MagRepr::Finite {
            man: MAG_ONE_HALF,
            exp: e + 1,
        })
    }

    /// Create an upper bound of `m * 2^shift`.
    fn from_u64_up(m: u64, shift: Integer) -> Magnitude {
        if m == 0 {
            return Magnitude::zero();
        }

        let bits = 64 - m.leading_zeros();
        let exp = shift + bits as i64;
        if bits <= MAG_BITS {
            return Magnitude(MagRepr::Finite {
                man: (m << (MAG_BITS - bits)) as u32,
                exp,
            });
        }

        let discard = bits - MAG_BITS;
        let mut man = m >> discard;
        if m & ((1 << discard) - 1) != 0 {
            man += 1;
        }

        if man == MAG_ONE {
            Magnitude(MagRepr::Finite {
                man: MAG_ONE_HALF,
                exp: exp + 1,
            })
        } else {
            Magnitude(MagRepr::Finite {
                man: man as u32,
                exp,
            })
        }
    }

    /// Create an upper bound of `|x|`. The bound of NaN is infinity.
    pub fn from_float(x: &BigFloat) -> Magnitude {
        Self::from_float_rounded(x, Round::Up)
    }

    /// Create a lower bound of `|x|`. The bound of NaN is zero.
    pub fn from_float_lower(x: &BigFloat) -> Magnitude {
        if x.is_nan() {
            return Magnitude::zero();
        }
        Self::from_float_rounded(x, Round::Down)
    }

    fn from_float_rounded(x: &BigFloat, round: Round) -> Magnitude {
        if x.is_nan() || x.is_inf() {
            return Magnitude::inf();
        }

        let (r, _) = x.round(MAG_BITS, round);
        match r.to_parts() {
            Some((_, m, shift)) => match m.to_u64() {
                Some(m) => Self::from_u64_up(m, shift),
                None => unreachable!(),
            },
            None => Magnitude::zero(),
        }
    }

    /// Create an upper bound of `|f|`.
    pub fn from_f64(f: f64) -> Magnitude {
        Self::from_float(&BigFloat::from_f64(f))
    }

    /// Convert to a float exactly.
    pub fn to_float(&self) -> BigFloat {
        match &self.0 {
            MagRepr::Zero => BigFloat::zero(),
            MagRepr::Inf => BigFloat::pos_inf(),
            MagRepr::Finite { man, exp } => {
                BigFloat::from_parts(false, (*man).into(), exp - MAG_BITS as i64)
            }
        }
    }

    /// Convert to an `f64` that is not smaller than the magnitude.
    pub fn to_f64(&self) -> f64 {
        match &self.0 {
            MagRepr::Zero => 0.,
            MagRepr::Inf => f64::INFINITY,
            MagRepr::Finite { exp, .. } => match exp.to_i64() {
                Some(e) if e > 1024 => f64::INFINITY,
                Some(_) => {
                    let f = self.to_float().to_f64();
                    if f == 0. {
                        f64::MIN_POSITIVE
                    } else {
                        f
                    }
                }
                None if exp.is_negative() => f64::MIN_POSITIVE,
                None => f64::INFINITY,
            },
        }
    }

    /// Return the mantissa and exponent `(man, exp)` such that the value is `man * 2^(exp - MAG_BITS)`,
    /// for finite non-zero magnitudes.
    pub fn to_parts(&self) -> Option<(u32, &Integer)> {
        match &self.0 {
            MagRepr::Finite { man, exp } => Some((*man, exp)),
            _ => None,
        }
    }

    /// The exponent `e` such that `2^(e-1) <= x < 2^e`, for finite non-zero magnitudes.
    pub fn exponent(&self) -> Option<&Integer> {
        match &self.0 {
            MagRepr::Finite { exp, .. } => Some(exp),
            _ => None,
        }
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        matches!(self.0, MagRepr::Zero)
    }

    #[inline]
    pub fn is_inf(&self) -> bool {
        matches!(self.0, MagRepr::Inf)
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        !self.is_inf()
    }

    /// Compute an upper bound of `self + other`.
    pub fn add(&self, other: &Magnitude) -> Magnitude {
        match (&self.0, &other.0) {
            (MagRepr::Inf, _) | (_, MagRepr::Inf) => Magnitude::inf(),
            (MagRepr::Zero, _) => other.clone(),
            (_, MagRepr::Zero) => self.clone(),
            (MagRepr::Finite { man: m1, exp: e1 }, MagRepr::Finite { man: m2, exp: e2 }) => {
                let ((hm, he), (lm, le)) = if e1 >= e2 {
                    ((*m1, e1), (*m2, e2))
                } else {
                    ((*m2, e2), (*m1, e1))
                };

                match (he - le).to_i64() {
                    Some(d) if d < 32 => Self::from_u64_up(
                        ((hm as u64) << d) + lm as u64,
                        le - MAG_BITS as i64,
                    ),
                    // the smaller term is below one unit in the last place
                    _ => Self::from_u64_up(hm as u64 + 1, he - MAG_BITS as i64),
                }
            }
        }
    }

    pub fn add_assign(&mut self, other: &Magnitude) {
        *self = self.add(other);
    }

    /// Compute an upper bound of `self * other`. Zero times infinity is zero.
    pub fn mul(&self, other: &Magnitude) -> Magnitude {
        match (&self.0, &other.0) {
            (MagRepr::Zero, _) | (_, MagRepr::Zero) => Magnitude::zero(),
            (MagRepr::Inf, _) | (_, MagRepr::Inf) => Magnitude::inf(),
            (MagRepr::Finite { man: m1, exp: e1 }, MagRepr::Finite { man: m2, exp: e2 }) => {
                Self::from_u64_up(
                    *m1 as u64 * *m2 as u64,
                    e1 + e2 - 2 * MAG_BITS as i64,
                )
            }
        }
    }

    /// Compute an upper bound of `self / other`. A non-zero magnitude divided by zero
    /// is infinity, and zero divided by zero is infinity as well.
    pub fn div(&self, other: &Magnitude) -> Magnitude {
        match (&self.0, &other.0) {
            (MagRepr::Inf, _) | (_, MagRepr::Zero) => Magnitude::inf(),
            (MagRepr::Zero, _) | (_, MagRepr::Inf) => Magnitude::zero(),
            (MagRepr::Finite { man: m1, exp: e1 }, MagRepr::Finite { man: m2, exp: e2 }) => {
                let num = (*m1 as u64) << 32;
                let den = *m2 as u64;
                let mut q = num / den;
                if num % den != 0 {
                    q += 1;
                }
                Self::from_u64_up(q, e1 - e2 - 32)
            }
        }
    }

    /// Compute an upper bound of `self * x` for an exact float `x`.
    pub fn mul_float(&self, x: &BigFloat) -> Magnitude {
        self.mul(&Magnitude::from_float(x))
    }

    /// Multiply by `2^e`. This operation is exact.
    pub fn mul_2exp(&self, e: &Integer) -> Magnitude {
        match &self.0 {
            MagRepr::Finite { man, exp } => Magnitude(MagRepr::Finite {
                man: *man,
                exp: exp + e,
            }),
            _ => self.clone(),
        }
    }

    /// Compute an upper bound of `self^e`.
    pub fn pow(&self, mut e: u64) -> Magnitude {
        let mut base = self.clone();
        let mut r = Magnitude::one();
        while e > 0 {
            if e & 1 == 1 {
                r = r.mul(&base);
            }
            e >>= 1;
            if e > 0 {
                base = base.mul(&base);
            }
        }
        r
    }

    pub fn max(&self, other: &Magnitude) -> Magnitude {
        if self >= other {
            self.clone()
        } else {
            other.clone()
        }
    }

    pub fn min(&self, other: &Magnitude) -> Magnitude {
        if self <= other {
            self.clone()
        } else {
            other.clone()
        }
    }

    /// Sample a random magnitude with an exponent of at most `exp_bits` bits.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, exp_bits: u32) -> Magnitude {
        match rng.gen_range(0..16) {
            0 => Magnitude::zero(),
            1 => Magnitude::inf(),
            _ => {
                let max_exp = 1i64 << exp_bits.min(62);
                let man = match rng.gen_range(0..4) {
                    0 => MAG_ONE_HALF,
                    1 => (MAG_ONE - 1) as u32,
                    _ => rng.gen_range(MAG_ONE_HALF..MAG_ONE as u32),
                };
                Magnitude(MagRepr::Finite {
                    man,
                    exp: rng.gen_range(-max_exp..=max_exp).into(),
                })
            }
        }
    }
}

impl From<u32> for Magnitude {
    fn from(value: u32) -> Self {
        Magnitude::from_u64_up(value as u64, Integer::zero())
    }
}

impl Ord for Magnitude {
    fn cmp(&self, other: &Self) -> Ordering {
        match (&self.0, &other.0) {
            (MagRepr::Zero, MagRepr::Zero) | (MagRepr::Inf, MagRepr::Inf) => Ordering::Equal,
            (MagRepr::Zero, _) | (_, MagRepr::Inf) => Ordering::Less,
            (_, MagRepr::Zero) | (MagRepr::Inf, _) => Ordering::Greater,
            (MagRepr::Finite { man: m1, exp: e1 }, MagRepr::Finite { man: m2, exp: e2 }) => {
                e1.cmp(e2).then(m1.cmp(m2))
            }
        }
    }
}

impl PartialOrd for Magnitude {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Debug for Magnitude {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.0 {
            MagRepr::Zero => f.write_str("0"),
            MagRepr::Inf => f.write_str("+inf"),
            MagRepr::Finite { man, exp } => write!(f, "{}*2^{}", man, exp - MAG_BITS as i64),
        }
    }
}

impl Display for Magnitude {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.0 {
            MagRepr::Zero => f.write_str("0"),
            MagRepr::Inf => f.write_str("+inf"),
            MagRepr::Finite { .. } => match self.to_float().to_multi_prec_float() {
                Some(x) => write!(f, "{:.3e}", x),
                None => Debug::fmt(self, f),
            },
        }
    }
}

#[cfg(test)]
mod test {
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;

    use super::{Magnitude, MAG_BITS};
    use crate::domains::{
        float::{BigFloat, Round},
        integer::Integer,
    };

    #[test]
    fn from_float_is_upper_bound() {
        let x = BigFloat::from((1i64 << 40) + 1);
        let m = Magnitude::from_float(&x);
        assert!(m.to_float() > x);
        assert!(Magnitude::from_float_lower(&x).to_float() < x);

        let y = BigFloat::from(-3);
        assert_eq!(Magnitude::from_float(&y).to_float(), BigFloat::from(3));
        assert!(Magnitude::from_float(&BigFloat::nan()).is_inf());
    }

    #[test]
    fn rounding_overflow() {
        // all mantissa bits set plus one ulp carries into the exponent
        let m = Magnitude::from(((1u64 << MAG_BITS) - 1) as u32);
        let r = m.add(&Magnitude::from(1));
        assert_eq!(r.to_float(), BigFloat::from(1i64 << MAG_BITS));
        assert_eq!(r.exponent(), Some(&Integer::new(MAG_BITS as i64 + 1)));
    }

    #[test]
    fn far_apart_addition() {
        let one = Magnitude::one();
        let tiny = Magnitude::from_2exp(&Integer::new(-100));
        let r = one.add(&tiny);
        assert!(r > one);
        assert!(r.to_float() > one.to_float().add_exact(&tiny.to_float()).mul_2exp_si(-1));
    }

    #[test]
    fn special_values() {
        let zero = Magnitude::zero();
        let inf = Magnitude::inf();
        let two = Magnitude::from(2);
        assert!(zero.mul(&inf).is_zero());
        assert!(two.div(&zero).is_inf());
        assert!(two.div(&inf).is_zero());
        assert!(two.add(&inf).is_inf());
        assert_eq!(two.pow(10).to_float(), BigFloat::from(1024));
        assert!(zero < two && two < inf);
    }

    #[test]
    fn operations_are_upper_bounds() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(7);
        for _ in 0..1000 {
            let a = Magnitude::random(&mut rng, 6);
            let b = Magnitude::random(&mut rng, 6);
            if a.is_inf() || b.is_inf() {
                continue;
            }
            let (fa, fb) = (a.to_float(), b.to_float());

            assert!(a.add(&b).to_float() >= fa.add_exact(&fb));
            assert!(a.mul(&b).to_float() >= fa.mul_exact(&fb));

            if !b.is_zero() {
                let q = a.div(&b).to_float();
                assert!(q.mul_exact(&fb) >= fa);
                let (exact, _) = fa.div(&fb, 200, Round::Floor);
                assert!(q >= exact);
            }
        }
    }
}
