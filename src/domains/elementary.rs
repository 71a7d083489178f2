//! Elementary functions of real and complex balls.
//!
//! Function values at the endpoints, or at the midpoint, are computed with MPFR using
//! directed rounding, and then widened by a bound on the variation of the function over
//! the ball. Arguments whose exponents are too large to be represented by MPFR yield an
//! indeterminate result.

use rug::float::{Constant, Round as FloatRound};
use rug::Float as MultiPrecisionFloat;

use super::{
    ball::Ball,
    complex_ball::ComplexBall,
    float::{BigFloat, Round},
    magnitude::Magnitude,
};

/// Extra bits used for intermediate evaluations.
const GUARD_BITS: u32 = 10;

type Evaluator = fn(&MultiPrecisionFloat, u32, FloatRound) -> MultiPrecisionFloat;

/// Evaluate `f(x)` at `prec` bits, rounded in direction `round`.
fn eval(x: &BigFloat, prec: u32, round: FloatRound, f: Evaluator) -> Option<BigFloat> {
    let x = x.to_multi_prec_float()?;
    Some(BigFloat::from_multi_prec_float(&f(&x, prec.max(2), round)))
}

fn mp_sqrt(x: &MultiPrecisionFloat, prec: u32, round: FloatRound) -> MultiPrecisionFloat {
    MultiPrecisionFloat::with_val_round(prec, x.sqrt_ref(), round).0
}

fn mp_exp(x: &MultiPrecisionFloat, prec: u32, round: FloatRound) -> MultiPrecisionFloat {
    MultiPrecisionFloat::with_val_round(prec, x.exp_ref(), round).0
}

fn mp_ln(x: &MultiPrecisionFloat, prec: u32, round: FloatRound) -> MultiPrecisionFloat {
    MultiPrecisionFloat::with_val_round(prec, x.ln_ref(), round).0
}

fn mp_atan(x: &MultiPrecisionFloat, prec: u32, round: FloatRound) -> MultiPrecisionFloat {
    MultiPrecisionFloat::with_val_round(prec, x.atan_ref(), round).0
}

fn mp_sin(x: &MultiPrecisionFloat, prec: u32, round: FloatRound) -> MultiPrecisionFloat {
    MultiPrecisionFloat::with_val_round(prec, x.sin_ref(), round).0
}

fn mp_cos(x: &MultiPrecisionFloat, prec: u32, round: FloatRound) -> MultiPrecisionFloat {
    MultiPrecisionFloat::with_val_round(prec, x.cos_ref(), round).0
}

/// Apply an increasing function to the endpoints of the ball.
fn increasing(x: &Ball, prec: u32, f: Evaluator) -> Ball {
    let wp = prec + GUARD_BITS;
    let (lo, hi) = (x.lbound(wp), x.ubound(wp));
    increasing_on(&lo, &hi, prec, f)
}

fn increasing_on(lo: &BigFloat, hi: &BigFloat, prec: u32, f: Evaluator) -> Ball {
    let wp = prec + GUARD_BITS;
    match (eval(lo, wp, FloatRound::Down, f), eval(hi, wp, FloatRound::Up, f)) {
        (Some(lo), Some(hi)) => Ball::from_interval(&lo, &hi, prec),
        _ => Ball::indeterminate(),
    }
}

/// Apply a 1-Lipschitz function bounded by one in absolute value.
fn lipschitz_unit(x: &Ball, prec: u32, f: Evaluator) -> Ball {
    if x.is_nan() {
        return Ball::indeterminate();
    }
    if !x.is_finite() {
        return Ball::new(BigFloat::zero(), Magnitude::one());
    }

    let wp = prec + GUARD_BITS;
    let (Some(lo), Some(hi)) = (
        eval(x.mid(), wp, FloatRound::Down, f),
        eval(x.mid(), wp, FloatRound::Up, f),
    ) else {
        return Ball::new(BigFloat::zero(), Magnitude::one());
    };

    let r = x.rad().to_float();
    let lo = lo.sub(&r, wp, Round::Floor).0.max(&BigFloat::from(-1));
    let hi = hi.add(&r, wp, Round::Ceil).0.min(&BigFloat::one());
    Ball::from_interval(&lo, &hi, prec)
}

/// A ball containing `pi`.
pub fn pi(prec: u32) -> Ball {
    let wp = prec + GUARD_BITS;
    let lo = MultiPrecisionFloat::with_val_round(wp, Constant::Pi, FloatRound::Down).0;
    let hi = MultiPrecisionFloat::with_val_round(wp, Constant::Pi, FloatRound::Up).0;
    Ball::from_interval(
        &BigFloat::from_multi_prec_float(&lo),
        &BigFloat::from_multi_prec_float(&hi),
        prec,
    )
}

impl Ball {
    /// Compute the square root. The result is indeterminate if the ball contains negative numbers.
    pub fn sqrt(&self, prec: u32) -> Ball {
        let lo = self.lbound(prec + GUARD_BITS);
        if lo.is_nan() || lo.is_negative() {
            return Ball::indeterminate();
        }
        increasing(self, prec, mp_sqrt)
    }

    /// Compute the square root of the non-negative part of the ball.
    pub fn sqrtpos(&self, prec: u32) -> Ball {
        let wp = prec + GUARD_BITS;
        let (lo, hi) = (self.lbound(wp), self.ubound(wp));
        if lo.is_nan() || hi.is_negative() {
            return Ball::indeterminate();
        }
        increasing_on(&lo.max(&BigFloat::zero()), &hi, prec, mp_sqrt)
    }

    pub fn exp(&self, prec: u32) -> Ball {
        increasing(self, prec, mp_exp)
    }

    /// Compute the natural logarithm. The result is indeterminate if the ball
    /// contains non-positive numbers.
    pub fn log(&self, prec: u32) -> Ball {
        if !self.is_positive() {
            return Ball::indeterminate();
        }
        increasing(self, prec, mp_ln)
    }

    pub fn atan(&self, prec: u32) -> Ball {
        increasing(self, prec, mp_atan)
    }

    pub fn sin(&self, prec: u32) -> Ball {
        lipschitz_unit(self, prec, mp_sin)
    }

    pub fn cos(&self, prec: u32) -> Ball {
        lipschitz_unit(self, prec, mp_cos)
    }

    /// Compute the angle of the point `(x, self)` in `(-pi, pi]`.
    pub fn atan2(&self, x: &Ball, prec: u32) -> Ball {
        let y = self;
        if y.is_nan() || x.is_nan() {
            return Ball::indeterminate();
        }

        let wp = prec + GUARD_BITS;
        let full_circle = || {
            let p = pi(prec);
            Ball::new(BigFloat::zero(), p.abs_ubound())
        };

        if !x.is_finite() || !y.is_finite() {
            return full_circle();
        }

        // on the real axis the angle is exact, including the negative half where
        // the principal value is pi
        if y.is_zero() {
            if x.is_negative() {
                return pi(prec);
            }
            if x.is_positive() {
                return Ball::zero();
            }
        }

        let crosses_cut = y.contains_zero() && x.lbound(wp).is_negative();
        if crosses_cut || (x.contains_zero() && y.contains_zero()) {
            return full_circle();
        }

        let (Some(my), Some(mx)) = (y.mid().to_multi_prec_float(), x.mid().to_multi_prec_float())
        else {
            return full_circle();
        };
        let lo = MultiPrecisionFloat::with_val_round(wp, my.atan2_ref(&mx), FloatRound::Down).0;
        let hi = MultiPrecisionFloat::with_val_round(wp, my.atan2_ref(&mx), FloatRound::Up).0;

        // |d atan2| <= |dz| / |z|
        let dist = Magnitude::max(&x.abs_lbound(), &y.abs_lbound());
        let err = x.rad().add(y.rad()).div(&dist).to_float();

        let lo = BigFloat::from_multi_prec_float(&lo).sub(&err, wp, Round::Floor).0;
        let hi = BigFloat::from_multi_prec_float(&hi).add(&err, wp, Round::Ceil).0;
        Ball::from_interval(&lo, &hi, prec)
    }
}

impl ComplexBall {
    /// Compute the absolute value `sqrt(re^2 + im^2)`.
    pub fn abs(&self, prec: u32) -> Ball {
        if self.is_real() {
            return self.re.abs().set_round(prec);
        }
        self.norm_squared(prec + GUARD_BITS).sqrtpos(prec)
    }

    /// Compute the argument in `(-pi, pi]`.
    pub fn arg(&self, prec: u32) -> Ball {
        self.im.atan2(&self.re, prec)
    }

    pub fn exp(&self, prec: u32) -> ComplexBall {
        if self.is_real() {
            return ComplexBall::from(self.re.exp(prec));
        }

        let wp = prec + GUARD_BITS;
        let m = self.re.exp(wp);
        ComplexBall::new(
            m.mul(&self.im.cos(wp), prec),
            m.mul(&self.im.sin(wp), prec),
        )
    }

    /// Compute the principal branch of the logarithm. The result is indeterminate if
    /// the ball contains zero.
    pub fn log(&self, prec: u32) -> ComplexBall {
        if self.contains_zero() {
            return ComplexBall::indeterminate();
        }
        if self.is_real() && self.re.is_positive() {
            return ComplexBall::from(self.re.log(prec));
        }

        let wp = prec + GUARD_BITS;
        let re = self.norm_squared(wp).log(wp).mul_2exp_si(-1).set_round(prec);
        ComplexBall::new(re, self.arg(prec))
    }

    /// Compute `self^w = exp(w log(self))`.
    pub fn pow(&self, w: &ComplexBall, prec: u32) -> ComplexBall {
        if w.is_zero() {
            return ComplexBall::one();
        }
        if self.is_zero() {
            if w.re.is_positive() {
                return ComplexBall::zero();
            }
            return ComplexBall::indeterminate();
        }

        let wp = prec + GUARD_BITS;
        self.log(wp).mul(w, wp).exp(prec)
    }
}

#[cfg(test)]
mod test {
    use super::pi;
    use crate::domains::{
        ball::Ball, complex_ball::ComplexBall, float::BigFloat, integer::Integer,
        magnitude::Magnitude,
    };

    #[test]
    fn exp_log() {
        assert!(Ball::zero().exp(64).contains_float(&BigFloat::one()));
        assert!(Ball::one().log(64).contains_float(&BigFloat::zero()));

        let two = Ball::from(2);
        let r = two.log(100).exp(100);
        assert!(r.contains_float(&BigFloat::from(2)));
        assert!(r.rel_accuracy_bits() > 90);

        assert!(Ball::zero().log(64).is_nan());
        assert!(Ball::new(BigFloat::one(), Magnitude::from(2)).log(64).is_nan());
    }

    #[test]
    fn sqrt() {
        assert!(Ball::from(4).sqrt(64).contains_float(&BigFloat::from(2)));
        assert!(Ball::from(-4).sqrt(64).is_nan());
        let r = Ball::new(BigFloat::zero(), Magnitude::one()).sqrtpos(64);
        assert!(r.contains_float(&BigFloat::one()));
        assert!(r.contains_float(&BigFloat::zero()));
    }

    #[test]
    fn trigonometry() {
        let x = Ball::from_fraction(1, 7, 80);
        let s = x.sin(80);
        let c = x.cos(80);
        let one = s.sqr(80).add(&c.sqr(80), 80);
        assert!(one.contains_float(&BigFloat::one()));

        let p = pi(100);
        assert!(p.lbound(100) > BigFloat::from_f64(3.14159));
        assert!(p.ubound(100) < BigFloat::from_f64(3.1416));
        assert!(Ball::one().atan(100).mul_2exp_si(2).overlaps(&p));
        assert!(p.sin(100).contains_float(&BigFloat::zero()));
        assert!(*Ball::from(1000).sin(64).rad() < Magnitude::one());
    }

    #[test]
    fn atan2_branch_cut() {
        let p = pi(64);
        let a = Ball::one().atan2(&Ball::one(), 64);
        assert!(a.mul_2exp_si(2).overlaps(&p));

        assert_eq!(Ball::zero().atan2(&Ball::from(-1), 64), p);
        assert_eq!(Ball::zero().atan2(&Ball::from(3), 64), Ball::zero());

        // an imaginary part around zero straddles the branch cut
        let y = Ball::new(BigFloat::zero(), Magnitude::from_2exp(&Integer::new(-10)));
        let cut = y.atan2(&Ball::from(-1), 64);
        assert!(cut.contains(&p));
        assert!(cut.contains(&p.neg()));
    }

    #[test]
    fn complex_functions() {
        let p = pi(100);
        let z = ComplexBall::new(Ball::zero(), p.clone());
        let e = z.exp(100);
        assert!(e.contains_float(&BigFloat::from(-1), &BigFloat::zero()));

        let l = ComplexBall::from(-1).log(64);
        assert!(l.re.contains_float(&BigFloat::zero()));
        assert_eq!(l.im, pi(64));

        let w = ComplexBall::from((3, 4));
        assert!(w.abs(64).contains_float(&BigFloat::from(5)));

        let sq = w.pow(&ComplexBall::from(2), 100);
        assert!(sq.contains_float(&BigFloat::from(-7), &BigFloat::from(24)));
    }
}
