//! Re-run ball computations at increasing precision until the result is usable.
//!
//! A computation is a closure that receives a working precision and reports an [Attempt].
//! The evaluator starts at [AdaptivePrecision::initial_prec] and doubles the precision after
//! every [Attempt::Retry], until [AdaptivePrecision::max_prec] would be exceeded. Every call
//! of the closure must start from the original inputs.
//!
//! Inputs that can never produce a usable result, such as a singular matrix, should be
//! detected with an exact check before the loop starts, see [AdaptivePrecision::evaluate_checked].
//!
//! ```
//! use ballistica::adaptive::{AdaptivePrecision, Attempt};
//! use ballistica::domains::ball::Ball;
//!
//! let config = AdaptivePrecision::default();
//! let (r, prec) = config
//!     .evaluate(|prec| {
//!         let x = Ball::from_fraction(1, 3, prec);
//!         if x.rel_accuracy_bits() >= 100 {
//!             Attempt::Done(x)
//!         } else {
//!             Attempt::Retry
//!         }
//!     })
//!     .unwrap();
//! assert_eq!(prec, 128);
//! ```

use std::fmt::Display;

use tracing::{debug, instrument};

use crate::domains::{ball::Ball, vector::BallRing};

/// The outcome of a single attempt at a given precision.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Attempt<T> {
    /// The result is usable.
    Done(T),
    /// The precision was insufficient.
    Retry,
    /// The computation can never succeed.
    Singular(String),
}

/// Errors that can occur during adaptive evaluation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PrecisionError {
    /// The input is degenerate and retrying cannot help.
    Singular(String),
    /// No attempt succeeded up to the maximal precision.
    CeilingExceeded { last_prec: u32 },
}

impl Display for PrecisionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrecisionError::Singular(reason) => write!(f, "The input is singular: {}", reason),
            PrecisionError::CeilingExceeded { last_prec } => write!(
                f,
                "No usable result up to the maximal precision; last attempt at {} bits",
                last_prec
            ),
        }
    }
}

/// Settings for adaptive evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AdaptivePrecision {
    /// The precision of the first attempt.
    pub initial_prec: u32,
    /// The maximal precision of any attempt.
    pub max_prec: u32,
}

impl Default for AdaptivePrecision {
    fn default() -> Self {
        Self {
            initial_prec: 64,
            max_prec: 10000,
        }
    }
}

impl AdaptivePrecision {
    pub fn new(initial_prec: u32, max_prec: u32) -> AdaptivePrecision {
        let a = AdaptivePrecision {
            initial_prec,
            max_prec,
        };
        a.validate();
        a
    }

    fn validate(&self) {
        if self.initial_prec == 0 {
            panic!("The initial precision must be positive");
        }
        if self.initial_prec > self.max_prec {
            panic!(
                "The initial precision {} exceeds the maximal precision {}",
                self.initial_prec, self.max_prec
            );
        }
    }

    /// The sequence of precisions that are tried.
    pub fn precisions(&self) -> impl Iterator<Item = u32> {
        self.validate();
        let max_prec = self.max_prec;
        std::iter::successors(Some(self.initial_prec), move |p| {
            p.checked_mul(2).filter(|n| *n <= max_prec)
        })
    }

    /// Call `f` with increasing precision until it returns [Attempt::Done].
    /// Returns the result and the precision at which it was obtained.
    #[instrument(level = "debug", skip_all, fields(initial_prec = self.initial_prec, max_prec = self.max_prec))]
    pub fn evaluate<T>(
        &self,
        mut f: impl FnMut(u32) -> Attempt<T>,
    ) -> Result<(T, u32), PrecisionError> {
        let mut last_prec = self.initial_prec;
        for prec in self.precisions() {
            last_prec = prec;
            match f(prec) {
                Attempt::Done(r) => {
                    debug!("Succeeded at precision {}", prec);
                    return Ok((r, prec));
                }
                Attempt::Retry => {
                    debug!("Precision {} is insufficient", prec);
                }
                Attempt::Singular(reason) => {
                    debug!("Singular input at precision {}: {}", prec, reason);
                    return Err(PrecisionError::Singular(reason));
                }
            }
        }

        debug!("Maximal precision {} exceeded", self.max_prec);
        Err(PrecisionError::CeilingExceeded { last_prec })
    }

    /// Run the exact, non-retried `check` once and then call `f` with increasing precision.
    /// A failing check is reported as [PrecisionError::Singular] without calling `f`.
    pub fn evaluate_checked<T>(
        &self,
        check: impl FnOnce() -> Result<(), String>,
        f: impl FnMut(u32) -> Attempt<T>,
    ) -> Result<(T, u32), PrecisionError> {
        if let Err(reason) = check() {
            debug!("Exact check failed: {}", reason);
            return Err(PrecisionError::Singular(reason));
        }

        self.evaluate(f)
    }

    /// Call `f` with increasing precision until all returned balls are finite.
    pub fn evaluate_until_finite<R: BallRing>(
        &self,
        mut f: impl FnMut(u32) -> Vec<R::Element>,
    ) -> Result<(Vec<R::Element>, u32), PrecisionError> {
        self.evaluate(|prec| {
            let r = f(prec);
            if r.iter().all(|x| R::is_finite(x)) {
                Attempt::Done(r)
            } else {
                Attempt::Retry
            }
        })
    }

    /// Call `f` with increasing precision until the result has a relative accuracy
    /// of at least `bits` bits.
    pub fn evaluate_to_accuracy(
        &self,
        bits: i64,
        mut f: impl FnMut(u32) -> Ball,
    ) -> Result<(Ball, u32), PrecisionError> {
        self.evaluate(|prec| {
            let r = f(prec);
            if r.rel_accuracy_bits() >= bits {
                Attempt::Done(r)
            } else {
                Attempt::Retry
            }
        })
    }
}

#[cfg(test)]
mod test {
    use super::{AdaptivePrecision, Attempt, PrecisionError};
    use crate::domains::{
        ball::{Ball, RealBallField},
        float::BigFloat,
    };

    #[test]
    fn precision_sequence() {
        let p: Vec<_> = AdaptivePrecision::new(64, 1000).precisions().collect();
        assert_eq!(p, vec![64, 128, 256, 512]);
        let p: Vec<_> = AdaptivePrecision::new(10, 10).precisions().collect();
        assert_eq!(p, vec![10]);
    }

    #[test]
    fn ceiling() {
        let mut calls = vec![];
        let r: Result<((), u32), _> = AdaptivePrecision::new(100, 1000).evaluate(|prec| {
            calls.push(prec);
            Attempt::Retry
        });
        assert_eq!(r, Err(PrecisionError::CeilingExceeded { last_prec: 800 }));
        assert_eq!(calls, vec![100, 200, 400, 800]);
    }

    #[test]
    fn singular_stops_immediately() {
        let mut calls = 0;
        let r: Result<((), u32), _> = AdaptivePrecision::default().evaluate_checked(
            || Err("zero pivot".to_owned()),
            |_| {
                calls += 1;
                Attempt::Retry
            },
        );
        assert_eq!(r, Err(PrecisionError::Singular("zero pivot".to_owned())));
        assert_eq!(calls, 0);
    }

    #[test]
    fn cancellation_needs_precision() {
        // (1 + 2^-200) - 1 only has a non-zero enclosure above 200 bits
        let (r, prec) = AdaptivePrecision::default()
            .evaluate_to_accuracy(10, |prec| {
                let x = Ball::one().add(&Ball::one().mul_2exp_si(-200), prec);
                x.sub(&Ball::one(), prec)
            })
            .unwrap();
        assert_eq!(prec, 256);
        assert!(r.contains_float(&BigFloat::one().mul_2exp_si(-200)));
    }

    #[test]
    fn finite_results() {
        let (r, prec) = AdaptivePrecision::new(32, 1024)
            .evaluate_until_finite::<RealBallField>(|prec| {
                let small = Ball::one().mul_2exp_si(-100);
                let d = Ball::one().add(&small, prec).sub(&Ball::one(), prec);
                vec![Ball::one().div(&d, prec)]
            })
            .unwrap();
        assert_eq!(prec, 128);
        assert!(r[0].contains_float(&BigFloat::one().mul_2exp_si(100)));
    }

    #[test]
    #[should_panic]
    fn invalid_configuration() {
        AdaptivePrecision::new(128, 64);
    }
}
