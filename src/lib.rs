//! Ballistica is a library for rigorous arbitrary-precision ball arithmetic.
//!
//! A [Ball](domains::ball::Ball) is a midpoint with a radius, that is guaranteed
//! to contain the exact result of the computation that produced it. Midpoints are
//! [BigFloat](domains::float::BigFloat)s with arbitrary precision and unbounded exponents,
//! radii are cheap [Magnitude](domains::magnitude::Magnitude)s that always round up.
//!
//! For example:
//!
//! ```
//! use ballistica::domains::ball::Ball;
//! use ballistica::domains::rational::Rational;
//!
//! let third = Ball::from_fraction(1, 3, 128);
//! let one = third.mul(&Ball::from(3), 128);
//! assert!(one.contains_rational(&Rational::from(1)));
//! assert!(!one.is_exact());
//! ```
//!
//! Computations that need a certain accuracy can be retried at increasing precision
//! with the [adaptive] module, and large sums can be split over threads with the
//! [parallel] module.

pub mod adaptive;
pub mod domains;
pub mod parallel;
pub mod series;
pub mod tensors;
