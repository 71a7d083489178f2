//! Truncated power series of the power sum `sum_{k < n} q^k (a + k)^(-(s + x))` in `x`.
//!
//! The coefficient of `x^j` is `sum_{k < n} q^k (a + k)^(-s) (-log(a + k))^j / j!`.
//! Every term is computed independently of the others, which makes the sum a natural
//! candidate for [parallel_sum_series].

use tracing::instrument;

use crate::{
    domains::{
        ball::Ball,
        complex_ball::{ComplexBall, ComplexBallField},
    },
    parallel::{parallel_sum_series, ReducerConfig},
};

/// Add the series of `c (a + k)^(-(s + x))` to `acc`, where `c` is the weight of term `k`.
fn add_powsum_term(
    s: &ComplexBall,
    a: &ComplexBall,
    c: &ComplexBall,
    k: usize,
    acc: &mut [ComplexBall],
    prec: u32,
) {
    let ak = a.add(&ComplexBall::from(k as i64), prec);
    let log = ak.log(prec);
    let mut t = c.mul(&s.mul(&log, prec).neg().exp(prec), prec);
    let log = log.neg();

    for (j, x) in acc.iter_mut().enumerate() {
        if j > 0 {
            t = t.mul(&log, prec).div_real(&Ball::from(j as i64), prec);
        }
        x.add_assign(&t, prec);
    }
}

/// Compute the first `len` coefficients of `sum_{k < n} q^k (a + k)^(-(s + x))`
/// on the current thread.
#[instrument(level = "debug", skip_all, fields(n = n, len = len, prec = prec))]
pub fn powsum_series_naive(
    s: &ComplexBall,
    a: &ComplexBall,
    q: &ComplexBall,
    n: usize,
    len: usize,
    prec: u32,
) -> Vec<ComplexBall> {
    let mut res = vec![ComplexBall::zero(); len];
    if len == 0 {
        return res;
    }

    let mut qpow = ComplexBall::one();
    for k in 0..n {
        if k > 0 {
            qpow = qpow.mul(q, prec);
        }
        add_powsum_term(s, a, &qpow, k, &mut res, prec);
    }
    res
}

/// Compute the first `len` coefficients of `sum_{k < n} q^k (a + k)^(-(s + x))`,
/// distributing the terms over [ReducerConfig::n_threads] workers.
///
/// The result overlaps the one of [powsum_series_naive], but the grouping of the
/// rounding errors depends on the number of threads.
#[instrument(level = "debug", skip_all, fields(n = n, len = len, prec = prec))]
pub fn powsum_series_threaded(
    s: &ComplexBall,
    a: &ComplexBall,
    q: &ComplexBall,
    n: usize,
    len: usize,
    prec: u32,
    config: &ReducerConfig,
) -> Vec<ComplexBall> {
    if len == 0 {
        return vec![];
    }

    let field = ComplexBallField::new(prec);
    parallel_sum_series(
        &field,
        n,
        len,
        |k, acc| {
            let qpow = q.pow_ui(k as u64, prec);
            add_powsum_term(s, a, &qpow, k, acc, prec);
        },
        config,
    )
}

#[cfg(test)]
mod test {
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;

    use super::{powsum_series_naive, powsum_series_threaded};
    use crate::{
        domains::{complex_ball::ComplexBall, rational::Rational},
        parallel::ReducerConfig,
    };

    #[test]
    fn zeta_partial_sum() {
        // sum_{k < 3} (1 + k)^(-2 - x)
        let s = ComplexBall::from(2);
        let a = ComplexBall::one();
        let q = ComplexBall::one();
        let r = powsum_series_naive(&s, &a, &q, 3, 2, 128);

        assert_eq!(r.len(), 2);
        assert!(r[0].contains_rational(&Rational::from((49, 36)), &Rational::new()));
        assert!(r[0].re.rel_accuracy_bits() > 100);
        // -(log(2)/4 + log(3)/9)
        assert!(r[1].re.is_negative());
        assert!((r[1].re.mid().to_f64() + 0.2953548).abs() < 1e-6);
        assert!(r[1].im.is_zero());
    }

    #[test]
    fn geometric_weights() {
        // sum_{k < 4} i^k = 0
        let s = ComplexBall::zero();
        let a = ComplexBall::one();
        let q = ComplexBall::i();
        let r = powsum_series_naive(&s, &a, &q, 4, 1, 64);
        assert!(r[0].contains_zero());

        let t = powsum_series_threaded(&s, &a, &q, 4, 1, 64, &ReducerConfig::new(2));
        assert!(t[0].contains_zero());
    }

    #[test]
    fn empty_sums() {
        let one = ComplexBall::one();
        assert!(powsum_series_naive(&one, &one, &one, 5, 0, 64).is_empty());
        let r = powsum_series_threaded(&one, &one, &one, 0, 3, 64, &ReducerConfig::new(3));
        assert_eq!(r, vec![ComplexBall::zero(); 3]);
    }

    #[test]
    fn threads_overlap() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(11);
        let s = ComplexBall::random(&mut rng, 40, 2);
        let a = ComplexBall::random(&mut rng, 40, 2).add(&ComplexBall::from(3), 64);
        let q = ComplexBall::random(&mut rng, 40, 1);

        let reference = powsum_series_naive(&s, &a, &q, 20, 5, 64);
        for t in 1..4 {
            let r = powsum_series_threaded(&s, &a, &q, 20, 5, 64, &ReducerConfig::new(t));
            for (x, y) in r.iter().zip(&reference) {
                assert!(x.overlaps(y));
            }
        }
    }
}
