use ballistica::domains::{ball::Ball, float::BigFloat, magnitude::Magnitude};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;

/// Sample a few points and return them together with a ball containing their hull.
fn sample_hull(rng: &mut Xoshiro256StarStar, prec: u32) -> (Ball, Vec<BigFloat>) {
    let n = rng.gen_range(1..4);
    let points: Vec<_> = (0..n).map(|_| BigFloat::random(rng, 120, 5)).collect();

    let mut lo = points[0].clone();
    let mut hi = points[0].clone();
    for p in &points[1..] {
        lo = lo.min(p);
        hi = hi.max(p);
    }

    (Ball::from_interval(&lo, &hi, prec), points)
}

#[test]
fn max_min_contain_pointwise_results() {
    let mut rng = Xoshiro256StarStar::seed_from_u64(42);

    for _ in 0..3000 {
        let prec = rng.gen_range(2..=200);
        let (a, xs) = sample_hull(&mut rng, prec);
        let (b, ys) = sample_hull(&mut rng, prec);

        for x in &xs {
            assert!(a.contains_float(x));
        }

        let max = a.max(&b, prec);
        let min = a.min(&b, prec);
        for x in &xs {
            for y in &ys {
                assert!(max.contains_float(&x.max(y)), "max({}, {}) not in {}", x, y, max);
                assert!(min.contains_float(&x.min(y)), "min({}, {}) not in {}", x, y, min);
            }
        }

        // a ball is always compared with itself consistently
        let self_max = a.max(&a, prec);
        for x in &xs {
            assert!(self_max.contains_float(x));
        }
    }
}

#[test]
fn max_min_aliasing() {
    let mut rng = Xoshiro256StarStar::seed_from_u64(43);

    for _ in 0..1000 {
        let prec = rng.gen_range(2..=200);
        let a = Ball::random_special(&mut rng, 100, 6);
        let b = Ball::random_special(&mut rng, 100, 6);

        let mut c = a.clone();
        c.max_assign(&b, prec);
        assert_eq!(c, a.max(&b, prec));

        let mut c = b.clone();
        c.min_assign(&a, prec);
        assert_eq!(c, b.min(&a, prec));
    }
}

#[test]
fn max_special_values() {
    let special = Ball::new(BigFloat::neg_inf(), Magnitude::inf());

    for r in [
        Ball::zero().max(&special, 64),
        special.max(&Ball::zero(), 64),
    ] {
        assert!(r.mid().is_zero());
        assert!(r.rad().is_inf());
    }

    let special = Ball::new(BigFloat::pos_inf(), Magnitude::inf());
    let r = Ball::zero().max(&special, 64);
    assert!(r.mid().is_zero());
    assert!(r.rad().is_inf());

    let nan = Ball::new(BigFloat::nan(), Magnitude::one());
    assert!(nan.is_indeterminate());
    assert!(Ball::one().max(&nan, 64).is_indeterminate());
    assert!(nan.min(&Ball::one(), 64).is_indeterminate());

    let r = Ball::exact(BigFloat::neg_inf()).max(&Ball::from(-3), 64);
    assert_eq!(r, Ball::from(-3));
    let r = Ball::exact(BigFloat::pos_inf()).min(&Ball::from(5), 64);
    assert_eq!(r, Ball::from(5));
}
