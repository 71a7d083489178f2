use ballistica::domains::{
    ball::Ball,
    complex_ball::ComplexBall,
    float::BigFloat,
    rational::Rational,
};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;

/// Pick the midpoint or one of the endpoints of a finite ball.
fn sample_point(rng: &mut Xoshiro256StarStar, x: &Ball) -> BigFloat {
    let r = x.rad().to_float();
    match rng.gen_range(0..3) {
        0 => x.mid().clone(),
        1 => x.mid().sub_exact(&r),
        _ => x.mid().add_exact(&r),
    }
}

#[test]
fn binary_operations_contain_exact_results() {
    let mut rng = Xoshiro256StarStar::seed_from_u64(100);

    for _ in 0..5000 {
        let prec = rng.gen_range(2..=200);
        let a = Ball::random(&mut rng, 150, 6);
        let b = Ball::random(&mut rng, 150, 6);
        let x = sample_point(&mut rng, &a);
        let y = sample_point(&mut rng, &b);

        assert!(a.add(&b, prec).contains_float(&x.add_exact(&y)));
        assert!(a.sub(&b, prec).contains_float(&x.sub_exact(&y)));
        assert!(a.mul(&b, prec).contains_float(&x.mul_exact(&y)));
        assert!(a.sqr(prec).contains_float(&x.mul_exact(&x)));

        if !y.is_zero() {
            let q = x.to_rational().unwrap() / y.to_rational().unwrap();
            assert!(a.div(&b, prec).contains_rational(&q));
        }
    }
}

#[test]
fn in_place_operations_agree() {
    let mut rng = Xoshiro256StarStar::seed_from_u64(101);

    for _ in 0..2000 {
        let prec = rng.gen_range(2..=200);
        let a = Ball::random_special(&mut rng, 150, 6);
        let b = Ball::random_special(&mut rng, 150, 6);

        let mut c = a.clone();
        c.add_assign(&b, prec);
        assert_eq!(c, a.add(&b, prec));

        let mut c = a.clone();
        c.sub_assign(&b, prec);
        assert_eq!(c, a.sub(&b, prec));

        let mut c = a.clone();
        c.mul_assign(&b, prec);
        assert_eq!(c, a.mul(&b, prec));

        let mut c = a.clone();
        c.div_assign(&b, prec);
        assert_eq!(c, a.div(&b, prec));

        // both operands are the same ball
        let mut c = a.clone();
        let d = c.clone();
        c.mul_assign(&d, prec);
        assert_eq!(c, a.mul(&a, prec));

        let mut c = a.clone();
        c.add_mul_assign(&a, &b, prec);
        assert_eq!(c, a.add(&a.mul(&b, prec), prec));
    }
}

#[test]
fn non_finite_operands() {
    let nan = Ball::indeterminate();
    let one = Ball::one();
    assert!(nan.add(&one, 64).is_indeterminate());
    assert!(one.mul(&nan, 64).is_indeterminate());
    assert!(one.div(&Ball::zero(), 64).is_indeterminate());

    let third = Ball::from_fraction(1, 3, 10);
    let zero = third.sub(&third, 10);
    assert!(!zero.is_exact());
    assert!(one.div(&zero, 64).is_indeterminate());
}

#[test]
fn complex_operations_contain_exact_results() {
    let mut rng = Xoshiro256StarStar::seed_from_u64(102);

    for _ in 0..1000 {
        let prec = rng.gen_range(2..=200);
        let a = ComplexBall::random(&mut rng, 100, 4);
        let b = ComplexBall::random(&mut rng, 100, 4);
        let (xr, xi) = (a.re.mid().clone(), a.im.mid().clone());
        let (yr, yi) = (b.re.mid().clone(), b.im.mid().clone());

        let re = xr.mul_exact(&yr).sub_exact(&xi.mul_exact(&yi));
        let im = xr.mul_exact(&yi).add_exact(&xi.mul_exact(&yr));
        assert!(a.mul(&b, prec).contains_float(&re, &im));
        assert!(a.add(&b, prec).contains_float(&xr.add_exact(&yr), &xi.add_exact(&yi)));

        let mut c = a.clone();
        c.mul_assign(&b, prec);
        assert_eq!(c, a.mul(&b, prec));
    }
}

#[test]
fn inverse_and_powers_contain_exact_results() {
    let mut rng = Xoshiro256StarStar::seed_from_u64(103);

    for _ in 0..2000 {
        let prec = rng.gen_range(2..=200);
        let a = Ball::random(&mut rng, 60, 5);
        let x = sample_point(&mut rng, &a);

        if !x.is_zero() {
            let q = Rational::from(1) / x.to_rational().unwrap();
            assert!(a.inv(prec).contains_rational(&q));
        }

        let e = rng.gen_range(0..7u64);
        let mut p = BigFloat::one();
        for _ in 0..e {
            p = p.mul_exact(&x);
        }
        assert!(a.pow(e, prec).contains_float(&p));
    }
}

fn to_rational(x: &BigFloat) -> Rational {
    x.to_rational().unwrap()
}

#[test]
fn complex_quotients_contain_exact_results() {
    let mut rng = Xoshiro256StarStar::seed_from_u64(104);

    for _ in 0..2000 {
        let prec = rng.gen_range(2..=200);
        let a = ComplexBall::random(&mut rng, 80, 4);
        let b = ComplexBall::random(&mut rng, 80, 4);
        let (xr, xi) = (sample_point(&mut rng, &a.re), sample_point(&mut rng, &a.im));
        let (yr, yi) = (sample_point(&mut rng, &b.re), sample_point(&mut rng, &b.im));

        let re = xr.sub_exact(&yr);
        let im = xi.sub_exact(&yi);
        assert!(a.sub(&b, prec).contains_float(&re, &im));

        let re = xr.mul_exact(&xr).sub_exact(&xi.mul_exact(&xi));
        let im = xr.mul_exact(&xi).mul_2exp_si(1);
        assert!(a.sqr(prec).contains_float(&re, &im));

        let (xr, xi, yr, yi) = (to_rational(&xr), to_rational(&xi), to_rational(&yr), to_rational(&yi));
        let norm = Rational::from(&yr * &yr) + Rational::from(&yi * &yi);
        if norm != 0 {
            let re = (Rational::from(&xr * &yr) + Rational::from(&xi * &yi)) / &norm;
            let im = (Rational::from(&xi * &yr) - Rational::from(&xr * &yi)) / &norm;
            assert!(a.div(&b, prec).contains_rational(&re, &im));

            let re = Rational::from(&yr / &norm);
            let im = -Rational::from(&yi / &norm);
            assert!(b.inv(prec).contains_rational(&re, &im));
        }
    }
}

#[test]
fn complex_in_place_operations_agree() {
    let mut rng = Xoshiro256StarStar::seed_from_u64(105);

    for _ in 0..1000 {
        let prec = rng.gen_range(2..=200);
        let a = ComplexBall::random(&mut rng, 100, 4);
        let b = ComplexBall::random(&mut rng, 100, 4);

        let mut c = a.clone();
        c.add_assign(&b, prec);
        assert_eq!(c, a.add(&b, prec));

        let mut c = a.clone();
        c.sub_assign(&b, prec);
        assert_eq!(c, a.sub(&b, prec));

        let mut c = a.clone();
        c.div_assign(&b, prec);
        assert_eq!(c, a.div(&b, prec));

        // both operands are the same ball
        let mut c = a.clone();
        let d = c.clone();
        c.mul_assign(&d, prec);
        assert_eq!(c, a.mul(&a, prec));

        let mut c = a.clone();
        let d = c.clone();
        c.div_assign(&d, prec);
        assert_eq!(c, a.div(&a, prec));
    }
}
