use ballistica::{
    adaptive::{AdaptivePrecision, PrecisionError},
    domains::rational::{Rational, Q},
    tensors::matrix::{Matrix, MatrixError},
};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;

fn random_rational(rng: &mut Xoshiro256StarStar) -> Rational {
    Rational::from((rng.gen_range(-5i64..=5), rng.gen_range(1i64..=4)))
}

fn random_matrix(rng: &mut Xoshiro256StarStar, nrows: u32, ncols: u32) -> Matrix<Q> {
    let data = (0..nrows * ncols).map(|_| random_rational(rng)).collect();
    Matrix::from_linear(data, nrows, ncols, Q).unwrap()
}

#[test]
fn random_positive_semidefinite_systems() {
    let mut rng = Xoshiro256StarStar::seed_from_u64(5);
    let config = AdaptivePrecision::new(32, 10000);

    let (mut solved, mut singular) = (0, 0);
    for _ in 0..200 {
        let n = rng.gen_range(1..=6);
        let m = rng.gen_range(1..=6);
        let r = random_matrix(&mut rng, n, m);
        let a = &r * &r.transpose();
        let nrhs = rng.gen_range(1..=2);
        let b = random_matrix(&mut rng, n, nrhs);

        assert!(a.is_symmetric());
        match a.spd_solve_adaptive(&b, &config) {
            Ok((x, prec)) => {
                assert_eq!(a.rank(), n as usize);
                assert!(prec <= config.max_prec);
                assert!(x.is_finite());
                assert!(x.contains_rational(&a.solve(&b).unwrap()));
                solved += 1;
            }
            Err(PrecisionError::Singular(_)) => {
                assert!(a.rank() < n as usize);
                singular += 1;
            }
            Err(e) => panic!("Unexpected failure: {}", e),
        }
    }

    assert!(solved > 0);
    assert!(singular > 0);
}

#[test]
fn ceiling_is_reported() {
    // entries that differ in the 200th bit need more than 128 bits to be resolved
    let eps = Rational::from(1) >> 200u32;
    let a = Matrix::from_linear(
        vec![
            Rational::from(1),
            Rational::from(1),
            Rational::from(1),
            Rational::from(1) + eps,
        ],
        2,
        2,
        Q,
    )
    .unwrap();
    let b = Matrix::new_vec(vec![Rational::from(1), Rational::from(0)], Q);

    let r = a.spd_solve_adaptive(&b, &AdaptivePrecision::new(16, 128));
    assert_eq!(r.unwrap_err(), PrecisionError::CeilingExceeded { last_prec: 128 });

    let (x, prec) = a.spd_solve_adaptive(&b, &AdaptivePrecision::new(16, 10000)).unwrap();
    assert!(prec >= 256);
    assert!(x.contains_rational(&a.solve(&b).unwrap()));
}

#[test]
fn singular_systems_never_factor() {
    let mut rng = Xoshiro256StarStar::seed_from_u64(6);

    for _ in 0..100 {
        let n = rng.gen_range(2..=6);
        let m = rng.gen_range(1..n);
        let r = random_matrix(&mut rng, n, m);
        let a = &r * &r.transpose();
        let b = random_matrix(&mut rng, n, 1);
        assert!(a.rank() < n as usize);

        for prec in [2, 10, 64, 300, 1000, 10000] {
            let ab = Matrix::from_rational(&a, prec);
            let bb = Matrix::from_rational(&b, prec);
            assert!(matches!(
                ab.spd_solve(&bb),
                Err(MatrixError::NotPositiveDefinite { .. })
            ));
        }
    }
}

#[test]
fn solving_in_place_matches() {
    let mut rng = Xoshiro256StarStar::seed_from_u64(7);

    for _ in 0..50 {
        let n = rng.gen_range(1..=5);
        let r = random_matrix(&mut rng, n, n);
        // adding the identity makes the matrix positive definite
        let a = &(&r * &r.transpose()) + &Matrix::identity(n, Q);
        let nrhs = rng.gen_range(1..=3);
        let b = random_matrix(&mut rng, n, nrhs);

        let prec = rng.gen_range(100..=300);
        let l = Matrix::from_rational(&a, prec).cho().unwrap();
        let bb = Matrix::from_rational(&b, prec);

        let x = l.solve_cho_precomp(&bb);
        let mut y = bb.clone();
        l.solve_cho_precomp_assign(&mut y);
        assert_eq!(x, y);
        assert!(x.contains_rational(&a.solve(&b).unwrap()));
    }
}
