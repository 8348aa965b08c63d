use flusvd_core::*;
use rand::prelude::*;
use rand_xoshiro::rand_core::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;

type La = FloatGeneric<f64>;

type AMat = Mat<La>;
type ASvd = Svd<La>;

fn max_abs_err(a: &AMat, b: &AMat) -> f64
{
    a.as_ref().iter().zip(b.as_ref()).fold(0., |m, (x, y)| f64::max(m, (x - y).abs()))
}

fn max_ortho_err(a: &AMat) -> f64
{
    let (_, k) = a.size();
    let mut err: f64 = 0.;
    for i in 0.. k {
        for j in 0.. k {
            let d = La::dot(a.col(i), a.col(j));
            err = err.max(if i == j {(d - 1.).abs()} else {d.abs()});
        }
    }
    err
}

//

#[test]
fn test_svd_centered_wide()
{
    let _ = env_logger::builder().is_test(true).try_init();

    // 33 weeks x 80 series, columns centered: rank <= 32
    let mut rng = Xoshiro256StarStar::seed_from_u64(33);
    let mut g = AMat::new(33, 80).by_fn(|_, _| rng.gen::<f64>());
    for c in 0.. 80 {
        let mean = g.col(c).iter().sum::<f64>() / 33.;
        for v in g.col_mut(c) {
            *v -= mean;
        }
    }

    let svd = ASvd::new().decomp(&g).unwrap();
    println!("s = {:?}", svd.s);

    assert_eq!(svd.len(), 33);
    assert!(svd.s[32] < 1e-10);
    for w in svd.s.windows(2) {
        assert!(w[0] >= w[1]);
    }

    assert!(max_abs_err(&svd.reconstruct(), &g) < 1e-10);
    assert!(max_ortho_err(&svd.u) < 1e-10);
    // the trailing v column is only determined up to the null space
    assert!(max_ortho_err(&svd.v.cols_head(32)) < 1e-10);
}

#[test]
fn test_svd_tall_square()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let mut rng = Xoshiro256StarStar::seed_from_u64(7);
    for &(m, n) in &[(10, 10), (33, 5), (2, 1)] {
        let g = AMat::new(m, n).by_fn(|_, _| rng.gen::<f64>() * 10. - 5.);

        let svd = ASvd::new().decomp(&g).unwrap();

        assert_eq!(svd.len(), n);
        assert!(max_abs_err(&svd.reconstruct(), &g) < 1e-10);
        assert!(max_ortho_err(&svd.u) < 1e-10);
        assert!(max_ortho_err(&svd.v) < 1e-10);
    }
}

#[test]
fn test_svd_sign_convention()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let mut rng = Xoshiro256StarStar::seed_from_u64(11);
    let g = AMat::new(8, 6).by_fn(|_, _| rng.gen::<f64>() - 0.5);

    let svd = ASvd::new().decomp(&g).unwrap();

    for c in 0.. svd.len() {
        let max = svd.u.col(c).iter().fold(0., |m: f64, e| if e.abs() > m.abs() {*e} else {m});
        assert!(max > 0.);
    }
}

#[test]
fn test_svd_collinear_wide()
{
    let _ = env_logger::builder().is_test(true).try_init();

    // centered curve in every column, scaled
    let curve: Vec<f64> = (0.. 33).map(|w| ((w as f64) - 16.).powi(2)).collect();
    let mean = curve.iter().sum::<f64>() / 33.;

    for &n in &[33, 34, 40, 100, 300] {
        let g = AMat::new(33, n).by_fn(|r, c| (c + 1) as f64 * (curve[r] - mean));

        let svd = ASvd::new().decomp(&g).unwrap();

        assert_eq!(svd.len(), 33);
        assert!(svd.s[0] > 1.);
        assert!(svd.s[1..].iter().all(|&s| s <= 1e-10 * svd.s[0]));
        assert!(max_abs_err(&svd.reconstruct(), &g) < 1e-8 * svd.s[0]);
        assert!(max_ortho_err(&svd.u) < 1e-10);
        assert!(max_ortho_err(&svd.v) < 1e-10);
    }
}

#[test]
fn test_svd_duplicated_columns()
{
    let _ = env_logger::builder().is_test(true).try_init();

    // two random columns repeated: rank 2
    let mut rng = Xoshiro256StarStar::seed_from_u64(2);
    let base = AMat::new(33, 2).by_fn(|_, _| rng.gen::<f64>() - 0.5);

    for &n in &[40, 100, 500] {
        let g = AMat::new(33, n).by_fn(|r, c| base[(r, c % 2)]);

        let svd = ASvd::new().decomp(&g).unwrap();

        assert!(svd.s[1] > 1e-3);
        assert!(svd.s[2..].iter().all(|&s| s <= 1e-10 * svd.s[0]));
        assert!(max_abs_err(&svd.reconstruct(), &g) < 1e-10);
        assert!(max_ortho_err(&svd.u) < 1e-10);
        assert!(max_ortho_err(&svd.v) < 1e-10);
    }
}
