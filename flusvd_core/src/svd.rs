//! One-sided Jacobi singular value decomposition

use num_traits::{Float, NumCast, Zero, One};
use core::cmp::Ordering;
use core::marker::PhantomData;
use crate::{LinAlg, Mat, SvdError};

//

/// SVD parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SvdParam<F: Float>
{
    /// Max number of Jacobi sweeps over all column pairs. `None` means no upper limit.
    pub max_sweep: Option<usize>,
    /// Tolerance of the column orthogonality; with columns of length \\(m\\),
    /// a pair is converged when
    /// \\((x_i^T x_j)^2 \le m \epsilon^2 \\|x_i\\|^2 \\|x_j\\|^2\\).
    /// A column with \\(\\|x_i\\|^2 \le m \epsilon^2 \\|G\\|_F^2\\) is regarded as zero.
    pub eps_conv: F,
}

impl<F: Float> Default for SvdParam<F>
{
    fn default() -> Self
    {
        SvdParam {
            max_sweep: Some(100),
            eps_conv: F::epsilon(),
        }
    }
}

//

/// Result of [`Svd::decomp`]: \\(G = U \mathbf{diag}(s) V^T\\).
///
/// With \\(G\\) of size \\(m \times n\\) and \\(k = \min(m, n)\\),
/// * `u` is \\(m \times k\\) with orthonormal columns,
/// * `s` has \\(k\\) non-negative singular values in non-increasing order,
/// * `v` is \\(n \times k\\) with orthonormal columns.
///
/// In each column of `u` the element of the largest magnitude is non-negative.
#[derive(Debug, Clone)]
pub struct SvdFactors<L: LinAlg>
{
    pub u: Mat<L>,
    pub s: Vec<L::F>,
    pub v: Mat<L>,
}

impl<L: LinAlg> SvdFactors<L>
{
    /// Number of components.
    pub fn len(&self) -> usize
    {
        self.s.len()
    }

    /// Checks if there is no component.
    pub fn is_empty(&self) -> bool
    {
        self.s.is_empty()
    }

    /// Keeps the leading `k` components.
    pub fn truncate(self, k: usize) -> Self
    {
        let k = k.min(self.len());

        SvdFactors {
            u: self.u.cols_head(k),
            s: self.s[..k].to_vec(),
            v: self.v.cols_head(k),
        }
    }

    /// Calculates \\(U \mathbf{diag}(s) V^T\\).
    pub fn reconstruct(&self) -> Mat<L>
    {
        let (m, _) = self.u.size();
        let (n, _) = self.v.size();

        Mat::new(m, n).by_fn(|r, c| {
            let mut sum = L::F::zero();
            for (i, &s) in self.s.iter().enumerate() {
                sum = sum + self.u[(r, i)] * s * self.v[(c, i)];
            }
            sum
        })
    }
}

//

/// SVD solver
///
/// Decomposes a dense matrix by one-sided (Hestenes) Jacobi rotations.
/// Column pairs are visited in a fixed cyclic order, so the result is
/// reproducible bit for bit for the same input.
#[derive(Debug, Clone)]
pub struct Svd<L: LinAlg>
{
    ph_l: PhantomData<L>,
    /// Parameters.
    pub par: SvdParam<L::F>,
}

impl<L: LinAlg> Default for Svd<L>
{
    fn default() -> Self
    {
        Self::new()
    }
}

impl<L: LinAlg> Svd<L>
{
    /// Creates an instance with default parameters.
    pub fn new() -> Self
    {
        Svd {
            ph_l: PhantomData,
            par: SvdParam::default(),
        }
    }

    /// Changes parameters.
    ///
    /// * `f` is a function to change parameters given by its argument.
    pub fn par<P>(mut self, f: P) -> Self
    where P: FnOnce(&mut SvdParam<L::F>)
    {
        f(&mut self.par);
        self
    }

    /// Decomposes a matrix.
    ///
    /// Returns [`SvdFactors`] or [`SvdError`].
    /// * `g` is the matrix \\(G\\) to decompose.
    ///
    /// Singular values negligible against \\(\\|G\\|_F\\) are set to zero.
    /// Components with a zero singular value have no defined direction;
    /// their singular vectors are completed to an orthonormal basis
    /// from the standard basis in a fixed order.
    pub fn decomp(&self, g: &Mat<L>) -> Result<SvdFactors<L>, SvdError>
    {
        let (m, n) = g.size();

        if m == 0 || n == 0 {
            log::error!("Empty matrix: {} x {}", m, n);
            return Err(SvdError::EmptyMat);
        }
        if !g.is_finite() {
            log::error!("Matrix contains non-finite elements");
            return Err(SvdError::NonFinite);
        }

        let transposed = m < n;
        let mut work = if !transposed {
            g.clone()
        }
        else {
            g.t()
        };
        let (_, k) = work.size();
        let mut rot = Mat::<L>::eye(k);

        log::debug!("svd {} x {} (transposed: {}) {:?}", m, n, transposed, self.par);

        let (mw, _) = work.size();
        let mw = <L::F as NumCast>::from(mw).unwrap_or_else(L::F::one);
        let tol = mw * self.par.eps_conv * self.par.eps_conv;
        // columns of squared norm below this are numerically zero
        let tol_zero = tol * L::dot(work.as_ref(), work.as_ref());
        let mut sweep = 0;
        loop {
            let mut converged_all = true;

            for i in 0.. k.saturating_sub(1) {
                for j in i + 1.. k {
                    if !Self::apply_jacobi_rot(&mut work, &mut rot, i, j, tol, tol_zero) {
                        converged_all = false;
                    }
                }
            }
            sweep += 1;
            log::trace!("{}: sweep done, converged {}", sweep, converged_all);

            if converged_all {
                log::debug!("converged after {} sweeps", sweep);
                break;
            }
            if let Some(max_sweep) = self.par.max_sweep {
                if sweep >= max_sweep {
                    log::warn!("----- ExcessSweep");
                    return Err(SvdError::ExcessSweep);
                }
            }
        }

        let f0 = L::F::zero();

        let mut s = vec![f0; k];
        for (i, si) in s.iter_mut().enumerate() {
            *si = L::norm(work.col(i));
            if *si * *si <= tol_zero {
                *si = f0;
            }
            else {
                work.scale_col(i, si.recip());
            }
        }

        let mut perm: Vec<usize> = (0.. k).collect();
        perm.sort_by(|&a, &b| s[b].partial_cmp(&s[a]).unwrap_or(Ordering::Equal));

        let mut left = work.permute_cols(&perm);
        let right = rot.permute_cols(&perm);
        let s: Vec<L::F> = perm.iter().map(|&p| s[p]).collect();

        if s[0] <= f0 {
            log::error!("All singular values are zero");
            return Err(SvdError::ZeroMat);
        }

        for c in 0.. k {
            if s[c] <= f0 {
                log::debug!("completing singular vector {} of zero singular value", c);
                Self::complete_col(&mut left, c);
            }
        }

        let (mut u, mut v) = if !transposed {
            (left, right)
        }
        else {
            (right, left)
        };

        Self::normalize_sign(&mut u, &mut v);

        Ok(SvdFactors {u, s, v})
    }

    fn apply_jacobi_rot(work: &mut Mat<L>, rot: &mut Mat<L>, c1: usize, c2: usize, tol: L::F, tol_zero: L::F) -> bool
    {
        let a = L::dot(work.col(c1), work.col(c1));
        let b = L::dot(work.col(c2), work.col(c2));
        let d = L::dot(work.col(c1), work.col(c2));

        if a <= tol_zero || b <= tol_zero || d * d <= tol * a * b {
            true
        }
        else {
            let f1 = L::F::one();
            let f2 = f1 + f1;

            let zeta = (b - a) / (f2 * d);
            let t = if zeta > L::F::zero() {
                f1 / (zeta + (f1 + zeta * zeta).sqrt())
            }
            else {
                -f1 / (-zeta + (f1 + zeta * zeta).sqrt())
            };
            let c = (f1 + t * t).sqrt().recip();
            let s = c * t;

            let (x1, x2) = work.col_pair_mut(c1, c2);
            L::rot(c, s, x1, x2);
            let (r1, r2) = rot.col_pair_mut(c1, c2);
            L::rot(c, s, r1, r2);

            false
        }
    }

    // columns 0..c are orthonormal on entry
    fn complete_col(mat: &mut Mat<L>, c: usize)
    {
        let (nr, _) = mat.size();
        let f0 = L::F::zero();
        let f1 = L::F::one();
        let half = (f1 + f1).recip();

        let mut best = vec![f0; nr];
        let mut best_norm = f0;
        let mut x = vec![f0; nr];

        for e in 0.. nr {
            L::scale(f0, &mut x);
            x[e] = f1;

            // twice for numerical orthogonality
            for _ in 0.. 2 {
                for p in 0.. c {
                    let proj = L::dot(mat.col(p), &x);
                    L::add(-proj, mat.col(p), &mut x);
                }
            }

            let nx = L::norm(&x);
            if nx > best_norm {
                best_norm = nx;
                L::copy(&x, &mut best);
                if nx > half {
                    break;
                }
            }
        }

        assert!(best_norm > f0);
        L::scale(best_norm.recip(), &mut best);
        L::copy(&best, mat.col_mut(c));
    }

    fn normalize_sign(u: &mut Mat<L>, v: &mut Mat<L>)
    {
        let (_, k) = u.size();
        let f0 = L::F::zero();

        for c in 0.. k {
            let mut max_abs = f0;
            let mut max_val = f0;
            for &e in u.col(c) {
                if e.abs() > max_abs {
                    max_abs = e.abs();
                    max_val = e;
                }
            }

            if max_val < f0 {
                u.scale_col(c, -L::F::one());
                v.scale_col(c, -L::F::one());
            }
        }
    }
}

//

#[cfg(test)]
mod tests
{
    use float_eq::assert_float_eq;
    use rand::prelude::*;
    use rand_xoshiro::rand_core::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;
    use crate::*;

    type L = FloatGeneric<f64>;
    type AMat = Mat<L>;
    type ASvd = Svd<L>;

    fn rand_mat(nr: usize, nc: usize, seed: u64) -> AMat
    {
        let mut rng = Xoshiro256StarStar::seed_from_u64(seed);
        AMat::new(nr, nc).by_fn(|_, _| rng.gen::<f64>() - 0.5)
    }

    fn max_abs_diff(a: &AMat, b: &AMat) -> f64
    {
        assert_eq!(a.size(), b.size());
        a.as_ref().iter().zip(b.as_ref()).fold(0., |m, (x, y)| f64::max(m, (x - y).abs()))
    }

    fn ortho_err(a: &AMat) -> f64
    {
        let (_, k) = a.size();
        let mut err: f64 = 0.;
        for i in 0.. k {
            for j in 0.. k {
                let d = L::dot(a.col(i), a.col(j));
                let e = if i == j {d - 1.} else {d};
                err = err.max(e.abs());
            }
        }
        err
    }

    fn check(g: &AMat)
    {
        let (m, n) = g.size();
        let svd = ASvd::new().decomp(g).unwrap();
        println!("s = {:?}", svd.s);

        assert_eq!(svd.len(), m.min(n));
        assert_eq!(svd.u.size(), (m, m.min(n)));
        assert_eq!(svd.v.size(), (n, m.min(n)));

        for w in svd.s.windows(2) {
            assert!(w[0] >= w[1]);
        }
        assert!(svd.s.iter().all(|&s| s >= 0.));

        assert!(max_abs_diff(&svd.reconstruct(), g) < 1e-12);
        assert!(ortho_err(&svd.u) < 1e-12);
        assert!(ortho_err(&svd.v) < 1e-12);
    }

    #[test]
    fn test_decomp_tall()
    {
        let _ = env_logger::builder().is_test(true).try_init();

        check(&rand_mat(7, 4, 1));
    }

    #[test]
    fn test_decomp_wide()
    {
        let _ = env_logger::builder().is_test(true).try_init();

        check(&rand_mat(4, 9, 2));
    }

    #[test]
    fn test_decomp_known()
    {
        let _ = env_logger::builder().is_test(true).try_init();

        // singular values of diag(3, -2) padded by a zero row
        let g = AMat::new(3, 2).iter_rowmaj(&[
            0., -2.,
            3.,  0.,
            0.,  0.,
        ]);

        let svd = ASvd::new().decomp(&g).unwrap();

        assert_float_eq!(svd.s.as_slice(), [3., 2.].as_ref(), abs_all <= 1e-12);
        // largest-magnitude element of each u column is positive
        assert_float_eq!(svd.u.col(0), [0., 1., 0.].as_ref(), abs_all <= 1e-12);
        assert_float_eq!(svd.u.col(1), [1., 0., 0.].as_ref(), abs_all <= 1e-12);
        assert_float_eq!(svd.v.col(0), [1., 0.].as_ref(), abs_all <= 1e-12);
        assert_float_eq!(svd.v.col(1), [0., -1.].as_ref(), abs_all <= 1e-12);
    }

    #[test]
    fn test_decomp_rank_deficient()
    {
        let _ = env_logger::builder().is_test(true).try_init();

        // second column is twice the first
        let g = AMat::new(5, 2).by_fn(|r, c| (r as f64 - 2.) * (c + 1) as f64);

        let svd = ASvd::new().decomp(&g).unwrap();
        println!("s = {:?}", svd.s);

        assert_float_eq!(svd.s[0], 50f64.sqrt(), abs <= 1e-12);
        assert_float_eq!(svd.s[1], 0., abs <= 1e-12);
        assert!(max_abs_diff(&svd.reconstruct(), &g) < 1e-12);
        assert!(ortho_err(&svd.u) < 1e-12);
        assert!(ortho_err(&svd.v) < 1e-12);
    }

    #[test]
    fn test_truncate()
    {
        let g = rand_mat(6, 5, 3);
        let svd = ASvd::new().decomp(&g).unwrap();
        let s_full = svd.s.clone();

        let svd = svd.truncate(2);

        assert_eq!(svd.len(), 2);
        assert_eq!(svd.u.size(), (6, 2));
        assert_eq!(svd.v.size(), (5, 2));
        assert_eq!(svd.s.as_slice(), &s_full[..2]);
    }

    #[test]
    fn test_deterministic()
    {
        let g = rand_mat(5, 8, 4);

        let svd1 = ASvd::new().decomp(&g).unwrap();
        let svd2 = ASvd::new().decomp(&g).unwrap();

        assert_eq!(svd1.s, svd2.s);
        assert_eq!(svd1.u.as_ref(), svd2.u.as_ref());
        assert_eq!(svd1.v.as_ref(), svd2.v.as_ref());
    }

    #[test]
    fn test_errors()
    {
        let _ = env_logger::builder().is_test(true).try_init();

        let rslt = ASvd::new().decomp(&AMat::new(0, 3)).unwrap_err();
        assert_eq!(rslt, SvdError::EmptyMat);

        let rslt = ASvd::new().decomp(&AMat::new(3, 3)).unwrap_err();
        assert_eq!(rslt, SvdError::ZeroMat);

        let mut g = rand_mat(3, 3, 5);
        g[(1, 1)] = f64::INFINITY;
        let rslt = ASvd::new().decomp(&g).unwrap_err();
        assert_eq!(rslt, SvdError::NonFinite);

        let g = rand_mat(6, 6, 6);
        let rslt = ASvd::new().par(|p| {p.max_sweep = Some(1)}).decomp(&g).unwrap_err();
        println!("{}", rslt);
        assert_eq!(rslt, SvdError::ExcessSweep);
    }
}
