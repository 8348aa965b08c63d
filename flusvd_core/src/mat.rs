use core::ops::{Index, IndexMut, Deref};
use num_traits::{Float, Zero, One};
use crate::LinAlg;

//

/// Dense matrix
///
/// Matrix struct which owns a `Vec` of data array stored in column-major.
/// Each column is a contiguous slice, which is what the column-oriented
/// routines of [`crate::Svd`] work on.
#[derive(Clone)]
pub struct Mat<L: LinAlg>
{
    n_row: usize,
    n_col: usize,
    array: Vec<L::F>,
}

impl<L: LinAlg> Mat<L>
{
    /// Creates an instance.
    ///
    /// Returns the [`Mat`] instance with zero data.
    /// * `n_row` is a number of rows.
    /// * `n_col` is a number of columns.
    pub fn new(n_row: usize, n_col: usize) -> Self
    {
        Mat {
            n_row,
            n_col,
            array: vec![L::F::zero(); n_row * n_col],
        }
    }

    /// Creates an identity matrix of size `n`.
    pub fn eye(n: usize) -> Self
    {
        Self::new(n, n).by_fn(|r, c| if r == c {L::F::one()} else {L::F::zero()})
    }

    /// Size of the matrix.
    ///
    /// Returns a tuple of a number of rows and columns.
    pub fn size(&self) -> (usize, usize)
    {
        (self.n_row, self.n_col)
    }

    /// Data by a function.
    ///
    /// * `func` takes a row and a column of the matrix and returns data of each element.
    pub fn set_by_fn<M>(&mut self, mut func: M)
    where M: FnMut(usize, usize) -> L::F
    {
        for c in 0.. self.n_col {
            for r in 0.. self.n_row {
                self[(r, c)] = func(r, c);
            }
        }
    }
    /// Builder pattern of [`Mat::set_by_fn`].
    pub fn by_fn<M>(mut self, func: M) -> Self
    where M: FnMut(usize, usize) -> L::F
    {
        self.set_by_fn(func);
        self
    }

    /// Data by an iterator in row-major.
    ///
    /// * `iter` iterates matrix data in row-major.
    pub fn set_iter_rowmaj<T, I>(&mut self, iter: T)
    where T: IntoIterator<Item=I>, I: Deref<Target=L::F>
    {
        let mut i = iter.into_iter();

        for r in 0.. self.n_row {
            for c in 0.. self.n_col {
                if let Some(v) = i.next() {
                    self[(r, c)] = *v;
                }
                else {
                    break;
                }
            }
        }
    }
    /// Builder pattern of [`Mat::set_iter_rowmaj`].
    pub fn iter_rowmaj<T, I>(mut self, iter: T) -> Self
    where T: IntoIterator<Item=I>, I: Deref<Target=L::F>
    {
        self.set_iter_rowmaj(iter);
        self
    }

    /// Column `c` as a slice.
    pub fn col(&self, c: usize) -> &[L::F]
    {
        assert!(c < self.n_col);

        let (_, spl) = self.array.split_at(c * self.n_row);
        let (v, _) = spl.split_at(self.n_row);
        v
    }

    /// Column `c` as a mutable slice.
    pub fn col_mut(&mut self, c: usize) -> &mut[L::F]
    {
        assert!(c < self.n_col);

        let (_, spl) = self.array.split_at_mut(c * self.n_row);
        let (v, _) = spl.split_at_mut(self.n_row);
        v
    }

    /// A pair of distinct columns `c1 < c2` as mutable slices.
    pub fn col_pair_mut(&mut self, c1: usize, c2: usize) -> (&mut[L::F], &mut[L::F])
    {
        assert!(c1 < c2);
        assert!(c2 < self.n_col);

        let nr = self.n_row;
        let (head, tail) = self.array.split_at_mut(c2 * nr);
        let (_, v1) = head.split_at_mut(c1 * nr);
        let (v1, _) = v1.split_at_mut(nr);
        let (v2, _) = tail.split_at_mut(nr);
        (v1, v2)
    }

    /// Scales column `c` by \\(\alpha\\).
    pub fn scale_col(&mut self, c: usize, alpha: L::F)
    {
        L::scale(alpha, self.col_mut(c));
    }

    /// Transposed copy of the matrix.
    pub fn t(&self) -> Self
    {
        Self::new(self.n_col, self.n_row).by_fn(|r, c| self[(c, r)])
    }

    /// Copy of the first `n` columns.
    pub fn cols_head(&self, n: usize) -> Self
    {
        assert!(n <= self.n_col);

        let (head, _) = self.array.split_at(n * self.n_row);
        Mat {
            n_row: self.n_row,
            n_col: n,
            array: head.to_vec(),
        }
    }

    /// Copy with columns rearranged, column `c` of the result being column `perm[c]` of `self`.
    pub fn permute_cols(&self, perm: &[usize]) -> Self
    {
        let mut m = Self::new(self.n_row, perm.len());
        for (c, &p) in perm.iter().enumerate() {
            L::copy(self.col(p), m.col_mut(c));
        }
        m
    }

    /// Checks if every element is finite.
    pub fn is_finite(&self) -> bool
    {
        self.array.iter().all(|v| v.is_finite())
    }

    fn index(&self, (r, c): (usize, usize)) -> usize
    {
        assert!(r < self.n_row);
        assert!(c < self.n_col);

        c * self.n_row + r
    }
}

//

impl<L: LinAlg> Index<(usize, usize)> for Mat<L>
{
    type Output = L::F;
    fn index(&self, index: (usize, usize)) -> &Self::Output
    {
        let i = self.index(index);

        &self.array[i]
    }
}

impl<L: LinAlg> IndexMut<(usize, usize)> for Mat<L>
{
    fn index_mut(&mut self, index: (usize, usize)) -> &mut Self::Output
    {
        let i = self.index(index);

        &mut self.array[i]
    }
}

//

impl<L: LinAlg> AsRef<[L::F]> for Mat<L>
{
    fn as_ref(&self) -> &[L::F]
    {
        &self.array
    }
}

//

impl<L: LinAlg> core::fmt::Debug for Mat<L>
where L::F: Float + core::fmt::LowerExp
{
    fn fmt(&self, f: &mut core::fmt::Formatter) -> Result<(), core::fmt::Error>
    {
        let (nr, nc) = self.size();

        if nr == 0 || nc == 0 {
            write!(f, "[ ]")?;
        }
        else {
            for r in 0..nr {
                if r == 0 {
                    write!(f, "[")?;
                }
                else {
                    write!(f, " ")?;
                }

                for c in 0..nc {
                    write!(f, " {:.3e}", self[(r, c)])?;
                }

                if r < nr - 1 {
                    writeln!(f)?;
                }
                else {
                    write!(f, " ] ({} x {})", nr, nc)?;
                }
            }
        }

        Ok(())
    }
}

//

#[test]
fn test_mat1()
{
    use crate::FloatGeneric;

    type L = FloatGeneric<f64>;

    let m = Mat::<L>::new(2, 3).iter_rowmaj(&[
        1., 2., 3.,
        4., 5., 6.,
    ]);

    assert_eq!(m.size(), (2, 3));
    assert_eq!(m.col(1), &[2., 5.]);
    assert_eq!(m.as_ref(), &[1., 4., 2., 5., 3., 6.]);

    let mt = m.t();
    assert_eq!(mt.size(), (3, 2));
    assert_eq!(mt.col(0), &[1., 2., 3.]);

    let p = m.permute_cols(&[2, 0]);
    assert_eq!(p.as_ref(), &[3., 6., 1., 4.]);

    let h = m.cols_head(2);
    assert_eq!(h.as_ref(), &[1., 4., 2., 5.]);
}

#[test]
fn test_mat2()
{
    use crate::FloatGeneric;

    type L = FloatGeneric<f64>;

    let mut m = Mat::<L>::eye(3);
    {
        let (c0, c2) = m.col_pair_mut(0, 2);
        c0[1] = 7.;
        c2[1] = 8.;
    }
    m.scale_col(2, -1.);

    assert_eq!(m[(1, 0)], 7.);
    assert_eq!(m[(1, 2)], -8.);
    assert_eq!(m[(2, 2)], -1.);
    assert!(m.is_finite());

    m[(0, 0)] = f64::NAN;
    assert!(!m.is_finite());
}
