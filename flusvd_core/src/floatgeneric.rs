use num_traits::Float;
use core::fmt::{Debug, LowerExp};
use core::marker::PhantomData;
use crate::LinAlg;

/// `num::Float`-generic [`LinAlg`] implementation
///
/// All numeric operations are written in pure Rust.
#[derive(Debug, Clone)]
pub struct FloatGeneric<F>
{
    ph_f: PhantomData<F>,
}

impl<F: Float + Debug + LowerExp> LinAlg for FloatGeneric<F>
{
    type F = F;

    fn norm(x: &[F]) -> F
    {
        let mut sum = F::zero();
        for u in x {
            sum = sum + *u * *u;
        }
        sum.sqrt()
    }

    fn dot(x: &[F], y: &[F]) -> F
    {
        assert_eq!(x.len(), y.len());

        let mut sum = F::zero();
        for (u, v) in x.iter().zip(y) {
            sum = sum + *u * *v;
        }
        sum
    }

    fn copy(x: &[F], y: &mut[F])
    {
        assert_eq!(x.len(), y.len());

        for (u, v) in x.iter().zip(y) {
            *v = *u;
        }
    }

    fn scale(alpha: F, x: &mut[F])
    {
        for u in x {
            *u = alpha * *u;
        }
    }

    fn add(alpha: F, x: &[F], y: &mut[F])
    {
        assert_eq!(x.len(), y.len());

        for (u, v) in x.iter().zip(y) {
            *v = *v + alpha * *u;
        }
    }

    fn rot(c: F, s: F, x: &mut[F], y: &mut[F])
    {
        assert_eq!(x.len(), y.len());

        for (u, v) in x.iter_mut().zip(y) {
            let xu = *u;
            let yv = *v;
            *u = c * xu - s * yv;
            *v = s * xu + c * yv;
        }
    }
}

//

#[test]
fn test_rot()
{
    use float_eq::assert_float_eq;

    type L = FloatGeneric<f64>;

    let mut x = [1., 0., 2.];
    let mut y = [0., 1., 2.];
    let (c, s) = (0.6, 0.8);

    L::rot(c, s, &mut x, &mut y);

    assert_float_eq!(x.as_ref(), [0.6, -0.8, -0.4].as_ref(), abs_all <= 1e-12);
    assert_float_eq!(y.as_ref(), [0.8, 0.6, 2.8].as_ref(), abs_all <= 1e-12);
    assert_float_eq!(L::dot(&x, &x) + L::dot(&y, &y), 10., abs <= 1e-12);
}
