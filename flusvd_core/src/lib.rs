/*!
Numeric core of [`flusvd`](https://crates.io/crates/flusvd).

<script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
<script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>

This crate provides a column-major dense matrix [`Mat`] and
a deterministic one-sided Jacobi singular value decomposition [`Svd`],
both generic over a [`LinAlg`] implementation.

# Examples

```
use float_eq::assert_float_eq;
use flusvd_core::*;

type La = FloatGeneric<f64>;

let g = Mat::<La>::new(3, 2).iter_rowmaj(&[
    1., 0.,
    0., 2.,
    0., 0.,
]);

let svd = Svd::<La>::new().decomp(&g).unwrap();

assert_float_eq!(svd.s.as_slice(), [2., 1.].as_ref(), abs_all <= 1e-12);
```
*/

mod linalg;

pub use linalg::*;

//

mod floatgeneric;

pub use floatgeneric::*;

//

mod mat;

pub use mat::*;

//

mod svd_error;
mod svd;

pub use svd_error::*;
pub use svd::*;
