/*!
Seasonal influenza admissions on the MMWR calendar, and their singular value decomposition.

<script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
<script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>

Weekly admissions per jurisdiction are mapped onto flu seasons
(season week 0 is the epi-week 40), pivoted into a dense season-week by
(season, location) matrix \\(G\\), and decomposed as
\\(G_{w,j} = m_j + \sum_c U_{w,c} \sigma_c V_{j,c}\\)
where \\(m_j\\) is the mean of column \\(j\\).

Stages:
* [`series`]: cleaning, calendar fields, season window, population join.
* [`popnorm`]: admissions per 100 000 residents.
* [`zscore`]: per-location standardization.
* [`matrix`]: long table to [`matrix::AnalysisMatrix`].
* [`decomp`]: centering, SVD and the long encoding of the factors.
* [`pipeline`]: batch jobs reading and writing CSV files under a root directory.

# Examples

```
use flusvd::prelude::*;
use flusvd::matrix::LongRecord;

let mut recs = Vec::new();
for (loc, scale) in [("06", 1.), ("36", 2.), ("US", 0.5)] {
    for w in 0.. 33 {
        recs.push(LongRecord {
            season_week: w,
            season: "2023/2024".to_string(),
            location: loc.to_string(),
            location_name: None,
            value: Some(scale * (w as f64 - 16.).powi(2) + w as f64),
        });
    }
}

let matrix = AnalysisMatrix::build(&recs, false).unwrap();
let d = decompose(&matrix, Some(2)).unwrap();

assert_eq!(d.n_components(), 2);
assert!(d.sigma[0] >= d.sigma[1]);
```
*/

pub mod calendar;
pub mod location;
pub mod stats;
pub mod error;
pub mod table;
pub mod series;
pub mod popnorm;
pub mod zscore;
pub mod matrix;
pub mod decomp;
pub mod config;
pub mod pipeline;

pub use error::{Error, Result};

/// Prelude
pub mod prelude
{
    pub use crate::error::{Error, Result};
    pub use crate::config::PipelineParam;
    pub use crate::pipeline::{Pipeline, Written};
    pub use crate::matrix::{AnalysisMatrix, ColumnMap};
    pub use crate::decomp::{decompose, Decomposition, FactorRow};
}
