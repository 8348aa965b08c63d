//! PCA of the analysis matrix and the long encoding of its factors.
//!
//! The flat encoding is one table of `(vector_name, vector_number1, season_week, value)`:
//!
//! | vector_name | vector_number1 | season_week | value |
//! |-------------|----------------|-------------|-------|
//! | `u`         | component      | week        | \\(U_{week,component}\\) |
//! | `sigma`     | component      | `-1`        | \\(\sigma_{component}\\) |
//! | `v`         | column id      | component   | \\(V_{column,component}\\) |

use serde::{Deserialize, Serialize};
use flusvd_core::{FloatGeneric, Mat, Svd};
use crate::calendar::LAST_SEASON_WEEK;
use crate::error::{preview, Error, Result};
use crate::matrix::{AnalysisMatrix, ColumnMap};
use crate::stats;
use crate::table::{self, Table};

type La = FloatGeneric<f64>;

/// Header of the flat factor table, in the field order of [`FlatFactorRow`].
pub const FACTOR_HEADERS: &[&str] = &["vector_name", "vector_number1", "season_week", "value"];

const TAG_U: &str = "u";
const TAG_SIGMA: &str = "sigma";
const TAG_V: &str = "v";
const SIGMA_WEEK: i64 = -1;

//

/// Element of a left singular vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeekComponentValue
{
    pub component: usize,
    pub season_week: usize,
    pub value: f64,
}

/// Singular value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComponentSingularValue
{
    pub component: usize,
    pub value: f64,
}

/// Element of a right singular vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnComponentValue
{
    pub col_id: usize,
    pub component: usize,
    pub value: f64,
}

/// One factor element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FactorRow
{
    U(WeekComponentValue),
    Sigma(ComponentSingularValue),
    V(ColumnComponentValue),
}

/// Row of the flat factor table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatFactorRow
{
    pub vector_name: String,
    pub vector_number1: usize,
    pub season_week: i64,
    pub value: f64,
}

impl FactorRow
{
    /// Flat encoding.
    pub fn to_flat(&self) -> FlatFactorRow
    {
        let (tag, number, week, value) = match *self {
            FactorRow::U(r) => (TAG_U, r.component, r.season_week as i64, r.value),
            FactorRow::Sigma(r) => (TAG_SIGMA, r.component, SIGMA_WEEK, r.value),
            FactorRow::V(r) => (TAG_V, r.col_id, r.component as i64, r.value),
        };

        FlatFactorRow {
            vector_name: tag.to_string(),
            vector_number1: number,
            season_week: week,
            value,
        }
    }

    /// Decodes a flat row.
    ///
    /// Returns `None` for an unknown tag or a week field out of range for the tag.
    pub fn from_flat(flat: &FlatFactorRow) -> Option<Self>
    {
        let week = flat.season_week;

        match flat.vector_name.as_str() {
            TAG_U if (0..= LAST_SEASON_WEEK).contains(&week) => Some(FactorRow::U(WeekComponentValue {
                component: flat.vector_number1,
                season_week: week as usize,
                value: flat.value,
            })),
            TAG_SIGMA if week == SIGMA_WEEK => Some(FactorRow::Sigma(ComponentSingularValue {
                component: flat.vector_number1,
                value: flat.value,
            })),
            TAG_V if week >= 0 => Some(FactorRow::V(ColumnComponentValue {
                col_id: flat.vector_number1,
                component: week as usize,
                value: flat.value,
            })),
            _ => None,
        }
    }
}

/// Decodes flat rows.
///
/// Fails with [`Error::ParseError`] listing the rows that do not decode.
pub fn decode(flat: &[FlatFactorRow]) -> Result<Vec<FactorRow>>
{
    let mut rows = Vec::with_capacity(flat.len());
    let mut bad = Vec::new();

    for (i, f) in flat.iter().enumerate() {
        match FactorRow::from_flat(f) {
            Some(r) => rows.push(r),
            None => bad.push(format!("row {}: ({}, {}, {})", i, f.vector_name, f.vector_number1, f.season_week)),
        }
    }

    if bad.is_empty() {
        Ok(rows)
    }
    else {
        Err(Error::ParseError {
            table: "factors".to_string(),
            column: "vector_name".to_string(),
            count: bad.len(),
            preview: preview(&bad),
        })
    }
}

impl FlatFactorRow
{
    /// Reads back a flat factor table.
    pub fn from_table(table: &Table) -> Result<Vec<Self>>
    {
        table.require(FACTOR_HEADERS)?;

        let names = table.text_column("vector_name")?;
        let numbers = table.column("vector_number1", |s| table::parse_i64(s).filter(|n| *n >= 0).map(|n| n as usize))?;
        let weeks = table.column("season_week", table::parse_i64)?;
        let values = table.column("value", table::parse_f64)?;

        let mut rows = Vec::with_capacity(table.len());
        let mut incomplete = Vec::new();

        for i in 0.. table.len() {
            match (&names[i], numbers[i], weeks[i], values[i]) {
                (Some(name), Some(number), Some(week), Some(value)) => rows.push(FlatFactorRow {
                    vector_name: name.clone(),
                    vector_number1: number,
                    season_week: week,
                    value,
                }),
                _ => incomplete.push(format!("line {}", i + 2)),
            }
        }

        if incomplete.is_empty() {
            Ok(rows)
        }
        else {
            Err(Error::ParseError {
                table: table.name().to_string(),
                column: "*".to_string(),
                count: incomplete.len(),
                preview: preview(&incomplete),
            })
        }
    }
}

//

/// PCA of an analysis matrix: \\(G_{w,j} \approx m_j + \sum_c U_{w,c} \sigma_c V_{j,c}\\).
#[derive(Debug, Clone)]
pub struct Decomposition
{
    /// Retained columns, in the row order of `v`.
    pub columns: ColumnMap,
    /// Mean of each column that was subtracted before decomposition.
    pub col_means: Vec<f64>,
    /// Season weeks by components, orthonormal columns.
    pub u: Mat<La>,
    /// Non-negative, non-increasing.
    pub sigma: Vec<f64>,
    /// Matrix columns by components, orthonormal columns.
    pub v: Mat<La>,
}

impl Decomposition
{
    /// Number of components.
    pub fn n_components(&self) -> usize
    {
        self.sigma.len()
    }

    /// Approximation of the analysis matrix from the kept components.
    pub fn reconstruct(&self) -> Mat<La>
    {
        let (n_week, _) = self.u.size();
        let (n_col, _) = self.v.size();

        Mat::new(n_week, n_col).by_fn(|w, j| {
            let mut sum = self.col_means[j];
            for (c, s) in self.sigma.iter().enumerate() {
                sum += self.u[(w, c)] * s * self.v[(j, c)];
            }
            sum
        })
    }

    /// Tagged factor rows: `u` by component then week, `sigma` by component,
    /// `v` by column id then component.
    pub fn to_rows(&self) -> Vec<FactorRow>
    {
        let (n_week, k) = self.u.size();
        let mut rows = Vec::new();

        for component in 0.. k {
            for season_week in 0.. n_week {
                rows.push(FactorRow::U(WeekComponentValue {
                    component,
                    season_week,
                    value: self.u[(season_week, component)],
                }));
            }
        }

        for (component, &value) in self.sigma.iter().enumerate() {
            rows.push(FactorRow::Sigma(ComponentSingularValue {component, value}));
        }

        let mut order: Vec<(usize, usize)> = self.columns.entries.iter()
            .enumerate()
            .map(|(j, e)| (e.col_id, j))
            .collect();
        order.sort_unstable();

        for (col_id, j) in order {
            for component in 0.. k {
                rows.push(FactorRow::V(ColumnComponentValue {
                    col_id,
                    component,
                    value: self.v[(j, component)],
                }));
            }
        }

        rows
    }

    /// Flat factor rows, see [`Decomposition::to_rows`].
    pub fn to_flat_rows(&self) -> Vec<FlatFactorRow>
    {
        self.to_rows().iter().map(FactorRow::to_flat).collect()
    }
}

//

/// Centers the columns of `matrix` and decomposes it with default SVD parameters.
///
/// * `n_components` caps the number of kept components; `Some(0)` is invalid.
pub fn decompose(matrix: &AnalysisMatrix, n_components: Option<usize>) -> Result<Decomposition>
{
    decompose_with(&Svd::new(), matrix, n_components)
}

/// Centers the columns of `matrix` and decomposes it with `svd`.
pub fn decompose_with(svd: &Svd<La>, matrix: &AnalysisMatrix, n_components: Option<usize>) -> Result<Decomposition>
{
    if n_components == Some(0) {
        return Err(Error::InvalidParam("number of components must be positive".to_string()));
    }

    let (n_row, n_col) = matrix.data.size();

    let col_means: Vec<f64> = (0.. n_col)
        .map(|j| stats::mean(matrix.data.col(j)).unwrap_or_default())
        .collect();

    let centered = matrix.data.clone().by_fn(|r, c| matrix.data[(r, c)] - col_means[c]);

    let factors = svd.decomp(&centered).map_err(|e| match e {
        flusvd_core::SvdError::ZeroMat => Error::InsufficientData(
            "every column is constant, nothing to decompose".to_string()
        ),
        e => Error::Svd(e),
    })?;

    let k = n_row.min(n_col).min(n_components.unwrap_or(usize::MAX));
    let factors = factors.truncate(k);

    log::info!("decomposed {} x {} matrix, {} components", n_row, n_col, factors.len());
    log::debug!("singular values {:?}", factors.s);

    Ok(Decomposition {
        columns: matrix.columns.clone(),
        col_means,
        u: factors.u,
        sigma: factors.s,
        v: factors.v,
    })
}

//
