//! Batch jobs.
//!
//! Every job reads its inputs and computes all of its outputs before the first
//! file is written, so a failing job leaves no output behind.

use std::fmt;
use std::path::{Path, PathBuf};
use serde::Serialize;
use flusvd_core::{FloatGeneric, Svd};
use crate::config::PipelineParam;
use crate::decomp::{self, Decomposition, FACTOR_HEADERS};
use crate::error::Result;
use crate::matrix::{AnalysisMatrix, ColumnEntryNoName, LongRecord};
use crate::popnorm::{self, PopNormRow, POPNORM_HEADERS};
use crate::series::{self, FormattedRow, FORMATTED_HEADERS};
use crate::table::{self, Table};
use crate::zscore::{self, ZScoreRow, ZSCORE_HEADERS};

/// Summary of one written file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Written
{
    pub path: PathBuf,
    pub rows: usize,
    pub columns: usize,
}

impl fmt::Display for Written
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "wrote {} ({} rows, {} columns)", self.path.display(), self.rows, self.columns)
    }
}

//

/// Pipeline of the batch jobs.
#[derive(Debug, Clone, Default)]
pub struct Pipeline
{
    /// Parameters.
    pub par: PipelineParam,
}

impl Pipeline
{
    /// Creates an instance with default parameters.
    pub fn new() -> Self
    {
        Pipeline {
            par: PipelineParam::default(),
        }
    }

    /// Changes parameters.
    ///
    /// * `f` is a function to change parameters given by its argument.
    pub fn par<P>(mut self, f: P) -> Self
    where P: FnOnce(&mut PipelineParam)
    {
        f(&mut self.par);
        self
    }

    /// Builds the formatted table from the raw admissions and the locations reference.
    pub fn format(&self) -> Result<Vec<Written>>
    {
        log::info!("----- format");
        let rows = self.compute_formatted()?;

        Ok(vec![self.write_formatted(&rows)?])
    }

    /// Builds the population-normalized table from the formatted table.
    pub fn popnorm(&self) -> Result<Vec<Written>>
    {
        log::info!("----- popnorm");
        let rows = self.read_formatted()?;
        let rows = popnorm::normalize(&rows, self.par.rate_per)?;

        Ok(vec![self.write_popnorm(&rows)?])
    }

    /// Builds the z-score table from the formatted table.
    pub fn zscore(&self) -> Result<Vec<Written>>
    {
        log::info!("----- zscore");
        let rows = self.read_formatted()?;
        let rows = zscore::standardize(&rows)?;

        Ok(vec![self.write_zscore(&rows)?])
    }

    /// Decomposes the population-normalized and the z-score tables.
    pub fn svd(&self) -> Result<Vec<Written>>
    {
        log::info!("----- svd");
        let pop = self.decompose_file(&self.par.popnorm, "popnorm", &self.par.popnorm_value_columns)?;
        let z = self.decompose_file(&self.par.zscore, "zscore", &self.par.zscore_value_columns)?;

        let mut written = self.write_decomposition(&self.par.svd_popnorm, &pop)?;
        written.extend(self.write_decomposition(&self.par.svd_zscore, &z)?);

        Ok(written)
    }

    /// Runs every job in memory, then writes every output.
    pub fn all(&self) -> Result<Vec<Written>>
    {
        log::info!("----- all");
        let formatted = self.compute_formatted()?;
        let pop_rows = popnorm::normalize(&formatted, self.par.rate_per)?;
        let z_rows = zscore::standardize(&formatted)?;

        let pop = self.decompose(&AnalysisMatrix::build(&long_popnorm(&pop_rows), true)?)?;
        let z = self.decompose(&AnalysisMatrix::build(&long_zscore(&z_rows), true)?)?;

        let mut written = vec![
            self.write_formatted(&formatted)?,
            self.write_popnorm(&pop_rows)?,
            self.write_zscore(&z_rows)?,
        ];
        written.extend(self.write_decomposition(&self.par.svd_popnorm, &pop)?);
        written.extend(self.write_decomposition(&self.par.svd_zscore, &z)?);

        Ok(written)
    }

    //

    fn compute_formatted(&self) -> Result<Vec<FormattedRow>>
    {
        let adm = Table::read(&self.par.resolve(&self.par.admissions), "admissions")?;

        let candidates: Vec<PathBuf> = self.par.locations.iter().map(|p| self.par.resolve(p)).collect();
        let (loc, loc_path) = Table::read_first(&candidates, "locations")?;
        log::info!("locations reference: {}", loc_path.display());

        let rows = series::format(&adm, &loc)?;
        log::info!("formatted {} rows of {} admissions rows", rows.len(), adm.len());

        Ok(rows)
    }

    fn read_formatted(&self) -> Result<Vec<FormattedRow>>
    {
        let t = Table::read(&self.par.resolve(&self.par.formatted), "formatted")?;

        FormattedRow::from_table(&t)
    }

    fn svd_solver(&self) -> Svd<FloatGeneric<f64>>
    {
        let max_sweep = self.par.max_sweep;

        Svd::new().par(|p| p.max_sweep = max_sweep)
    }

    fn decompose(&self, matrix: &AnalysisMatrix) -> Result<Decomposition>
    {
        decomp::decompose_with(&self.svd_solver(), matrix, self.par.n_components)
    }

    fn decompose_file(&self, path: &Path, name: &str, value_columns: &[String]) -> Result<Decomposition>
    {
        let t = Table::read(&self.par.resolve(path), name)?;
        let matrix = AnalysisMatrix::from_table(&t, value_columns)?;

        self.decompose(&matrix)
    }

    fn write<S: Serialize>(&self, path: &Path, headers: &[&str], rows: &[S]) -> Result<Written>
    {
        let path = self.par.resolve(path);
        table::write_atomic(&path, headers, rows)?;

        let w = Written {
            path,
            rows: rows.len(),
            columns: headers.len(),
        };
        log::info!("{}", w);

        Ok(w)
    }

    fn write_formatted(&self, rows: &[FormattedRow]) -> Result<Written>
    {
        self.write(&self.par.formatted, FORMATTED_HEADERS, rows)
    }

    fn write_popnorm(&self, rows: &[PopNormRow]) -> Result<Written>
    {
        self.write(&self.par.popnorm, POPNORM_HEADERS, rows)
    }

    fn write_zscore(&self, rows: &[ZScoreRow]) -> Result<Written>
    {
        self.write(&self.par.zscore, ZSCORE_HEADERS, rows)
    }

    fn write_decomposition(&self, path: &Path, d: &Decomposition) -> Result<Vec<Written>>
    {
        let factors = self.write(path, FACTOR_HEADERS, &d.to_flat_rows())?;

        let columns_path = PipelineParam::columns_path(path);
        let columns = if d.columns.has_names {
            self.write(&columns_path, d.columns.headers(), &d.columns.entries)?
        }
        else {
            let entries: Vec<ColumnEntryNoName> = d.columns.entries.iter().map(ColumnEntryNoName::from).collect();
            self.write(&columns_path, d.columns.headers(), &entries)?
        };

        Ok(vec![factors, columns])
    }
}

//

fn long_popnorm(rows: &[PopNormRow]) -> Vec<LongRecord>
{
    rows.iter()
        .map(|r| LongRecord {
            season_week: r.season_week,
            season: r.season.clone(),
            location: r.location.clone(),
            location_name: Some(r.location_name.clone()),
            value: Some(r.hosps_pop_norm),
        })
        .collect()
}

fn long_zscore(rows: &[ZScoreRow]) -> Vec<LongRecord>
{
    rows.iter()
        .map(|r| LongRecord {
            season_week: r.season_week,
            season: r.season.clone(),
            location: r.location.clone(),
            location_name: Some(r.location_name.clone()),
            value: Some(r.zflu),
        })
        .collect()
}
