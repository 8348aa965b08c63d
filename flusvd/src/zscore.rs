//! Per-location standardization.

use std::collections::BTreeMap;
use chrono::NaiveDate;
use serde::Serialize;
use crate::error::{Error, Result};
use crate::series::FormattedRow;
use crate::stats;

/// Header of the z-score table, in the field order of [`ZScoreRow`].
pub const ZSCORE_HEADERS: &[&str] = &[
    "date", "location", "location_name", "population", "value",
    "season", "season_week", "epiyear", "epiweek",
    "state_mean", "state_std", "zflu",
];

/// Row of the z-score table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZScoreRow
{
    pub date: NaiveDate,
    pub location: String,
    pub location_name: String,
    pub population: u64,
    pub value: f64,
    pub season: String,
    pub season_week: i64,
    pub epiyear: i32,
    pub epiweek: u32,
    /// Mean of `value` over every row of the location.
    pub state_mean: f64,
    /// Sample standard deviation of `value` over every row of the location.
    pub state_std: f64,
    /// `(value - state_mean) / state_std`
    pub zflu: f64,
}

/// Standardizes `value` within each location across all its seasons.
///
/// Locations whose sample standard deviation is zero or undefined (a single row)
/// are excluded. Row order is preserved.
/// Fails with [`Error::InsufficientData`] if no row remains.
pub fn standardize(rows: &[FormattedRow]) -> Result<Vec<ZScoreRow>>
{
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for r in rows {
        groups.entry(r.location.as_str()).or_default().push(r.value);
    }

    let mut moments = BTreeMap::new();
    for (loc, values) in &groups {
        match (stats::mean(values), stats::sample_std(values)) {
            (Some(m), Some(s)) if s > 0. => {
                moments.insert(*loc, (m, s));
            },
            _ => {
                log::warn!("location {}: zero or undefined standard deviation over {} rows, excluded", loc, values.len());
            },
        }
    }

    let out: Vec<ZScoreRow> = rows.iter()
        .filter_map(|r| {
            let &(state_mean, state_std) = moments.get(r.location.as_str())?;
            Some(ZScoreRow {
                date: r.date,
                location: r.location.clone(),
                location_name: r.location_name.clone(),
                population: r.population,
                value: r.value,
                season: r.season.clone(),
                season_week: r.season_week,
                epiyear: r.epiyear,
                epiweek: r.epiweek,
                state_mean,
                state_std,
                zflu: (r.value - state_mean) / state_std,
            })
        })
        .collect();

    if out.is_empty() {
        return Err(Error::InsufficientData(
            "no location has a positive standard deviation to standardize".to_string()
        ));
    }

    log::debug!("standardized {} rows of {} locations", out.len(), moments.len());

    Ok(out)
}

//
