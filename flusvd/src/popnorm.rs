//! Admissions per population.

use chrono::NaiveDate;
use serde::Serialize;
use crate::error::{Error, Result};
use crate::series::FormattedRow;

/// Header of the population-normalized table, in the field order of [`PopNormRow`].
pub const POPNORM_HEADERS: &[&str] = &[
    "date", "location", "location_name", "population", "value",
    "season", "season_week", "epiyear", "epiweek",
    "hosps_pop_norm",
];

/// Row of the population-normalized table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopNormRow
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
    /// `value / population * rate_per`
    pub hosps_pop_norm: f64,
}

/// Normalizes admissions by population.
///
/// * `rows` is the formatted table.
/// * `rate_per` is the population unit, e.g. `100000.` for admissions per 100 000 residents.
pub fn normalize(rows: &[FormattedRow], rate_per: f64) -> Result<Vec<PopNormRow>>
{
    if !(rate_per.is_finite() && rate_per > 0.) {
        return Err(Error::InvalidParam(format!("rate_per must be positive, got {}", rate_per)));
    }

    log::debug!("normalizing {} rows per {} residents", rows.len(), rate_per);

    Ok(rows.iter()
        .map(|r| PopNormRow {
            date: r.date,
            location: r.location.clone(),
            location_name: r.location_name.clone(),
            population: r.population,
            value: r.value,
            season: r.season.clone(),
            season_week: r.season_week,
            epiyear: r.epiyear,
            epiweek: r.epiweek,
            hosps_pop_norm: r.value / r.population as f64 * rate_per,
        })
        .collect())
}

//

#[cfg(test)]
mod tests
{
    use float_eq::assert_float_eq;
    use super::*;

    fn row(location: &str, population: u64, value: f64) -> FormattedRow
    {
        FormattedRow {
            date: NaiveDate::from_ymd_opt(2023, 10, 7).unwrap(),
            location: location.to_string(),
            location_name: String::new(),
            population,
            value,
            season: "2023/2024".to_string(),
            season_week: 0,
            epiyear: 2023,
            epiweek: 40,
        }
    }

    #[test]
    fn test_normalize()
    {
        let rows = [row("06", 39_000_000, 390.), row("56", 580_000, 0.)];

        let n = normalize(&rows, 100000.).unwrap();

        assert_eq!(n.len(), 2);
        assert_float_eq!(n[0].hosps_pop_norm, 1., abs <= 1e-12);
        assert_eq!(n[1].hosps_pop_norm, 0.);
        assert_eq!(n[0].location, "06");

        assert!(matches!(normalize(&rows, 0.), Err(Error::InvalidParam(_))));
    }
}
