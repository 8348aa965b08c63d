//! Admissions series on the season calendar.

use std::collections::{BTreeMap, BTreeSet};
use chrono::NaiveDate;
use serde::Serialize;
use crate::calendar::{self, SeasonDate};
use crate::error::{preview, Error, Result};
use crate::location::normalize_location;
use crate::table::{self, Table};

/// Required columns of the admissions table.
pub const ADMISSIONS_COLUMNS: &[&str] = &["date", "location", "location_name", "value"];
/// Required columns of the locations reference table.
pub const LOCATIONS_COLUMNS: &[&str] = &["location", "population"];

/// Header of the formatted table, in the field order of [`FormattedRow`].
pub const FORMATTED_HEADERS: &[&str] = &[
    "date", "location", "location_name", "population", "value",
    "season", "season_week", "epiyear", "epiweek",
];

//

/// One cleaned admissions record.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation
{
    pub date: NaiveDate,
    pub location: String,
    pub location_name: String,
    pub value: f64,
}

impl Observation
{
    /// Cleans the admissions table.
    ///
    /// Rows without location or value are dropped, location codes are normalized,
    /// and dates and values are parsed.
    pub fn from_table(table: &Table) -> Result<Vec<Self>>
    {
        table.require(ADMISSIONS_COLUMNS)?;

        let locations = table.text_column("location")?;
        let raw_values = table.text_column("value")?;
        let names = table.text_column("location_name")?;
        let raw_dates = table.text_column("date")?;

        let keep: Vec<usize> = (0.. table.len())
            .filter(|&i| locations[i].is_some() && raw_values[i].is_some())
            .collect();
        if keep.len() < table.len() {
            log::warn!("{}: dropped {} rows without location or value", table.name(), table.len() - keep.len());
        }

        let mut bad_dates = Vec::new();
        let mut bad_values = Vec::new();
        let mut obs = Vec::with_capacity(keep.len());

        for &i in &keep {
            let date = raw_dates[i].as_deref().and_then(calendar::parse_date);
            let value = raw_values[i].as_deref()
                .and_then(table::parse_f64)
                .filter(|v| *v >= 0.);

            if date.is_none() {
                bad_dates.push(format!("line {}: {:?}", i + 2, raw_dates[i].as_deref().unwrap_or("")));
            }
            if value.is_none() {
                bad_values.push(format!("line {}: {:?}", i + 2, raw_values[i].as_deref().unwrap_or("")));
            }

            if let (Some(date), Some(value)) = (date, value) {
                obs.push(Observation {
                    date,
                    location: normalize_location(locations[i].as_deref().unwrap_or("")),
                    location_name: names[i].clone().unwrap_or_default(),
                    value,
                });
            }
        }

        if !bad_dates.is_empty() {
            return Err(Error::ParseError {
                table: table.name().to_string(),
                column: "date".to_string(),
                count: bad_dates.len(),
                preview: preview(&bad_dates),
            });
        }
        if !bad_values.is_empty() {
            return Err(Error::ParseError {
                table: table.name().to_string(),
                column: "value".to_string(),
                count: bad_values.len(),
                preview: preview(&bad_values),
            });
        }

        Ok(obs)
    }
}

//

/// Observation with calendar fields, inside the season window.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonObservation
{
    pub obs: Observation,
    pub season: String,
    pub season_week: i64,
    pub epiyear: i32,
    pub epiweek: u32,
}

/// Attaches calendar fields and keeps observations inside the season window.
pub fn attach_calendar(obs: Vec<Observation>) -> Vec<SeasonObservation>
{
    let n = obs.len();

    let rows: Vec<SeasonObservation> = obs.into_iter()
        .filter_map(|o| {
            let sd = SeasonDate::of(o.date)?;
            if sd.in_window() {
                Some(SeasonObservation {
                    season: sd.season(),
                    season_week: sd.season_week,
                    epiyear: sd.epi.year,
                    epiweek: sd.epi.week,
                    obs: o,
                })
            }
            else {
                None
            }
        })
        .collect();

    log::debug!("{} of {} observations inside the season window", rows.len(), n);
    rows
}

//

/// Population by normalized location code.
#[derive(Debug, Clone, Default)]
pub struct Population
{
    map: BTreeMap<String, u64>,
}

impl Population
{
    /// Reads the locations reference table.
    ///
    /// Population shall be a positive integer. For duplicate codes the first row is used.
    pub fn from_table(table: &Table) -> Result<Self>
    {
        table.require(LOCATIONS_COLUMNS)?;

        let locations = table.text_column("location")?;
        let pops = table.column("population", |s| {
            table::parse_i64(s).filter(|p| *p > 0).map(|p| p as u64)
        })?;

        let mut map = BTreeMap::new();
        for (loc, pop) in locations.into_iter().zip(pops) {
            if let (Some(loc), Some(pop)) = (loc, pop) {
                let code = normalize_location(&loc);
                if map.contains_key(&code) {
                    log::warn!("{}: duplicate location {}, keeping the first", table.name(), code);
                }
                else {
                    map.insert(code, pop);
                }
            }
        }

        Ok(Population {map})
    }

    /// Population of a normalized location code.
    pub fn get(&self, location: &str) -> Option<u64>
    {
        self.map.get(location).copied()
    }

    /// Number of locations.
    pub fn len(&self) -> usize
    {
        self.map.len()
    }

    /// Checks if there is no location.
    pub fn is_empty(&self) -> bool
    {
        self.map.is_empty()
    }
}

//

/// Row of the formatted table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedRow
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
}

impl FormattedRow
{
    /// Reads back a formatted table.
    pub fn from_table(table: &Table) -> Result<Vec<Self>>
    {
        table.require(FORMATTED_HEADERS)?;

        let dates = table.column("date", calendar::parse_date)?;
        let locations = table.text_column("location")?;
        let names = table.text_column("location_name")?;
        let pops = table.column("population", |s| table::parse_i64(s).filter(|p| *p > 0).map(|p| p as u64))?;
        let values = table.column("value", table::parse_f64)?;
        let seasons = table.text_column("season")?;
        let season_weeks = table.column("season_week", table::parse_i64)?;
        let epiyears = table.column("epiyear", |s| table::parse_i64(s).map(|y| y as i32))?;
        let epiweeks = table.column("epiweek", |s| table::parse_i64(s).filter(|w| (1..= 53).contains(w)).map(|w| w as u32))?;

        let mut rows = Vec::with_capacity(table.len());
        let mut incomplete = Vec::new();

        for i in 0.. table.len() {
            match (dates[i], &locations[i], pops[i], values[i], &seasons[i], season_weeks[i], epiyears[i], epiweeks[i]) {
                (Some(date), Some(location), Some(population), Some(value), Some(season), Some(season_week), Some(epiyear), Some(epiweek)) => {
                    rows.push(FormattedRow {
                        date,
                        location: normalize_location(location),
                        location_name: names[i].clone().unwrap_or_default(),
                        population,
                        value,
                        season: season.clone(),
                        season_week,
                        epiyear,
                        epiweek,
                    });
                },
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

/// Inner join of season observations with population.
///
/// Fails with [`Error::JoinMismatch`] if any observation has no population.
/// Returns rows sorted by (season, location, season_week, date).
pub fn join_population(rows: Vec<SeasonObservation>, population: &Population) -> Result<Vec<FormattedRow>>
{
    let unmatched: BTreeSet<&str> = rows.iter()
        .map(|r| r.obs.location.as_str())
        .filter(|l| population.get(l).is_none())
        .collect();

    if !unmatched.is_empty() {
        let keys: Vec<&str> = unmatched.into_iter().collect();
        return Err(Error::JoinMismatch {
            reference: "locations".to_string(),
            count: keys.len(),
            preview: preview(&keys),
        });
    }

    let mut out: Vec<FormattedRow> = rows.into_iter()
        .filter_map(|r| {
            let population = population.get(&r.obs.location)?;
            Some(FormattedRow {
                date: r.obs.date,
                location: r.obs.location,
                location_name: r.obs.location_name,
                population,
                value: r.obs.value,
                season: r.season,
                season_week: r.season_week,
                epiyear: r.epiyear,
                epiweek: r.epiweek,
            })
        })
        .collect();

    out.sort_by(|a, b| {
        (&a.season, &a.location, a.season_week, a.date)
            .cmp(&(&b.season, &b.location, b.season_week, b.date))
            .then_with(|| a.location_name.cmp(&b.location_name))
            .then_with(|| a.value.total_cmp(&b.value))
    });

    Ok(out)
}

/// Builds the formatted table from the admissions and locations tables.
pub fn format(admissions: &Table, locations: &Table) -> Result<Vec<FormattedRow>>
{
    let obs = Observation::from_table(admissions)?;
    let rows = attach_calendar(obs);
    let population = Population::from_table(locations)?;

    join_population(rows, &population)
}

//
