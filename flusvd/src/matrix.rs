//! Season-week by column analysis matrix.
//!
//! A column is one (season, location) pair. Rows are the season weeks
//! `0..=LAST_SEASON_WEEK`. Only fully observed columns are retained.

use std::collections::{BTreeMap, BTreeSet};
use serde::Serialize;
use flusvd_core::{FloatGeneric, Mat};
use crate::calendar::{LAST_SEASON_WEEK, SEASON_WEEKS};
use crate::error::{Error, Result};
use crate::location::pad_location;
use crate::stats;
use crate::table::{self, Table};

type La = FloatGeneric<f64>;

/// Required columns of a long table, besides the value column.
pub const LONG_COLUMNS: &[&str] = &["season_week", "season", "location"];

/// Header of the column map table, in the field order of [`ColumnEntry`].
pub const COLUMN_MAP_HEADERS: &[&str] = &["col_id", "season", "location", "location_name"];

/// One record of a long table.
#[derive(Debug, Clone, PartialEq)]
pub struct LongRecord
{
    pub season_week: i64,
    pub season: String,
    pub location: String,
    pub location_name: Option<String>,
    pub value: Option<f64>,
}

impl LongRecord
{
    /// Reads a long table.
    ///
    /// Returns the records and the resolved value column.
    /// * `value_candidates` are tried in order against the header.
    ///
    /// Rows without season week, season or location are dropped.
    pub fn from_table(table: &Table, value_candidates: &[String]) -> Result<(Vec<Self>, String)>
    {
        table.require(LONG_COLUMNS)?;
        let value_col = table.pick_column(value_candidates)?;
        log::debug!("{}: value column {}", table.name(), value_col);

        let weeks = table.column("season_week", table::parse_i64)?;
        let seasons = table.text_column("season")?;
        let locations = table.text_column("location")?;
        let values = table.column(&value_col, table::parse_f64)?;
        let names = if table.has_column("location_name") {
            table.text_column("location_name")?
        }
        else {
            vec![None; table.len()]
        };

        let mut recs = Vec::with_capacity(table.len());
        for i in 0.. table.len() {
            if let (Some(season_week), Some(season), Some(location)) = (weeks[i], &seasons[i], &locations[i]) {
                recs.push(LongRecord {
                    season_week,
                    season: season.clone(),
                    location: location.clone(),
                    location_name: names[i].clone(),
                    value: values[i],
                });
            }
        }

        if recs.len() < table.len() {
            log::warn!("{}: dropped {} rows without season week, season or location", table.name(), table.len() - recs.len());
        }

        Ok((recs, value_col))
    }
}

//

/// Identity of a matrix column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnEntry
{
    pub col_id: usize,
    pub season: String,
    pub location: String,
    pub location_name: Option<String>,
}

impl ColumnEntry
{
    /// Composite key `"{season}__{location}"`.
    pub fn key(&self) -> String
    {
        format!("{}__{}", self.season, self.location)
    }
}

/// Retained columns in matrix order.
///
/// Ids are assigned before the completeness filter and never renumbered,
/// so they may have gaps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap
{
    pub entries: Vec<ColumnEntry>,
    /// Whether the source table had location names.
    pub has_names: bool,
}

impl ColumnMap
{
    /// Number of columns.
    pub fn len(&self) -> usize
    {
        self.entries.len()
    }

    /// Checks if there is no column.
    pub fn is_empty(&self) -> bool
    {
        self.entries.is_empty()
    }

    /// Column ids in matrix order.
    pub fn col_ids(&self) -> Vec<usize>
    {
        self.entries.iter().map(|e| e.col_id).collect()
    }

    /// Entry of a column id.
    pub fn get(&self, col_id: usize) -> Option<&ColumnEntry>
    {
        self.entries.iter().find(|e| e.col_id == col_id)
    }

    /// Header of the column map table.
    pub fn headers(&self) -> &'static [&'static str]
    {
        if self.has_names {
            COLUMN_MAP_HEADERS
        }
        else {
            &COLUMN_MAP_HEADERS[..3]
        }
    }
}

#[derive(Serialize)]
pub(crate) struct ColumnEntryNoName<'a>
{
    col_id: usize,
    season: &'a str,
    location: &'a str,
}

impl<'a> From<&'a ColumnEntry> for ColumnEntryNoName<'a>
{
    fn from(e: &'a ColumnEntry) -> Self
    {
        ColumnEntryNoName {
            col_id: e.col_id,
            season: &e.season,
            location: &e.location,
        }
    }
}

//

/// Dense analysis matrix of [`SEASON_WEEKS`] rows.
#[derive(Debug, Clone)]
pub struct AnalysisMatrix
{
    /// Row `w` is season week `w`; column `j` is `columns.entries[j]`.
    pub data: Mat<La>,
    pub columns: ColumnMap,
}

impl AnalysisMatrix
{
    /// Column ids in matrix order.
    pub fn col_ids(&self) -> Vec<usize>
    {
        self.columns.col_ids()
    }

    /// Builds the matrix from long records.
    ///
    /// * `recs` are the records in any order.
    /// * `has_names` tells whether the records carry location names.
    ///
    /// Records outside the season window or without value are ignored.
    /// Duplicate cells are averaged independently of record order.
    /// Columns missing any season week are dropped.
    /// Fails with [`Error::InsufficientData`] if fewer than two columns remain.
    pub fn build(recs: &[LongRecord], has_names: bool) -> Result<Self>
    {
        let in_window: Vec<&LongRecord> = recs.iter()
            .filter(|r| (0..= LAST_SEASON_WEEK).contains(&r.season_week) && r.value.is_some())
            .collect();

        let pairs: BTreeSet<(String, String)> = in_window.iter()
            .map(|r| (r.season.clone(), pad_location(&r.location)))
            .collect();
        let ids: BTreeMap<(String, String), usize> = pairs.into_iter()
            .enumerate()
            .map(|(id, pair)| (pair, id))
            .collect();

        let mut cells: BTreeMap<usize, Vec<Vec<f64>>> = BTreeMap::new();
        let mut names: BTreeMap<usize, BTreeSet<String>> = BTreeMap::new();

        for r in &in_window {
            let key = (r.season.clone(), pad_location(&r.location));
            let (Some(&id), Some(value)) = (ids.get(&key), r.value)
            else {
                continue;
            };

            cells.entry(id).or_insert_with(|| vec![Vec::new(); SEASON_WEEKS])[r.season_week as usize].push(value);

            if let Some(name) = r.location_name.as_ref().filter(|n| !n.is_empty()) {
                names.entry(id).or_default().insert(name.clone());
            }
        }

        let n_candidates = ids.len();
        let mut entries = Vec::new();
        let mut columns = Vec::new();

        for ((season, location), id) in ids {
            let complete = cells.get(&id).filter(|weeks| weeks.iter().all(|w| !w.is_empty()));

            if let Some(weeks) = complete {
                let mut col = Vec::with_capacity(SEASON_WEEKS);
                for w in weeks {
                    col.push(stats::mean(w).unwrap_or_default());
                }
                columns.push(col);

                entries.push(ColumnEntry {
                    col_id: id,
                    season,
                    location,
                    location_name: names.get(&id).and_then(|s| s.iter().next().cloned()),
                });
            }
            else {
                log::debug!("column {} {}__{} incomplete, dropped", id, season, location);
            }
        }

        log::info!("matrix: {} of {} columns complete over {} season weeks", entries.len(), n_candidates, SEASON_WEEKS);

        if entries.len() < 2 {
            return Err(Error::InsufficientData(format!(
                "{} complete columns of {} candidates, at least 2 required", entries.len(), n_candidates
            )));
        }

        let data = Mat::new(SEASON_WEEKS, columns.len())
            .by_fn(|r, c| columns[c][r]);

        Ok(AnalysisMatrix {
            data,
            columns: ColumnMap {entries, has_names},
        })
    }

    /// Reads a long table and builds the matrix.
    pub fn from_table(table: &Table, value_candidates: &[String]) -> Result<Self>
    {
        let (recs, _) = LongRecord::from_table(table, value_candidates)?;

        Self::build(&recs, table.has_column("location_name"))
    }
}

//

#[cfg(test)]
mod tests
{
    use rand::prelude::*;
    use rand_xoshiro::Xoshiro256StarStar;
    use super::*;

    fn rec(season: &str, location: &str, week: i64, value: f64) -> LongRecord
    {
        LongRecord {
            season_week: week,
            season: season.to_string(),
            location: location.to_string(),
            location_name: None,
            value: Some(value),
        }
    }

    fn full_col(season: &str, location: &str, base: f64) -> Vec<LongRecord>
    {
        (0.. SEASON_WEEKS as i64).map(|w| rec(season, location, w, base + w as f64)).collect()
    }

    #[test]
    fn test_build_ids()
    {
        let _ = env_logger::builder().is_test(true).try_init();

        let mut recs = Vec::new();
        recs.extend(full_col("2023/2024", "36", 100.));
        recs.extend(full_col("2022/2023", "6", 0.));
        recs.extend(full_col("2023/2024", "06", 50.));
        // outside the window
        recs.push(rec("2023/2024", "36", 33, 1e6));
        recs.push(rec("2023/2024", "36", -1, 1e6));

        let m = AnalysisMatrix::build(&recs, false).unwrap();

        assert_eq!(m.data.size(), (33, 3));
        assert_eq!(m.col_ids(), vec![0, 1, 2]);
        let keys: Vec<String> = m.columns.entries.iter().map(|e| e.key()).collect();
        assert_eq!(keys, vec!["2022/2023__06", "2023/2024__06", "2023/2024__36"]);
        assert_eq!(m.data[(0, 2)], 100.);
        assert_eq!(m.data[(32, 2)], 132.);
        assert_eq!(m.columns.headers(), &["col_id", "season", "location"]);
    }

    #[test]
    fn test_build_shuffle()
    {
        let mut rng = Xoshiro256StarStar::seed_from_u64(7);

        let mut recs = Vec::new();
        for (i, loc) in ["01", "02", "06", "36", "US"].iter().enumerate() {
            for s in ["2021/2022", "2022/2023", "2023/2024"] {
                for w in 0.. SEASON_WEEKS as i64 {
                    recs.push(rec(s, loc, w, rng.gen_range(0. .. 10.) + i as f64));
                    // duplicates
                    if w % 5 == 0 {
                        recs.push(rec(s, loc, w, rng.gen_range(0. .. 10.)));
                        recs.push(rec(s, loc, w, rng.gen_range(-1e9 .. 1e9)));
                    }
                }
            }
        }

        let m0 = AnalysisMatrix::build(&recs, false).unwrap();

        for _ in 0.. 5 {
            recs.shuffle(&mut rng);
            let m = AnalysisMatrix::build(&recs, false).unwrap();

            assert_eq!(m.columns, m0.columns);
            let a: Vec<u64> = m.data.as_ref().iter().map(|v| v.to_bits()).collect();
            let b: Vec<u64> = m0.data.as_ref().iter().map(|v| v.to_bits()).collect();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_build_completeness()
    {
        let mut recs = Vec::new();
        recs.extend(full_col("2023/2024", "01", 0.));
        recs.extend(full_col("2023/2024", "02", 0.));
        // 32 of 33 weeks
        recs.extend(full_col("2023/2024", "03", 0.).into_iter().filter(|r| r.season_week != 17));
        // value missing in one week
        let mut c4 = full_col("2023/2024", "04", 0.);
        c4[5].value = None;
        recs.extend(c4);
        recs.extend(full_col("2023/2024", "05", 0.));

        let m = AnalysisMatrix::build(&recs, false).unwrap();

        assert_eq!(m.col_ids(), vec![0, 1, 4]);
        assert!(m.columns.get(2).is_none());
        assert_eq!(m.columns.get(4).map(|e| e.location.as_str()), Some("05"));
        assert!(m.data.is_finite());
    }

    #[test]
    fn test_build_mean()
    {
        let mut recs = Vec::new();
        recs.extend(full_col("2023/2024", "01", 0.));
        recs.extend(full_col("2023/2024", "02", 0.));
        recs.push(rec("2023/2024", "01", 3, 10.));
        recs.push(rec("2023/2024", "01", 3, 20.));

        let m = AnalysisMatrix::build(&recs, false).unwrap();

        assert_eq!(m.data[(3, 0)], 11.);
        assert_eq!(m.data[(3, 1)], 3.);
    }

    #[test]
    fn test_build_names()
    {
        let mut recs = full_col("2023/2024", "01", 0.);
        recs[0].location_name = Some("Zeta".to_string());
        recs[1].location_name = Some("Alabama".to_string());
        recs[2].location_name = Some(String::new());
        recs.extend(full_col("2023/2024", "02", 0.));

        let m = AnalysisMatrix::build(&recs, true).unwrap();

        assert_eq!(m.columns.entries[0].location_name.as_deref(), Some("Alabama"));
        assert_eq!(m.columns.entries[1].location_name, None);
        assert_eq!(m.columns.headers().len(), 4);
    }

    #[test]
    fn test_build_insufficient()
    {
        let mut recs = full_col("2023/2024", "01", 0.);
        recs.extend(full_col("2023/2024", "02", 0.).into_iter().skip(1));

        assert!(matches!(AnalysisMatrix::build(&recs, false), Err(Error::InsufficientData(_))));
        assert!(matches!(AnalysisMatrix::build(&[], false), Err(Error::InsufficientData(_))));
    }

    #[test]
    fn test_from_table()
    {
        let mut csv = String::from("season_week,season,location,location_name,zflu\n");
        for loc in ["1", "2"] {
            for w in 0.. SEASON_WEEKS {
                csv.push_str(&format!("{},2023/2024,{},Name{},{}\n", w, loc, loc, w));
            }
        }
        csv.push_str(",2023/2024,1,Name1,5\n");
        let t = Table::from_reader(csv.as_bytes(), "zscore").unwrap();

        let m = AnalysisMatrix::from_table(&t, &["hosps_pop_norm".to_string(), "zflu".to_string()]).unwrap();

        assert_eq!(m.data.size(), (33, 2));
        assert_eq!(m.columns.entries[1].location, "02");
        assert_eq!(m.columns.entries[1].location_name.as_deref(), Some("Name2"));
        assert!(m.columns.has_names);

        match AnalysisMatrix::from_table(&t, &["hosps_pop_norm".to_string()]).unwrap_err() {
            Error::SchemaError {missing, ..} => assert!(missing[0].contains("hosps_pop_norm")),
            e => panic!("unexpected {}", e),
        }
    }
}
