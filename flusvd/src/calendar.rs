//! MMWR (CDC epidemiological) calendar and flu seasons.
//!
//! Epi-weeks run Sunday to Saturday. Week 1 of a year is the first week with
//! at least four days in that year, i.e. the week containing January 4th.
//! A season starts on the Sunday of epi-week 40 and its window covers
//! season weeks 0 to [`LAST_SEASON_WEEK`].

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

/// First epi-week of a season.
pub const SEASON_START_WEEK: u32 = 40;
/// Years accepted by [`parse_date`].
pub const YEAR_RANGE: core::ops::RangeInclusive<i32> = 1..= 9999;
/// Last season week inside the season window.
pub const LAST_SEASON_WEEK: i64 = 32;
/// Number of season weeks in the season window.
pub const SEASON_WEEKS: usize = LAST_SEASON_WEEK as usize + 1;

/// Epi-calendar key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EpiWeek
{
    pub year: i32,
    pub week: u32,
}

/// Calendar fields of one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonDate
{
    pub epi: EpiWeek,
    pub season_start_year: i32,
    pub season_start: NaiveDate,
    pub season_week: i64,
}

impl SeasonDate
{
    /// Calendar fields of `date`.
    ///
    /// Returns `None` if the calendar of `date` falls out of the representable date range.
    pub fn of(date: NaiveDate) -> Option<Self>
    {
        let (epi, week1_start, jan1) = epi_parts(date)?;
        let season_start_year = season_start_year_of(epi.year, epi.week);

        let season_week1_start = if season_start_year == epi.year {
            week1_start
        }
        else {
            week1_start_from_jan1(jan1.checked_sub_signed(Duration::days(days_in_year(epi.year - 1)))?)?
        };
        let season_start = week40_start(season_week1_start)?;

        Some(SeasonDate {
            epi,
            season_start_year,
            season_start,
            season_week: weeks_between(season_start, date),
        })
    }

    /// Season label, see [`season_label`].
    pub fn season(&self) -> String
    {
        season_label(self.season_start_year)
    }

    /// Checks if the date lies in the season window.
    pub fn in_window(&self) -> bool
    {
        (0..= LAST_SEASON_WEEK).contains(&self.season_week)
    }
}

//

/// Epi-year and epi-week of `date`.
///
/// Returns `None` at the ends of the representable date range.
pub fn epiweek_of(date: NaiveDate) -> Option<EpiWeek>
{
    epi_parts(date).map(|(epi, _, _)| epi)
}

/// Season start year: `epi_year` for `epi_week >= 40`, otherwise `epi_year - 1`.
pub fn season_start_year_of(epi_year: i32, epi_week: u32) -> i32
{
    if epi_week >= SEASON_START_WEEK {
        epi_year
    }
    else {
        epi_year - 1
    }
}

/// Season label such as `"2023/2024"`.
pub fn season_label(season_start_year: i32) -> String
{
    format!("{}/{}", season_start_year, season_start_year + 1)
}

/// First day (Sunday) of epi-week 40 of `season_start_year`.
///
/// Returns `None` if the year is out of the representable date range.
pub fn season_start_date(season_start_year: i32) -> Option<NaiveDate>
{
    let jan1 = NaiveDate::from_ymd_opt(season_start_year, 1, 1)?;

    week40_start(week1_start_from_jan1(jan1)?)
}

/// Whole weeks from the start of the season of `season_start_year` to `date`,
/// rounded toward negative infinity.
///
/// Returns `None` if the year is out of the representable date range.
pub fn season_week_of(date: NaiveDate, season_start_year: i32) -> Option<i64>
{
    season_start_date(season_start_year).map(|start| weeks_between(start, date))
}

/// Parses an ISO date (`YYYY-MM-DD`) or an ISO date-time whose date part is taken.
///
/// Returns `None` for anything else, including years out of [`YEAR_RANGE`].
pub fn parse_date(text: &str) -> Option<NaiveDate>
{
    let text = text.trim();

    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
        .or_else(|| {
            ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.date())
        })
        .filter(|d| YEAR_RANGE.contains(&d.year()))
}

//

fn days_in_year(year: i32) -> i64
{
    if (year % 4 == 0 && year % 100 != 0) || year % 400 == 0 {
        366
    }
    else {
        365
    }
}

// Sunday of the week containing January 4th
fn week1_start_from_jan1(jan1: NaiveDate) -> Option<NaiveDate>
{
    let w = jan1.weekday().num_days_from_sunday() as i64;

    if w <= 3 {
        jan1.checked_sub_signed(Duration::days(w))
    }
    else {
        jan1.checked_add_signed(Duration::days(7 - w))
    }
}

fn week40_start(week1_start: NaiveDate) -> Option<NaiveDate>
{
    week1_start.checked_add_signed(Duration::weeks(SEASON_START_WEEK as i64 - 1))
}

fn weeks_between(start: NaiveDate, date: NaiveDate) -> i64
{
    (date - start).num_days().div_euclid(7)
}

// (epi key, start of epi-week 1 of the epi year, January 1st of the epi year)
fn epi_parts(date: NaiveDate) -> Option<(EpiWeek, NaiveDate, NaiveDate)>
{
    let year = date.year();
    let jan1 = NaiveDate::from_yo_opt(year, 1)?;
    let start = week1_start_from_jan1(jan1)?;

    let (year, start, jan1) = if date < start {
        let jan1_prev = jan1.checked_sub_signed(Duration::days(days_in_year(year - 1)))?;
        (year - 1, week1_start_from_jan1(jan1_prev)?, jan1_prev)
    }
    else {
        let jan1_next = jan1.checked_add_signed(Duration::days(days_in_year(year)))?;
        let start_next = week1_start_from_jan1(jan1_next)?;
        if date >= start_next {
            (year + 1, start_next, jan1_next)
        }
        else {
            (year, start, jan1)
        }
    };

    let week = ((date - start).num_days() / 7 + 1) as u32;

    Some((EpiWeek {year, week}, start, jan1))
}

//

#[cfg(test)]
mod tests
{
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate
    {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_epiweek_known()
    {
        // published MMWR week boundaries
        assert_eq!(epiweek_of(ymd(2023, 1, 1)), Some(EpiWeek {year: 2023, week: 1}));
        assert_eq!(epiweek_of(ymd(2023, 10, 1)), Some(EpiWeek {year: 2023, week: 40}));
        assert_eq!(epiweek_of(ymd(2023, 10, 7)), Some(EpiWeek {year: 2023, week: 40}));
        assert_eq!(epiweek_of(ymd(2023, 10, 8)), Some(EpiWeek {year: 2023, week: 41}));
        assert_eq!(epiweek_of(ymd(2022, 1, 1)), Some(EpiWeek {year: 2021, week: 52}));
        assert_eq!(epiweek_of(ymd(2021, 1, 2)), Some(EpiWeek {year: 2020, week: 53}));
        assert_eq!(epiweek_of(ymd(2021, 1, 3)), Some(EpiWeek {year: 2021, week: 1}));
        assert_eq!(epiweek_of(ymd(2019, 12, 29)), Some(EpiWeek {year: 2020, week: 1}));
        assert_eq!(epiweek_of(ymd(2024, 12, 28)), Some(EpiWeek {year: 2024, week: 52}));
        assert_eq!(epiweek_of(ymd(2024, 12, 29)), Some(EpiWeek {year: 2025, week: 1}));
    }

    #[test]
    fn test_epiweek_consecutive()
    {
        // every Sunday starts a new week; weeks count up by one or restart at 1
        let mut d = ymd(2009, 1, 4);
        let mut prev = epiweek_of(d).unwrap();
        for _ in 0.. 52 * 20 {
            d = d + Duration::weeks(1);
            let e = epiweek_of(d).unwrap();
            assert_eq!(epiweek_of(d + Duration::days(6)), Some(e));
            if e.year == prev.year {
                assert_eq!(e.week, prev.week + 1);
            }
            else {
                assert_eq!(e.year, prev.year + 1);
                assert_eq!(e.week, 1);
                assert!(prev.week == 52 || prev.week == 53);
            }
            prev = e;
        }
    }

    #[test]
    fn test_season_start_year()
    {
        for w in 40..= 53 {
            assert_eq!(season_start_year_of(2020, w), 2020);
        }
        for w in 1..= 39 {
            assert_eq!(season_start_year_of(2021, w), 2020);
        }
        assert_eq!(season_label(2023), "2023/2024");
    }

    #[test]
    fn test_season_week()
    {
        for y in 2010..= 2030 {
            let start = season_start_date(y).unwrap();
            assert_eq!(epiweek_of(start), Some(EpiWeek {year: y, week: 40}));
            assert_eq!(start.weekday(), chrono::Weekday::Sun);

            assert_eq!(season_week_of(start, y), Some(0));
            assert_eq!(season_week_of(start + Duration::weeks(32), y), Some(32));
            assert_eq!(season_week_of(start + Duration::days(6), y), Some(0));
            assert_eq!(season_week_of(start - Duration::days(1), y), Some(-1));
        }
    }

    #[test]
    fn test_season_date()
    {
        let sd = SeasonDate::of(ymd(2023, 10, 7)).unwrap();
        assert_eq!(sd.season(), "2023/2024");
        assert_eq!(sd.season_week, 0);
        assert!(sd.in_window());

        let sd = SeasonDate::of(ymd(2023, 10, 8)).unwrap();
        assert_eq!(sd.season_week, 1);

        // weeks 1..39 belong to the season started the year before
        let sd = SeasonDate::of(ymd(2024, 3, 2)).unwrap();
        assert_eq!(sd.epi, EpiWeek {year: 2024, week: 9});
        assert_eq!(sd.season(), "2023/2024");
        assert_eq!(sd.season_start, ymd(2023, 10, 1));
        assert_eq!(sd.season_week, 21);

        // summer weeks fall beyond the window
        let sd = SeasonDate::of(ymd(2024, 7, 20)).unwrap();
        assert_eq!(sd.season(), "2023/2024");
        assert!(!sd.in_window());

        // consistent with the year-based helpers
        let mut d = ymd(2015, 1, 1);
        while d < ymd(2026, 1, 1) {
            let sd = SeasonDate::of(d).unwrap();
            assert_eq!(Some(sd.season_start), season_start_date(sd.season_start_year));
            assert_eq!(Some(sd.season_week), season_week_of(d, sd.season_start_year));
            assert!(sd.season_week >= 0);
            d = d + Duration::days(3);
        }
    }

    #[test]
    fn test_parse_date()
    {
        assert_eq!(parse_date("2023-10-07"), Some(ymd(2023, 10, 7)));
        assert_eq!(parse_date(" 2023-10-07 "), Some(ymd(2023, 10, 7)));
        assert_eq!(parse_date("2023-10-07T00:00:00"), Some(ymd(2023, 10, 7)));
        assert_eq!(parse_date("2023-10-07 12:30:00"), Some(ymd(2023, 10, 7)));
        assert_eq!(parse_date("2023-02-30"), None);
        assert_eq!(parse_date("10/07/2023"), None);
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("+262142-12-31"), None);
        assert_eq!(parse_date("-262143-01-01"), None);
        assert_eq!(parse_date("0000-06-01"), None);
        assert_eq!(parse_date("9999-12-31"), Some(ymd(9999, 12, 31)));
    }

    #[test]
    fn test_date_range_ends()
    {
        // the epi-year of the last representable day ends beyond it
        assert_eq!(epiweek_of(NaiveDate::MAX), None);
        assert!(SeasonDate::of(NaiveDate::MAX).is_none());

        // every year accepted by parse_date has a calendar
        for d in [ymd(1, 1, 1), ymd(1, 12, 31), ymd(9999, 1, 1), ymd(9999, 12, 31)] {
            assert!(SeasonDate::of(d).is_some());
        }
    }
}
