use crate::entries::EntryIndex;
use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

/// Week-columns in the rolling heat-map grid.
pub const ROLLING_WEEKS: usize = 53;
/// Days covered by the rolling window, today inclusive.
pub const ROLLING_WINDOW_DAYS: i64 = 365;

pub const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Canonical `YYYY-MM-DD` key. All date comparisons in the core go through
/// this day-granular form, never through timestamps.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn parse_date_key(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

// Callers validate the year range; month and day always come from
// calendar iteration here.
fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayCell {
    pub date: String,
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub journal: Option<String>,
    pub is_today: bool,
    /// ISO weekday, 1 = Monday .. 7 = Sunday.
    pub weekday: u8,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthBlock {
    /// 1 = January .. 12 = December.
    pub month: u32,
    pub year: i32,
    pub name: &'static str,
    pub days: Vec<DayCell>,
    /// Empty cells before day 1 so weekday rows line up, Monday-first.
    pub start_offset: u8,
    /// Week columns this month occupies when rendered column-major.
    pub total_weeks: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthLabel {
    pub name: &'static str,
    pub column: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RollingGrid {
    /// Exactly [`ROLLING_WEEKS`] columns of 7 rows. `None` cells pad the
    /// grid outside the 365-day window.
    pub weeks: Vec<Vec<Option<DayCell>>>,
    pub month_labels: Vec<MonthLabel>,
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let first = ymd(year, month, 1);
    let next = if month == 12 {
        ymd(year + 1, 1, 1)
    } else {
        ymd(year, month + 1, 1)
    };
    (next - first).num_days() as u32
}

/// Padding cells before day 1 of the month in a Monday-first grid.
pub fn month_start_offset(year: i32, month: u32) -> u8 {
    let weekday = ymd(year, month, 1).weekday().number_from_monday();
    ((weekday - 1) % 7) as u8
}

pub fn month_week_count(year: i32, month: u32) -> u8 {
    let cells = days_in_month(year, month) + u32::from(month_start_offset(year, month));
    cells.div_ceil(7) as u8
}

fn day_cell(date: NaiveDate, index: &EntryIndex, as_of: NaiveDate) -> DayCell {
    let key = date_key(date);
    let found = index.get(&key);
    DayCell {
        value: found.map(|day| day.value),
        journal: found.and_then(|day| day.journal.clone()),
        is_today: date == as_of,
        weekday: date.weekday().number_from_monday() as u8,
        date: key,
    }
}

/// Fixed-year grid: 12 month blocks with aligned weekday columns.
/// `as_of` is the single "today" for the whole computation.
pub fn year_grid(year: i32, index: &EntryIndex, as_of: NaiveDate) -> Vec<MonthBlock> {
    (1..=12)
        .map(|month| {
            let days = (1..=days_in_month(year, month))
                .map(|day| day_cell(ymd(year, month, day), index, as_of))
                .collect();
            MonthBlock {
                month,
                year,
                name: MONTH_NAMES[(month - 1) as usize],
                days,
                start_offset: month_start_offset(year, month),
                total_weeks: month_week_count(year, month),
            }
        })
        .collect()
}

/// Ordered day skeleton for a calendar year.
pub fn year_day_keys(year: i32) -> Vec<String> {
    ymd(year, 1, 1)
        .iter_days()
        .take_while(|date| date.year() == year)
        .map(date_key)
        .collect()
}

/// Ordered day skeleton for the 365 days ending on `as_of`, inclusive.
pub fn rolling_day_keys(as_of: NaiveDate) -> Vec<String> {
    (as_of - Duration::days(ROLLING_WINDOW_DAYS - 1))
        .iter_days()
        .take(ROLLING_WINDOW_DAYS as usize)
        .map(date_key)
        .collect()
}

/// Rolling 53-week grid ending on the Saturday of the week containing
/// `as_of` (Sunday week start). Cells before `as_of - 364` or after
/// `as_of` are `None`, so exactly 365 cells carry real dates.
pub fn rolling_grid(index: &EntryIndex, as_of: NaiveDate) -> RollingGrid {
    let week_end = as_of + Duration::days(6 - i64::from(as_of.weekday().num_days_from_sunday()));
    let grid_start = week_end - Duration::days((ROLLING_WEEKS * 7 - 1) as i64);
    let window_start = as_of - Duration::days(ROLLING_WINDOW_DAYS - 1);

    let mut weeks = Vec::with_capacity(ROLLING_WEEKS);
    for week in 0..ROLLING_WEEKS {
        let mut column = Vec::with_capacity(7);
        for row in 0..7 {
            let date = grid_start + Duration::days((week * 7 + row) as i64);
            if date < window_start || date > as_of {
                column.push(None);
            } else {
                column.push(Some(day_cell(date, index, as_of)));
            }
        }
        weeks.push(column);
    }

    // A label goes above each column where the month of the top-row date
    // changes; columns whose top row is padding are skipped.
    let mut month_labels = Vec::new();
    let mut last_month = None;
    for (column, cells) in weeks.iter().enumerate() {
        if cells[0].is_none() {
            continue;
        }
        let month = (grid_start + Duration::days((column * 7) as i64)).month();
        if last_month != Some(month) {
            month_labels.push(MonthLabel {
                name: MONTH_NAMES[(month - 1) as usize],
                column,
            });
            last_month = Some(month);
        }
    }

    RollingGrid {
        weeks,
        month_labels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntryRecord;

    fn date(raw: &str) -> NaiveDate {
        parse_date_key(raw).unwrap()
    }

    fn empty() -> EntryIndex {
        EntryIndex::build(std::iter::empty::<&EntryRecord>())
    }

    #[test]
    fn january_2025_starts_in_wednesday_row() {
        // Jan 1, 2025 is a Wednesday: two padding cells under Monday-first.
        assert_eq!(month_start_offset(2025, 1), 2);
        assert_eq!(month_week_count(2025, 1), 5);
    }

    #[test]
    fn february_length_tracks_leap_years() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2025, 2), 28);
        assert_eq!(days_in_month(2000, 2), 29);
        assert_eq!(days_in_month(1900, 2), 28);
    }

    #[test]
    fn year_grid_covers_every_day_once() {
        let as_of = date("2025-06-15");
        let months = year_grid(2025, &empty(), as_of);
        assert_eq!(months.len(), 12);
        let total: usize = months.iter().map(|m| m.days.len()).sum();
        assert_eq!(total, 365);

        let june = &months[5];
        assert_eq!(june.name, "Jun");
        let today = june.days.iter().find(|d| d.is_today).unwrap();
        assert_eq!(today.date, "2025-06-15");
        assert_eq!(today.weekday, 7); // a Sunday

        let flagged: usize = months
            .iter()
            .flat_map(|m| &m.days)
            .filter(|d| d.is_today)
            .count();
        assert_eq!(flagged, 1);
    }

    #[test]
    fn year_grid_overlays_entries() {
        let entries = vec![EntryRecord {
            id: "e1".to_string(),
            date: "2025-03-08".to_string(),
            value: 1.0,
            journal: Some("note".to_string()),
        }];
        let months = year_grid(2025, &EntryIndex::build(&entries), date("2025-06-15"));
        let march = &months[2];
        let day = &march.days[7];
        assert_eq!(day.date, "2025-03-08");
        assert_eq!(day.value, Some(1.0));
        assert_eq!(day.journal.as_deref(), Some("note"));
        assert_eq!(march.days[6].value, None);
    }

    #[test]
    fn rolling_grid_has_53_columns_and_365_real_cells() {
        // A Wednesday, so the grid carries padding at both ends.
        let as_of = date("2025-06-11");
        let grid = rolling_grid(&empty(), as_of);
        assert_eq!(grid.weeks.len(), ROLLING_WEEKS);
        assert!(grid.weeks.iter().all(|week| week.len() == 7));

        let real: usize = grid
            .weeks
            .iter()
            .flatten()
            .filter(|cell| cell.is_some())
            .count();
        assert_eq!(real, 365);
    }

    #[test]
    fn rolling_grid_pads_before_window_and_after_today() {
        let as_of = date("2025-06-11"); // Wednesday, 3 days from Sunday
        let grid = rolling_grid(&empty(), as_of);

        // Leading padding mirrors today's weekday position.
        assert!(grid.weeks[0][0].is_none());
        assert!(grid.weeks[0][2].is_none());
        assert!(grid.weeks[0][3].is_some());

        // The final column holds today, then padding through Saturday.
        let last = &grid.weeks[ROLLING_WEEKS - 1];
        let today = last[3].as_ref().unwrap();
        assert!(today.is_today);
        assert_eq!(today.date, "2025-06-11");
        assert!(last[4].is_none());
        assert!(last[6].is_none());
    }

    #[test]
    fn rolling_grid_ends_on_week_boundary() {
        // A Saturday keeps the whole final week real.
        let as_of = date("2025-06-14");
        let grid = rolling_grid(&empty(), as_of);
        let last = &grid.weeks[ROLLING_WEEKS - 1];
        assert!(last.iter().all(|cell| cell.is_some()));
        assert_eq!(last[6].as_ref().unwrap().date, "2025-06-14");
    }

    #[test]
    fn month_labels_change_with_top_row_month() {
        let as_of = date("2025-06-14");
        let grid = rolling_grid(&empty(), as_of);
        let labels = &grid.month_labels;
        assert!(!labels.is_empty());
        assert!(labels.windows(2).all(|pair| pair[0].column < pair[1].column));
        // Roughly one label per month over a year of columns.
        assert!(labels.len() >= 12 && labels.len() <= 13);
        assert_eq!(labels.last().unwrap().name, "Jun");
    }

    #[test]
    fn day_skeletons_have_expected_shape() {
        assert_eq!(year_day_keys(2025).len(), 365);
        assert_eq!(year_day_keys(2024).len(), 366);
        assert_eq!(year_day_keys(2025)[0], "2025-01-01");

        let rolling = rolling_day_keys(date("2025-06-15"));
        assert_eq!(rolling.len(), 365);
        assert_eq!(rolling.last().unwrap(), "2025-06-15");
        assert_eq!(rolling[0], "2024-06-16");
    }
}
