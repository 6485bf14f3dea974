use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// Canonical date key format shared by the ledger, the event list, and the
/// grid builder.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// How many events a day cell shows before collapsing to a "+N more" badge.
pub const VISIBLE_EVENTS_PER_CELL: usize = 2;

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).ok()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One populated square of the month grid. Blank squares (leading and
/// trailing filler outside the month) are `None` in the grid vector.
#[derive(Debug, Clone)]
pub struct DayCell {
    pub day: u32,
    pub is_today: bool,
    pub events: Vec<CalendarEvent>,
}

impl DayCell {
    pub fn visible_events(&self) -> &[CalendarEvent] {
        let shown = self.events.len().min(VISIBLE_EVENTS_PER_CELL);
        &self.events[..shown]
    }

    pub fn overflow_count(&self) -> usize {
        self.events.len().saturating_sub(VISIBLE_EVENTS_PER_CELL)
    }
}

/// Gregorian day count for a 1-based month. Day zero of the following month
/// is the last day of this one, which handles February leap years.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(30)
}

/// Weekday of day 1, 0=Sunday..6=Saturday.
pub fn first_weekday(year: i32, month: u32) -> u32 {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.weekday().num_days_from_sunday())
        .unwrap_or(0)
}

pub fn is_today(year: i32, month: u32, day: u32, today: NaiveDate) -> bool {
    today.year() == year && today.month() == month && today.day() == day
}

/// Lays out one month as full calendar weeks: `first_weekday` blank cells,
/// one cell per day, then blank padding up to the next multiple of 7.
/// Events are matched by calendar date; entries whose `date` does not parse
/// are skipped. Caller order is preserved within a cell.
pub fn build_grid(
    year: i32,
    month: u32,
    events: &[CalendarEvent],
    today: NaiveDate,
) -> Vec<Option<DayCell>> {
    let days = days_in_month(year, month);
    let lead = first_weekday(year, month) as usize;

    let mut by_day: HashMap<u32, Vec<CalendarEvent>> = HashMap::new();
    for event in events {
        let Some(date) = parse_date(&event.date) else {
            continue;
        };
        if date.year() == year && date.month() == month {
            by_day.entry(date.day()).or_default().push(event.clone());
        }
    }

    let mut cells: Vec<Option<DayCell>> = Vec::with_capacity(lead + days as usize + 6);
    cells.resize(lead, None);
    for day in 1..=days {
        cells.push(Some(DayCell {
            day,
            is_today: is_today(year, month, day, today),
            events: by_day.remove(&day).unwrap_or_default(),
        }));
    }
    while cells.len() % 7 != 0 {
        cells.push(None);
    }
    cells
}
