//! Yearly contribution activity: daily counts fetched from the calendar
//! query, then compressed to four slots per month for the activity graph.

use crate::api::types::{CalendarData, GraphQl};
use crate::api::{queries, Transport};
use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;

pub const SLOTS_PER_MONTH: usize = 4;
pub const SLOTS_PER_YEAR: usize = 12 * SLOTS_PER_MONTH;

#[derive(Debug, Clone, PartialEq)]
pub struct DayActivity {
    pub date: NaiveDate,
    pub count: u64,
}

/// Daily contribution counts for `year`, in calendar order. Days the
/// calendar reports outside the year boundary are dropped.
pub async fn daily(transport: &dyn Transport, year: i32) -> Vec<DayActivity> {
    let raw = transport.graphql(&queries::daily_activity(year)).await;
    let parsed: GraphQl<CalendarData> = serde_json::from_value(raw).unwrap_or_default();

    let mut days = Vec::new();
    let Some(data) = parsed.data else {
        return days;
    };
    for week in data
        .viewer
        .contributions_collection
        .contribution_calendar
        .weeks
    {
        for day in week.contribution_days {
            let Ok(date) = NaiveDate::parse_from_str(&day.date, "%Y-%m-%d") else {
                continue;
            };
            if date.year() == year {
                days.push(DayActivity {
                    date,
                    count: day.contribution_count,
                });
            }
        }
    }
    days
}

/// Compress a year of daily counts into 48 slots (4 per month). Months
/// after the last reported day are all `None`; within reported months a
/// slot is `None` only when it received no days at all.
///
/// Returns the year the data actually belongs to (the last reported day's
/// year, or `fallback_year` when there is no data).
pub fn month_slots(days: &[DayActivity], fallback_year: i32) -> (i32, Vec<Option<u64>>) {
    let (year, last_month) = match days.iter().map(|d| d.date).max() {
        Some(last) => (last.year(), last.month()),
        None => (fallback_year, 0),
    };

    let mut by_month: HashMap<u32, Vec<u64>> = HashMap::new();
    for day in days {
        by_month.entry(day.date.month()).or_default().push(day.count);
    }

    let mut slots = Vec::with_capacity(SLOTS_PER_YEAR);
    for month in 1..=12u32 {
        if month > last_month {
            slots.extend(std::iter::repeat(None).take(SLOTS_PER_MONTH));
        } else {
            let values = by_month.get(&month).map(Vec::as_slice).unwrap_or(&[]);
            slots.extend(compress_month(values, SLOTS_PER_MONTH));
        }
    }
    (year, slots)
}

/// Compress a month's daily values into a fixed number of slots by summing
/// evenly sized chunks.
pub fn compress_month(values: &[u64], slots: usize) -> Vec<Option<u64>> {
    if values.is_empty() {
        return vec![None; slots];
    }
    let step = values.len() as f64 / slots as f64;
    (0..slots)
        .map(|i| {
            let start = (i as f64 * step) as usize;
            let end = ((i + 1) as f64 * step) as usize;
            let chunk = &values[start..end.min(values.len())];
            if chunk.is_empty() {
                None
            } else {
                Some(chunk.iter().sum())
            }
        })
        .collect()
}
