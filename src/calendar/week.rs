use chrono::{Datelike, Days, NaiveDate, NaiveTime, TimeDelta, Weekday};

use crate::appointments::SlotKey;

/// Weekdays shown on the grid, in column order.
pub const DAYS: [Weekday; 5] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
];

const FIRST_SLOT: (u32, u32) = (8, 30);
const SLOT_MINUTES: i64 = 30;
const SLOTS_PER_DAY: usize = 21;

pub fn day_label(day_index: usize) -> Option<&'static str> {
    let label = match DAYS.get(day_index)? {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        _ => "Friday",
    };
    Some(label)
}

/// Start times of the grid rows: every half hour from 08:30 to 18:30.
pub fn hours() -> Vec<NaiveTime> {
    let (h, m) = FIRST_SLOT;
    let first = NaiveTime::from_hms_opt(h, m, 0).unwrap_or_default();
    (0..SLOTS_PER_DAY as i64)
        .map(|i| first + TimeDelta::minutes(i * SLOT_MINUTES))
        .collect()
}

/// Parse `HH:MM`, accepting only times that are rows of the grid.
pub fn parse_hour(value: &str) -> Option<NaiveTime> {
    let time = NaiveTime::parse_from_str(value.trim(), "%H:%M").ok()?;
    hours().contains(&time).then_some(time)
}

/// The Monday of the ISO week containing `date`. Sunday belongs to the
/// week that started six days earlier.
pub fn monday_of(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().num_days_from_monday();
    date - Days::new(offset.into())
}

pub fn week_dates(week_start: NaiveDate) -> [NaiveDate; 5] {
    std::array::from_fn(|i| week_start + Days::new(i as u64))
}

/// Key of the slot at `hour` on the `day_index`-th weekday (0 = Monday)
/// of the week starting `week_start`. `None` past Friday.
pub fn slot_key(week_start: NaiveDate, day_index: usize, hour: NaiveTime) -> Option<SlotKey> {
    let date = week_dates(week_start).get(day_index).copied()?;
    Some(SlotKey::new(date, hour))
}

pub fn next_week(week_start: NaiveDate) -> NaiveDate {
    week_start + Days::new(7)
}

pub fn previous_week(week_start: NaiveDate) -> NaiveDate {
    week_start - Days::new(7)
}

/// Heading for the week, e.g. `6 January - 10 January 2025`.
pub fn week_label(week_start: NaiveDate) -> String {
    let dates = week_dates(week_start);
    format!(
        "{} - {}",
        dates[0].format("%-d %B"),
        dates[4].format("%-d %B %Y")
    )
}
