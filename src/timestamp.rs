use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};

use crate::errors::{ListingError, ListingResult};

const MONTH_NAMES: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];
const DEFAULT_DAY: u32 = 1;
const DEFAULT_HOUR: u32 = 12;
// Mirrors the hour default, not zero.
const DEFAULT_MINUTE: u32 = 12;
const TWO_DIGIT_YEAR_PIVOT: i32 = 70;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimestampFields {
    pub month: String,
    pub day: Option<String>,
    pub year: Option<String>,
    pub hour: Option<String>,
    pub minute: Option<String>,
    pub noon: Option<String>,
}

pub fn resolve_timestamp_now(fields: Option<&TimestampFields>) -> ListingResult<NaiveDateTime> {
    resolve_timestamp(fields, Local::now().year())
}

/// Missing year becomes `current_year`, missing day becomes 1, missing hour
/// and minute both become 12. Seconds are always zero.
pub fn resolve_timestamp(
    fields: Option<&TimestampFields>,
    current_year: i32,
) -> ListingResult<NaiveDateTime> {
    let fields = fields.ok_or(ListingError::EmptyTimestamp)?;

    let year = fields
        .year
        .as_deref()
        .and_then(parse_year)
        .unwrap_or(current_year);
    let month = parse_month(&fields.month)?;
    let day = parse_number(fields.day.as_deref()).unwrap_or(DEFAULT_DAY);
    let hour = parse_number(fields.hour.as_deref()).unwrap_or(DEFAULT_HOUR);
    let hour = fold_noon(hour, fields.noon.as_deref());
    let minute = parse_number(fields.minute.as_deref()).unwrap_or(DEFAULT_MINUTE);

    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, 0))
        .ok_or(ListingError::InvalidDate {
            year,
            month,
            day,
            hour,
            minute,
        })
}

pub fn fold_noon(hour: u32, noon: Option<&str>) -> u32 {
    match noon.map(str::to_ascii_uppercase).as_deref() {
        Some("AM") if hour == 12 => 0,
        Some("PM") if hour < 12 => hour + 12,
        _ => hour,
    }
}

pub fn parse_month(value: &str) -> ListingResult<u32> {
    let value = value.trim();
    if let Ok(month) = value.parse::<u32>() {
        return if (1..=12).contains(&month) {
            Ok(month)
        } else {
            Err(ListingError::invalid_month(value))
        };
    }

    let lower = value.to_ascii_lowercase();
    MONTH_NAMES
        .iter()
        .position(|name| *name == lower)
        .map(|idx| idx as u32 + 1)
        .ok_or_else(|| ListingError::invalid_month(value))
}

fn parse_year(value: &str) -> Option<i32> {
    let value = value.trim();
    let year = value.parse::<i32>().ok()?;
    if value.len() <= 2 {
        Some(if year < TWO_DIGIT_YEAR_PIVOT {
            2000 + year
        } else {
            1900 + year
        })
    } else {
        Some(year)
    }
}

fn parse_number(value: Option<&str>) -> Option<u32> {
    value?.trim().parse().ok()
}
