use crate::error::{extraction_error, AppResult};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone};
use chrono_tz::Tz;

/// Datetime formats the extractor is known to produce for the date field
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Date-only formats
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Parse a clock time like "14:00", "2pm" or "2:30 PM" into (hour, minute)
pub fn parse_clock_time(time_str: &str) -> Option<(u32, u32)> {
    let cleaned = time_str.trim().to_lowercase().replace('.', "");

    let (body, pm) = if let Some(stripped) = cleaned.strip_suffix("pm") {
        (stripped.trim().to_string(), Some(true))
    } else if let Some(stripped) = cleaned.strip_suffix("am") {
        (stripped.trim().to_string(), Some(false))
    } else {
        (cleaned, None)
    };

    let mut parts = body.split(':');
    let mut hour = parts.next()?.trim().parse::<u32>().ok()?;
    let minute = match parts.next() {
        Some(m) => m.trim().parse::<u32>().ok()?,
        None => 0,
    };
    // Seconds, if present, are ignored
    if parts.clone().count() > 1 {
        return None;
    }

    match pm {
        Some(true) if hour < 12 => hour += 12,
        Some(false) if hour == 12 => hour = 0,
        _ => {}
    }

    if hour > 23 || minute > 59 {
        return None;
    }
    Some((hour, minute))
}

fn parse_full_datetime(value: &str) -> Option<NaiveDateTime> {
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt);
        }
    }
    // RFC 3339 with an offset, e.g. "2025-06-03T14:00:00-04:00"
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }
    None
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date);
        }
    }
    None
}

/// Combine the extractor's date and start-time strings into a local timestamp
///
/// The date field may already carry a time of day; an explicit start time
/// takes precedence over it when both are present.
pub fn parse_event_datetime(date: &str, start_time: &str, tz: Tz) -> AppResult<DateTime<Tz>> {
    let date = date.trim();
    let start_time = start_time.trim();

    let naive = if let Some(dt) = parse_full_datetime(date) {
        match parse_clock_time(start_time) {
            Some((hour, minute)) => dt
                .date()
                .and_hms_opt(hour, minute, 0)
                .ok_or_else(|| extraction_error(&format!("Invalid start time: {}", start_time)))?,
            None => dt,
        }
    } else if let Some(day) = parse_date(date) {
        let (hour, minute) = parse_clock_time(start_time).ok_or_else(|| {
            extraction_error(&format!("Could not parse start time: {}", start_time))
        })?;
        day.and_hms_opt(hour, minute, 0)
            .ok_or_else(|| extraction_error(&format!("Invalid start time: {}", start_time)))?
    } else if date.is_empty() {
        parse_full_datetime(start_time).ok_or_else(|| {
            extraction_error(&format!("Could not parse start time: {}", start_time))
        })?
    } else {
        return Err(extraction_error(&format!("Could not parse date: {}", date)));
    };

    tz.from_local_datetime(&naive).single().ok_or_else(|| {
        extraction_error(&format!("Timestamp {} is not valid in timezone {}", naive, tz))
    })
}

/// End of an event, start plus its duration
pub fn event_end(start: DateTime<Tz>, duration_minutes: i64) -> AppResult<DateTime<Tz>> {
    if duration_minutes <= 0 {
        return Err(extraction_error(&format!(
            "Duration must be positive, got {} minutes",
            duration_minutes
        )));
    }
    Ok(start + Duration::minutes(duration_minutes))
}
