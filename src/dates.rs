use chrono::{DateTime, Datelike, NaiveDate};

use crate::fields::Value;

// Offset between the spreadsheet serial epoch (with the conventional leap-year
// correction) and the Unix epoch, in days.
const SERIAL_EPOCH_OFFSET: f64 = 25568.0;

pub fn parse_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::Number(serial) => serial_to_date(*serial),
        Value::Text(s) => parse_date_str(s),
    }
}

fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }
    let secs = ((serial - SERIAL_EPOCH_OFFSET) * 86_400.0) as i64;
    DateTime::from_timestamp(secs, 0).map(|dt| dt.date_naive())
}

/// Scans for the first `D[-/]M[-/]Y` pattern (1-2 digit day and month, 2-4
/// digit year) anywhere in the string. Two-digit years are taken as 20xx.
/// The first group is always the day, so month-first strings like "03/15/24"
/// fail calendar validation and yield None.
fn parse_date_str(s: &str) -> Option<NaiveDate> {
    let bytes = s.as_bytes();
    for start in 0..bytes.len() {
        if let Some((day, month, year)) = match_dmy(bytes, start) {
            return NaiveDate::from_ymd_opt(year, month, day);
        }
    }
    None
}

fn match_dmy(bytes: &[u8], start: usize) -> Option<(u32, u32, i32)> {
    for day_len in [2, 1] {
        let Some(day) = read_digits(bytes, start, day_len) else {
            continue;
        };
        let sep_a = start + day_len;
        if !is_separator(bytes, sep_a) {
            continue;
        }
        for month_len in [2, 1] {
            let month_at = sep_a + 1;
            let Some(month) = read_digits(bytes, month_at, month_len) else {
                continue;
            };
            let sep_b = month_at + month_len;
            if !is_separator(bytes, sep_b) {
                continue;
            }
            let year_at = sep_b + 1;
            let year_len = digit_run(bytes, year_at).min(4);
            if year_len < 2 {
                continue;
            }
            let year_raw = read_digits(bytes, year_at, year_len)?;
            let year = if year_len == 2 {
                2000 + year_raw as i32
            } else {
                year_raw as i32
            };
            return Some((day, month, year));
        }
    }
    None
}

fn is_separator(bytes: &[u8], at: usize) -> bool {
    matches!(bytes.get(at), Some(b'-') | Some(b'/'))
}

fn digit_run(bytes: &[u8], from: usize) -> usize {
    bytes[from.min(bytes.len())..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count()
}

fn read_digits(bytes: &[u8], from: usize, len: usize) -> Option<u32> {
    if from + len > bytes.len() {
        return None;
    }
    let slice = &bytes[from..from + len];
    if !slice.iter().all(|b| b.is_ascii_digit()) {
        return None;
    }
    std::str::from_utf8(slice).ok()?.parse().ok()
}

/// School period for an "HH:MM" time. None means no period: the row is left
/// out of the heatmap.
pub fn period_from_time(time: Option<&str>) -> Option<u32> {
    let time = time?;
    let mut parts = time.trim().split(':');
    let hour: u32 = parts.next()?.trim().parse().ok()?;
    let minute: u32 = parts.next()?.trim().parse().ok()?;
    let t = hour as f64 + minute as f64 / 60.0;
    let period = if t < 9.75 {
        1
    } else if t < 10.75 {
        2
    } else if t < 12.0 {
        3
    } else if t < 13.0 {
        4
    } else if t < 14.5 {
        5
    } else {
        6
    };
    Some(period)
}

/// First `H:MM` or `HH:MM` substring, used to recover a time of day from a
/// creation-timestamp column when no explicit time field is present.
pub fn extract_time(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    for start in 0..bytes.len() {
        for hour_len in [2, 1] {
            if read_digits(bytes, start, hour_len).is_none() {
                continue;
            }
            let colon = start + hour_len;
            if bytes.get(colon) != Some(&b':') {
                continue;
            }
            if read_digits(bytes, colon + 1, 2).is_some() {
                return Some(&s[start..colon + 3]);
            }
        }
    }
    None
}

pub fn iso_week_number(date: NaiveDate) -> u32 {
    date.iso_week().week()
}
