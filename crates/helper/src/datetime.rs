//! Date and time formatting for widget data documents.
//!
//! The host emits ISO-ish timestamps; widgets display them as local
//! `MM/dd/yyyy` dates and `hh:mm:ss` times. Values that don't parse are
//! passed through unchanged so a widget never renders an empty cell.

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};
use wasm_bindgen::prelude::wasm_bindgen;

/// Zero-pads a number to the four digit key format used by widget data
/// documents.
pub fn num_to_key(num: i64) -> String {
    format!("{num:04}")
}

/// Zero-pads a number to two digits. Wider values pass through
/// unshortened, which the year and millisecond rendering below rely on.
pub fn num_to_time_part(num: i64) -> String {
    format!("{num:02}")
}

fn parse_naive(value: &str) -> Option<NaiveDateTime> {
    const FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
    ];

    for format in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Reads a timestamp the way the host writes them. With `is_utc` the value
/// is converted to local time; otherwise a trailing `Z` is dropped and the
/// value is taken as local wall time.
fn parse_timestamp(value: &str, is_utc: bool) -> Option<DateTime<Local>> {
    if is_utc {
        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Some(dt.with_timezone(&Local));
        }
        let naive = parse_naive(value)?;
        return Some(Utc.from_utc_datetime(&naive).with_timezone(&Local));
    }

    let value = value.strip_suffix('Z').unwrap_or(value);
    Local.from_local_datetime(&parse_naive(value)?).earliest()
}

/// Two digit years arrive from some data sources as years below 2000;
/// 30..=99 map to 19xx and 0..=29 to 20xx.
fn windowed_year(year: i32) -> i32 {
    if year >= 2000 {
        return year;
    }
    let yy = year.rem_euclid(100);
    if yy > 29 {
        1900 + yy
    } else {
        2000 + yy
    }
}

/// Renders a timestamp as a local `MM/dd/yyyy` date.
pub fn str_to_date(value: &str, is_utc: bool) -> String {
    let Some(d) = parse_timestamp(value, is_utc) else {
        return value.to_string();
    };

    format!(
        "{}/{}/{}",
        num_to_time_part(d.month() as i64),
        num_to_time_part(d.day() as i64),
        windowed_year(d.year())
    )
}

/// Renders a timestamp as a local `hh:mm:ss` time, with a fractional part
/// when `millisecond` is set.
pub fn str_to_time(value: &str, is_utc: bool, millisecond: bool) -> String {
    let Some(d) = parse_timestamp(value, is_utc) else {
        return value.to_string();
    };

    let mut out = format!(
        "{}:{}:{}",
        num_to_time_part(d.hour() as i64),
        num_to_time_part(d.minute() as i64),
        num_to_time_part(d.second() as i64)
    );
    if millisecond {
        out.push('.');
        out.push_str(&num_to_time_part(d.timestamp_subsec_millis() as i64));
    }
    out
}

/// Renders a timestamp as `MM/dd/yyyy hh:mm:ss`.
pub fn str_to_date_time(value: &str, is_utc: bool, millisecond: bool) -> String {
    format!(
        "{} {}",
        str_to_date(value, is_utc),
        str_to_time(value, is_utc, millisecond)
    )
}

/// Structural check of an `hh:mm:ss` string. Bounds only, the fields are
/// not required to name a real wall-clock instant.
pub fn is_valid_time(value: &str) -> bool {
    let parts: Vec<&str> = value.split(':').collect();
    if parts.len() != 3 {
        return false;
    }

    let Ok(hours) = parts[0].parse::<i64>() else {
        return false;
    };
    if hours > 23 {
        return false;
    }

    let Ok(minutes) = parts[1].parse::<i64>() else {
        return false;
    };
    if minutes > 59 {
        return false;
    }

    let Ok(seconds) = parts[2].parse::<f64>() else {
        return false;
    };
    seconds <= 59.0
}

/// Structural check of an `MM/dd/yyyy` string. Month and day are bounded,
/// the calendar is not consulted.
pub fn is_valid_date(value: &str) -> bool {
    let parts: Vec<&str> = value.split('/').collect();
    if parts.len() != 3 {
        return false;
    }

    let Ok(month) = parts[0].parse::<i64>() else {
        return false;
    };
    if month > 12 {
        return false;
    }

    let Ok(day) = parts[1].parse::<i64>() else {
        return false;
    };
    if day > 31 {
        return false;
    }

    parts[2].parse::<i64>().is_ok()
}

/// Structural check of an `MM/dd/yyyy hh:mm:ss` pair.
pub fn is_valid_date_time(value: &str) -> bool {
    let parts: Vec<&str> = value.split(' ').collect();
    if parts.len() != 2 {
        return false;
    }
    is_valid_date(parts[0]) && is_valid_time(parts[1])
}

#[wasm_bindgen(js_name = numToKey)]
pub fn num_to_key_js(num: f64) -> String {
    num_to_key(num.trunc() as i64)
}

#[wasm_bindgen(js_name = numToTimePart)]
pub fn num_to_time_part_js(num: f64) -> String {
    num_to_time_part(num.trunc() as i64)
}

#[wasm_bindgen(js_name = strToDate)]
pub fn str_to_date_js(value: &str, is_utc: Option<bool>) -> String {
    str_to_date(value, is_utc.unwrap_or(false))
}

#[wasm_bindgen(js_name = strToTime)]
pub fn str_to_time_js(value: &str, is_utc: Option<bool>, millisecond: Option<bool>) -> String {
    str_to_time(value, is_utc.unwrap_or(false), millisecond.unwrap_or(false))
}

#[wasm_bindgen(js_name = strToDateTime)]
pub fn str_to_date_time_js(value: &str, is_utc: Option<bool>, millisecond: Option<bool>) -> String {
    str_to_date_time(value, is_utc.unwrap_or(false), millisecond.unwrap_or(false))
}

#[wasm_bindgen(js_name = isValidTime)]
pub fn is_valid_time_js(value: &str) -> bool {
    is_valid_time(value)
}

#[wasm_bindgen(js_name = isValidDate)]
pub fn is_valid_date_js(value: &str) -> bool {
    is_valid_date(value)
}

#[wasm_bindgen(js_name = isValidDateTime)]
pub fn is_valid_date_time_js(value: &str) -> bool {
    is_valid_date_time(value)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_num_to_key_pads_to_four_digits() {
        assert_eq!(num_to_key(7), "0007");
        assert_eq!(num_to_key(123), "0123");
        assert_eq!(num_to_key(12345), "12345");
    }

    #[test]
    fn test_num_to_time_part_pads_to_two_digits() {
        assert_eq!(num_to_time_part(7), "07");
        assert_eq!(num_to_time_part(59), "59");
        assert_eq!(num_to_time_part(250), "250");
    }

    #[test]
    fn test_str_to_date_formats_local_wall_time() {
        assert_eq!(str_to_date("2024-05-06T07:08:09", false), "05/06/2024");
        // A trailing Z is dropped when the caller asked for wall time
        assert_eq!(str_to_date("2024-05-06T07:08:09Z", false), "05/06/2024");
        assert_eq!(str_to_date("2024-05-06", false), "05/06/2024");
    }

    #[test]
    fn test_str_to_date_windows_two_digit_years() {
        assert_eq!(str_to_date("1929-03-04T00:00:00", false), "03/04/2029");
        assert_eq!(str_to_date("1931-03-04T00:00:00", false), "03/04/1931");
        assert_eq!(str_to_date("1985-03-04T00:00:00", false), "03/04/1985");
    }

    #[test]
    fn test_str_to_date_passes_garbage_through() {
        assert_eq!(str_to_date("not a date", false), "not a date");
        assert_eq!(str_to_date("", false), "");
    }

    #[test]
    fn test_str_to_time_renders_seconds_and_milliseconds() {
        assert_eq!(str_to_time("2024-05-06T07:08:09", false, false), "07:08:09");
        assert_eq!(str_to_time("2024-05-06T07:08:09.007", false, true), "07:08:09.07");
        assert_eq!(str_to_time("2024-05-06T07:08:09.250", false, true), "07:08:09.250");
    }

    #[test]
    fn test_utc_conversion_round_trips_through_local() {
        // Independent of the test machine's zone: format the expected value
        // from the same instant converted with chrono directly
        let instant = Utc.with_ymd_and_hms(2024, 5, 6, 23, 30, 0).unwrap();
        let local = instant.with_timezone(&Local);
        let expected = format!(
            "{}/{}/{}",
            num_to_time_part(local.month() as i64),
            num_to_time_part(local.day() as i64),
            local.year()
        );

        assert_eq!(str_to_date("2024-05-06T23:30:00Z", true), expected);
    }

    #[test]
    fn test_str_to_date_time_joins_both_parts() {
        assert_eq!(
            str_to_date_time("2024-05-06T07:08:09", false, false),
            "05/06/2024 07:08:09"
        );
    }

    #[test]
    fn test_is_valid_time_bounds() {
        assert!(is_valid_time("23:59:59"));
        assert!(is_valid_time("00:00:00"));
        assert!(is_valid_time("1:2:3.5"));

        assert!(!is_valid_time("24:00:00"));
        assert!(!is_valid_time("12:60:00"));
        assert!(!is_valid_time("12:00:60"));
        assert!(!is_valid_time("12:00"));
        assert!(!is_valid_time("a:b:c"));
    }

    #[test]
    fn test_is_valid_date_bounds() {
        assert!(is_valid_date("12/31/2024"));
        assert!(is_valid_date("1/1/99"));

        assert!(!is_valid_date("13/01/2024"));
        assert!(!is_valid_date("12/32/2024"));
        assert!(!is_valid_date("12/31"));
        assert!(!is_valid_date("12-31-2024"));
    }

    #[test]
    fn test_is_valid_date_time_needs_both_halves() {
        assert!(is_valid_date_time("12/31/2024 23:59:59"));
        assert!(!is_valid_date_time("12/31/2024"));
        assert!(!is_valid_date_time("12/31/2024 24:00:00"));
        assert!(!is_valid_date_time("12/31/2024  23:59:59"));
    }
}
