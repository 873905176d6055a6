use chrono::{Duration, Local, NaiveDateTime};

/// Textual timestamp layout used by the relational store.
const TIME_LAYOUT: &str = "%Y-%m-%d %H:%M:%S";

/// Render a timestamp in the store's textual format, one-second resolution.
pub fn encode(time: NaiveDateTime) -> String {
    time.format(TIME_LAYOUT).to_string()
}

/// Parse a stored timestamp literal. Unparseable literals fall back to the
/// current local time rather than raising an error.
pub fn decode(literal: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(literal, TIME_LAYOUT)
        .unwrap_or_else(|_| Local::now().naive_local())
}

pub fn add_seconds(time: NaiveDateTime, seconds: i64) -> NaiveDateTime {
    time + Duration::seconds(seconds)
}

pub fn add_minutes(time: NaiveDateTime, minutes: i64) -> NaiveDateTime {
    time + Duration::minutes(minutes)
}

pub fn add_hours(time: NaiveDateTime, hours: i64) -> NaiveDateTime {
    time + Duration::hours(hours)
}

#[cfg(test)]
mod tests {
    use chrono::{Local, NaiveDate, Timelike};

    use super::{add_hours, add_minutes, add_seconds, decode, encode};

    #[test]
    fn round_trip_truncates_to_seconds() {
        let time = NaiveDate::from_ymd_opt(2023, 11, 5)
            .unwrap()
            .and_hms_nano_opt(13, 37, 21, 456_000_000)
            .unwrap();
        let literal = encode(time);
        assert_eq!(literal, "2023-11-05 13:37:21");
        assert_eq!(decode(&literal), time.with_nanosecond(0).unwrap());
    }

    #[test]
    fn decode_falls_back_to_now_on_parse_failure() {
        let before = Local::now().naive_local();
        let decoded = decode("not-a-time");
        let after = Local::now().naive_local();
        assert!(decoded >= before && decoded <= after);
    }

    #[test]
    fn offset_helpers_shift_the_window() {
        let time = NaiveDate::from_ymd_opt(2023, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(encode(add_seconds(time, 120)), "2023-01-01 00:02:00");
        assert_eq!(encode(add_minutes(time, 90)), "2023-01-01 01:30:00");
        assert_eq!(encode(add_hours(time, 25)), "2023-01-02 01:00:00");
    }
}
