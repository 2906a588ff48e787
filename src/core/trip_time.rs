use chrono::{NaiveDateTime, NaiveTime};

/// Format of the timestamps in the raw trip export, e.g. `08/15/2015 06:41:46 PM`.
pub const SOURCE_DATETIME_FORMAT: &str = "%m/%d/%Y %I:%M:%S %p";
/// 24-hour clock time written to the processed files.
pub const CLOCK_TIME_FORMAT: &str = "%H:%M:%S";

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Reduces a raw timestamp to its 24-hour clock time.
pub fn to_clock_time(raw: &str, format: &str) -> Result<String, chrono::ParseError> {
    let datetime = NaiveDateTime::parse_from_str(raw.trim(), format)?;
    Ok(datetime.format(CLOCK_TIME_FORMAT).to_string())
}

pub fn parse_clock_time(value: &str) -> Result<NaiveTime, chrono::ParseError> {
    NaiveTime::parse_from_str(value.trim(), CLOCK_TIME_FORMAT)
}

/// Seconds from pickup to dropoff. A dropoff earlier than the pickup means
/// the trip crossed midnight; trips are assumed shorter than a day.
pub fn elapsed_seconds(pickup: &str, dropoff: &str) -> Result<i64, chrono::ParseError> {
    let pickup = parse_clock_time(pickup)?;
    let dropoff = parse_clock_time(dropoff)?;

    let mut seconds = (dropoff - pickup).num_seconds();
    if seconds < 0 {
        seconds += SECONDS_PER_DAY;
    }
    Ok(seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_clock_time_pm() {
        assert_eq!(
            to_clock_time("08/15/2015 06:41:46 PM", SOURCE_DATETIME_FORMAT).unwrap(),
            "18:41:46"
        );
    }

    #[test]
    fn test_to_clock_time_midnight_and_noon() {
        assert_eq!(
            to_clock_time("01/01/2015 12:05:00 AM", SOURCE_DATETIME_FORMAT).unwrap(),
            "00:05:00"
        );
        assert_eq!(
            to_clock_time("01/01/2015 12:05:00 PM", SOURCE_DATETIME_FORMAT).unwrap(),
            "12:05:00"
        );
    }

    #[test]
    fn test_to_clock_time_rejects_other_formats() {
        assert!(to_clock_time("2015-08-15 18:41:46", SOURCE_DATETIME_FORMAT).is_err());
        assert!(to_clock_time("", SOURCE_DATETIME_FORMAT).is_err());
    }

    #[test]
    fn test_elapsed_same_day() {
        assert_eq!(elapsed_seconds("18:41:46", "18:55:01").unwrap(), 795);
        assert_eq!(elapsed_seconds("10:00:00", "10:00:00").unwrap(), 0);
    }

    #[test]
    fn test_elapsed_crosses_midnight() {
        assert_eq!(elapsed_seconds("23:58:00", "00:03:30").unwrap(), 330);
    }

    #[test]
    fn test_elapsed_rejects_garbage() {
        assert!(elapsed_seconds("6pm", "19:00:00").is_err());
    }
}
