use std::time::Duration;

use chrono::{DateTime, Utc};

/// Wall clock in milliseconds, for measuring elapsed request time.
pub fn now_millis() -> f64 {
    js_sys::Date::now()
}

/// Age of a reading as "1m 5s", seconds resolution. A timestamp from the
/// future reads as "0s".
pub fn format_age(newest: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let age = (now - newest).to_std().unwrap_or_default();
    humantime::format_duration(Duration::from_secs(age.as_secs())).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn age_is_truncated_to_seconds() {
        let newest = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let now = Utc
            .with_ymd_and_hms(2024, 6, 1, 12, 1, 5)
            .unwrap()
            .checked_add_signed(chrono::Duration::milliseconds(400))
            .unwrap();
        assert_eq!(format_age(newest, now), "1m 5s");
    }

    #[test]
    fn future_readings_have_zero_age() {
        let newest = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 1).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(format_age(newest, now), "0s");
    }
}
