//! Event record storage module

use chrono::{DateTime, Datelike, Utc};

/// A single seismic event flattened from its preferred origin and magnitude
#[derive(Clone, Debug, PartialEq)]
pub struct EventRecord {
    /// Identifier shared by the table row and the map marker
    pub event_id: String,
    /// Origin time
    pub time: DateTime<Utc>,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Depth in kilometres
    pub depth_km: f64,
    /// Magnitude, absent when the event lists none
    pub magnitude: Option<f64>,
}

impl EventRecord {
    /// Origin time as whole seconds since the Unix epoch
    ///
    /// Truncates toward zero, so pre-1970 times round up to the later second.
    pub fn timestamp(&self) -> i64 {
        let seconds = self.time.timestamp();
        if seconds < 0 && self.time.timestamp_subsec_nanos() > 0 {
            seconds + 1
        } else {
            seconds
        }
    }

    /// Origin time at the whole second reported by [`Self::timestamp`]
    fn truncated_time(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.timestamp(), 0).unwrap_or(self.time)
    }

    /// Origin time formatted like C `ctime`, e.g. `Fri Mar 11 05:46:23 2011`
    pub fn time_string(&self) -> String {
        self.truncated_time()
            .format("%a %b %e %H:%M:%S %Y")
            .to_string()
    }

    /// Day of the year of the origin time, starting at 1
    pub fn julian_day(&self) -> u32 {
        self.truncated_time().ordinal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn create_test_record() -> EventRecord {
        EventRecord {
            event_id: "ev1".to_string(),
            time: Utc
                .with_ymd_and_hms(2011, 3, 11, 5, 46, 23)
                .single()
                .unwrap()
                + chrono::Duration::milliseconds(700),
            latitude: 38.297,
            longitude: 142.373,
            depth_km: 29.0,
            magnitude: Some(9.1),
        }
    }

    #[test]
    fn test_timestamp_truncates_fraction() {
        let record = create_test_record();
        assert_eq!(record.timestamp(), 1299822383);
    }

    #[test]
    fn test_time_string_ctime_format() {
        let record = create_test_record();
        assert_eq!(record.time_string(), "Fri Mar 11 05:46:23 2011");
    }

    #[test]
    fn test_time_string_pads_single_digit_day() {
        let mut record = create_test_record();
        record.time = Utc.with_ymd_and_hms(1993, 6, 9, 4, 26, 40).single().unwrap();
        assert_eq!(record.time_string(), "Wed Jun  9 04:26:40 1993");
    }

    #[test]
    fn test_julian_day() {
        let record = create_test_record();
        assert_eq!(record.julian_day(), 70);
    }

    #[test]
    fn test_pre_epoch_timestamp_truncates_toward_zero() {
        let mut record = create_test_record();
        record.time = Utc
            .with_ymd_and_hms(1960, 5, 22, 19, 11, 20)
            .single()
            .unwrap()
            + chrono::Duration::milliseconds(500);

        assert_eq!(record.timestamp(), -303281319);
        assert_eq!(record.time_string(), "Sun May 22 19:11:21 1960");
        assert_eq!(record.julian_day(), 143);
    }

    #[test]
    fn test_pre_epoch_whole_second_unchanged() {
        let mut record = create_test_record();
        record.time = Utc.with_ymd_and_hms(1960, 5, 22, 19, 11, 20).single().unwrap();
        assert_eq!(record.timestamp(), -303281320);
        assert_eq!(record.time_string(), "Sun May 22 19:11:20 1960");
    }

    #[test]
    fn test_new_year_edge_uses_truncated_second() {
        let mut record = create_test_record();
        record.time = Utc.with_ymd_and_hms(1959, 12, 31, 23, 59, 59).single().unwrap()
            + chrono::Duration::milliseconds(250);
        assert_eq!(record.time_string(), "Fri Jan  1 00:00:00 1960");
        assert_eq!(record.julian_day(), 1);
    }
}
