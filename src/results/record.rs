use chrono::{Local, NaiveDateTime, SubsecRound};
use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use std::time::Duration;

/// Column names of the backing store, in order
pub const HEADER: [&str; 4] = ["datetime", "score", "duration", "level"];

/// Durable summary of one finished session
///
/// Timestamps are local wall-clock time truncated to whole seconds and the
/// duration is rounded to two decimals, so a record survives a trip through
/// the store unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    #[serde(rename = "datetime", with = "timestamp_format")]
    pub timestamp: NaiveDateTime,
    pub score: u32,
    #[serde(rename = "duration", deserialize_with = "deserialize_duration")]
    pub duration_seconds: f64,
    pub level: u32,
}

impl ResultRecord {
    pub fn new(timestamp: NaiveDateTime, score: u32, duration: Duration, level: u32) -> Self {
        Self {
            timestamp: timestamp.trunc_subsecs(0),
            score,
            duration_seconds: round_hundredths(duration.as_secs_f64()),
            level,
        }
    }

    /// Record stamped with the current local time
    pub fn now(score: u32, duration: Duration, level: u32) -> Self {
        Self::new(Local::now().naive_local(), score, duration, level)
    }
}

fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Seconds that fit a `Duration`; `inf`, `NaN`, negatives and overflow are rejected
fn deserialize_duration<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let seconds = f64::deserialize(deserializer)?;
    Duration::try_from_secs_f64(seconds)
        .map(|_| seconds)
        .map_err(|_| D::Error::custom(format!("invalid duration {seconds}")))
}

/// `YYYY-MM-DD HH:MM:SS` on write; the `T` separator is also accepted on read
pub(crate) mod timestamp_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";
    const FORMAT_T: &str = "%Y-%m-%dT%H:%M:%S";

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(D::Error::custom)
    }

    pub fn parse(raw: &str) -> Result<NaiveDateTime, chrono::ParseError> {
        let raw = raw.trim();
        NaiveDateTime::parse_from_str(raw, FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(raw, FORMAT_T))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_duration_rounded_to_hundredths() {
        let record = ResultRecord::new(at(10, 0, 0), 4, Duration::from_millis(12_346), 1);
        assert_eq!(record.duration_seconds, 12.35);

        let record = ResultRecord::new(at(10, 0, 0), 4, Duration::from_micros(1_004_900), 1);
        assert_eq!(record.duration_seconds, 1.0);
    }

    #[test]
    fn test_timestamp_truncated_to_seconds() {
        let precise = at(10, 20, 30).with_nanosecond(987_654_321).unwrap();
        let record = ResultRecord::new(precise, 0, Duration::ZERO, 1);
        assert_eq!(record.timestamp, at(10, 20, 30));
    }

    #[test]
    fn test_timestamp_formats() {
        assert_eq!(
            timestamp_format::parse("2024-03-09 10:20:30").unwrap(),
            at(10, 20, 30)
        );
        assert_eq!(
            timestamp_format::parse("2024-03-09T10:20:30").unwrap(),
            at(10, 20, 30)
        );
        assert!(timestamp_format::parse("yesterday").is_err());
    }

    #[test]
    fn test_unrepresentable_durations_rejected() {
        for bad in ["inf", "-inf", "NaN", "1e30", "-1.5"] {
            let data = format!("datetime,score,duration,level\n2024-03-09 10:00:00,1,{bad},1\n");
            let mut reader = csv::Reader::from_reader(data.as_bytes());
            let parsed: Vec<_> = reader.deserialize::<ResultRecord>().collect();
            assert!(parsed[0].is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_json_field_names() {
        let record = ResultRecord::new(at(8, 5, 0), 7, Duration::from_secs(42), 2);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["datetime"], "2024-03-09 08:05:00");
        assert_eq!(json["score"], 7);
        assert_eq!(json["duration"], 42.0);
        assert_eq!(json["level"], 2);
    }
}
