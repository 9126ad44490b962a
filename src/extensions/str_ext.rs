use chrono::{DateTime, NaiveDate, Utc};

pub trait ToTimestamp {
    /// Parses an RFC 3339 timestamp or a plain `YYYY-MM-DD` date (taken as midnight UTC).
    fn to_timestamp(&self) -> Option<DateTime<Utc>>;
}

impl ToTimestamp for str {
    fn to_timestamp(&self) -> Option<DateTime<Utc>> {
        let value = self.trim();
        if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
            return Some(timestamp.with_timezone(&Utc));
        }

        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|datetime| datetime.and_utc())
    }
}
