use chrono::{DateTime, Utc};
use serde::Serializer;

pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Serializes a UTC timestamp the way the AWS CLI writes `Expiration` into its cache files
pub fn serialize_datetime_with_ms<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let str_dt = dt.format(DATETIME_FORMAT).to_string();
    serializer.serialize_str(&str_dt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Wrapper {
        #[serde(serialize_with = "serialize_datetime_with_ms")]
        at: DateTime<Utc>,
    }

    #[test]
    fn datetime_is_written_with_milliseconds() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 5).unwrap();
        let json = serde_json::to_string(&Wrapper { at }).unwrap();
        assert_eq!(json, r#"{"at":"2024-03-01T12:30:05.000Z"}"#);
    }
}
