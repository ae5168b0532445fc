//! Custom serde helpers for upstream wire formats.

/// Parses a JSON value into a finite `f64`, accepting numbers and numeric strings.
pub fn parse_number(value: &serde_json::Value) -> Option<f64> {
    let n = match value {
        serde_json::Value::Number(n) => n.as_f64()?,
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Deserializes NewsData's `"2024-05-01 12:30:00"` (UTC) into `DateTime<Utc>`.
///
/// Missing or unparseable values become `None` rather than failing the whole
/// article list.
pub mod news_timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer};

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.and_then(|s| parse(&s)))
    }

    pub fn parse(s: &str) -> Option<DateTime<Utc>> {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, FORMAT) {
            return Some(naive.and_utc());
        }
        DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(&json!("3100.25")), Some(3100.25));
        assert_eq!(parse_number(&json!(42)), Some(42.0));
        assert_eq!(parse_number(&json!(null)), None);
        assert_eq!(parse_number(&json!("NaN")), None);
        assert_eq!(parse_number(&json!({"a": 1})), None);
    }

    #[test]
    fn test_news_timestamp_formats() {
        let dt = news_timestamp::parse("2024-05-01 12:30:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-05-01T12:30:00+00:00");
        assert!(news_timestamp::parse("2024-05-01T12:30:00Z").is_some());
        assert!(news_timestamp::parse("yesterday").is_none());
    }
}
