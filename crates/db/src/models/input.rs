//! Lenient deserializers for form payloads. The web forms send money as either
//! strings or numbers and dates as either timestamps or bare `YYYY-MM-DD`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, de::Error as _};
use serde_with::DeserializeAs;

#[derive(Deserialize)]
#[serde(untagged)]
enum DecimalRepr {
    Number(f64),
    Text(String),
}

/// `"12.5"`, `12.5`, `""` or `null`; stored as a two-decimal string.
pub struct OptionalDecimal;

impl<'de> DeserializeAs<'de, Option<String>> for OptionalDecimal {
    fn deserialize_as<D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = match Option::<DecimalRepr>::deserialize(deserializer)? {
            None => return Ok(None),
            Some(DecimalRepr::Number(n)) => n,
            Some(DecimalRepr::Text(s)) if s.trim().is_empty() => return Ok(None),
            Some(DecimalRepr::Text(s)) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| D::Error::custom(format!("invalid decimal: {s}")))?,
        };
        normalize_decimal(value).map(Some).map_err(D::Error::custom)
    }
}

pub fn normalize_decimal(value: f64) -> Result<String, String> {
    if value.is_finite() {
        Ok(format!("{value:.2}"))
    } else {
        Err(format!("invalid decimal: {value}"))
    }
}

/// RFC 3339, `YYYY-MM-DDTHH:MM[:SS]` (UTC) or `YYYY-MM-DD` (midnight UTC).
/// Blank strings and `null` mean "no date".
pub struct OptionalDate;

impl<'de> DeserializeAs<'de, Option<DateTime<Utc>>> for OptionalDate {
    fn deserialize_as<D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(s) if s.trim().is_empty() => Ok(None),
            Some(s) => parse_date(s.trim())
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid date: {s}"))),
        }
    }
}

pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
