//! Lenient deserializers for values coming back from the record store or
//! from form input.
//!
//! The store returns money as strings or numbers depending on the column
//! type, timestamps with or without an offset, and dates either bare or as
//! the date part of a timestamp. Form input sends blank strings for unset
//! fields.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{self, Deserialize, Deserializer};
use serde_json::{Number, Value};
use std::str::FromStr;

#[derive(Deserialize)]
#[serde(untagged)]
enum DecimalInput {
    String(String),
    Number(Number),
    Null,
}

fn parse_decimal_value(value: &str) -> Result<Decimal, String> {
    let trimmed = value.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|e| format!("Invalid decimal value '{}': {}", value, e))
}

/// Parses an RFC 3339 timestamp, or a naive one taken as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Parses `YYYY-MM-DD`, or the date part of a timestamp.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_timestamp(trimmed).map(|ts| ts.date_naive()))
}

pub fn deserialize_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_option_decimal(deserializer)?
        .ok_or_else(|| serde::de::Error::custom("amount is required"))
}

pub fn deserialize_option_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<DecimalInput>::deserialize(deserializer)?;
    match raw {
        None | Some(DecimalInput::Null) => Ok(None),
        Some(DecimalInput::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            parse_decimal_value(trimmed)
                .map(Some)
                .map_err(serde::de::Error::custom)
        }
        Some(DecimalInput::Number(n)) => parse_decimal_value(&n.to_string())
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

pub fn deserialize_option_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => parse_timestamp(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("Invalid timestamp '{}'", s))),
    }
}

pub fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_option_timestamp(deserializer)?
        .ok_or_else(|| serde::de::Error::custom("timestamp is required"))
}

pub fn deserialize_option_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => parse_date(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("Invalid date '{}'", s))),
    }
}

pub fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_option_date(deserializer)?
        .ok_or_else(|| serde::de::Error::custom("date is required"))
}

/// Blank strings become `None`.
pub fn deserialize_blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

/// Integers sent as numbers or numeric strings. Blank becomes `None`.
pub fn deserialize_option_i32<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("Invalid integer '{}'", n))),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s
            .trim()
            .parse::<i32>()
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("Invalid integer '{}': {}", s, e))),
        other => Err(serde::de::Error::custom(format!(
            "Invalid integer '{}'",
            other
        ))),
    }
}

/// `null` becomes an empty list.
pub fn deserialize_null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use rust_decimal_macros::dec;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "deserialize_option_decimal")]
        amount: Option<Decimal>,
        #[serde(default, deserialize_with = "deserialize_option_timestamp")]
        at: Option<DateTime<Utc>>,
        #[serde(default, deserialize_with = "deserialize_option_date")]
        on: Option<NaiveDate>,
        #[serde(default, deserialize_with = "deserialize_blank_as_none")]
        room: Option<String>,
        #[serde(default, deserialize_with = "deserialize_option_i32")]
        age: Option<i32>,
    }

    #[test]
    fn accepts_store_and_form_shapes() {
        let probe: Probe = serde_json::from_value(serde_json::json!({
            "amount": "500.00",
            "at": "2024-05-01T08:30:00+00:00",
            "on": "2024-05-01T08:30:00",
            "room": "",
            "age": "4"
        }))
        .unwrap();
        assert_eq!(probe.amount, Some(dec!(500.00)));
        assert_eq!(probe.at.unwrap().hour(), 8);
        assert_eq!(probe.on.unwrap().day(), 1);
        assert_eq!(probe.room, None);
        assert_eq!(probe.age, Some(4));
    }

    #[test]
    fn missing_and_null_fields_are_none() {
        let probe: Probe = serde_json::from_value(serde_json::json!({
            "amount": null,
            "at": null
        }))
        .unwrap();
        assert!(probe.amount.is_none());
        assert!(probe.at.is_none());
        assert!(probe.on.is_none());
        assert!(probe.age.is_none());
    }

    #[test]
    fn numeric_amounts_keep_exact_value() {
        let probe: Probe = serde_json::from_value(serde_json::json!({ "amount": 42.5 })).unwrap();
        assert_eq!(probe.amount, Some(dec!(42.5)));
    }

    #[test]
    fn naive_timestamps_are_taken_as_utc() {
        let ts = parse_timestamp("2024-05-01 17:45:10.123").unwrap();
        assert_eq!(ts.minute(), 45);
        assert!(parse_timestamp("yesterday").is_none());
    }
}
