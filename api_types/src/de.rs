//! Lenient deserializers for form-style payloads.
//!
//! Browser forms submit every field as a string, so numeric fields may arrive either as JSON
//! numbers or as numeric strings, and an empty string means the field was left blank.

use chrono::{NaiveDate, NaiveTime};
use serde::de::Error;
use serde::{Deserialize, Deserializer};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

fn parse_text<T, E>(value: &str) -> Result<Option<T>, E>
where
    T: FromStr,
    T::Err: Display,
    E: Error,
{
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed.parse().map(Some).map_err(E::custom)
}

/// `null`, `""`, a number or a numeric string.
pub fn lenient_i32<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Scalar>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Scalar::Int(v)) => i32::try_from(v).map(Some).map_err(D::Error::custom),
        Some(Scalar::Float(v)) => Ok(Some(v.trunc() as i32)),
        Some(Scalar::Bool(v)) => Ok(Some(i32::from(v))),
        Some(Scalar::Text(v)) => parse_text(&v),
    }
}

/// Like [lenient_i32], for decimal amounts.
pub fn lenient_decimal<'de, D>(deserializer: D) -> Result<Option<rust_decimal::Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Scalar>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Scalar::Int(v)) => Ok(Some(v.into())),
        Some(Scalar::Float(v)) => rust_decimal::Decimal::try_from(v)
            .map(Some)
            .map_err(D::Error::custom),
        Some(Scalar::Bool(_)) => Err(D::Error::custom("expected a number")),
        Some(Scalar::Text(v)) => parse_text(&v),
    }
}

/// Strings where blank means absent.
pub fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Scalar>::deserialize(deserializer)?;
    Ok(match value {
        None => None,
        Some(Scalar::Text(v)) if v.trim().is_empty() => None,
        Some(Scalar::Text(v)) => Some(v),
        Some(Scalar::Int(v)) => Some(v.to_string()),
        Some(Scalar::Float(v)) => Some(v.to_string()),
        Some(Scalar::Bool(v)) => Some(v.to_string()),
    })
}

/// Blank means absent; anything else goes through [FromStr], e.g. `"on-campus"` for an event type.
pub fn from_str_lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    match blank_as_none(deserializer)? {
        None => Ok(None),
        Some(v) => parse_text(&v),
    }
}

pub fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match blank_as_none(deserializer)? {
        None => Ok(None),
        Some(v) => NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(D::Error::custom),
    }
}

/// Accepts both `HH:MM` (as sent by `<input type="time">`) and `HH:MM:SS`.
pub fn lenient_time<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
where
    D: Deserializer<'de>,
{
    match blank_as_none(deserializer)? {
        None => Ok(None),
        Some(v) => parse_time(v.trim()).map(Some).map_err(D::Error::custom),
    }
}

pub fn parse_time(value: &str) -> Result<NaiveTime, chrono::ParseError> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
}

/// A list of ids that may contain `null` entries or numeric strings; both are dropped or parsed.
pub fn id_list<'de, D>(deserializer: D) -> Result<Vec<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = Option::<Vec<Option<Scalar>>>::deserialize(deserializer)?.unwrap_or_default();
    let mut ids = Vec::with_capacity(items.len());
    for item in items.into_iter().flatten() {
        let id = match item {
            Scalar::Int(v) => Some(i32::try_from(v).map_err(D::Error::custom)?),
            Scalar::Float(v) => Some(v.trunc() as i32),
            Scalar::Bool(_) => None,
            Scalar::Text(v) => parse_text::<i32, D::Error>(&v)?,
        };
        ids.extend(id);
    }
    Ok(ids)
}

/// A list of names where `null` means empty; `null` and blank entries are dropped.
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = Option::<Vec<Option<String>>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(items
        .into_iter()
        .flatten()
        .filter(|item| !item.trim().is_empty())
        .collect())
}
