//! Lenient field decoders.
//!
//! The backend computes aggregates in PostgreSQL, and its driver renders
//! `bigint` and `numeric` columns as JSON strings (`"12"`, `"4.99"`). These
//! helpers accept either the number or its textual form.

use std::fmt::Display;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText<T> {
    Number(T),
    Text(String),
}

impl<T> NumberOrText<T>
where
    T: FromStr,
    T::Err: Display,
{
    fn resolve<E: de::Error>(self) -> Result<T, E> {
        match self {
            NumberOrText::Number(value) => Ok(value),
            NumberOrText::Text(text) => text.trim().parse().map_err(E::custom),
        }
    }
}

pub fn number<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Deserialize<'de>,
    T::Err: Display,
{
    NumberOrText::<T>::deserialize(deserializer)?.resolve()
}

/// Like [`number`], with `null` mapping to `None`. Pair with `#[serde(default)]`.
pub fn opt_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Deserialize<'de>,
    T::Err: Display,
{
    Option::<NumberOrText<T>>::deserialize(deserializer)?
        .map(|value| value.resolve())
        .transpose()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(i64),
    Text(String),
}

/// Accepts `true`/`false`, `1`/`0`, and their string forms.
pub fn opt_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Flag>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Flag::Bool(b)) => Ok(Some(b)),
        Some(Flag::Int(i)) => Ok(Some(i != 0)),
        Some(Flag::Text(t)) => match t.trim() {
            "true" | "t" | "1" => Ok(Some(true)),
            "false" | "f" | "0" => Ok(Some(false)),
            other => Err(de::Error::custom(format!("not a boolean: {other}"))),
        },
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Row {
        #[serde(deserialize_with = "super::number")]
        count: i64,
        #[serde(deserialize_with = "super::number")]
        amount: f64,
        #[serde(default, deserialize_with = "super::opt_number")]
        average: Option<f64>,
        #[serde(default, deserialize_with = "super::opt_flag")]
        active: Option<bool>,
    }

    #[test]
    fn accepts_numbers_and_numeric_strings() {
        let a: Row = serde_json::from_str(r#"{"count":3,"amount":4.99,"average":1.5,"active":true}"#).unwrap();
        let b: Row = serde_json::from_str(r#"{"count":"3","amount":"4.99","average":"1.50","active":1}"#).unwrap();
        assert_eq!(a.count, b.count);
        assert_eq!(a.amount, b.amount);
        assert_eq!(a.average, b.average);
        assert_eq!(a.active, b.active);
    }

    #[test]
    fn null_and_missing_optionals_are_none() {
        let row: Row = serde_json::from_str(r#"{"count":0,"amount":0,"average":null}"#).unwrap();
        assert_eq!(row.average, None);
        assert_eq!(row.active, None);
    }

    #[test]
    fn garbage_text_is_rejected() {
        let result: Result<Row, _> = serde_json::from_str(r#"{"count":"many","amount":0}"#);
        assert!(result.is_err());
    }
}
