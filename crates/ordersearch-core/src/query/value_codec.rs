//! Conversion between typed values and stored cells.
//!
//! Storage layout:
//! - money: integer minor units
//! - timestamps: text `YYYY-MM-DD HH:MM:SS[.fff]`, which sorts and compares
//!   correctly as text
//! - dates: text `YYYY-MM-DD`
//! - enumerations: upper-case variant text
//!
//! Decoding failures are mapping errors naming the offending column.

use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use ordersearch_proto::{Money, ParseEnumError, Value};

use crate::error::Error;
use crate::storage::{Cell, Row};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Encode a typed value into its stored representation.
pub fn encode_value(value: &Value) -> Cell {
    match value {
        Value::Int64(v) => Cell::Integer(*v),
        Value::String(s) => Cell::Text(s.clone()),
        Value::Money(m) => Cell::Integer(m.cents()),
        Value::Timestamp(ts) => Cell::Text(encode_timestamp(ts)),
        Value::Date(d) => Cell::Text(d.format(DATE_FORMAT).to_string()),
    }
}

pub fn encode_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub fn encode_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn cell<'a>(row: &'a Row, column: &str) -> Result<&'a Cell, Error> {
    row.get(column)
        .ok_or_else(|| Error::mapping(column, "column missing from result row"))
}

fn type_error(column: &str, expected: &str, found: &Cell) -> Error {
    Error::mapping(
        column,
        format!("expected {}, found {}", expected, found.type_name()),
    )
}

pub fn decode_i64(row: &Row, column: &str) -> Result<i64, Error> {
    match cell(row, column)? {
        Cell::Integer(v) => Ok(*v),
        other => Err(type_error(column, "integer", other)),
    }
}

pub fn decode_u64(row: &Row, column: &str) -> Result<u64, Error> {
    let value = decode_i64(row, column)?;
    u64::try_from(value).map_err(|_| Error::mapping(column, format!("negative count {}", value)))
}

pub fn decode_string(row: &Row, column: &str) -> Result<String, Error> {
    match cell(row, column)? {
        Cell::Text(s) => Ok(s.clone()),
        other => Err(type_error(column, "text", other)),
    }
}

pub fn decode_optional_string(row: &Row, column: &str) -> Result<Option<String>, Error> {
    match cell(row, column)? {
        Cell::Null => Ok(None),
        Cell::Text(s) => Ok(Some(s.clone())),
        other => Err(type_error(column, "text or null", other)),
    }
}

pub fn decode_money(row: &Row, column: &str) -> Result<Money, Error> {
    let cents = decode_i64(row, column)?;
    Money::from_cents(cents).map_err(|e| Error::mapping(column, e.to_string()))
}

pub fn decode_timestamp(row: &Row, column: &str) -> Result<NaiveDateTime, Error> {
    let text = decode_string(row, column)?;
    parse_timestamp(&text).ok_or_else(|| {
        Error::mapping(column, format!("`{}` is not a timestamp", text))
    })
}

/// Parse the stored timestamp form.
///
/// Only the space-separated form is accepted: range filters compare stored
/// text, and any other layout would sort inconsistently with its value.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT).ok()
}

pub fn decode_enum<T>(row: &Row, column: &str) -> Result<T, Error>
where
    T: FromStr<Err = ParseEnumError>,
{
    let text = decode_string(row, column)?;
    text.parse()
        .map_err(|e: ParseEnumError| Error::mapping(column, e.to_string()))
}

pub fn decode_optional_enum<T>(row: &Row, column: &str) -> Result<Option<T>, Error>
where
    T: FromStr<Err = ParseEnumError>,
{
    match decode_optional_string(row, column)? {
        Some(text) => text
            .parse()
            .map(Some)
            .map_err(|e: ParseEnumError| Error::mapping(column, e.to_string())),
        None => Ok(None),
    }
}

/// Decode a JSON array aggregate into a set, dropping nulls.
///
/// Groups with no joined rows aggregate to `[null]`.
pub fn decode_name_set(row: &Row, column: &str) -> Result<BTreeSet<String>, Error> {
    let text = match cell(row, column)? {
        Cell::Null => return Ok(BTreeSet::new()),
        Cell::Text(s) => s,
        other => return Err(type_error(column, "json array", other)),
    };
    let names: Vec<Option<String>> = serde_json::from_str(text)
        .map_err(|e| Error::mapping(column, format!("invalid json array: {}", e)))?;
    Ok(names.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ordersearch_proto::OrderStatus;

    fn row(cells: Vec<(&str, Cell)>) -> Row {
        Row::new(cells.into_iter().map(|(n, c)| (n.to_string(), c)).collect())
    }

    #[test]
    fn test_encode_storage_layout() {
        let ts = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        assert_eq!(
            encode_value(&Value::Timestamp(ts)),
            Cell::Text("2024-01-15 10:30:00".into())
        );
        assert_eq!(
            encode_value(&Value::Date(NaiveDate::from_ymd_opt(2023, 6, 1).unwrap())),
            Cell::Text("2023-06-01".into())
        );
        assert_eq!(
            encode_value(&Value::Money("1050".parse().unwrap())),
            Cell::Integer(105_000)
        );
    }

    #[test]
    fn test_timestamp_text_roundtrip() {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_milli_opt(8, 0, 1, 250)
            .unwrap();
        assert_eq!(parse_timestamp(&encode_timestamp(&ts)), Some(ts));
        assert!(parse_timestamp("2024-03-05 08:00:01").is_some());
        assert!(parse_timestamp("2024-03-05T08:00:01").is_none());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_non_canonical_timestamp_is_mapping_error() {
        let r = row(vec![("order_date", Cell::Text("2024-03-05T08:00:01".into()))]);
        let err = decode_timestamp(&r, "order_date").unwrap_err();
        assert!(matches!(err, Error::Mapping { .. }));
    }

    #[test]
    fn test_unknown_enum_is_mapping_error() {
        let r = row(vec![("order_status", Cell::Text("LOST".into()))]);
        let err = decode_enum::<OrderStatus>(&r, "order_status").unwrap_err();
        match err {
            Error::Mapping { column, reason } => {
                assert_eq!(column, "order_status");
                assert!(reason.contains("LOST"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_null_optional_enum() {
        let r = row(vec![("payment_status", Cell::Null)]);
        let status: Option<OrderStatus> = decode_optional_enum(&r, "payment_status").unwrap();
        assert!(status.is_none());
    }

    #[test]
    fn test_name_set_drops_nulls() {
        let r = row(vec![
            ("empty", Cell::Text("[null]".into())),
            ("names", Cell::Text(r#"["Mouse","Laptop"]"#.into())),
            ("delimited", Cell::Text(r#"["a, b","c"]"#.into())),
        ]);
        assert!(decode_name_set(&r, "empty").unwrap().is_empty());
        let names: Vec<_> = decode_name_set(&r, "names").unwrap().into_iter().collect();
        assert_eq!(names, vec!["Laptop".to_string(), "Mouse".to_string()]);
        assert_eq!(decode_name_set(&r, "delimited").unwrap().len(), 2);
    }

    #[test]
    fn test_missing_and_mistyped_columns() {
        let r = row(vec![("item_count", Cell::Text("two".into()))]);
        assert!(matches!(
            decode_u64(&r, "item_count"),
            Err(Error::Mapping { .. })
        ));
        assert!(matches!(
            decode_i64(&r, "order_id"),
            Err(Error::Mapping { .. })
        ));
    }
}
