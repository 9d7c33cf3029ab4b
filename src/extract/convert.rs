//! Coercion of raw cell text into typed values. Deliberately forgiving:
//! numeric text is scrubbed of units and thousands separators before
//! parsing, dates walk an ordered pattern ladder.
use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

use crate::config::FieldType;
use crate::extract::record::Value;

/// Errors raised when a cell value cannot be coerced to its target type.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConvertError {
    #[error("Cannot parse '{0}' as an integer")]
    Integer(String),

    #[error("Cannot parse '{0}' as a number")]
    Number(String),

    #[error("No date pattern matches '{0}'")]
    Date(String),
}

/// Datetime patterns tried before the date-only ones; both hyphen and slash
/// separators, with and without seconds.
const DATETIME_PATTERNS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M",
];

const DATE_PATTERNS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

/// Coerces trimmed cell text to the target type. Blank input, and numeric
/// input that is nothing but scrubbed-away noise, yield `Ok(None)`.
pub fn convert_value(
    raw: &str,
    field_type: FieldType,
    format: Option<&str>,
) -> Result<Option<Value>, ConvertError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match field_type {
        FieldType::Text => Ok(Some(Value::Text(trimmed.to_owned()))),
        FieldType::Integer | FieldType::Long => parse_integer(trimmed),
        FieldType::Float | FieldType::Double | FieldType::Decimal => parse_number(trimmed),
        FieldType::Boolean => Ok(Some(Value::Bool(parse_truthy(trimmed)))),
        FieldType::Date => parse_date(trimmed, format).map(|date| Some(Value::Date(date))),
        FieldType::DateTime => {
            parse_datetime(trimmed, format).map(|moment| Some(Value::DateTime(moment)))
        }
    }
}

/// Keeps digits and minus signs only, so "42 m" and "1,024" both parse.
fn parse_integer(text: &str) -> Result<Option<Value>, ConvertError> {
    let digits: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '-')
        .collect();
    if digits.is_empty() {
        return Ok(None);
    }
    digits
        .parse::<i64>()
        .map(|value| Some(Value::Int(value)))
        .map_err(|_| ConvertError::Integer(text.to_owned()))
}

/// Strips ASCII and fullwidth thousands separators before parsing.
fn parse_number(text: &str) -> Result<Option<Value>, ConvertError> {
    let cleaned: String = text.chars().filter(|c| *c != ',' && *c != '，').collect();
    if cleaned.is_empty() || cleaned == "-" {
        return Ok(None);
    }
    cleaned
        .parse::<f64>()
        .map(|value| Some(Value::Float(value)))
        .map_err(|_| ConvertError::Number(text.to_owned()))
}

fn parse_truthy(text: &str) -> bool {
    text.eq_ignore_ascii_case("true")
        || text.eq_ignore_ascii_case("yes")
        || text == "1"
        || text == "是"
}

fn parse_date(text: &str, format: Option<&str>) -> Result<NaiveDate, ConvertError> {
    if let Some(format) = format {
        if let Ok(moment) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(moment.date());
        }
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Ok(date);
        }
    }
    for pattern in DATETIME_PATTERNS {
        if let Ok(moment) = NaiveDateTime::parse_from_str(text, pattern) {
            return Ok(moment.date());
        }
    }
    for pattern in DATE_PATTERNS {
        if let Ok(date) = NaiveDate::parse_from_str(text, pattern) {
            return Ok(date);
        }
    }
    Err(ConvertError::Date(text.to_owned()))
}

fn parse_datetime(text: &str, format: Option<&str>) -> Result<NaiveDateTime, ConvertError> {
    if let Some(format) = format {
        if let Ok(moment) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(moment);
        }
    }
    for pattern in DATETIME_PATTERNS {
        if let Ok(moment) = NaiveDateTime::parse_from_str(text, pattern) {
            return Ok(moment);
        }
    }
    for pattern in DATE_PATTERNS {
        if let Ok(date) = NaiveDate::parse_from_str(text, pattern) {
            if let Some(moment) = date.and_hms_opt(0, 0, 0) {
                return Ok(moment);
            }
        }
    }
    Err(ConvertError::Date(text.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_input_is_none() {
        assert_eq!(convert_value("", FieldType::Text, None).unwrap(), None);
        assert_eq!(convert_value("  ", FieldType::Double, None).unwrap(), None);
    }

    #[test]
    fn integers_shed_units() {
        assert_eq!(
            convert_value("42 m", FieldType::Integer, None).unwrap(),
            Some(Value::Int(42))
        );
        assert_eq!(
            convert_value("1,024", FieldType::Long, None).unwrap(),
            Some(Value::Int(1024))
        );
        assert_eq!(
            convert_value("-17", FieldType::Integer, None).unwrap(),
            Some(Value::Int(-17))
        );
        // Nothing but noise collapses to empty.
        assert_eq!(convert_value("m³", FieldType::Integer, None).unwrap(), None);
    }

    #[test]
    fn floats_strip_both_comma_kinds() {
        assert_eq!(
            convert_value("1，234.5", FieldType::Double, None).unwrap(),
            Some(Value::Float(1234.5))
        );
        assert_eq!(
            convert_value("1,234.5", FieldType::Float, None).unwrap(),
            Some(Value::Float(1234.5))
        );
        assert_eq!(
            convert_value("-", FieldType::Decimal, None).unwrap(),
            None
        );
        assert!(convert_value("abc", FieldType::Double, None).is_err());
    }

    #[test]
    fn booleans_accept_truthy_tokens() {
        for token in ["true", "TRUE", "yes", "1", "是"] {
            assert_eq!(
                convert_value(token, FieldType::Boolean, None).unwrap(),
                Some(Value::Bool(true)),
                "token {token}"
            );
        }
        assert_eq!(
            convert_value("no", FieldType::Boolean, None).unwrap(),
            Some(Value::Bool(false))
        );
    }

    #[test]
    fn dates_walk_the_pattern_ladder() {
        let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
        assert_eq!(
            convert_value("2024-3-5", FieldType::Date, None).unwrap(),
            Some(Value::Date(date(2024, 3, 5)))
        );
        assert_eq!(
            convert_value("2024/03/05", FieldType::Date, None).unwrap(),
            Some(Value::Date(date(2024, 3, 5)))
        );
        assert_eq!(
            convert_value("2024-03-05 10:30:00", FieldType::Date, None).unwrap(),
            Some(Value::Date(date(2024, 3, 5)))
        );
        assert_eq!(
            convert_value("2024-13-99", FieldType::Date, None),
            Err(ConvertError::Date("2024-13-99".to_owned()))
        );
    }

    #[test]
    fn datetimes_fill_midnight_for_date_only_text() {
        let moment = convert_value("2024-03-05", FieldType::DateTime, None)
            .unwrap()
            .unwrap();
        assert_eq!(
            moment,
            Value::DateTime(
                NaiveDate::from_ymd_opt(2024, 3, 5)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap()
            )
        );
    }

    #[test]
    fn explicit_format_wins_then_falls_back() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(
            convert_value("05.03.2024", FieldType::Date, Some("%d.%m.%Y")).unwrap(),
            Some(Value::Date(date))
        );
        // Format that does not match falls through to the common ladder.
        assert_eq!(
            convert_value("2024-03-05", FieldType::Date, Some("%d.%m.%Y")).unwrap(),
            Some(Value::Date(date))
        );
    }
}
