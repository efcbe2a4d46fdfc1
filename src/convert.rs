//! Primitive text conversion
//!
//! Pure functions turning raw element text or attribute content into typed
//! values. Converters never fail: non-numeric text becomes NaN, text that
//! does not match the date grammar becomes null.

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use lazy_static::lazy_static;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use crate::schema::{PrimitiveKind, Rule};
use crate::value::{Value, XmlDate};

// YYYY-MM-DD[THH:MM:SS[.fff]][Z|+HH:MM|-HH:MM]
static DATE_PARTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"([0-9]+)-([0-9]+)-([0-9]+)(?:T([0-9]+):([0-9]+):([0-9]+)(\.[0-9]+)?)?(?:Z|([+-][0-9]+):([0-9]+))?",
    )
    .unwrap()
});

type Converter = fn(&str) -> Value;

lazy_static! {
    /// Scalar converters keyed by primitive kind
    static ref CONVERTER_TBL: HashMap<PrimitiveKind, Converter> = {
        let mut m = HashMap::new();
        m.insert(PrimitiveKind::String, convert_string as Converter);
        m.insert(PrimitiveKind::Number, convert_number as Converter);
        m.insert(PrimitiveKind::Boolean, convert_boolean as Converter);
        m.insert(PrimitiveKind::Date, convert_date as Converter);
        m
    };
}

fn convert_string(text: &str) -> Value {
    Value::Text(text.to_string())
}

fn convert_number(text: &str) -> Value {
    Value::Number(text.parse().unwrap_or(f64::NAN))
}

fn convert_boolean(text: &str) -> Value {
    Value::Bool(text == "true")
}

fn convert_date(text: &str) -> Value {
    let parts = match DATE_PARTS.captures(text) {
        Some(parts) => parts,
        None => return Value::Null,
    };

    let num = |i: usize| -> i64 {
        parts
            .get(i)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0)
    };

    // Offset hours carry the sign; minutes follow it.
    let hours_offset = num(8) * 60;
    let mut minutes_offset = num(9);
    if hours_offset < 0 {
        minutes_offset = -minutes_offset;
    }
    let offset = hours_offset + minutes_offset;

    let millis = parts
        .get(7)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .map(|f| (f * 1000.0) as u32)
        .unwrap_or(0);

    let naive = NaiveDate::from_ymd_opt(num(1) as i32, num(2) as u32, num(3) as u32)
        .and_then(|d| d.and_hms_milli_opt(num(4) as u32, num(5) as u32, num(6) as u32, millis));
    let naive = match naive {
        Some(naive) => naive,
        None => return Value::Null,
    };

    let instant = Utc.from_utc_datetime(&naive) - Duration::minutes(offset);

    Value::Date(XmlDate {
        instant,
        timezone_offset: offset as i32,
    })
}

/// Convert trimmed element text or attribute content according to the
/// rule's primitive kind. List-typed rules split on whitespace runs and
/// convert each token; rules with no primitive kind yield null.
pub fn convert_primitive(text: &str, rule: &Rule) -> Value {
    let converter = match rule.primitive().and_then(|kind| CONVERTER_TBL.get(&kind)) {
        Some(converter) => converter,
        None => return Value::Null,
    };

    if rule.is_list() {
        Value::List(text.trim().split_whitespace().map(converter).collect())
    } else {
        converter(text.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_string_identity() {
        assert_eq!(convert_string("hello"), Value::Text("hello".into()));
    }

    #[test]
    fn test_number_coercion() {
        assert_eq!(convert_number("123"), Value::Number(123.0));
        assert_eq!(convert_number("-4.5"), Value::Number(-4.5));
        match convert_number("abc") {
            Value::Number(n) => assert!(n.is_nan()),
            other => panic!("expected NaN, got {:?}", other),
        }
    }

    #[test]
    fn test_boolean_literal() {
        assert_eq!(convert_boolean("true"), Value::Bool(true));
        assert_eq!(convert_boolean("false"), Value::Bool(false));
        assert_eq!(convert_boolean("TRUE"), Value::Bool(false));
        assert_eq!(convert_boolean("1"), Value::Bool(false));
    }

    #[test]
    fn test_date_with_explicit_offset() {
        let value = convert_date("2020-01-02T03:04:05+02:00");
        let date = match value {
            Value::Date(date) => date,
            other => panic!("expected date, got {:?}", other),
        };
        assert_eq!(date.timezone_offset, 120);
        assert_eq!(
            date.instant,
            Utc.with_ymd_and_hms(2020, 1, 2, 1, 4, 5).unwrap()
        );
    }

    #[test]
    fn test_date_negative_offset() {
        let value = convert_date("2020-01-02T03:04:05-05:30");
        let date = match value {
            Value::Date(date) => date,
            other => panic!("expected date, got {:?}", other),
        };
        assert_eq!(date.timezone_offset, -330);
        assert_eq!(
            date.instant,
            Utc.with_ymd_and_hms(2020, 1, 2, 8, 34, 5).unwrap()
        );
    }

    #[test]
    fn test_date_defaults_missing_time_to_midnight() {
        let value = convert_date("2020-01-02");
        let date = match value {
            Value::Date(date) => date,
            other => panic!("expected date, got {:?}", other),
        };
        assert_eq!(date.timezone_offset, 0);
        assert_eq!(
            date.instant,
            Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_date_fractional_seconds() {
        let value = convert_date("2020-01-02T03:04:05.250Z");
        let date = match value {
            Value::Date(date) => date,
            other => panic!("expected date, got {:?}", other),
        };
        assert_eq!(
            date.instant,
            Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap()
                + Duration::milliseconds(250)
        );
    }

    #[test]
    fn test_unparseable_date_is_null() {
        assert_eq!(convert_date("not a date"), Value::Null);
    }

    #[test]
    fn test_date_display_round_trip() {
        let value = convert_date("2020-01-02T03:04:05+02:00");
        let date = match value {
            Value::Date(date) => date,
            other => panic!("expected date, got {:?}", other),
        };
        assert_eq!(format!("{}", date), "2020-01-02T03:04:05.000+02:00");
    }
}
