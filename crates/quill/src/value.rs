//! Literal values and the SQL type-coercion policy.
//!
//! Every value a builder embeds into SQL text goes through [`convert_types`],
//! which turns a [`Value`] into a literal using the connection's escaping
//! primitive:
//!
//! | value       | literal                                   |
//! |-------------|-------------------------------------------|
//! | integer     | `42` (unquoted)                           |
//! | text, float | `'text'`, `'1.5'` (quoted)                |
//! | bool        | `TRUE` / `FALSE`                          |
//! | null        | `NULL`                                    |
//! | list        | items joined by a space, quoted once      |
//! | date/time   | `'2024-01-31 13:45:00'`                   |
//! | other       | string form, quoted                       |
//!
//! Floats are quoted on purpose so the database parses the exact decimal text
//! instead of a lossy binary rendering.

use crate::connection::Connection;
use crate::error::DbResult;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

/// Format used for date/time literals.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A value that can be embedded into a SQL statement as a literal.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Integer, emitted unquoted
    Int(i64),
    /// Float, emitted as quoted text
    Float(f64),
    /// Text, emitted quoted
    Text(String),
    /// Boolean, emitted as `TRUE` / `FALSE`
    Bool(bool),
    /// SQL NULL
    Null,
    /// List of values, joined with spaces into a single quoted string
    List(Vec<Value>),
    /// Date/time, emitted as a quoted `YYYY-MM-DD HH:MM:SS` string
    DateTime(NaiveDateTime),
    /// Any other type, carried in its string form and emitted quoted
    Other(String),
}

impl Value {
    /// Wrap any displayable value as [`Value::Other`].
    pub fn other(value: impl std::fmt::Display) -> Self {
        Value::Other(value.to_string())
    }

    /// Check if this is [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Plain text form, used when a value is flattened into a list literal.
    pub fn as_text(&self) -> String {
        match self {
            Value::Int(n) => n.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Text(s) | Value::Other(s) => s.clone(),
            Value::Bool(true) => "1".to_string(),
            Value::Bool(false) | Value::Null => String::new(),
            Value::List(items) => join_text(items),
            Value::DateTime(dt) => dt.format(DATETIME_FORMAT).to_string(),
        }
    }
}

fn join_text(items: &[Value]) -> String {
    items.iter().map(Value::as_text).collect::<Vec<_>>().join(" ")
}

/// Convert a value into a SQL literal using `conn` for escaping.
pub fn convert_types(value: &Value, conn: &dyn Connection) -> String {
    match value {
        Value::Int(n) => n.to_string(),
        Value::Float(f) => conn.quote(&f.to_string()),
        Value::Text(s) => conn.quote(s),
        Value::Bool(true) => "TRUE".to_string(),
        Value::Bool(false) => "FALSE".to_string(),
        Value::Null => "NULL".to_string(),
        Value::List(items) => conn.quote(&join_text(items)),
        Value::DateTime(dt) => conn.quote(&dt.format(DATETIME_FORMAT).to_string()),
        Value::Other(s) => conn.quote(s),
    }
}

/// Convert a value using the registry's default connection.
///
/// Fails with [`crate::DbError::Connection`] when no default is registered.
pub fn convert_types_default(value: &Value) -> DbResult<String> {
    let conn = crate::registry::get()?;
    Ok(convert_types(value, conn.as_ref()))
}

// ==================== Conversions ====================

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Int(i64::from(v))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! impl_from_wide_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    match i64::try_from(v) {
                        Ok(n) => Value::Int(n),
                        Err(_) => Value::Other(v.to_string()),
                    }
                }
            }
        )*
    };
}

impl_from_wide_int!(u64, usize, isize, i128, u128);

impl From<f32> for Value {
    // Widening directly would expose binary noise (0.1f32 -> 0.10000000149011612),
    // so go through the f32's shortest decimal form.
    fn from(v: f32) -> Self {
        Value::Float(v.to_string().parse().unwrap_or(f64::from(v)))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::DateTime(v.and_time(NaiveTime::MIN))
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Value {
    fn from(v: DateTime<Tz>) -> Self {
        Value::DateTime(v.naive_local())
    }
}

impl From<uuid::Uuid> for Value {
    fn from(v: uuid::Uuid) -> Self {
        Value::Other(v.to_string())
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Other(v.to_string())
    }
}

#[cfg(feature = "rust_decimal")]
impl From<rust_decimal::Decimal> for Value {
    fn from(v: rust_decimal::Decimal) -> Self {
        Value::Other(v.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(v: [T; N]) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Clone + Into<Value>> From<&[T]> for Value {
    fn from(v: &[T]) -> Self {
        Value::List(v.iter().cloned().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeConnection;

    fn lit(v: impl Into<Value>) -> String {
        convert_types(&v.into(), &FakeConnection::new())
    }

    #[test]
    fn integers_are_unquoted() {
        assert_eq!(lit(42), "42");
        assert_eq!(lit(-7i64), "-7");
        assert_eq!(lit(0u8), "0");
    }

    #[test]
    fn oversized_integers_fall_back_to_quoted_text() {
        assert_eq!(lit(u64::MAX), "'18446744073709551615'");
        assert_eq!(lit(5u64), "5");
    }

    #[test]
    fn strings_and_floats_are_quoted() {
        assert_eq!(lit("active"), "'active'");
        assert_eq!(lit(String::from("O'Brien")), "'O''Brien'");
        assert_eq!(lit(1.5), "'1.5'");
        assert_eq!(lit(0.1f64), "'0.1'");
        assert_eq!(lit(2.0f64), "'2'");
    }

    #[test]
    fn f32_keeps_its_decimal_form() {
        assert_eq!(lit(0.1f32), "'0.1'");
        assert_eq!(lit(3.3f32), "'3.3'");
        assert_eq!(lit(-1.5f32), "'-1.5'");
        assert_eq!(lit(vec![0.1f32, 0.2f32]), "'0.1 0.2'");
    }

    #[test]
    fn booleans_and_null_are_tokens() {
        assert_eq!(lit(true), "TRUE");
        assert_eq!(lit(false), "FALSE");
        assert_eq!(lit(Value::Null), "NULL");
        assert_eq!(lit(None::<i32>), "NULL");
        assert_eq!(lit(Some(3)), "3");
    }

    #[test]
    fn lists_are_space_joined_and_quoted_once() {
        assert_eq!(lit(vec!["a", "b", "c"]), "'a b c'");
        assert_eq!(lit([1, 2, 3]), "'1 2 3'");
        assert_eq!(lit(vec![Value::Bool(true), Value::Bool(false), Value::Null]), "'1  '");
        assert_eq!(lit(Vec::<i32>::new()), "''");
    }

    #[test]
    fn datetimes_are_formatted_and_quoted() {
        let dt = NaiveDate::from_ymd_opt(2024, 1, 31)
            .unwrap()
            .and_hms_opt(13, 45, 9)
            .unwrap();
        assert_eq!(lit(dt), "'2024-01-31 13:45:09'");

        let date = NaiveDate::from_ymd_opt(2023, 12, 1).unwrap();
        assert_eq!(lit(date), "'2023-12-01 00:00:00'");

        let utc = chrono::Utc.with_ymd_and_hms(2020, 2, 29, 23, 59, 59).unwrap();
        assert_eq!(lit(utc), "'2020-02-29 23:59:59'");
    }

    #[test]
    fn other_types_are_string_cast_and_quoted() {
        let id = uuid::Uuid::nil();
        assert_eq!(lit(id), "'00000000-0000-0000-0000-000000000000'");
        assert_eq!(lit(serde_json::json!({"a": 1})), r#"'{"a":1}'"#);
        assert_eq!(lit(Value::other(3.25f32)), "'3.25'");
    }
}
