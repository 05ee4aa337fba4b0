//! Query parameter values and their SoQL literal form.
//!
//! [`format_value`] renders a value for a `?` placeholder and
//! [`format_identifier`] renders one for a `??` placeholder.

use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};
use regex::Regex;

use crate::error::{SodaError, SodaResult};

/// A parameter bound to a query template.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Calendar date and time, rendered without timezone conversion.
    DateTime(NaiveDateTime),
    Array(Vec<Value>),
    /// A column name. Only valid in identifier position.
    Identifier(String),
    /// Arbitrary JSON object. Cannot be rendered.
    Object(serde_json::Map<String, serde_json::Value>),
}

impl Value {
    /// Build an identifier value.
    pub fn ident(name: impl Into<String>) -> Self {
        Value::Identifier(name.into())
    }

    /// Short kind name used in errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) | Value::Float(_) => "number",
            Value::String(_) => "string",
            Value::DateTime(_) => "date",
            Value::Array(_) => "array",
            Value::Identifier(_) => "identifier",
            Value::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

/// Escape backslashes first, then single quotes.
pub fn escape_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Format a date as `YYYY-MM-DD HH:MM:SS.mmm`.
pub fn format_date(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}

/// Render a value in literal position.
pub fn format_value(value: &Value) -> SodaResult<String> {
    match value {
        Value::Null => Ok("NULL".to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Int(n) => Ok(n.to_string()),
        Value::Float(n) if n.is_finite() => Ok(n.to_string()),
        // inf and NaN have no SoQL spelling
        Value::Float(_) => Err(SodaError::UnsupportedValueType("number")),
        Value::String(s) => Ok(format!("'{}'", escape_string(s))),
        Value::DateTime(dt) => Ok(format!("'{}'", format_date(dt))),
        Value::Array(items) => {
            let parts = items.iter().map(format_value).collect::<SodaResult<Vec<_>>>()?;
            Ok(format!("({})", parts.join(",")))
        }
        Value::Identifier(_) | Value::Object(_) => Err(SodaError::UnsupportedValueType(value.kind())),
    }
}

fn alias_separator() -> &'static Regex {
    static ALIAS_RE: OnceLock<Regex> = OnceLock::new();
    ALIAS_RE.get_or_init(|| Regex::new(r"(?i) as ").expect("alias regex must compile"))
}

/// Render a value in identifier position.
///
/// - `*` stays bare
/// - `a.b` becomes `` `a`.`b` ``
/// - `a as b` (any case) becomes `` `a` AS `b` ``
/// - arrays become a parenthesised list of identifiers
pub fn format_identifier(value: &Value) -> SodaResult<String> {
    match value {
        Value::String(name) | Value::Identifier(name) => Ok(quote_identifier(name)),
        Value::Int(n) => Ok(quote_identifier(&n.to_string())),
        Value::Float(n) => Ok(quote_identifier(&n.to_string())),
        Value::Bool(b) => Ok(quote_identifier(&b.to_string())),
        Value::Array(items) => {
            let parts = items.iter().map(format_identifier).collect::<SodaResult<Vec<_>>>()?;
            Ok(format!("({})", parts.join(",")))
        }
        Value::Null | Value::DateTime(_) | Value::Object(_) => {
            Err(SodaError::UnsupportedValueType(value.kind()))
        }
    }
}

fn quote_identifier(name: &str) -> String {
    if name == "*" {
        return name.to_string();
    }
    if name.contains('.') {
        return name.split('.').map(quote_identifier).collect::<Vec<_>>().join(".");
    }
    let alias = alias_separator();
    if alias.is_match(name) {
        return alias.split(name).map(quote_identifier).collect::<Vec<_>>().join(" AS ");
    }
    format!("`{}`", name)
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v as f64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::String(v.clone())
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::DateTime(v.and_time(chrono::NaiveTime::MIN))
    }
}

/// Keeps the wall-clock fields of the source timezone.
impl<Tz: TimeZone> From<DateTime<Tz>> for Value {
    fn from(v: DateTime<Tz>) -> Self {
        Value::DateTime(v.naive_local())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(v: [T; N]) -> Self {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(map) => Value::Object(map),
        }
    }
}
