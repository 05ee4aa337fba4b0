//! Predicate builders for `$where` and `$having` clauses.
//!
//! A [`Where`] holds a template and its parameters. It is rendered through
//! the substitution engine only when [`ToSoql::to_soql`] is called.
//!
//! ```
//! use soda_query::prelude::*;
//!
//! let w = Where::and([Where::eq("a", "b"), Where::gt("c", 1)]).unwrap();
//! assert_eq!(w.to_soql().unwrap(), "(`a` = 'b' AND `c` > 1)");
//! ```

use crate::error::SodaResult;
use crate::field::FieldRef;
use crate::param::substitute;
use crate::render::ToSoql;
use crate::value::Value;

/// A boolean condition with still-unsubstituted parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Where {
    expr: String,
    params: Vec<Value>,
}

fn field_name(field: impl Into<FieldRef>) -> Value {
    Value::String(field.into().name().to_string())
}

impl Where {
    pub fn new(expr: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            expr: expr.into(),
            params,
        }
    }

    /// Raw template with positional parameters.
    pub fn expr<I, V>(expr: impl Into<String>, params: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::new(expr, params.into_iter().map(Into::into).collect())
    }

    pub fn template(&self) -> &str {
        &self.expr
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// `field = value`. A null value becomes `IS NULL`.
    pub fn eq(field: impl Into<FieldRef>, value: impl Into<Value>) -> Self {
        let value = value.into();
        if value.is_null() {
            return Self::is_null(field);
        }
        Self::new("?? = ?", vec![field_name(field), value])
    }

    /// `field != value`. A null value becomes `IS NOT NULL`.
    pub fn ne(field: impl Into<FieldRef>, value: impl Into<Value>) -> Self {
        let value = value.into();
        if value.is_null() {
            return Self::is_not_null(field);
        }
        Self::new("?? != ?", vec![field_name(field), value])
    }

    pub fn gt(field: impl Into<FieldRef>, value: impl Into<Value>) -> Self {
        Self::new("?? > ?", vec![field_name(field), value.into()])
    }

    pub fn gte(field: impl Into<FieldRef>, value: impl Into<Value>) -> Self {
        Self::new("?? >= ?", vec![field_name(field), value.into()])
    }

    pub fn lt(field: impl Into<FieldRef>, value: impl Into<Value>) -> Self {
        Self::new("?? < ?", vec![field_name(field), value.into()])
    }

    pub fn lte(field: impl Into<FieldRef>, value: impl Into<Value>) -> Self {
        Self::new("?? <= ?", vec![field_name(field), value.into()])
    }

    pub fn is_null(field: impl Into<FieldRef>) -> Self {
        Self::new("?? IS NULL", vec![field_name(field)])
    }

    pub fn is_not_null(field: impl Into<FieldRef>) -> Self {
        Self::new("?? IS NOT NULL", vec![field_name(field)])
    }

    /// `field in (...)`.
    ///
    /// Several values render as a list. A single value is used as is, so an
    /// array renders as a list while a scalar renders bare (`` `a` in 'b' ``).
    /// Existing callers depend on that shape.
    pub fn is_in<I, V>(field: impl Into<FieldRef>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::new("?? in ?", vec![field_name(field), membership(values)])
    }

    /// `field not in (...)`. Same single/multi handling as [`Where::is_in`].
    pub fn not_in<I, V>(field: impl Into<FieldRef>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::new("?? not in ?", vec![field_name(field), membership(values)])
    }

    pub fn like(field: impl Into<FieldRef>, value: impl Into<Value>) -> Self {
        Self::new("?? like ?", vec![field_name(field), value.into()])
    }

    pub fn not_like(field: impl Into<FieldRef>, value: impl Into<Value>) -> Self {
        Self::new("?? not like ?", vec![field_name(field), value.into()])
    }

    /// Inclusive range. Works on Number, Text and timestamp fields.
    pub fn between(
        field: impl Into<FieldRef>,
        start: impl Into<Value>,
        end: impl Into<Value>,
    ) -> Self {
        Self::new(
            "?? between ? and ?",
            vec![field_name(field), start.into(), end.into()],
        )
    }

    pub fn not_between(
        field: impl Into<FieldRef>,
        start: impl Into<Value>,
        end: impl Into<Value>,
    ) -> Self {
        Self::new(
            "?? not between ? and ?",
            vec![field_name(field), start.into(), end.into()],
        )
    }

    /// Records of a `Location` field inside the box spanned by its
    /// north-west and south-east corners.
    pub fn within_box(
        field: impl Into<FieldRef>,
        lat_nw: f64,
        lon_nw: f64,
        lat_se: f64,
        lon_se: f64,
    ) -> Self {
        Self::new(
            "within_box(??, ?, ?, ?, ?)",
            vec![
                field_name(field),
                lat_nw.into(),
                lon_nw.into(),
                lat_se.into(),
                lon_se.into(),
            ],
        )
    }

    /// Records of a `Location` field within `radius` meters of a point.
    pub fn within_circle(field: impl Into<FieldRef>, lat: f64, lon: f64, radius: f64) -> Self {
        Self::new(
            "within_circle(??, ?, ?, ?)",
            vec![field_name(field), lat.into(), lon.into(), radius.into()],
        )
    }

    /// Records inside a `MULTIPOLYGON (...)` WKT shape.
    pub fn within_polygon(field: impl Into<FieldRef>, wkt: &str) -> Self {
        Self::new("within_polygon(??, ?)", vec![field_name(field), wkt.into()])
    }

    /// Text fields starting with `value`.
    pub fn starts_with(field: impl Into<FieldRef>, value: &str) -> Self {
        Self::new("starts_with(??, ?)", vec![field_name(field), value.into()])
    }

    /// Geometry intersection. `wkt` is e.g. `POINT (...)` or `POLYGON (...)`.
    /// Only available on 2.1 endpoints.
    pub fn intersects(field: impl Into<FieldRef>, wkt: &str) -> Self {
        Self::new("intersects(??, ?)", vec![field_name(field), wkt.into()])
    }

    /// Join rendered predicates with `AND` inside one pair of parentheses.
    pub fn and<I, W>(items: I) -> SodaResult<Self>
    where
        I: IntoIterator<Item = W>,
        W: Into<Option<Where>>,
    {
        Self::join(items, " AND ")
    }

    /// Join rendered predicates with `OR` inside one pair of parentheses.
    pub fn or<I, W>(items: I) -> SodaResult<Self>
    where
        I: IntoIterator<Item = W>,
        W: Into<Option<Where>>,
    {
        Self::join(items, " OR ")
    }

    fn join<I, W>(items: I, sep: &str) -> SodaResult<Self>
    where
        I: IntoIterator<Item = W>,
        W: Into<Option<Where>>,
    {
        let mut parts = Vec::new();
        for item in items {
            if let Some(w) = item.into() {
                let rendered = w.to_soql()?;
                if !rendered.is_empty() {
                    parts.push(rendered);
                }
            }
        }
        Ok(Self::new(format!("({})", parts.join(sep)), Vec::new()))
    }

    /// One equality per entry, AND-ed in iteration order.
    pub fn from_map<I, K, V>(entries: I) -> SodaResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<FieldRef>,
        V: Into<Value>,
    {
        Self::and(entries.into_iter().map(|(k, v)| Self::eq(k, v)))
    }

    /// Bind a field once and build predicates against it.
    pub fn field(field: impl Into<FieldRef>) -> FieldFilter {
        FieldFilter {
            field: field.into(),
        }
    }
}

fn membership<I, V>(values: I) -> Value
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    let mut values: Vec<Value> = values.into_iter().map(Into::into).collect();
    match values.len() {
        0 => Value::Null,
        1 => values.remove(0),
        _ => Value::Array(values),
    }
}

impl ToSoql for Where {
    fn to_soql(&self) -> SodaResult<String> {
        substitute(&self.expr, &self.params)
    }
}

/// Predicate constructors bound to one field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    field: FieldRef,
}

impl FieldFilter {
    pub fn eq(&self, value: impl Into<Value>) -> Where {
        Where::eq(&self.field, value)
    }

    pub fn ne(&self, value: impl Into<Value>) -> Where {
        Where::ne(&self.field, value)
    }

    pub fn gt(&self, value: impl Into<Value>) -> Where {
        Where::gt(&self.field, value)
    }

    pub fn gte(&self, value: impl Into<Value>) -> Where {
        Where::gte(&self.field, value)
    }

    pub fn lt(&self, value: impl Into<Value>) -> Where {
        Where::lt(&self.field, value)
    }

    pub fn lte(&self, value: impl Into<Value>) -> Where {
        Where::lte(&self.field, value)
    }

    pub fn is_null(&self) -> Where {
        Where::is_null(&self.field)
    }

    pub fn is_not_null(&self) -> Where {
        Where::is_not_null(&self.field)
    }

    pub fn is_in<I, V>(&self, values: I) -> Where
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Where::is_in(&self.field, values)
    }

    pub fn not_in<I, V>(&self, values: I) -> Where
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Where::not_in(&self.field, values)
    }

    pub fn like(&self, value: impl Into<Value>) -> Where {
        Where::like(&self.field, value)
    }

    pub fn not_like(&self, value: impl Into<Value>) -> Where {
        Where::not_like(&self.field, value)
    }

    pub fn between(&self, start: impl Into<Value>, end: impl Into<Value>) -> Where {
        Where::between(&self.field, start, end)
    }

    pub fn not_between(&self, start: impl Into<Value>, end: impl Into<Value>) -> Where {
        Where::not_between(&self.field, start, end)
    }

    pub fn within_box(&self, lat_nw: f64, lon_nw: f64, lat_se: f64, lon_se: f64) -> Where {
        Where::within_box(&self.field, lat_nw, lon_nw, lat_se, lon_se)
    }

    pub fn within_circle(&self, lat: f64, lon: f64, radius: f64) -> Where {
        Where::within_circle(&self.field, lat, lon, radius)
    }

    pub fn within_polygon(&self, wkt: &str) -> Where {
        Where::within_polygon(&self.field, wkt)
    }

    pub fn starts_with(&self, value: &str) -> Where {
        Where::starts_with(&self.field, value)
    }

    pub fn intersects(&self, wkt: &str) -> Where {
        Where::intersects(&self.field, wkt)
    }
}
