//! `$select` expression builder.
//!
//! Every transform is checked against the allow-list returned by
//! [`SelectFunction::allowed_types`] before it is applied. Bare field names
//! carry [`DataType::Unknown`] and pass every check.

use std::fmt;

use crate::error::{SodaError, SodaResult};
use crate::field::{DataType, FieldRef};
use crate::render::ToSoql;
use crate::value::{format_value, Value};

/// SoQL functions usable in `$select`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectFunction {
    /// The bare field, no function applied.
    Field,
    Abs,
    Avg,
    Count,
    ConvexHull,
    DateExtractDayOfDate,
    DateExtractDayOfWeek,
    DateExtractHourOfDay,
    DateExtractMonth,
    DateExtractMinute,
    DateExtractSeconds,
    DateExtractWeekOfYear,
    DateExtractYear,
    DateTruncYear,
    DateTruncYearMonth,
    DateTruncYearMonthDay,
    DistanceInMeters,
    Distinct,
    Extent,
    Greatest,
    Least,
    Length,
    Ln,
    LowerCase,
    Max,
    Min,
    NumberOfVertices,
    PadLeft,
    PadRight,
    RegrIntercept,
    RegrR2,
    RegrSlope,
    Simplify,
    SimplifyPreserveTopology,
    StddevPop,
    StddevSamp,
    Sum,
    UpperCase,
}

const NUMBER: &[DataType] = &[DataType::Number];
const TEXT: &[DataType] = &[DataType::Text];
const FLOATING: &[DataType] = &[DataType::FloatingTimestamp];
const POINT: &[DataType] = &[DataType::Point];
const ORDERABLE: &[DataType] = &[
    DataType::Number,
    DataType::Text,
    DataType::FloatingTimestamp,
    DataType::FixedTimestamp,
];
const COMPARABLE: &[DataType] = &[DataType::Text, DataType::Number, DataType::FloatingTimestamp];
const SHAPES: &[DataType] = &[
    DataType::Line,
    DataType::MultiLine,
    DataType::Polygon,
    DataType::MultiPolygon,
];

impl SelectFunction {
    /// SoQL function name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectFunction::Field => "field",
            SelectFunction::Abs => "abs",
            SelectFunction::Avg => "avg",
            SelectFunction::Count => "count",
            SelectFunction::ConvexHull => "convex_hull",
            SelectFunction::DateExtractDayOfDate => "date_extract_d",
            SelectFunction::DateExtractDayOfWeek => "date_extract_dow",
            SelectFunction::DateExtractHourOfDay => "date_extract_hh",
            SelectFunction::DateExtractMonth => "date_extract_m",
            SelectFunction::DateExtractMinute => "date_extract_mm",
            SelectFunction::DateExtractSeconds => "date_extract_ss",
            SelectFunction::DateExtractWeekOfYear => "date_extract_woy",
            SelectFunction::DateExtractYear => "date_extract_y",
            SelectFunction::DateTruncYear => "date_trunc_y",
            SelectFunction::DateTruncYearMonth => "date_trunc_ym",
            SelectFunction::DateTruncYearMonthDay => "date_trunc_ymd",
            SelectFunction::DistanceInMeters => "distance_in_meters",
            SelectFunction::Distinct => "distinct",
            SelectFunction::Extent => "extent",
            SelectFunction::Greatest => "greatest",
            SelectFunction::Least => "least",
            SelectFunction::Length => "length",
            SelectFunction::Ln => "ln",
            SelectFunction::LowerCase => "lower",
            SelectFunction::Max => "max",
            SelectFunction::Min => "min",
            SelectFunction::NumberOfVertices => "num_points",
            SelectFunction::PadLeft => "pad_left",
            SelectFunction::PadRight => "pad_right",
            SelectFunction::RegrIntercept => "regr_intercept",
            SelectFunction::RegrR2 => "regr_r2",
            SelectFunction::RegrSlope => "regr_slope",
            SelectFunction::Simplify => "simplify",
            SelectFunction::SimplifyPreserveTopology => "simplify_preserve_topology",
            SelectFunction::StddevPop => "stddev_pop",
            SelectFunction::StddevSamp => "stddev_samp",
            SelectFunction::Sum => "sum",
            SelectFunction::UpperCase => "upper",
        }
    }

    /// Field types this function accepts. `None` means any field, `*` included.
    pub fn allowed_types(&self) -> Option<&'static [DataType]> {
        use SelectFunction::*;
        match self {
            Field | Count | Distinct => None,
            Abs | Avg | Sum | Ln | StddevPop | StddevSamp => Some(NUMBER),
            RegrIntercept | RegrR2 | RegrSlope => Some(NUMBER),
            Min | Max => Some(ORDERABLE),
            Greatest | Least => Some(COMPARABLE),
            DateExtractDayOfDate | DateExtractDayOfWeek | DateExtractHourOfDay
            | DateExtractMonth | DateExtractMinute | DateExtractSeconds
            | DateExtractWeekOfYear | DateExtractYear => Some(FLOATING),
            DateTruncYear | DateTruncYearMonth | DateTruncYearMonthDay => Some(FLOATING),
            DistanceInMeters => Some(POINT),
            LowerCase | UpperCase | Length | PadLeft | PadRight => Some(TEXT),
            ConvexHull | NumberOfVertices | Extent => Some(DataType::GEOMETRY),
            Simplify | SimplifyPreserveTopology => Some(SHAPES),
        }
    }

    /// Fail unless `field` may be passed to this function.
    pub fn check(&self, field: &FieldRef) -> SodaResult<()> {
        let Some(allowed) = self.allowed_types() else {
            return Ok(());
        };
        if field.is_wildcard() {
            return Err(SodaError::WildcardFunction(*self));
        }
        let (name, data_type) = field.parts();
        if !data_type.accepts(allowed) {
            return Err(SodaError::incompatible(*self, name, data_type, allowed));
        }
        Ok(())
    }
}

impl fmt::Display for SelectFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_ascii_uppercase())
    }
}

/// Side to pad text on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadSide {
    Left,
    Right,
}

/// One `$select` entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    field: FieldRef,
    alias: Option<String>,
    function: SelectFunction,
    extra: Option<String>,
}

impl Default for Select {
    fn default() -> Self {
        Self::all()
    }
}

impl Select {
    /// Select a single field.
    pub fn new(field: impl Into<FieldRef>) -> SodaResult<Self> {
        Ok(Self::bare(field.into().validate()?))
    }

    /// `*`
    pub fn all() -> Self {
        Self::bare(FieldRef::Name("*".to_string()))
    }

    /// Build from a JSON field argument; `null` selects `*`.
    pub fn from_json(value: &serde_json::Value) -> SodaResult<Self> {
        if value.is_null() {
            return Ok(Self::all());
        }
        Self::new(FieldRef::try_from(value)?)
    }

    fn bare(field: FieldRef) -> Self {
        Self {
            field,
            alias: None,
            function: SelectFunction::Field,
            extra: None,
        }
    }

    pub fn field_name(&self) -> &str {
        self.field.name()
    }

    pub fn function(&self) -> SelectFunction {
        self.function
    }

    /// `<expr> as <alias>`. Not allowed on `*`.
    pub fn with_alias(mut self, alias: impl Into<String>) -> SodaResult<Self> {
        if self.field.is_wildcard() {
            return Err(SodaError::CannotAliasWildcard);
        }
        self.alias = Some(alias.into());
        Ok(self)
    }

    /// Apply any function with pre-rendered extra arguments.
    pub fn with_function(mut self, function: SelectFunction, extra: Option<String>) -> SodaResult<Self> {
        function.check(&self.field)?;
        self.function = function;
        self.extra = extra;
        Ok(self)
    }

    fn apply(self, function: SelectFunction) -> SodaResult<Self> {
        self.with_function(function, None)
    }

    pub fn abs(self) -> SodaResult<Self> {
        self.apply(SelectFunction::Abs)
    }

    /// Docs: <https://dev.socrata.com/docs/functions/avg.html>
    pub fn avg(self) -> SodaResult<Self> {
        self.apply(SelectFunction::Avg)
    }

    pub fn sum(self) -> SodaResult<Self> {
        self.apply(SelectFunction::Sum)
    }

    /// Works like `COUNT(*)` on `*`.
    pub fn count(self) -> SodaResult<Self> {
        self.apply(SelectFunction::Count)
    }

    pub fn distinct(self) -> SodaResult<Self> {
        self.apply(SelectFunction::Distinct)
    }

    pub fn min(self) -> SodaResult<Self> {
        self.apply(SelectFunction::Min)
    }

    pub fn max(self) -> SodaResult<Self> {
        self.apply(SelectFunction::Max)
    }

    pub fn ln(self) -> SodaResult<Self> {
        self.apply(SelectFunction::Ln)
    }

    pub fn stddev_pop(self) -> SodaResult<Self> {
        self.apply(SelectFunction::StddevPop)
    }

    pub fn stddev_samp(self) -> SodaResult<Self> {
        self.apply(SelectFunction::StddevSamp)
    }

    /// Day of the month as an integer.
    pub fn date_extract_day_of_date(self) -> SodaResult<Self> {
        self.apply(SelectFunction::DateExtractDayOfDate)
    }

    /// Day of the week, 0 to 6.
    pub fn date_extract_day_of_week(self) -> SodaResult<Self> {
        self.apply(SelectFunction::DateExtractDayOfWeek)
    }

    /// Hour of the day, 0 to 23.
    pub fn date_extract_hour_of_day(self) -> SodaResult<Self> {
        self.apply(SelectFunction::DateExtractHourOfDay)
    }

    pub fn date_extract_month(self) -> SodaResult<Self> {
        self.apply(SelectFunction::DateExtractMonth)
    }

    pub fn date_extract_minute(self) -> SodaResult<Self> {
        self.apply(SelectFunction::DateExtractMinute)
    }

    pub fn date_extract_seconds(self) -> SodaResult<Self> {
        self.apply(SelectFunction::DateExtractSeconds)
    }

    /// Week of the year, 0 to 51.
    pub fn date_extract_week_of_year(self) -> SodaResult<Self> {
        self.apply(SelectFunction::DateExtractWeekOfYear)
    }

    pub fn date_extract_year(self) -> SodaResult<Self> {
        self.apply(SelectFunction::DateExtractYear)
    }

    pub fn date_trunc_year(self) -> SodaResult<Self> {
        self.apply(SelectFunction::DateTruncYear)
    }

    pub fn date_trunc_year_month(self) -> SodaResult<Self> {
        self.apply(SelectFunction::DateTruncYearMonth)
    }

    pub fn date_trunc_year_month_day(self) -> SodaResult<Self> {
        self.apply(SelectFunction::DateTruncYearMonthDay)
    }

    /// Distance from a Point field to (`lat`, `lon`).
    pub fn distance_in_meters(self, lat: f64, lon: f64) -> SodaResult<Self> {
        self.with_function(
            SelectFunction::DistanceInMeters,
            Some(format!("'POINT({}, {})'", lon, lat)),
        )
    }

    pub fn lower(self) -> SodaResult<Self> {
        self.apply(SelectFunction::LowerCase)
    }

    pub fn upper(self) -> SodaResult<Self> {
        self.apply(SelectFunction::UpperCase)
    }

    pub fn length(self) -> SodaResult<Self> {
        self.apply(SelectFunction::Length)
    }

    /// Pad text to `length` with `pad`.
    pub fn pad(self, length: u32, pad: &str, side: PadSide) -> SodaResult<Self> {
        let function = match side {
            PadSide::Left => SelectFunction::PadLeft,
            PadSide::Right => SelectFunction::PadRight,
        };
        let pad = format_value(&Value::from(pad))?;
        self.with_function(function, Some(format!("{}, {}", length, pad)))
    }

    pub fn pad_left(self, length: u32, pad: &str) -> SodaResult<Self> {
        self.pad(length, pad, PadSide::Left)
    }

    pub fn pad_right(self, length: u32, pad: &str) -> SodaResult<Self> {
        self.pad(length, pad, PadSide::Right)
    }

    /// Smallest convex geometry enclosing all points.
    pub fn convex_hull(self) -> SodaResult<Self> {
        self.apply(SelectFunction::ConvexHull)
    }

    pub fn num_points(self) -> SodaResult<Self> {
        self.apply(SelectFunction::NumberOfVertices)
    }

    /// Reduce vertices of a line or polygon. `tolerance` is in meters.
    pub fn simplify(self, tolerance: f64) -> SodaResult<Self> {
        self.with_function(SelectFunction::Simplify, Some(tolerance.to_string()))
    }

    pub fn simplify_preserve_topology(self, tolerance: f64) -> SodaResult<Self> {
        self.with_function(
            SelectFunction::SimplifyPreserveTopology,
            Some(tolerance.to_string()),
        )
    }

    /// Bounding box of a set of geometries.
    pub fn extent(self) -> SodaResult<Self> {
        self.apply(SelectFunction::Extent)
    }

    /// Largest value among the fields, ignoring NULLs.
    pub fn greatest<I, F>(fields: I) -> SodaResult<Self>
    where
        I: IntoIterator<Item = F>,
        F: Into<FieldRef>,
    {
        Self::multi(SelectFunction::Greatest, fields)
    }

    /// Smallest value among the fields, ignoring NULLs.
    pub fn least<I, F>(fields: I) -> SodaResult<Self>
    where
        I: IntoIterator<Item = F>,
        F: Into<FieldRef>,
    {
        Self::multi(SelectFunction::Least, fields)
    }

    /// y-intercept of the least squares fit.
    pub fn regr_intercept(x: impl Into<FieldRef>, y: impl Into<FieldRef>) -> SodaResult<Self> {
        Self::multi(SelectFunction::RegrIntercept, [x.into(), y.into()])
    }

    /// Square of the correlation coefficient.
    pub fn regr_r2(x: impl Into<FieldRef>, y: impl Into<FieldRef>) -> SodaResult<Self> {
        Self::multi(SelectFunction::RegrR2, [x.into(), y.into()])
    }

    /// Slope of the least squares fit.
    pub fn regr_slope(x: impl Into<FieldRef>, y: impl Into<FieldRef>) -> SodaResult<Self> {
        Self::multi(SelectFunction::RegrSlope, [x.into(), y.into()])
    }

    fn multi<I, F>(function: SelectFunction, fields: I) -> SodaResult<Self>
    where
        I: IntoIterator<Item = F>,
        F: Into<FieldRef>,
    {
        let fields: Vec<FieldRef> = fields.into_iter().map(Into::into).collect();
        if fields.len() < 2 {
            return Err(SodaError::TooFewFields {
                function,
                required: 2,
                found: fields.len(),
            });
        }
        for field in &fields {
            function.check(field)?;
        }

        let mut fields = fields.into_iter();
        let Some(first) = fields.next() else {
            return Err(SodaError::invalid_field("no fields given"));
        };
        let rest = fields
            .map(|f| f.name().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        Self::new(first)?.with_function(function, Some(rest))
    }
}

impl fmt::Display for Select {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.field.name();
        match (self.function, &self.extra) {
            (SelectFunction::Field, _) => f.write_str(name)?,
            (function, Some(extra)) => write!(f, "{}({}, {})", function.as_str(), name, extra)?,
            (function, None) => write!(f, "{}({})", function.as_str(), name)?,
        }
        if let Some(alias) = &self.alias {
            write!(f, " as {}", alias)?;
        }
        Ok(())
    }
}

impl ToSoql for Select {
    fn to_soql(&self) -> SodaResult<String> {
        Ok(self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Field;
    use pretty_assertions::assert_eq;

    fn typed(data_type: DataType) -> Select {
        Select::new(Field::new("test", data_type)).unwrap()
    }

    fn is_incompatible<T: fmt::Debug>(result: SodaResult<T>) -> bool {
        matches!(result, Err(SodaError::IncompatibleFieldType { .. }))
    }

    #[test]
    fn test_empty() {
        let select = Select::default();
        assert_eq!(select.field_name(), "*");
        assert_eq!(select.to_string(), "*");
        assert_eq!(Select::all().to_soql().unwrap(), "*");
    }

    #[test]
    fn test_invalid_field() {
        assert_eq!(Select::new("").unwrap().to_string(), "");
        assert!(matches!(
            Select::new(Field::new("", DataType::Number)),
            Err(SodaError::InvalidField(_))
        ));
        assert!(matches!(
            Select::from_json(&serde_json::json!(1)),
            Err(SodaError::InvalidField(_))
        ));
        assert_eq!(Select::from_json(&serde_json::Value::Null).unwrap().to_string(), "*");
        assert_eq!(
            Select::from_json(&serde_json::json!({"name": "n", "type": "number"}))
                .unwrap()
                .avg()
                .unwrap()
                .to_string(),
            "avg(n)"
        );
    }

    #[test]
    fn test_with_function() {
        let select = Select::new("test")
            .unwrap()
            .with_function(SelectFunction::Ln, Some("test".into()))
            .unwrap();
        assert_eq!(select.field_name(), "test");
        assert_eq!(select.to_string(), "ln(test, test)");

        let select = select.with_function(SelectFunction::Ln, None).unwrap();
        assert_eq!(select.to_string(), "ln(test)");
    }

    #[test]
    fn test_plain_fields() {
        assert_eq!(Select::new("test").unwrap().to_string(), "test");
        assert_eq!(typed(DataType::Text).to_string(), "test");
    }

    #[test]
    fn test_count_and_distinct() {
        let select = typed(DataType::Number).count().unwrap();
        assert_eq!(select.field_name(), "test");
        assert_eq!(select.to_string(), "count(test)");
        assert_eq!(typed(DataType::Number).distinct().unwrap().to_string(), "distinct(test)");
        assert_eq!(Select::all().count().unwrap().to_string(), "count(*)");
    }

    #[test]
    fn test_alias() {
        let select = typed(DataType::Number).with_alias("test2").unwrap();
        assert_eq!(select.field_name(), "test");
        assert_eq!(select.to_string(), "test as test2");

        let select = typed(DataType::Number).sum().unwrap().with_alias("total").unwrap();
        assert_eq!(select.to_string(), "sum(test) as total");

        assert!(matches!(
            Select::all().with_alias("test2"),
            Err(SodaError::CannotAliasWildcard)
        ));
    }

    #[test]
    fn test_wildcard_functions() {
        assert!(matches!(
            Select::all().avg(),
            Err(SodaError::WildcardFunction(SelectFunction::Avg))
        ));
    }

    #[test]
    fn test_number_functions() {
        let number = || typed(DataType::Number);

        assert_eq!(number().avg().unwrap().to_string(), "avg(test)");
        assert!(is_incompatible(typed(DataType::Text).avg()));

        assert_eq!(number().abs().unwrap().to_string(), "abs(test)");
        assert!(is_incompatible(typed(DataType::Text).abs()));

        assert_eq!(number().min().unwrap().to_string(), "min(test)");
        assert!(is_incompatible(typed(DataType::Checkbox).min()));

        assert_eq!(number().max().unwrap().to_string(), "max(test)");
        assert!(is_incompatible(typed(DataType::Checkbox).max()));

        assert_eq!(number().sum().unwrap().to_string(), "sum(test)");
        assert!(is_incompatible(typed(DataType::Text).sum()));

        assert_eq!(number().stddev_pop().unwrap().to_string(), "stddev_pop(test)");
        assert!(is_incompatible(typed(DataType::Text).stddev_pop()));

        assert_eq!(number().stddev_samp().unwrap().to_string(), "stddev_samp(test)");
        assert!(is_incompatible(typed(DataType::Text).stddev_samp()));

        assert_eq!(number().ln().unwrap().to_string(), "ln(test)");
    }

    #[test]
    fn test_unknown_passes() {
        assert_eq!(typed(DataType::Unknown).avg().unwrap().to_string(), "avg(test)");
        assert_eq!(Select::new("test").unwrap().avg().unwrap().to_string(), "avg(test)");
        assert_eq!(
            Select::new("test").unwrap().convex_hull().unwrap().to_string(),
            "convex_hull(test)"
        );
    }

    #[test]
    fn test_min_max_timestamps() {
        assert_eq!(typed(DataType::FixedTimestamp).max().unwrap().to_string(), "max(test)");
        assert_eq!(typed(DataType::Text).min().unwrap().to_string(), "min(test)");
    }

    #[test]
    fn test_date_extraction() {
        let ts = || typed(DataType::FloatingTimestamp);
        let cases: [(fn(Select) -> SodaResult<Select>, &str); 8] = [
            (Select::date_extract_day_of_date, "date_extract_d(test)"),
            (Select::date_extract_day_of_week, "date_extract_dow(test)"),
            (Select::date_extract_hour_of_day, "date_extract_hh(test)"),
            (Select::date_extract_month, "date_extract_m(test)"),
            (Select::date_extract_minute, "date_extract_mm(test)"),
            (Select::date_extract_seconds, "date_extract_ss(test)"),
            (Select::date_extract_week_of_year, "date_extract_woy(test)"),
            (Select::date_extract_year, "date_extract_y(test)"),
        ];
        for (apply, expected) in cases {
            assert_eq!(apply(ts()).unwrap().to_string(), expected);
            assert!(is_incompatible(apply(typed(DataType::Text))));
        }
    }

    #[test]
    fn test_date_truncation() {
        let ts = || typed(DataType::FloatingTimestamp);
        assert_eq!(ts().date_trunc_year().unwrap().to_string(), "date_trunc_y(test)");
        assert_eq!(ts().date_trunc_year_month().unwrap().to_string(), "date_trunc_ym(test)");
        assert_eq!(
            ts().date_trunc_year_month_day().unwrap().to_string(),
            "date_trunc_ymd(test)"
        );
        assert!(is_incompatible(typed(DataType::Text).date_trunc_year()));
        assert!(is_incompatible(typed(DataType::FixedTimestamp).date_trunc_year_month()));
    }

    #[test]
    fn test_text_functions() {
        let text = || typed(DataType::Text);

        assert_eq!(text().lower().unwrap().to_string(), "lower(test)");
        assert!(is_incompatible(typed(DataType::Number).lower()));

        assert_eq!(text().upper().unwrap().to_string(), "upper(test)");
        assert!(is_incompatible(typed(DataType::Number).upper()));

        assert_eq!(text().length().unwrap().to_string(), "length(test)");
        assert!(is_incompatible(typed(DataType::Number).length()));

        assert_eq!(text().pad_left(1, "a").unwrap().to_string(), "pad_left(test, 1, 'a')");
        assert!(is_incompatible(typed(DataType::Number).pad_left(1, "a")));

        assert_eq!(
            text().pad(1, "a", PadSide::Right).unwrap().to_string(),
            "pad_right(test, 1, 'a')"
        );
        assert_eq!(text().pad_right(3, "'").unwrap().to_string(), r"pad_right(test, 3, '\'')");
    }

    #[test]
    fn test_spatial_functions() {
        let point = || typed(DataType::Point);

        assert_eq!(
            point().distance_in_meters(0.0, 0.0).unwrap().to_string(),
            "distance_in_meters(test, 'POINT(0, 0)')"
        );
        assert_eq!(
            point().distance_in_meters(1.5, -2.0).unwrap().to_string(),
            "distance_in_meters(test, 'POINT(-2, 1.5)')"
        );
        assert!(is_incompatible(typed(DataType::Text).distance_in_meters(0.0, 0.0)));

        assert_eq!(point().convex_hull().unwrap().to_string(), "convex_hull(test)");
        assert!(is_incompatible(typed(DataType::Text).convex_hull()));

        assert_eq!(point().num_points().unwrap().to_string(), "num_points(test)");
        assert!(is_incompatible(typed(DataType::Text).num_points()));

        assert_eq!(
            typed(DataType::Line).simplify(0.1).unwrap().to_string(),
            "simplify(test, 0.1)"
        );
        assert!(is_incompatible(typed(DataType::Point).simplify(0.1)));

        assert_eq!(
            typed(DataType::Line).simplify_preserve_topology(0.1).unwrap().to_string(),
            "simplify_preserve_topology(test, 0.1)"
        );
        assert!(is_incompatible(typed(DataType::Text).simplify_preserve_topology(0.1)));

        assert_eq!(typed(DataType::Line).extent().unwrap().to_string(), "extent(test)");
        assert!(is_incompatible(typed(DataType::Text).extent()));
    }

    #[test]
    fn test_greatest_least() {
        let number = || Field::new("test", DataType::Number);

        let select = Select::greatest([number(), number()]).unwrap();
        assert_eq!(select.field_name(), "test");
        assert_eq!(select.to_string(), "greatest(test, test)");
        assert_eq!(Select::least([number(), number()]).unwrap().to_string(), "least(test, test)");
        assert_eq!(
            Select::greatest(["a", "b", "c"]).unwrap().to_string(),
            "greatest(a, b, c)"
        );

        assert!(is_incompatible(Select::greatest([
            Field::new("test", DataType::Text),
            Field::new("test", DataType::Checkbox),
        ])));
        assert!(is_incompatible(Select::least([
            Field::new("test", DataType::Text),
            Field::new("test", DataType::Checkbox),
        ])));
        assert!(matches!(
            Select::greatest(["a"]),
            Err(SodaError::TooFewFields { found: 1, .. })
        ));
    }

    #[test]
    fn test_regression() {
        let number = || Field::new("test", DataType::Number);
        let bad = || Field::new("test", DataType::Checkbox);

        assert_eq!(
            Select::regr_intercept(number(), number()).unwrap().to_string(),
            "regr_intercept(test, test)"
        );
        assert_eq!(Select::regr_slope(number(), number()).unwrap().to_string(), "regr_slope(test, test)");
        assert_eq!(Select::regr_r2(number(), number()).unwrap().to_string(), "regr_r2(test, test)");
        assert_eq!(Select::regr_r2("x", "y").unwrap().to_string(), "regr_r2(x, y)");

        assert!(is_incompatible(Select::regr_intercept(Field::new("test", DataType::Text), bad())));
        assert!(is_incompatible(Select::regr_slope(number(), bad())));
        assert!(is_incompatible(Select::regr_r2(bad(), number())));
    }

    #[test]
    fn test_idempotent_render() {
        let select = typed(DataType::Number).avg().unwrap().with_alias("a").unwrap();
        assert_eq!(select.to_soql().unwrap(), select.to_soql().unwrap());
    }
}
