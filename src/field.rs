//! Dataset fields and their SODA data types.
//!
//! Builders accept either a bare column name or a typed [`Field`]. Both are
//! normalised through [`FieldRef::parts`], which yields the name plus a
//! [`DataType`]; bare names carry [`DataType::Unknown`] and pass every
//! type check.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{SodaError, SodaResult};

/// The data type of a dataset column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Checkbox,
    FixedTimestamp,
    FloatingTimestamp,
    Line,
    Location,
    #[serde(rename = "multiline")]
    MultiLine,
    #[serde(rename = "multipoint")]
    MultiPoint,
    #[serde(rename = "multipolygon")]
    MultiPolygon,
    Number,
    Point,
    Polygon,
    Text,
    Url,
    /// Only used when retrieving row ids.
    RowIdentifier,
    /// Untyped column. Always passes type checks.
    #[serde(rename = "_unknown")]
    Unknown,
}

impl DataType {
    /// Every geometry type.
    pub const GEOMETRY: &'static [DataType] = &[
        DataType::Point,
        DataType::MultiPoint,
        DataType::Line,
        DataType::MultiLine,
        DataType::Polygon,
        DataType::MultiPolygon,
    ];

    /// Wire name as used by the SODA API.
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Checkbox => "checkbox",
            DataType::FixedTimestamp => "fixed_timestamp",
            DataType::FloatingTimestamp => "floating_timestamp",
            DataType::Line => "line",
            DataType::Location => "location",
            DataType::MultiLine => "multiline",
            DataType::MultiPoint => "multipoint",
            DataType::MultiPolygon => "multipolygon",
            DataType::Number => "number",
            DataType::Point => "point",
            DataType::Polygon => "polygon",
            DataType::Text => "text",
            DataType::Url => "url",
            DataType::RowIdentifier => "row_identifier",
            DataType::Unknown => "_unknown",
        }
    }

    /// Human-readable name used in error messages.
    pub fn label(&self) -> &'static str {
        match self {
            DataType::Checkbox => "Checkbox",
            DataType::FixedTimestamp => "Fixed Timestamp",
            DataType::FloatingTimestamp => "Floating Timestamp",
            DataType::Line => "Line",
            DataType::Location => "Location",
            DataType::MultiLine => "MultiLine",
            DataType::MultiPoint => "MultiPoint",
            DataType::MultiPolygon => "MultiPolygon",
            DataType::Number => "Number",
            DataType::Point => "Point",
            DataType::Polygon => "Polygon",
            DataType::Text => "Text",
            DataType::Url => "URL",
            DataType::RowIdentifier => "Row Identifier",
            DataType::Unknown => "Unknown",
        }
    }

    /// Check this type against an allow-list. `Unknown` always passes.
    pub fn accepts(&self, allowed: &[DataType]) -> bool {
        *self == DataType::Unknown || allowed.contains(self)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = SodaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let data_type = match s.trim().to_ascii_lowercase().as_str() {
            "checkbox" => DataType::Checkbox,
            "fixed_timestamp" => DataType::FixedTimestamp,
            "floating_timestamp" => DataType::FloatingTimestamp,
            "line" => DataType::Line,
            "location" => DataType::Location,
            "multiline" => DataType::MultiLine,
            "multipoint" => DataType::MultiPoint,
            "multipolygon" => DataType::MultiPolygon,
            "number" => DataType::Number,
            "point" => DataType::Point,
            "polygon" => DataType::Polygon,
            "text" => DataType::Text,
            "url" => DataType::Url,
            "row_identifier" => DataType::RowIdentifier,
            "_unknown" | "unknown" => DataType::Unknown,
            other => return Err(SodaError::invalid_field(format!("unknown data type '{}'", other))),
        };
        Ok(data_type)
    }
}

/// A named, typed dataset column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type", default = "unknown_type")]
    pub data_type: DataType,
}

fn unknown_type() -> DataType {
    DataType::Unknown
}

impl Field {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }

    /// A field without type information.
    pub fn untyped(name: impl Into<String>) -> Self {
        Self::new(name, DataType::Unknown)
    }

    /// System field `:id`. Only works on 2.1 endpoints.
    pub fn id() -> Self {
        Self::new(":id", DataType::RowIdentifier)
    }

    /// System field `:created_at`. Only works on 2.1 endpoints.
    pub fn created_at() -> Self {
        Self::new(":created_at", DataType::FixedTimestamp)
    }

    /// System field `:updated_at`. Only works on 2.1 endpoints.
    pub fn updated_at() -> Self {
        Self::new(":updated_at", DataType::FixedTimestamp)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A field argument: either a bare name or a typed field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldRef {
    Name(String),
    Typed(Field),
}

impl FieldRef {
    /// Name and data type. Bare names report [`DataType::Unknown`].
    pub fn parts(&self) -> (&str, DataType) {
        match self {
            FieldRef::Name(name) => (name.as_str(), DataType::Unknown),
            FieldRef::Typed(field) => (field.name.as_str(), field.data_type),
        }
    }

    pub fn name(&self) -> &str {
        self.parts().0
    }

    pub fn data_type(&self) -> DataType {
        self.parts().1
    }

    pub fn is_wildcard(&self) -> bool {
        self.name() == "*"
    }

    /// Reject typed fields without a name. Plain names pass as given.
    pub fn validate(self) -> SodaResult<Self> {
        match &self {
            FieldRef::Typed(field) if field.name.trim().is_empty() => {
                Err(SodaError::invalid_field("field name is empty"))
            }
            _ => Ok(self),
        }
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<&str> for FieldRef {
    fn from(name: &str) -> Self {
        FieldRef::Name(name.to_string())
    }
}

impl From<String> for FieldRef {
    fn from(name: String) -> Self {
        FieldRef::Name(name)
    }
}

impl From<&String> for FieldRef {
    fn from(name: &String) -> Self {
        FieldRef::Name(name.clone())
    }
}

impl From<Field> for FieldRef {
    fn from(field: Field) -> Self {
        FieldRef::Typed(field)
    }
}

impl From<&Field> for FieldRef {
    fn from(field: &Field) -> Self {
        FieldRef::Typed(field.clone())
    }
}

impl From<&FieldRef> for FieldRef {
    fn from(field: &FieldRef) -> Self {
        field.clone()
    }
}

/// Field arguments arriving as JSON: a string, or `{"name": .., "type": ..}`.
impl TryFrom<&serde_json::Value> for FieldRef {
    type Error = SodaError;

    fn try_from(value: &serde_json::Value) -> Result<Self, Self::Error> {
        match value {
            serde_json::Value::String(name) => Ok(FieldRef::Name(name.clone())),
            serde_json::Value::Object(map) => {
                let name = map.get("name").and_then(|n| n.as_str());
                let data_type = map.get("type").and_then(|t| t.as_str());
                match (name, data_type) {
                    (Some(name), Some(data_type)) if !name.is_empty() => {
                        Ok(FieldRef::Typed(Field::new(name, data_type.parse()?)))
                    }
                    _ => Err(SodaError::invalid_field(value.to_string())),
                }
            }
            other => Err(SodaError::invalid_field(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_accepts() {
        assert!(DataType::Checkbox.accepts(&[DataType::Checkbox]));
        assert!(!DataType::Checkbox.accepts(&[DataType::Text]));
        assert!(DataType::Checkbox.accepts(&[DataType::Text, DataType::Checkbox]));
        assert!(DataType::Unknown.accepts(&[DataType::Number]));
        assert!(DataType::Unknown.accepts(&[]));
    }

    #[test]
    fn test_parts() {
        let bare = FieldRef::from("test");
        assert_eq!(bare.parts(), ("test", DataType::Unknown));

        let typed = FieldRef::from(Field::new("field", DataType::Checkbox));
        assert_eq!(typed.parts(), ("field", DataType::Checkbox));
        assert_eq!(typed.to_string(), "field");
    }

    #[test]
    fn test_field() {
        let field = Field::new("test", DataType::Checkbox);
        assert_eq!(field.name, "test");
        assert_eq!(field.data_type, DataType::Checkbox);
        assert_eq!(field.to_string(), "test");
        assert_eq!(Field::untyped("test2").data_type, DataType::Unknown);
    }

    #[test]
    fn test_system_fields() {
        assert_eq!(Field::id().name, ":id");
        assert_eq!(Field::id().data_type, DataType::RowIdentifier);
        assert_eq!(Field::created_at().data_type, DataType::FixedTimestamp);
        assert_eq!(Field::updated_at().name, ":updated_at");
    }

    #[test]
    fn test_data_type_names() {
        assert_eq!("multipolygon".parse::<DataType>().unwrap(), DataType::MultiPolygon);
        assert_eq!(DataType::FloatingTimestamp.to_string(), "floating_timestamp");
        assert!("blob".parse::<DataType>().is_err());

        let parsed: DataType = serde_json::from_value(json!("_unknown")).unwrap();
        assert_eq!(parsed, DataType::Unknown);
        assert_eq!(serde_json::to_value(DataType::MultiLine).unwrap(), json!("multiline"));
    }

    #[test]
    fn test_field_ref_from_json() {
        let named = FieldRef::try_from(&json!("a")).unwrap();
        assert_eq!(named, FieldRef::Name("a".into()));

        let typed = FieldRef::try_from(&json!({"name": "b", "type": "number"})).unwrap();
        assert_eq!(typed.parts(), ("b", DataType::Number));

        assert!(matches!(
            FieldRef::try_from(&json!(1)),
            Err(SodaError::InvalidField(_))
        ));
        assert!(matches!(
            FieldRef::try_from(&json!({"name": "c"})),
            Err(SodaError::InvalidField(_))
        ));
    }

    #[test]
    fn test_validate() {
        assert!(FieldRef::from("a").validate().is_ok());
        assert_eq!(FieldRef::from("").validate().unwrap(), FieldRef::from(""));
        assert!(matches!(
            FieldRef::from(Field::new("  ", DataType::Number)).validate(),
            Err(SodaError::InvalidField(_))
        ));
    }
}
