//! `$order` clause builder.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::SodaResult;
use crate::field::FieldRef;
use crate::render::ToSoql;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// One `$order` entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    field: String,
    direction: SortOrder,
}

/// A field waiting for its sort direction.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    field: String,
}

impl Order {
    /// `Order::by("a").desc()`
    pub fn by(field: impl Into<FieldRef>) -> OrderBy {
        OrderBy {
            field: field.into().name().to_string(),
        }
    }

    pub fn direction(&self) -> SortOrder {
        self.direction
    }

    /// Normalise a raw order string, appending ` ASC` when no direction is given.
    pub fn normalize(raw: &str) -> String {
        if direction_suffix().is_match(raw) {
            raw.to_string()
        } else {
            format!("{} ASC", raw)
        }
    }
}

impl OrderBy {
    pub fn asc(self) -> Order {
        Order {
            field: self.field,
            direction: SortOrder::Asc,
        }
    }

    pub fn desc(self) -> Order {
        Order {
            field: self.field,
            direction: SortOrder::Desc,
        }
    }
}

fn direction_suffix() -> &'static Regex {
    static DIRECTION_RE: OnceLock<Regex> = OnceLock::new();
    DIRECTION_RE.get_or_init(|| Regex::new(r"(?i) (ASC|DESC)$").expect("direction regex must compile"))
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.direction.as_str())
    }
}

impl ToSoql for Order {
    fn to_soql(&self) -> SodaResult<String> {
        Ok(self.to_string())
    }
}
