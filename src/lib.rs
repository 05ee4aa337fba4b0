//! # soda-query — Typed SoQL for SODA open-data APIs
//!
//! > **Stop concatenating query strings. Build them.**
//!
//! soda-query turns typed builders into SoQL clauses and resource URLs for
//! Socrata-style open-data portals.
//!
//! ## Quick Example
//!
//! ```
//! use soda_query::prelude::*;
//!
//! let price = Field::new("price", DataType::Number);
//!
//! let mut query = soda_query::query("data.example.com", "abcd-1234");
//! query
//!     .select([Select::new(&price)?.avg()?.with_alias("avg_price")?])?
//!     .filter([Where::and([Where::gt(&price, 10), Where::is_not_null("name")])?])?
//!     .group_by(["name"])
//!     .order_by([Order::by("avg_price").desc()])
//!     .limit(10);
//!
//! let url = query.url(None)?;
//! assert!(url.starts_with("https://data.example.com/resource/abcd-1234.json?$select="));
//! # Ok::<(), SodaError>(())
//! ```
//!
//! ## Placeholders
//!
//! | Symbol | Renders as                 | Example            |
//! |--------|----------------------------|--------------------|
//! | `??`   | back-tick quoted name      | `` `price` ``      |
//! | `?`    | escaped literal            | `'it\'s'`, `10`    |
//! | `'…'`  | copied verbatim            | `'??'`             |

pub mod client;
pub mod config;
pub mod error;
pub mod field;
pub mod filter;
pub mod order;
pub mod param;
pub mod qs;
pub mod query;
pub mod render;
pub mod select;
pub mod value;

pub mod prelude {
    pub use crate::client::{AuthOptions, DataResponse, SodaClient, Transport};
    pub use crate::config::SodaConfig;
    pub use crate::error::*;
    pub use crate::field::{DataType, Field, FieldRef};
    pub use crate::filter::{FieldFilter, Where};
    pub use crate::order::{Order, SortOrder};
    pub use crate::param::substitute;
    pub use crate::query::{Clause, SelectItem, SodaQuery};
    pub use crate::render::ToSoql;
    pub use crate::select::{PadSide, Select, SelectFunction};
    pub use crate::value::Value;
}

/// Start a query against `dataset` on `domain`.
///
/// # Example
///
/// ```
/// let query = soda_query::query("data.example.com", "abcd-1234");
/// assert_eq!(
///     query.dev_url().unwrap(),
///     "https://dev.socrata.com/foundry/data.example.com/abcd-1234"
/// );
/// ```
pub fn query(domain: impl Into<String>, dataset: impl Into<String>) -> query::SodaQuery {
    query::SodaQuery::for_dataset(domain, dataset)
}

/// Render a template with positional parameters.
///
/// # Example
///
/// ```
/// use soda_query::value::Value;
///
/// let soql = soda_query::render_template("?? > ?", &[Value::from("total"), Value::from(5)]).unwrap();
/// assert_eq!(soql, "`total` > 5");
/// ```
pub fn render_template(template: &str, params: &[value::Value]) -> error::SodaResult<String> {
    param::substitute(template, params)
}
