//! Clause accumulator and request URL construction.
//!
//! [`SodaQuery`] collects clauses, renders them into ordered
//! [`QueryParams`] and turns those into a resource URL.
//!
//! ```
//! use soda_query::prelude::*;
//!
//! let mut query = SodaQuery::for_dataset("data.example.com", "abcd-1234");
//! query
//!     .select(["name", "total"])
//!     .unwrap()
//!     .filter([Where::gt("total", 10)])
//!     .unwrap()
//!     .limit(5);
//! assert_eq!(
//!     query.url(None).unwrap(),
//!     "https://data.example.com/resource/abcd-1234.json?$select=name%2Ctotal&$where=(%60total%60+%3E+10)&$limit=5"
//! );
//! ```

use std::collections::HashMap;

use tracing::debug;

use crate::error::{SodaError, SodaResult};
use crate::field::{Field, FieldRef};
use crate::filter::Where;
use crate::order::Order;
use crate::qs::to_query_string;
use crate::render::ToSoql;
use crate::select::Select;
use crate::value::{format_value, Value};

/// Rendered request parameters, in emission order.
pub type QueryParams = Vec<(String, String)>;

/// An entry for `$select`.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectItem {
    Raw(String),
    Select(Select),
}

impl SelectItem {
    fn render(&self) -> SodaResult<String> {
        match self {
            SelectItem::Raw(s) => Ok(s.clone()),
            SelectItem::Select(select) => select.to_soql(),
        }
    }
}

impl From<&str> for SelectItem {
    fn from(s: &str) -> Self {
        SelectItem::Raw(s.to_string())
    }
}

impl From<String> for SelectItem {
    fn from(s: String) -> Self {
        SelectItem::Raw(s)
    }
}

impl From<Select> for SelectItem {
    fn from(select: Select) -> Self {
        SelectItem::Select(select)
    }
}

impl From<Field> for SelectItem {
    fn from(field: Field) -> Self {
        SelectItem::Raw(field.name)
    }
}

impl From<&Field> for SelectItem {
    fn from(field: &Field) -> Self {
        SelectItem::Raw(field.name.clone())
    }
}

impl From<FieldRef> for SelectItem {
    fn from(field: FieldRef) -> Self {
        SelectItem::Raw(field.name().to_string())
    }
}

/// An entry for `$where` or `$having`.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    /// Inserted as is.
    Raw(String),
    Where(Where),
    /// One `key = <literal>` condition per pair.
    Pairs(Vec<(String, Value)>),
}

impl Clause {
    /// Key/value conditions, in order.
    pub fn pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Clause::Pairs(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    fn render_into(&self, target: &mut Vec<String>) -> SodaResult<()> {
        match self {
            Clause::Raw(s) => target.push(s.clone()),
            Clause::Where(w) => target.push(w.to_soql()?),
            Clause::Pairs(pairs) => {
                for (key, value) in pairs {
                    target.push(format!("{} = {}", key, format_value(value)?));
                }
            }
        }
        Ok(())
    }
}

impl From<&str> for Clause {
    fn from(s: &str) -> Self {
        Clause::Raw(s.to_string())
    }
}

impl From<String> for Clause {
    fn from(s: String) -> Self {
        Clause::Raw(s)
    }
}

impl From<Where> for Clause {
    fn from(w: Where) -> Self {
        Clause::Where(w)
    }
}

/// An entry for `$order`.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderItem {
    /// Gets ` ASC` appended unless it already ends in a direction.
    Raw(String),
    Order(Order),
}

impl From<&str> for OrderItem {
    fn from(s: &str) -> Self {
        OrderItem::Raw(s.to_string())
    }
}

impl From<String> for OrderItem {
    fn from(s: String) -> Self {
        OrderItem::Raw(s)
    }
}

impl From<Order> for OrderItem {
    fn from(order: Order) -> Self {
        OrderItem::Order(order)
    }
}

/// Wrap each clause in parentheses and join with `and`.
fn and_all(clauses: &[String]) -> String {
    clauses
        .iter()
        .map(|c| format!("({})", c))
        .collect::<Vec<_>>()
        .join(" and ")
}

/// A SODA resource query under construction.
#[derive(Debug, Clone, Default)]
pub struct SodaQuery {
    domain: String,
    dataset: Option<String>,
    strict: bool,
    prepared: HashMap<String, QueryParams>,

    simple: Option<QueryParams>,
    soql: Option<String>,
    search: Option<String>,
    select: Vec<String>,
    filter: Vec<String>,
    group: Vec<String>,
    having: Vec<String>,
    order: Vec<String>,
    limit: Option<u64>,
    offset: Option<u64>,
    system_fields: bool,
}

impl SodaQuery {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            ..Default::default()
        }
    }

    /// A non-strict query with the dataset already set.
    pub fn for_dataset(domain: impl Into<String>, dataset: impl Into<String>) -> Self {
        let mut query = Self::new(domain);
        query.dataset = Some(dataset.into());
        query
    }

    /// In strict mode the dataset may only be set once.
    pub fn with_options(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn dataset(&self) -> Option<&str> {
        self.dataset.as_deref()
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn with_dataset(&mut self, dataset: impl Into<String>) -> SodaResult<&mut Self> {
        if self.strict {
            if let Some(current) = &self.dataset {
                return Err(SodaError::DatasetAlreadySet(current.clone()));
            }
        }
        self.dataset = Some(dataset.into());
        Ok(self)
    }

    /// Plain `key=value` filters. Overrides every other clause.
    pub fn simple<I, K, V>(&mut self, pairs: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToString,
    {
        let simple = self.simple.get_or_insert_with(Vec::new);
        for (key, value) in pairs {
            let key = key.into();
            let value = value.to_string();
            match simple.iter_mut().find(|(k, _)| *k == key) {
                Some(entry) => entry.1 = value,
                None => simple.push((key, value)),
            }
        }
        self
    }

    /// A full `$query` statement. Overrides everything except [`SodaQuery::simple`].
    pub fn soql(&mut self, query: impl Into<String>) -> &mut Self {
        self.soql = Some(query.into());
        self
    }

    pub fn select<I, S>(&mut self, items: I) -> SodaResult<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<SelectItem>,
    {
        for item in items {
            let rendered = item.into().render()?;
            if !rendered.is_empty() {
                self.select.push(rendered);
            }
        }
        Ok(self)
    }

    /// Add `$where` conditions. Each is AND-ed with the rest.
    pub fn filter<I, C>(&mut self, clauses: I) -> SodaResult<&mut Self>
    where
        I: IntoIterator<Item = C>,
        C: Into<Clause>,
    {
        for clause in clauses {
            clause.into().render_into(&mut self.filter)?;
        }
        Ok(self)
    }

    /// Add `$having` conditions. Needs a `$group` at build time.
    pub fn having<I, C>(&mut self, clauses: I) -> SodaResult<&mut Self>
    where
        I: IntoIterator<Item = C>,
        C: Into<Clause>,
    {
        for clause in clauses {
            clause.into().render_into(&mut self.having)?;
        }
        Ok(self)
    }

    pub fn group_by<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn order_by<I, O>(&mut self, orders: I) -> &mut Self
    where
        I: IntoIterator<Item = O>,
        O: Into<OrderItem>,
    {
        for order in orders {
            let rendered = match order.into() {
                OrderItem::Raw(raw) => Order::normalize(&raw),
                OrderItem::Order(order) => order.to_string(),
            };
            self.order.push(rendered);
        }
        self
    }

    pub fn limit(&mut self, limit: u64) -> &mut Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(&mut self, offset: u64) -> &mut Self {
        self.offset = Some(offset);
        self
    }

    /// Full text search (`q`).
    pub fn search(&mut self, q: impl Into<String>) -> &mut Self {
        self.search = Some(q.into());
        self
    }

    /// Ask for `:id`, `:created_at` and `:updated_at` in the response.
    pub fn with_system_fields(&mut self) -> &mut Self {
        self.system_fields = true;
        self
    }

    /// Drop every clause. Dataset, domain and prepared queries are kept.
    pub fn clear(&mut self) -> &mut Self {
        self.simple = None;
        self.soql = None;
        self.search = None;
        self.select.clear();
        self.filter.clear();
        self.group.clear();
        self.having.clear();
        self.order.clear();
        self.limit = None;
        self.offset = None;
        self.system_fields = false;
        self
    }

    /// Store the current parameters under `id`, then clear.
    pub fn prepare(&mut self, id: impl Into<String>) -> SodaResult<&mut Self> {
        let params = self.build_query()?;
        self.prepared.insert(id.into(), params);
        Ok(self.clear())
    }

    /// Render the accumulated clauses.
    pub fn build_query(&self) -> SodaResult<QueryParams> {
        let mut params = QueryParams::new();

        if let Some(simple) = &self.simple {
            params.extend(simple.iter().cloned());
        } else if let Some(soql) = &self.soql {
            params.push(("$query".into(), soql.clone()));
        } else {
            if !self.select.is_empty() {
                params.push(("$select".into(), self.select.join(",")));
            }
            if !self.filter.is_empty() {
                params.push(("$where".into(), and_all(&self.filter)));
            }
            if !self.group.is_empty() {
                params.push(("$group".into(), self.group.join(", ")));
            }
            if !self.having.is_empty() {
                if self.group.is_empty() {
                    return Err(SodaError::MissingGroupForHaving);
                }
                params.push(("$having".into(), and_all(&self.having)));
            }
            if !self.order.is_empty() {
                params.push(("$order".into(), self.order.join(", ")));
            }
            if let Some(offset) = self.offset {
                params.push(("$offset".into(), offset.to_string()));
            }
            if let Some(limit) = self.limit {
                params.push(("$limit".into(), limit.to_string()));
            }
            if let Some(q) = &self.search {
                params.push(("q".into(), q.clone()));
            }
        }

        if self.system_fields {
            params.push(("$$exclude_system_fields".into(), "false".into()));
        }

        Ok(params)
    }

    fn require_dataset(&self) -> SodaResult<&str> {
        self.dataset.as_deref().ok_or(SodaError::MissingDataset)
    }

    /// Resource URL for the current clauses, or for a prepared query.
    pub fn url(&self, query_id: Option<&str>) -> SodaResult<String> {
        let params = match query_id {
            Some(id) => self
                .prepared
                .get(id)
                .cloned()
                .ok_or_else(|| SodaError::UnknownQuery(id.to_string()))?,
            None => self.build_query()?,
        };
        let dataset = self.require_dataset()?;

        let qs = to_query_string(&params);
        let mut url = format!("https://{}/resource/{}.json", self.domain, dataset);
        if !qs.is_empty() {
            url.push('?');
            url.push_str(&qs);
        }
        debug!(url = %url, "built resource url");
        Ok(url)
    }

    /// Dataset documentation page on dev.socrata.com.
    pub fn dev_url(&self) -> SodaResult<String> {
        let dataset = self.require_dataset()?;
        Ok(format!("https://dev.socrata.com/foundry/{}/{}", self.domain, dataset))
    }

    pub fn metadata_url(&self) -> SodaResult<String> {
        let dataset = self.require_dataset()?;
        Ok(format!("https://{}/api/views/{}", self.domain, dataset))
    }
}
