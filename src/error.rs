//! Error types for soda-query.

use thiserror::Error;

use crate::field::DataType;
use crate::select::SelectFunction;

/// The main error type for query building and execution.
#[derive(Debug, Error)]
pub enum SodaError {
    /// A field argument was neither a name nor a well-formed field.
    #[error("Invalid field: {0}")]
    InvalidField(String),

    /// A function was applied to a field whose type is not in its allow-list.
    #[error("Can only use {function} on {allowed} fields (field '{field}' is {found})")]
    IncompatibleFieldType {
        function: SelectFunction,
        field: String,
        found: DataType,
        allowed: String,
    },

    /// Alias requested on `*`.
    #[error("Cannot use AS on * (all fields)")]
    CannotAliasWildcard,

    /// A field-typed function requested on `*`.
    #[error("Cannot use {0} on * (all fields)")]
    WildcardFunction(SelectFunction),

    /// A multi-field function got too few fields.
    #[error("{function} needs at least {required} fields, got {found}")]
    TooFewFields {
        function: SelectFunction,
        required: usize,
        found: usize,
    },

    /// The literal formatter cannot render this kind of value.
    #[error("Unsupported argument type in query: {0}")]
    UnsupportedValueType(&'static str),

    /// `$having` supplied without `$group`.
    #[error("Having provided without group by")]
    MissingGroupForHaving,

    /// URL requested before a dataset was set.
    #[error("No dataset given to work against")]
    MissingDataset,

    /// Strict mode forbids replacing the dataset.
    #[error("Dataset already set: '{0}'")]
    DatasetAlreadySet(String),

    /// No prepared query stored under this id.
    #[error("No query with ID '{0}' found")]
    UnknownQuery(String),

    /// The API answered with a non-success status.
    #[error("API error {status} for {url}: {message}")]
    Api {
        status: u16,
        message: String,
        error_code: Option<String>,
        url: String,
    },

    /// Transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not valid JSON for the requested type.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Config file was not valid TOML.
    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SodaError {
    /// Create an incompatible-field-type error.
    pub fn incompatible(
        function: SelectFunction,
        field: impl Into<String>,
        found: DataType,
        allowed: &[DataType],
    ) -> Self {
        let allowed = allowed
            .iter()
            .map(|t| t.label())
            .collect::<Vec<_>>()
            .join("/");
        Self::IncompatibleFieldType {
            function,
            field: field.into(),
            found,
            allowed,
        }
    }

    /// Create an invalid-field error.
    pub fn invalid_field(message: impl Into<String>) -> Self {
        Self::InvalidField(message.into())
    }
}

/// Result type alias for soda-query operations.
pub type SodaResult<T> = Result<T, SodaError>;
