//! Error types for sqlgate

use crate::schema::ValidationReason;
use thiserror::Error;

/// Result type alias for sqlgate operations
pub type GateResult<T> = Result<T, GateError>;

/// Error types for query construction and execution
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GateError {
    /// The catalog returned no rows for the table
    #[error("Table {schema}.{table} not found")]
    TableNotFound { schema: String, table: String },

    /// A name could not be resolved to a column, even after a schema refresh
    #[error("Column {schema}.{table}.{column} not found")]
    ColumnNotFound {
        schema: String,
        table: String,
        column: String,
    },

    /// ORDER BY direction other than ASC/DESC
    #[error("Invalid ordering direction {0}")]
    InvalidOrderDirection(String),

    /// Update/delete/fetch attempted without every key column bound
    #[error("Incomplete primary key for table {0}")]
    IncompletePrimaryKey(String),

    /// WHERE (or execution) requested before FROM/INTO/table
    #[error("No table specified")]
    NoTableSpecified,

    /// INSERT without any row of values
    #[error("No values supplied to insert")]
    EmptyInsert,

    /// UPDATE/DELETE without a WHERE clause
    #[error("{0} requires a WHERE clause")]
    MissingWhere(String),

    /// Condition, join or name token that does not fit the grammar
    #[error("Malformed condition: {0}")]
    MalformedCondition(String),

    /// A value failed schema-driven validation
    #[error("Invalid value for column {column}: {value}, {reason}")]
    ValidationFailed {
        column: String,
        reason: ValidationReason,
        value: String,
    },

    /// Error reported by the connection collaborator
    #[error("Connection error: {0}")]
    Connection(String),

    /// Error reported by the cache collaborator
    #[error("Cache error: {0}")]
    Cache(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl GateError {
    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a malformed condition error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedCondition(message.into())
    }

    /// Create a connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create a cache error
    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache(message.into())
    }

    /// Create a validation failure for a column
    pub fn validation(
        column: impl Into<String>,
        reason: ValidationReason,
        value: impl Into<String>,
    ) -> Self {
        Self::ValidationFailed {
            column: column.into(),
            reason,
            value: value.into(),
        }
    }

    /// Check if this is a table or column lookup failure
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::TableNotFound { .. } | Self::ColumnNotFound { .. }
        )
    }

    /// Check if this is a validation failure
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ValidationFailed { .. })
    }

    /// The validation reason, if this is a validation failure
    pub fn validation_reason(&self) -> Option<ValidationReason> {
        match self {
            Self::ValidationFailed { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for GateError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
