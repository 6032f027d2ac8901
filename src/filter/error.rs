use thiserror::Error;

/// Raised when a filter document cannot be compiled. These indicate a
/// programming error in the caller, never bad user input.
#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Invalid WHERE clause: {0}")]
    InvalidWhereClause(String),

    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),

    #[error("Invalid data for {operator}: {reason}")]
    InvalidOperatorData { operator: String, reason: String },

    #[error("Invalid ORDER clause: {0}")]
    InvalidOrder(String),

    #[error("Limit and offset must be non-negative (limit={limit:?}, offset={offset:?})")]
    InvalidRange { limit: Option<i64>, offset: Option<i64> },
}

impl FilterError {
    pub(crate) fn operator_data(operator: &str, reason: impl Into<String>) -> Self {
        FilterError::InvalidOperatorData {
            operator: operator.to_string(),
            reason: reason.into(),
        }
    }
}
