use std::sync::Arc;

use crate::error::SqlTxError;
use crate::types::RowValues;

/// Parameterized statement with positional placeholder slots.
///
/// A statement is created with a fixed number of slots and must have every slot bound
/// before it can be appended to a [`Transaction`](crate::Transaction).
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedStatement {
    sql: Arc<str>,
    params: Vec<Option<RowValues>>,
}

impl PreparedStatement {
    /// Create a statement with `param_count` unbound slots.
    #[must_use]
    pub fn new(sql: &str, param_count: usize) -> Self {
        Self {
            sql: Arc::from(sql),
            params: vec![None; param_count],
        }
    }

    /// Create a statement with every slot already bound.
    #[must_use]
    pub fn with_params(sql: &str, params: Vec<RowValues>) -> Self {
        Self {
            sql: Arc::from(sql),
            params: params.into_iter().map(Some).collect(),
        }
    }

    /// Bind `value` to the zero-based slot `index`, replacing any previous value.
    ///
    /// # Errors
    /// Returns `SqlTxError::ParameterError` if `index` is outside the statement's slots.
    pub fn bind(&mut self, index: usize, value: RowValues) -> Result<(), SqlTxError> {
        let count = self.params.len();
        let slot = self.params.get_mut(index).ok_or_else(|| {
            SqlTxError::ParameterError(format!(
                "parameter index {index} out of range for statement with {count} parameters"
            ))
        })?;
        *slot = Some(value);
        Ok(())
    }

    /// True once every slot holds a value.
    #[must_use]
    pub fn is_fully_bound(&self) -> bool {
        self.params.iter().all(Option::is_some)
    }

    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    #[must_use]
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Iterate over bound values in placeholder order. Unbound slots are skipped.
    pub fn params(&self) -> impl Iterator<Item = &RowValues> {
        self.params.iter().flatten()
    }
}
