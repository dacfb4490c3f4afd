use crate::statement::PreparedStatement;

/// One statement of a [`Transaction`].
#[derive(Debug, Clone, PartialEq)]
pub enum StatementEntry {
    /// Ad-hoc SQL text, executed as-is.
    Raw(String),
    /// Fully bound prepared statement owned by the batch.
    Prepared(PreparedStatement),
}

/// Ordered batch of statements executed as one atomic unit.
///
/// Statements run in the order they were appended. Once [`cleanup`](Self::cleanup) has run
/// (explicitly, after a failed execution, or on drop) the batch is empty for good and must
/// not be appended to again.
#[derive(Debug, Default)]
pub struct Transaction {
    entries: Vec<StatementEntry>,
    cleaned_up: bool,
}

impl Transaction {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a raw SQL statement.
    ///
    /// # Panics
    /// Panics if `sql` is blank or the batch has already been cleaned up.
    pub fn append(&mut self, sql: &str) {
        assert!(!sql.trim().is_empty(), "cannot append empty SQL to a transaction");
        self.assert_open();
        self.entries.push(StatementEntry::Raw(sql.to_owned()));
    }

    /// Append a prepared statement, taking ownership of it.
    ///
    /// # Panics
    /// Panics if `stmt` still has unbound parameters or the batch has already been cleaned up.
    pub fn append_prepared_statement(&mut self, stmt: PreparedStatement) {
        assert!(
            stmt.is_fully_bound(),
            "cannot append a prepared statement with unbound parameters: {}",
            stmt.sql()
        );
        self.assert_open();
        self.entries.push(StatementEntry::Prepared(stmt));
    }

    /// Drop every entry and mark the batch as cleaned up. Calling it again is a no-op.
    pub fn cleanup(&mut self) {
        if self.cleaned_up {
            return;
        }

        self.entries.clear();
        self.cleaned_up = true;
    }

    #[must_use]
    pub fn is_cleaned_up(&self) -> bool {
        self.cleaned_up
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in execution order.
    #[must_use]
    pub fn entries(&self) -> &[StatementEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StatementEntry> {
        self.entries.iter()
    }

    fn assert_open(&self) {
        assert!(
            !self.cleaned_up,
            "cannot append to a transaction that has been cleaned up"
        );
    }
}

impl<'a> IntoIterator for &'a Transaction {
    type Item = &'a StatementEntry;
    type IntoIter = std::slice::Iter<'a, StatementEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        self.cleanup();
    }
}
