//! Compiled SQL fragments and positional parameter numbering.
//!
//! Every compiler in this crate produces a [`CompiledClause`]: a fragment of SQL text
//! containing `$1, $2, ...` placeholders plus the values bound to them, in order.
//! [`ParamList`] is the one place that hands out placeholder numbers, so a fragment
//! and the statement it is spliced into always agree on numbering.

use crate::value::SqlValue;
use std::fmt::Write;

/// Render the positional placeholder for a 1-based parameter index.
pub fn placeholder(index: usize) -> String {
    format!("${index}")
}

/// Ordered parameter values for one statement.
///
/// Pushing a value returns its 1-based placeholder index, which is always
/// `len()` after the push.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamList {
    values: Vec<SqlValue>,
}

impl ParamList {
    /// Create a new empty parameter list.
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// Add a value and return its 1-based index.
    pub fn push(&mut self, value: impl Into<SqlValue>) -> usize {
        self.values.push(value.into());
        self.values.len()
    }

    /// Add a value and return the placeholder text (`$n`) that refers to it.
    pub fn bind(&mut self, value: impl Into<SqlValue>) -> String {
        placeholder(self.push(value))
    }

    /// Index the next pushed value will receive.
    pub fn next_index(&self) -> usize {
        self.values.len() + 1
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[SqlValue] {
        &self.values
    }

    pub fn into_values(self) -> Vec<SqlValue> {
        self.values
    }
}

impl From<Vec<SqlValue>> for ParamList {
    fn from(values: Vec<SqlValue>) -> Self {
        Self { values }
    }
}

/// A SQL fragment together with its ordered bound values.
///
/// `values[i]` is bound to placeholder `$(i + 1)` in `clause`. An empty clause has no
/// values and means "no constraint" to the statement that consumes it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledClause {
    pub clause: String,
    pub values: Vec<SqlValue>,
}

impl CompiledClause {
    pub fn new(clause: impl Into<String>, values: Vec<SqlValue>) -> Self {
        Self {
            clause: clause.into(),
            values,
        }
    }

    /// Clause with no text and no values.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.clause.is_empty()
    }

    /// Placeholder number a statement should use for its next parameter.
    pub fn next_placeholder(&self) -> usize {
        self.values.len() + 1
    }

    /// Append ` WHERE <clause>` to `sql` when the clause is non-empty.
    pub fn append_where(&self, sql: &mut String) {
        if !self.is_empty() {
            let _ = write!(sql, " WHERE {}", self.clause);
        }
    }

    /// Convert into a [`ParamList`] so a statement can keep numbering after this clause.
    pub fn into_params(self) -> (String, ParamList) {
        (self.clause, ParamList::from(self.values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_returns_one_based_index() {
        let mut params = ParamList::new();
        assert_eq!(params.next_index(), 1);
        assert_eq!(params.push(10), 1);
        assert_eq!(params.bind("x"), "$2");
        assert_eq!(params.next_index(), 3);
    }

    #[test]
    fn numbering_continues_after_compiled_clause() {
        let compiled = CompiledClause::new(
            "\"title\"=$1, \"salary\"=$2",
            vec![SqlValue::from("Dev"), SqlValue::from(100)],
        );
        assert_eq!(compiled.next_placeholder(), 3);

        let (_, mut params) = compiled.into_params();
        assert_eq!(params.bind(7), "$3");
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn append_where_skips_empty_clause() {
        let mut sql = String::from("SELECT * FROM jobs");
        CompiledClause::empty().append_where(&mut sql);
        assert_eq!(sql, "SELECT * FROM jobs");

        CompiledClause::new("equity > 0", vec![]).append_where(&mut sql);
        assert_eq!(sql, "SELECT * FROM jobs WHERE equity > 0");
    }
}
