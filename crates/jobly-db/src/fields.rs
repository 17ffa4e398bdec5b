//! Logical field names, their physical columns, and which of them may be written.
//!
//! Column names cannot be bound as parameters, so the update compiler interpolates
//! them into SQL text. Two types keep that safe:
//!
//! - [`FieldTranslation`] maps a logical (API-facing) field name such as `numEmployees`
//!   to its column (`num_employees`). Fields without an entry use their own name.
//! - [`FieldAllowList`] is the closed set of logical names an entity accepts in a
//!   partial update. Requests are checked against it before any SQL is produced.

use crate::error::{DbError, DbResult};
use std::collections::{BTreeSet, HashMap};

/// Quote a column name as a SQL identifier, doubling any embedded `"`.
pub fn quote_column(column: &str) -> String {
    format!("\"{}\"", column.replace('"', "\"\""))
}

/// Mapping from logical field name to physical column name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldTranslation {
    columns: HashMap<String, String>,
}

impl FieldTranslation {
    /// An empty table: every field maps to a column of the same name.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            columns: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Add or replace one mapping.
    pub fn with(mut self, field: impl Into<String>, column: impl Into<String>) -> Self {
        self.columns.insert(field.into(), column.into());
        self
    }

    /// Resolve the column for `field`, falling back to `field` itself when there is
    /// no mapping or the mapping is empty.
    pub fn column_for<'a>(&'a self, field: &'a str) -> &'a str {
        self.columns
            .get(field)
            .map(String::as_str)
            .filter(|column| !column.is_empty())
            .unwrap_or(field)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// The logical field names an entity permits in a partial update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldAllowList {
    fields: BTreeSet<String>,
}

impl FieldAllowList {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn allows(&self, field: &str) -> bool {
        self.fields.contains(field)
    }

    /// Fail with [`DbError::InvalidRequest`] on the first field not in the list.
    pub fn check<'a>(&self, fields: impl IntoIterator<Item = &'a str>) -> DbResult<()> {
        for field in fields {
            if !self.allows(field) {
                return Err(DbError::invalid_request(format!(
                    "Field not allowed: {field}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_for_falls_back_to_field_name() {
        let t = FieldTranslation::from_pairs([("numEmployees", "num_employees")]);
        assert_eq!(t.column_for("numEmployees"), "num_employees");
        assert_eq!(t.column_for("name"), "name");
        assert_eq!(FieldTranslation::new().column_for("title"), "title");
    }

    #[test]
    fn empty_mapping_falls_back_to_field_name() {
        let t = FieldTranslation::from_pairs([("title", "")]).with("logoUrl", "");
        assert_eq!(t.column_for("title"), "title");
        assert_eq!(t.column_for("logoUrl"), "logoUrl");
    }

    #[test]
    fn with_replaces_existing_mapping() {
        let t = FieldTranslation::new()
            .with("logoUrl", "logo")
            .with("logoUrl", "logo_url");
        assert_eq!(t.len(), 1);
        assert_eq!(t.column_for("logoUrl"), "logo_url");
    }

    #[test]
    fn quote_column_doubles_quotes() {
        assert_eq!(quote_column("first_name"), "\"first_name\"");
        assert_eq!(quote_column("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn allow_list_rejects_unknown_field() {
        let allowed = FieldAllowList::new(["title", "salary", "equity"]);
        assert!(allowed.check(["salary", "title"]).is_ok());

        let err = allowed.check(["salary", "id"]).unwrap_err();
        assert!(err.is_invalid_request());
        assert_eq!(err.to_string(), "Invalid request: Field not allowed: id");
    }
}
