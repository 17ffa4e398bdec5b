//! Partial-update compilation: `{field: value, ...}` to `"col"=$1, "col2"=$2`.
//!
//! ```ignore
//! use jobly_db::{FieldTranslation, PartialUpdate, compile_partial_update};
//!
//! let translation = FieldTranslation::from_pairs([("numEmployees", "num_employees")]);
//! let request = PartialUpdate::new().with("name", "NewComp").with("numEmployees", 10);
//!
//! let compiled = compile_partial_update(&request, &translation)?;
//! assert_eq!(compiled.clause, r#""name"=$1, "num_employees"=$2"#);
//! ```

use crate::clause::{CompiledClause, ParamList};
use crate::error::{DbError, DbResult};
use crate::fields::{FieldAllowList, FieldTranslation, quote_column};
use crate::value::SqlValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The fields to change and their new values, in the order they were given.
///
/// Setting a field twice replaces its value but keeps its first position. When
/// deserialized from a JSON object the object's key order is kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartialUpdate {
    fields: IndexMap<String, SqlValue>,
}

impl PartialUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`PartialUpdate::set`].
    pub fn with(mut self, field: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<SqlValue>) -> &mut Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&SqlValue> {
        self.fields.get(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K, V> FromIterator<(K, V)> for PartialUpdate
where
    K: Into<String>,
    V: Into<SqlValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Compile a partial update into a `SET` clause body and its ordered values.
///
/// Each field becomes `"<column>"=$n`, where the column comes from `translation`
/// (or is the field name itself) and `n` counts from 1 in field order. Terms are
/// joined with `, `.
///
/// Values are always bound. Column names are not: they are written into the clause
/// text, so field names must come from code-controlled vocabulary. Callers holding
/// user-supplied field names go through [`UpdateSchema::compile`], which checks
/// them against an allow-list first; this function performs no such check.
///
/// Returns [`DbError::InvalidRequest`] if `request` has no fields.
pub fn compile_partial_update(
    request: &PartialUpdate,
    translation: &FieldTranslation,
) -> DbResult<CompiledClause> {
    if request.is_empty() {
        return Err(DbError::invalid_request("No data"));
    }

    let mut params = ParamList::new();
    let terms: Vec<String> = request
        .iter()
        .map(|(field, value)| {
            let column = quote_column(translation.column_for(field));
            format!("{}={}", column, params.bind(value.clone()))
        })
        .collect();

    Ok(CompiledClause::new(terms.join(", "), params.into_values()))
}

/// Which fields of one entity may be updated and where they are stored.
#[derive(Debug, Clone)]
pub struct UpdateSchema {
    entity: &'static str,
    allowed: FieldAllowList,
    translation: FieldTranslation,
}

impl UpdateSchema {
    pub fn new(
        entity: &'static str,
        allowed: FieldAllowList,
        translation: FieldTranslation,
    ) -> Self {
        Self {
            entity,
            allowed,
            translation,
        }
    }

    /// Check `request` against the allow-list, then compile it.
    pub fn compile(&self, request: &PartialUpdate) -> DbResult<CompiledClause> {
        self.allowed.check(request.fields()).map_err(|err| match err {
            DbError::InvalidRequest(msg) => {
                DbError::InvalidRequest(format!("{} update: {msg}", self.entity))
            }
            other => other,
        })?;
        compile_partial_update(request, &self.translation)
    }
}
