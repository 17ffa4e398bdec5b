//! Result rows as ordered column → value maps, and mapping them to structs.

use crate::error::{DbError, DbResult};
use crate::value::{FromValue, SqlValue};
use indexmap::IndexMap;
use tokio_postgres::Row;

/// One result row: column names (after `AS` aliasing) mapped to decoded values, in
/// select-list order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    columns: IndexMap<String, SqlValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly useful for scripting fake executors.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.columns.insert(column.into(), value.into());
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<SqlValue>) {
        self.columns.insert(column.into(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.columns.get(column)
    }

    /// Remove a column, keeping the order of the others.
    pub fn remove(&mut self, column: &str) -> Option<SqlValue> {
        self.columns.shift_remove(column)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Get a column value converted to `T`, returning [`DbError::Decode`] on failure.
    pub fn try_get_column<T: FromValue>(&self, column: &str) -> DbResult<T> {
        let value = self
            .columns
            .get(column)
            .ok_or_else(|| DbError::decode(column, "column not present in row"))?;
        T::from_value(value).map_err(|message| DbError::decode(column, message))
    }

    /// Decode every column of a `tokio_postgres` row.
    pub fn from_row(row: &Row) -> DbResult<Self> {
        let mut columns = IndexMap::with_capacity(row.len());
        for (idx, column) in row.columns().iter().enumerate() {
            let value: SqlValue = row
                .try_get(idx)
                .map_err(|e| DbError::decode(column.name(), e.to_string()))?;
            columns.insert(column.name().to_string(), value);
        }
        Ok(Self { columns })
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<SqlValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            columns: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Trait for converting a [`Record`] into a Rust struct.
pub trait FromRecord: Sized {
    fn from_record(record: &Record) -> DbResult<Self>;
}

impl FromRecord for Record {
    fn from_record(record: &Record) -> DbResult<Self> {
        Ok(record.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn try_get_column_reports_column_name() {
        let record = Record::new().with("id", 7).with("title", "Dev");

        assert_eq!(record.try_get_column::<i32>("id").unwrap(), 7);
        assert_eq!(record.try_get_column::<String>("title").unwrap(), "Dev");

        match record.try_get_column::<i32>("title").unwrap_err() {
            DbError::Decode { column, .. } => assert_eq!(column, "title"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(record.try_get_column::<i32>("salary").is_err());
    }

    #[test]
    fn remove_keeps_remaining_order() {
        let mut record: Record = [("a", 1), ("b", 2), ("c", 3)].into_iter().collect();
        assert_eq!(record.remove("b"), Some(SqlValue::Int(2)));
        assert_eq!(record.columns().collect::<Vec<_>>(), vec!["a", "c"]);
    }
}
