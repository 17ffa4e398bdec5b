//! Search filters compiled into `WHERE` clause bodies.
//!
//! A filter struct holds optional predicates; absent predicates produce neither a
//! term nor a value. Present ones are appended in a fixed order and numbered as
//! they are appended, so leaving out an earlier filter shifts later placeholders
//! down while keeping them aligned with the values.

use crate::clause::{CompiledClause, ParamList};
use crate::error::{DbError, DbResult};
use crate::value::SqlValue;
use serde::{Deserialize, Serialize};

/// Conjunctive `WHERE` clause builder.
///
/// Conditions are joined with ` AND ` when built. Column names are written into the
/// SQL text as given and must be code-controlled.
#[derive(Debug, Clone, Default)]
pub struct WhereBuilder {
    conditions: Vec<String>,
    params: ParamList,
}

impl WhereBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn add_condition(&mut self, column: &str, op: &str, value: impl Into<SqlValue>) {
        let placeholder = self.params.bind(value);
        self.conditions.push(format!("{column} {op} {placeholder}"));
    }

    /// Add `column >= $n`.
    pub fn gte(&mut self, column: &str, value: impl Into<SqlValue>) -> &mut Self {
        self.add_condition(column, ">=", value);
        self
    }

    /// Add `column <= $n`.
    pub fn lte(&mut self, column: &str, value: impl Into<SqlValue>) -> &mut Self {
        self.add_condition(column, "<=", value);
        self
    }

    /// Add `column ILIKE $n` bound to `%needle%` (case-insensitive "contains").
    ///
    /// `%` and `_` inside `needle` keep their pattern meaning.
    pub fn ilike_contains(&mut self, column: &str, needle: &str) -> &mut Self {
        self.add_condition(column, "ILIKE", format!("%{needle}%"));
        self
    }

    /// Add a fixed condition that binds no value.
    pub fn raw(&mut self, condition: &str) -> &mut Self {
        self.conditions.push(condition.to_string());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn build(self) -> CompiledClause {
        CompiledClause::new(self.conditions.join(" AND "), self.params.into_values())
    }
}

/// Job search predicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobFilter {
    /// Inclusive lower bound on salary.
    pub min_salary: Option<i32>,
    /// `Some(true)` keeps only jobs with `equity > 0`; `false` adds no constraint.
    pub has_equity: Option<bool>,
    /// Case-insensitive substring of the title.
    pub title: Option<String>,
}

impl JobFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min_salary(mut self, salary: i32) -> Self {
        self.min_salary = Some(salary);
        self
    }

    pub fn has_equity(mut self, has_equity: bool) -> Self {
        self.has_equity = Some(has_equity);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Compile into `salary >= $n`, `equity > 0`, `title ILIKE $n` (in that order,
    /// each only when present) joined by ` AND `.
    pub fn compile(&self) -> CompiledClause {
        let mut w = WhereBuilder::new();
        if let Some(min_salary) = self.min_salary {
            w.gte("salary", min_salary);
        }
        if self.has_equity == Some(true) {
            w.raw("equity > 0");
        }
        if let Some(title) = &self.title {
            w.ilike_contains("title", title);
        }
        w.build()
    }
}

/// Compile an optional job filter; `None` behaves like an empty filter.
pub fn compile_job_filter(filters: Option<&JobFilter>) -> CompiledClause {
    filters.map_or_else(CompiledClause::empty, JobFilter::compile)
}

/// Company search predicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanyFilter {
    /// Case-insensitive substring of the company name.
    pub name_like: Option<String>,
    pub min_employees: Option<i32>,
    pub max_employees: Option<i32>,
}

impl CompanyFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name_like(mut self, name: impl Into<String>) -> Self {
        self.name_like = Some(name.into());
        self
    }

    pub fn min_employees(mut self, n: i32) -> Self {
        self.min_employees = Some(n);
        self
    }

    pub fn max_employees(mut self, n: i32) -> Self {
        self.max_employees = Some(n);
        self
    }

    /// Compile into `num_employees >= $n`, `num_employees <= $n`, `name ILIKE $n`.
    ///
    /// Returns [`DbError::InvalidRequest`] when the minimum exceeds the maximum.
    pub fn compile(&self) -> DbResult<CompiledClause> {
        if let (Some(min), Some(max)) = (self.min_employees, self.max_employees) {
            if min > max {
                return Err(DbError::invalid_request(
                    "Min employees cannot be greater than max",
                ));
            }
        }

        let mut w = WhereBuilder::new();
        if let Some(min) = self.min_employees {
            w.gte("num_employees", min);
        }
        if let Some(max) = self.max_employees {
            w.lte("num_employees", max);
        }
        if let Some(name) = &self.name_like {
            w.ilike_contains("name", name);
        }
        Ok(w.build())
    }
}

/// Compile an optional company filter; `None` behaves like an empty filter.
pub fn compile_company_filter(filters: Option<&CompanyFilter>) -> DbResult<CompiledClause> {
    filters.map_or_else(|| Ok(CompiledClause::empty()), CompanyFilter::compile)
}
