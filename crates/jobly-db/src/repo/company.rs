use super::{map_all, returned};
use crate::clause::placeholder;
use crate::error::{DbError, DbResult};
use crate::executor::Executor;
use crate::filter::{CompanyFilter, compile_company_filter};
use crate::models::{COMPANY_UPDATE, Company, CompanyDetail, CompanyJob, NewCompany};
use crate::update::PartialUpdate;
use crate::value::SqlValue;

const COMPANY_COLUMNS: &str =
    r#"handle, name, description, num_employees AS "numEmployees", logo_url AS "logoUrl""#;

pub(super) const SELECT_COMPANY_BY_HANDLE: &str = r#"SELECT handle,
       name,
       description,
       num_employees AS "numEmployees",
       logo_url AS "logoUrl"
FROM companies
WHERE handle = $1"#;

/// Company persistence.
pub struct CompanyRepository<'a, E> {
    executor: &'a E,
}

impl<'a, E: Executor> CompanyRepository<'a, E> {
    pub fn new(executor: &'a E) -> Self {
        Self { executor }
    }

    /// Insert a company.
    ///
    /// Returns [`DbError::InvalidRequest`] if the handle is already taken.
    pub async fn create(&self, company: &NewCompany) -> DbResult<Company> {
        let duplicate = self
            .executor
            .query_opt(
                "SELECT handle FROM companies WHERE handle = $1",
                &[SqlValue::from(company.handle.as_str())],
            )
            .await?;
        if duplicate.is_some() {
            return Err(DbError::invalid_request(format!(
                "Duplicate company: {}",
                company.handle
            )));
        }

        let sql = format!(
            "INSERT INTO companies (handle, name, description, num_employees, logo_url) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COMPANY_COLUMNS}"
        );
        let params = [
            SqlValue::from(company.handle.as_str()),
            SqlValue::from(company.name.as_str()),
            SqlValue::from(company.description.as_str()),
            SqlValue::from(company.num_employees),
            SqlValue::from(company.logo_url.clone()),
        ];
        let row = self.executor.query_opt(&sql, &params).await?;
        returned(row, || "company insert returned no row".to_string())
    }

    /// All companies matching `filters` (all when `None`), ordered by name.
    ///
    /// Returns [`DbError::InvalidRequest`] if the employee range is inverted.
    pub async fn find_all(&self, filters: Option<&CompanyFilter>) -> DbResult<Vec<Company>> {
        let compiled = compile_company_filter(filters)?;

        let mut sql = format!("SELECT {COMPANY_COLUMNS} FROM companies");
        compiled.append_where(&mut sql);
        sql.push_str(" ORDER BY name");

        let rows = self.executor.query(&sql, &compiled.values).await?;
        map_all(&rows)
    }

    /// One company with its jobs, ordered by job id.
    ///
    /// Returns [`DbError::NotFound`] if there is no company with this handle.
    pub async fn get(&self, handle: &str) -> DbResult<CompanyDetail> {
        let row = self
            .executor
            .query_opt(SELECT_COMPANY_BY_HANDLE, &[SqlValue::from(handle)])
            .await?;
        let company: Company = returned(row, || format!("No company: {handle}"))?;

        let jobs = self
            .executor
            .query(
                "SELECT id, title, salary, equity FROM jobs WHERE company_handle = $1 ORDER BY id",
                &[SqlValue::from(handle)],
            )
            .await?;
        let jobs = map_all::<CompanyJob>(&jobs)?;

        Ok(CompanyDetail { company, jobs })
    }

    /// Apply a partial update to `name`, `description`, `numEmployees`, `logoUrl`.
    ///
    /// Returns [`DbError::InvalidRequest`] for an empty or disallowed request and
    /// [`DbError::NotFound`] if no company has this handle.
    pub async fn update(&self, handle: &str, data: &PartialUpdate) -> DbResult<Company> {
        let (set_cols, mut params) = COMPANY_UPDATE.compile(data)?.into_params();
        let handle_idx = params.push(handle);

        let sql = format!(
            "UPDATE companies SET {set_cols} WHERE handle = {} RETURNING {COMPANY_COLUMNS}",
            placeholder(handle_idx)
        );
        let row = self.executor.query_opt(&sql, params.as_slice()).await?;
        returned(row, || format!("No company: {handle}"))
    }

    /// Delete a company (its jobs go with it through the foreign key).
    ///
    /// Returns [`DbError::NotFound`] if no company has this handle.
    pub async fn remove(&self, handle: &str) -> DbResult<()> {
        let row = self
            .executor
            .query_opt(
                "DELETE FROM companies WHERE handle = $1 RETURNING handle",
                &[SqlValue::from(handle)],
            )
            .await?;
        if row.is_none() {
            tracing::debug!(handle, "company not found for delete");
            return Err(DbError::not_found(format!("No company: {handle}")));
        }
        Ok(())
    }
}
