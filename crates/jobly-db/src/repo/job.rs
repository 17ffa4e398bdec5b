use super::{map_all, returned};
use crate::clause::placeholder;
use crate::error::{DbError, DbResult};
use crate::executor::Executor;
use crate::filter::{JobFilter, compile_job_filter};
use crate::models::{Company, JOB_UPDATE, Job, JobDetail, JobListing, NewJob};
use crate::record::FromRecord;
use crate::update::PartialUpdate;
use crate::value::SqlValue;

const JOB_COLUMNS: &str = r#"id, title, salary, equity, company_handle AS "companyHandle""#;

const SELECT_JOB_LISTINGS: &str = r#"SELECT j.id,
       j.title,
       j.salary,
       j.equity,
       j.company_handle AS "companyHandle",
       c.name AS "companyName"
FROM jobs j
LEFT JOIN companies AS c ON c.handle = j.company_handle"#;

/// Job persistence.
///
/// ```ignore
/// let repo = JobRepository::new(&client);
/// let jobs = repo.find_all(Some(&JobFilter::new().min_salary(50000))).await?;
/// ```
pub struct JobRepository<'a, E> {
    executor: &'a E,
}

impl<'a, E: Executor> JobRepository<'a, E> {
    pub fn new(executor: &'a E) -> Self {
        Self { executor }
    }

    /// Insert a job and return it with its generated id.
    pub async fn create(&self, job: &NewJob) -> DbResult<Job> {
        let sql = format!(
            "INSERT INTO jobs (title, salary, equity, company_handle) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {JOB_COLUMNS}"
        );
        let params = [
            SqlValue::from(job.title.as_str()),
            SqlValue::from(job.salary),
            SqlValue::from(job.equity),
            SqlValue::from(job.company_handle.as_str()),
        ];
        let row = self.executor.query_opt(&sql, &params).await?;
        returned(row, || "job insert returned no row".to_string())
    }

    /// All jobs matching `filters` (all jobs when `None`), ordered by title.
    pub async fn find_all(&self, filters: Option<&JobFilter>) -> DbResult<Vec<JobListing>> {
        let compiled = compile_job_filter(filters);

        let mut sql = String::from(SELECT_JOB_LISTINGS);
        compiled.append_where(&mut sql);
        sql.push_str(" ORDER BY title");

        let rows = self.executor.query(&sql, &compiled.values).await?;
        map_all(&rows)
    }

    /// One job with its company embedded.
    ///
    /// Returns [`DbError::NotFound`] if there is no job with this id.
    pub async fn get(&self, id: i32) -> DbResult<JobDetail> {
        let sql = format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1");
        let Some(row) = self.executor.query_opt(&sql, &[SqlValue::from(id)]).await? else {
            tracing::debug!(job_id = id, "job not found");
            return Err(DbError::not_found(format!("No job: {id}")));
        };
        let job = Job::from_record(&row)?;

        let company = self
            .executor
            .query_opt(
                super::company::SELECT_COMPANY_BY_HANDLE,
                &[SqlValue::from(job.company_handle.as_str())],
            )
            .await?
            .map(|row| Company::from_record(&row))
            .transpose()?;

        Ok(JobDetail::new(job, company))
    }

    /// Apply a partial update. Only `title`, `salary` and `equity` may change.
    ///
    /// Returns [`DbError::InvalidRequest`] for an empty or disallowed request and
    /// [`DbError::NotFound`] if no job has this id.
    pub async fn update(&self, id: i32, data: &PartialUpdate) -> DbResult<Job> {
        let (set_cols, mut params) = JOB_UPDATE.compile(data)?.into_params();
        let id_idx = params.push(id);

        let sql = format!(
            "UPDATE jobs SET {set_cols} WHERE id = {} RETURNING {JOB_COLUMNS}",
            placeholder(id_idx)
        );
        let row = self.executor.query_opt(&sql, params.as_slice()).await?;
        returned(row, || format!("No job: {id}"))
    }

    /// Delete a job. Returns [`DbError::NotFound`] if no job has this id.
    pub async fn remove(&self, id: i32) -> DbResult<()> {
        let row = self
            .executor
            .query_opt("DELETE FROM jobs WHERE id = $1 RETURNING id", &[SqlValue::from(id)])
            .await?;
        match row {
            Some(_) => Ok(()),
            None => {
                tracing::debug!(job_id = id, "job not found for delete");
                Err(DbError::not_found(format!("No job: {id}")))
            }
        }
    }
}
