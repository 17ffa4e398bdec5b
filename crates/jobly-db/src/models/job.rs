use super::company::Company;
use crate::error::DbResult;
use crate::fields::{FieldAllowList, FieldTranslation};
use crate::record::{FromRecord, Record};
use crate::update::UpdateSchema;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Updatable job fields: `title`, `salary`, `equity`. Column names match.
///
/// `id` and `companyHandle` are fixed once a job exists.
pub static JOB_UPDATE: LazyLock<UpdateSchema> = LazyLock::new(|| {
    UpdateSchema::new(
        "job",
        FieldAllowList::new(["title", "salary", "equity"]),
        FieldTranslation::new(),
    )
});

/// A row of `jobs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

impl FromRecord for Job {
    fn from_record(record: &Record) -> DbResult<Self> {
        Ok(Self {
            id: record.try_get_column("id")?,
            title: record.try_get_column("title")?,
            salary: record.try_get_column("salary")?,
            equity: record.try_get_column("equity")?,
            company_handle: record.try_get_column("companyHandle")?,
        })
    }
}

/// Data for inserting a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    pub title: String,
    #[serde(default)]
    pub salary: Option<i32>,
    #[serde(default)]
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

impl NewJob {
    pub fn new(title: impl Into<String>, company_handle: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            salary: None,
            equity: None,
            company_handle: company_handle.into(),
        }
    }

    pub fn salary(mut self, salary: i32) -> Self {
        self.salary = Some(salary);
        self
    }

    pub fn equity(mut self, equity: Decimal) -> Self {
        self.equity = Some(equity);
        self
    }
}

/// A job in search results, with its company's name from the join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListing {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
    pub company_name: Option<String>,
}

impl FromRecord for JobListing {
    fn from_record(record: &Record) -> DbResult<Self> {
        Ok(Self {
            id: record.try_get_column("id")?,
            title: record.try_get_column("title")?,
            salary: record.try_get_column("salary")?,
            equity: record.try_get_column("equity")?,
            company_handle: record.try_get_column("companyHandle")?,
            company_name: record.try_get_column("companyName")?,
        })
    }
}

/// A single job with its company embedded in place of the handle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDetail {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company: Option<Company>,
}

impl JobDetail {
    pub fn new(job: Job, company: Option<Company>) -> Self {
        Self {
            id: job.id,
            title: job.title,
            salary: job.salary,
            equity: job.equity,
            company,
        }
    }
}
