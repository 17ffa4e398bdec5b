//! Domain shapes for the `jobs` and `companies` tables.

pub mod company;
pub mod job;

pub use company::{COMPANY_UPDATE, Company, CompanyDetail, CompanyJob, NewCompany};
pub use job::{JOB_UPDATE, Job, JobDetail, JobListing, NewJob};
