//! Repository round trips against a live database.
//!
//! Each test opens its own connection and works on temporary tables, so nothing
//! leaks between tests. Skipped when `DATABASE_URL` is not set.

use jobly_db::{
    CompanyFilter, CompanyRepository, DbError, DbResult, JobFilter, JobRepository, NewCompany,
    NewJob, PartialUpdate,
};
use rust_decimal::Decimal;
use tokio_postgres::{Client, NoTls};

const SCHEMA: &str = r#"
CREATE TEMP TABLE companies (
    handle VARCHAR(25) PRIMARY KEY CHECK (handle = lower(handle)),
    name TEXT UNIQUE NOT NULL,
    num_employees INTEGER CHECK (num_employees >= 0),
    description TEXT NOT NULL,
    logo_url TEXT
);

CREATE TEMP TABLE jobs (
    id SERIAL PRIMARY KEY,
    title TEXT NOT NULL,
    salary INTEGER CHECK (salary >= 0),
    equity NUMERIC CHECK (equity <= 1.0),
    company_handle VARCHAR(25) NOT NULL
        REFERENCES companies ON DELETE CASCADE
);

INSERT INTO companies (handle, name, num_employees, description, logo_url)
VALUES ('c1', 'C1', 1, 'Desc1', 'http://c1.img'),
       ('c2', 'C2', 2, 'Desc2', 'http://c2.img'),
       ('c3', 'C3', 3, 'Desc3', 'http://c3.img');

INSERT INTO jobs (title, salary, equity, company_handle)
VALUES ('Job1', 100, '0.1', 'c1'),
       ('Job2', 200, '0.2', 'c1'),
       ('Job3', 300, '0', 'c1'),
       ('Job4', NULL, NULL, 'c1');
"#;

async fn try_connect() -> DbResult<Option<Client>> {
    dotenvy::dotenv().ok();
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL is not set; skipping");
        return Ok(None);
    };

    let (client, connection) = tokio_postgres::connect(&database_url, NoTls)
        .await
        .map_err(DbError::from_db_error)?;
    tokio::spawn(async move {
        let _ = connection.await;
    });

    client
        .batch_execute(SCHEMA)
        .await
        .map_err(DbError::from_db_error)?;
    Ok(Some(client))
}

async fn job_id(client: &Client, title: &str) -> i32 {
    client
        .query_one("SELECT id FROM jobs WHERE title = $1", &[&title])
        .await
        .unwrap()
        .get(0)
}

// ==================== jobs ====================

#[tokio::test]
async fn job_find_all_filters() -> DbResult<()> {
    let Some(client) = try_connect().await? else {
        return Ok(());
    };
    let repo = JobRepository::new(&client);

    let all = repo.find_all(None).await?;
    let titles: Vec<_> = all.iter().map(|j| j.title.as_str()).collect();
    assert_eq!(titles, ["Job1", "Job2", "Job3", "Job4"]);
    assert_eq!(all[0].company_name.as_deref(), Some("C1"));

    let with_equity = repo
        .find_all(Some(&JobFilter::new().has_equity(true)))
        .await?;
    assert_eq!(with_equity.len(), 2);

    let no_equity_filter = repo
        .find_all(Some(&JobFilter::new().has_equity(false)))
        .await?;
    assert_eq!(no_equity_filter.len(), 4);

    let combined = repo
        .find_all(Some(&JobFilter::new().min_salary(150).title("job")))
        .await?;
    let titles: Vec<_> = combined.iter().map(|j| j.title.as_str()).collect();
    assert_eq!(titles, ["Job2", "Job3"]);

    Ok(())
}

#[tokio::test]
async fn job_create_get_update_remove() -> DbResult<()> {
    let Some(client) = try_connect().await? else {
        return Ok(());
    };
    let repo = JobRepository::new(&client);

    let created = repo
        .create(
            &NewJob::new("Newbie", "c2")
                .salary(50)
                .equity(Decimal::new(5, 1)),
        )
        .await?;
    assert_eq!(created.company_handle, "c2");
    assert_eq!(created.equity, Some(Decimal::new(5, 1)));

    let detail = repo.get(created.id).await?;
    assert_eq!(detail.title, "Newbie");
    assert_eq!(detail.company.map(|c| c.handle), Some("c2".to_string()));

    let data: PartialUpdate =
        serde_json::from_str(r#"{"title": "Senior", "salary": 500, "equity": null}"#).unwrap();
    let updated = repo.update(created.id, &data).await?;
    assert_eq!(updated.title, "Senior");
    assert_eq!(updated.salary, Some(500));
    assert_eq!(updated.equity, None);

    repo.remove(created.id).await?;
    assert!(repo.get(created.id).await.unwrap_err().is_not_found());

    Ok(())
}

#[tokio::test]
async fn job_update_binds_float_equity_to_numeric() -> DbResult<()> {
    let Some(client) = try_connect().await? else {
        return Ok(());
    };
    let id = job_id(&client, "Job1").await;

    let data: PartialUpdate = serde_json::from_str(r#"{"equity": 0.25}"#).unwrap();
    let updated = JobRepository::new(&client).update(id, &data).await?;
    assert_eq!(updated.equity, Some(Decimal::new(25, 2)));

    Ok(())
}

#[tokio::test]
async fn job_update_binds_whole_float_salary_to_integer() -> DbResult<()> {
    let Some(client) = try_connect().await? else {
        return Ok(());
    };
    let id = job_id(&client, "Job2").await;
    let repo = JobRepository::new(&client);

    let data: PartialUpdate = serde_json::from_str(r#"{"salary": 100.0}"#).unwrap();
    let updated = repo.update(id, &data).await?;
    assert_eq!(updated.salary, Some(100));

    let fractional: PartialUpdate = serde_json::from_str(r#"{"salary": 100.5}"#).unwrap();
    assert!(repo.update(id, &fractional).await.is_err());

    Ok(())
}

#[tokio::test]
async fn job_missing_ids_are_not_found() -> DbResult<()> {
    let Some(client) = try_connect().await? else {
        return Ok(());
    };
    let repo = JobRepository::new(&client);

    assert!(repo.get(0).await.unwrap_err().is_not_found());
    assert!(repo.remove(0).await.unwrap_err().is_not_found());
    let update = PartialUpdate::new().with("title", "x");
    assert!(repo.update(0, &update).await.unwrap_err().is_not_found());

    Ok(())
}

// ==================== companies ====================

#[tokio::test]
async fn company_find_all_filters() -> DbResult<()> {
    let Some(client) = try_connect().await? else {
        return Ok(());
    };
    let repo = CompanyRepository::new(&client);

    let ranged = repo
        .find_all(Some(
            &CompanyFilter::new().min_employees(2).max_employees(3),
        ))
        .await?;
    let handles: Vec<_> = ranged.iter().map(|c| c.handle.as_str()).collect();
    assert_eq!(handles, ["c2", "c3"]);

    let named = repo
        .find_all(Some(&CompanyFilter::new().name_like("1")))
        .await?;
    assert_eq!(named.len(), 1);

    Ok(())
}

#[tokio::test]
async fn company_lifecycle() -> DbResult<()> {
    let Some(client) = try_connect().await? else {
        return Ok(());
    };
    let repo = CompanyRepository::new(&client);

    let new = NewCompany {
        handle: "new".into(),
        name: "New".into(),
        description: "New Description".into(),
        num_employees: Some(1),
        logo_url: None,
    };
    repo.create(&new).await?;
    assert!(repo.create(&new).await.unwrap_err().is_invalid_request());

    let updated = repo
        .update(
            "new",
            &PartialUpdate::new()
                .with("numEmployees", 42)
                .with("logoUrl", "http://new.img"),
        )
        .await?;
    assert_eq!(updated.num_employees, Some(42));
    assert_eq!(updated.logo_url.as_deref(), Some("http://new.img"));

    let c1 = repo.get("c1").await?;
    let titles: Vec<_> = c1.jobs.iter().map(|j| j.title.as_str()).collect();
    assert_eq!(titles, ["Job1", "Job2", "Job3", "Job4"]);

    repo.remove("new").await?;
    assert!(repo.get("new").await.unwrap_err().is_not_found());

    Ok(())
}
