use crate::error::DbResult;
use crate::fields::{FieldAllowList, FieldTranslation};
use crate::record::{FromRecord, Record};
use crate::update::UpdateSchema;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Updatable company fields. The handle is the primary key and cannot change.
pub static COMPANY_UPDATE: LazyLock<UpdateSchema> = LazyLock::new(|| {
    UpdateSchema::new(
        "company",
        FieldAllowList::new(["name", "description", "numEmployees", "logoUrl"]),
        FieldTranslation::from_pairs([("numEmployees", "num_employees"), ("logoUrl", "logo_url")]),
    )
});

/// A row of `companies`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

impl FromRecord for Company {
    fn from_record(record: &Record) -> DbResult<Self> {
        Ok(Self {
            handle: record.try_get_column("handle")?,
            name: record.try_get_column("name")?,
            description: record.try_get_column("description")?,
            num_employees: record.try_get_column("numEmployees")?,
            logo_url: record.try_get_column("logoUrl")?,
        })
    }
}

/// Data for inserting a company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCompany {
    pub handle: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub num_employees: Option<i32>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

/// A job as listed under its company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyJob {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
}

impl FromRecord for CompanyJob {
    fn from_record(record: &Record) -> DbResult<Self> {
        Ok(Self {
            id: record.try_get_column("id")?,
            title: record.try_get_column("title")?,
            salary: record.try_get_column("salary")?,
            equity: record.try_get_column("equity")?,
        })
    }
}

/// A company with its jobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: Company,
    pub jobs: Vec<CompanyJob>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::update::PartialUpdate;
    use crate::value::SqlValue;

    #[test]
    fn company_update_schema_translates_columns() {
        let request = PartialUpdate::new()
            .with("name", "NewComp")
            .with("description", "New Comp Description")
            .with("numEmployees", 10)
            .with("logoUrl", "http://new.img");
        let compiled = COMPANY_UPDATE.compile(&request).unwrap();
        assert_eq!(
            compiled.clause,
            r#""name"=$1, "description"=$2, "num_employees"=$3, "logo_url"=$4"#
        );
        assert_eq!(compiled.values[2], SqlValue::Int(10));
    }

    #[test]
    fn company_update_schema_rejects_handle() {
        let err = COMPANY_UPDATE
            .compile(&PartialUpdate::new().with("handle", "new"))
            .unwrap_err();
        assert!(err.is_invalid_request());
    }

    #[test]
    fn company_detail_flattens_company_fields() {
        let detail = CompanyDetail {
            company: Company {
                handle: "c1".into(),
                name: "C1".into(),
                description: "Desc1".into(),
                num_employees: Some(1),
                logo_url: None,
            },
            jobs: vec![],
        };
        let value = serde_json::to_value(&detail).unwrap();
        assert_eq!(value["handle"], "c1");
        assert_eq!(value["numEmployees"], 1);
        assert!(value["jobs"].as_array().unwrap().is_empty());
    }
}
