//! SurrealDB implementation of [`PatientRepository`].

use chrono::{DateTime, Utc};
use hms_core::error::HmsResult;
use hms_core::models::patient::{CreatePatient, Patient};
use hms_core::repository::{PaginatedResult, Pagination, PatientRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, parse_uuid, single};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct PatientRow {
    record_id: String,
    hospital_id: String,
    name: String,
    age: u32,
    gender: String,
    phone: String,
    created_by: String,
    created_at: DateTime<Utc>,
}

impl PatientRow {
    fn try_into_patient(self) -> Result<Patient, DbError> {
        Ok(Patient {
            id: parse_uuid(&self.record_id, "patient")?,
            hospital_id: parse_uuid(&self.hospital_id, "hospital")?,
            name: self.name,
            age: self.age,
            gender: self.gender,
            phone: self.phone,
            created_by: parse_uuid(&self.created_by, "created_by")?,
            created_at: self.created_at,
        })
    }
}

/// SurrealDB implementation of the Patient repository.
#[derive(Clone)]
pub struct SurrealPatientRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPatientRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> PatientRepository for SurrealPatientRepository<C> {
    async fn create(&self, input: CreatePatient) -> HmsResult<Patient> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('patient', $id) SET \
                 hospital_id = $hospital_id, \
                 name = $name, age = $age, \
                 gender = $gender, phone = $phone, \
                 created_by = $created_by \
                 RETURN NONE; \
                 SELECT meta::id(id) AS record_id, * \
                 FROM type::record('patient', $id);",
            )
            .bind(("id", id_str.clone()))
            .bind(("hospital_id", input.hospital_id.to_string()))
            .bind(("name", input.name))
            .bind(("age", input.age))
            .bind(("gender", input.gender))
            .bind(("phone", input.phone))
            .bind(("created_by", input.created_by.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_check(e, "Patient"))?;

        let rows: Vec<PatientRow> = result.take(1).map_err(DbError::from)?;
        let row = single(rows, "patient", id_str)?;

        Ok(row.try_into_patient()?)
    }

    async fn get_by_id(&self, hospital_id: Uuid, id: Uuid) -> HmsResult<Patient> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM type::record('patient', $id) \
                 WHERE hospital_id = $hospital_id",
            )
            .bind(("id", id.to_string()))
            .bind(("hospital_id", hospital_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PatientRow> = result.take(0).map_err(DbError::from)?;
        let row = single(rows, "patient", id.to_string())?;

        Ok(row.try_into_patient()?)
    }

    async fn list(
        &self,
        hospital_id: Uuid,
        pagination: Pagination,
    ) -> HmsResult<PaginatedResult<Patient>> {
        let hospital_id_str = hospital_id.to_string();
        let total = self.count(hospital_id).await?;

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM patient \
                 WHERE hospital_id = $hospital_id \
                 ORDER BY created_at DESC \
                 LIMIT $limit START $offset",
            )
            .bind(("hospital_id", hospital_id_str))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PatientRow> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_patient())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn find_by_name(&self, hospital_id: Uuid, name: &str) -> HmsResult<Patient> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM patient \
                 WHERE hospital_id = $hospital_id \
                 AND string::contains(string::lowercase(name), $needle) \
                 ORDER BY created_at ASC LIMIT 1",
            )
            .bind(("hospital_id", hospital_id.to_string()))
            .bind(("needle", name.to_lowercase()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PatientRow> = result.take(0).map_err(DbError::from)?;
        let row = single(rows, "patient", format!("name~{name}"))?;

        Ok(row.try_into_patient()?)
    }

    async fn count(&self, hospital_id: Uuid) -> HmsResult<u64> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM patient \
                 WHERE hospital_id = $hospital_id GROUP ALL",
            )
            .bind(("hospital_id", hospital_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }
}
