//! SurrealDB implementation of [`DoctorRepository`].

use chrono::{DateTime, Utc};
use hms_core::error::HmsResult;
use hms_core::models::doctor::{CreateDoctor, Doctor};
use hms_core::repository::DoctorRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, parse_uuid, single};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct DoctorRow {
    record_id: String,
    hospital_id: String,
    user_id: String,
    specialization: String,
    created_at: DateTime<Utc>,
}

impl DoctorRow {
    fn try_into_doctor(self) -> Result<Doctor, DbError> {
        Ok(Doctor {
            id: parse_uuid(&self.record_id, "doctor")?,
            hospital_id: parse_uuid(&self.hospital_id, "hospital")?,
            user_id: parse_uuid(&self.user_id, "user")?,
            specialization: self.specialization,
            created_at: self.created_at,
        })
    }
}

/// SurrealDB implementation of the Doctor repository.
#[derive(Clone)]
pub struct SurrealDoctorRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealDoctorRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> DoctorRepository for SurrealDoctorRepository<C> {
    async fn create(&self, input: CreateDoctor) -> HmsResult<Doctor> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('doctor', $id) SET \
                 hospital_id = $hospital_id, \
                 user_id = $user_id, \
                 specialization = $specialization \
                 RETURN NONE; \
                 SELECT meta::id(id) AS record_id, * \
                 FROM type::record('doctor', $id);",
            )
            .bind(("id", id_str.clone()))
            .bind(("hospital_id", input.hospital_id.to_string()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("specialization", input.specialization))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_check(e, "Doctor profile"))?;

        let rows: Vec<DoctorRow> = result.take(1).map_err(DbError::from)?;
        let row = single(rows, "doctor", id_str)?;

        Ok(row.try_into_doctor()?)
    }

    async fn get_by_id(&self, hospital_id: Uuid, id: Uuid) -> HmsResult<Doctor> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM type::record('doctor', $id) \
                 WHERE hospital_id = $hospital_id",
            )
            .bind(("id", id.to_string()))
            .bind(("hospital_id", hospital_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DoctorRow> = result.take(0).map_err(DbError::from)?;
        let row = single(rows, "doctor", id.to_string())?;

        Ok(row.try_into_doctor()?)
    }

    async fn get_by_user(&self, hospital_id: Uuid, user_id: Uuid) -> HmsResult<Doctor> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM doctor \
                 WHERE hospital_id = $hospital_id AND user_id = $user_id",
            )
            .bind(("hospital_id", hospital_id.to_string()))
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DoctorRow> = result.take(0).map_err(DbError::from)?;
        let row = single(rows, "doctor", format!("user_id={user_id}"))?;

        Ok(row.try_into_doctor()?)
    }

    async fn list(&self, hospital_id: Uuid) -> HmsResult<Vec<Doctor>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM doctor \
                 WHERE hospital_id = $hospital_id \
                 ORDER BY created_at ASC",
            )
            .bind(("hospital_id", hospital_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<DoctorRow> = result.take(0).map_err(DbError::from)?;

        Ok(rows
            .into_iter()
            .map(|row| row.try_into_doctor())
            .collect::<Result<Vec<_>, DbError>>()?)
    }

    async fn count(&self, hospital_id: Uuid) -> HmsResult<u64> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM doctor \
                 WHERE hospital_id = $hospital_id GROUP ALL",
            )
            .bind(("hospital_id", hospital_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }
}
