//! SurrealDB implementation of [`PrescriptionRepository`].

use chrono::{DateTime, Utc};
use hms_core::error::HmsResult;
use hms_core::models::prescription::{CreatePrescription, Prescription};
use hms_core::repository::PrescriptionRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{parse_uuid, single};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct PrescriptionRow {
    record_id: String,
    hospital_id: String,
    doctor_id: String,
    patient_id: String,
    content: String,
    created_at: DateTime<Utc>,
}

impl PrescriptionRow {
    fn try_into_prescription(self) -> Result<Prescription, DbError> {
        Ok(Prescription {
            id: parse_uuid(&self.record_id, "prescription")?,
            hospital_id: parse_uuid(&self.hospital_id, "hospital")?,
            doctor_id: parse_uuid(&self.doctor_id, "doctor")?,
            patient_id: parse_uuid(&self.patient_id, "patient")?,
            content: self.content,
            created_at: self.created_at,
        })
    }
}

/// SurrealDB implementation of the Prescription repository.
#[derive(Clone)]
pub struct SurrealPrescriptionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPrescriptionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    /// Shared body for the two filtered list queries. `column` is one of
    /// the fixed column names below, never caller input.
    async fn list_where(
        &self,
        hospital_id: Uuid,
        column: &'static str,
        value: Uuid,
    ) -> HmsResult<Vec<Prescription>> {
        let mut result = self
            .db
            .query(format!(
                "SELECT meta::id(id) AS record_id, * FROM prescription \
                 WHERE hospital_id = $hospital_id AND {column} = $value \
                 ORDER BY created_at DESC"
            ))
            .bind(("hospital_id", hospital_id.to_string()))
            .bind(("value", value.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PrescriptionRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(|row| row.try_into_prescription())
            .collect::<Result<Vec<_>, DbError>>()?)
    }
}

impl<C: Connection> PrescriptionRepository for SurrealPrescriptionRepository<C> {
    async fn create(&self, input: CreatePrescription) -> HmsResult<Prescription> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('prescription', $id) SET \
                 hospital_id = $hospital_id, \
                 doctor_id = $doctor_id, \
                 patient_id = $patient_id, \
                 content = $content \
                 RETURN NONE; \
                 SELECT meta::id(id) AS record_id, * \
                 FROM type::record('prescription', $id);",
            )
            .bind(("id", id_str.clone()))
            .bind(("hospital_id", input.hospital_id.to_string()))
            .bind(("doctor_id", input.doctor_id.to_string()))
            .bind(("patient_id", input.patient_id.to_string()))
            .bind(("content", input.content))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_check(e, "Prescription"))?;

        let rows: Vec<PrescriptionRow> = result.take(1).map_err(DbError::from)?;
        let row = single(rows, "prescription", id_str)?;

        Ok(row.try_into_prescription()?)
    }

    async fn list_by_doctor(
        &self,
        hospital_id: Uuid,
        doctor_id: Uuid,
    ) -> HmsResult<Vec<Prescription>> {
        self.list_where(hospital_id, "doctor_id", doctor_id).await
    }

    async fn list_by_patient(
        &self,
        hospital_id: Uuid,
        patient_id: Uuid,
    ) -> HmsResult<Vec<Prescription>> {
        self.list_where(hospital_id, "patient_id", patient_id).await
    }
}
