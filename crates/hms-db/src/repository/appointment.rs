//! SurrealDB implementation of [`AppointmentRepository`].

use chrono::{DateTime, Utc};
use hms_core::error::HmsResult;
use hms_core::models::appointment::{Appointment, CreateAppointment};
use hms_core::repository::AppointmentRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, parse_uuid, single};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct AppointmentRow {
    record_id: String,
    hospital_id: String,
    doctor_id: String,
    patient_id: String,
    date: DateTime<Utc>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl AppointmentRow {
    fn try_into_appointment(self) -> Result<Appointment, DbError> {
        Ok(Appointment {
            id: parse_uuid(&self.record_id, "appointment")?,
            hospital_id: parse_uuid(&self.hospital_id, "hospital")?,
            doctor_id: parse_uuid(&self.doctor_id, "doctor")?,
            patient_id: parse_uuid(&self.patient_id, "patient")?,
            date: self.date,
            notes: self.notes,
            created_at: self.created_at,
        })
    }
}

fn collect(rows: Vec<AppointmentRow>) -> Result<Vec<Appointment>, DbError> {
    rows.into_iter()
        .map(|row| row.try_into_appointment())
        .collect()
}

/// SurrealDB implementation of the Appointment repository.
#[derive(Clone)]
pub struct SurrealAppointmentRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealAppointmentRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> AppointmentRepository for SurrealAppointmentRepository<C> {
    async fn create(&self, input: CreateAppointment) -> HmsResult<Appointment> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('appointment', $id) SET \
                 hospital_id = $hospital_id, \
                 doctor_id = $doctor_id, \
                 patient_id = $patient_id, \
                 date = $date, notes = $notes \
                 RETURN NONE; \
                 SELECT meta::id(id) AS record_id, * \
                 FROM type::record('appointment', $id);",
            )
            .bind(("id", id_str.clone()))
            .bind(("hospital_id", input.hospital_id.to_string()))
            .bind(("doctor_id", input.doctor_id.to_string()))
            .bind(("patient_id", input.patient_id.to_string()))
            .bind(("date", input.date))
            .bind(("notes", input.notes))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_check(e, "Appointment"))?;

        let rows: Vec<AppointmentRow> = result.take(1).map_err(DbError::from)?;
        let row = single(rows, "appointment", id_str)?;

        Ok(row.try_into_appointment()?)
    }

    async fn list(&self, hospital_id: Uuid) -> HmsResult<Vec<Appointment>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM appointment \
                 WHERE hospital_id = $hospital_id \
                 ORDER BY date DESC",
            )
            .bind(("hospital_id", hospital_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AppointmentRow> = result.take(0).map_err(DbError::from)?;
        Ok(collect(rows)?)
    }

    async fn list_by_doctor(
        &self,
        hospital_id: Uuid,
        doctor_id: Uuid,
    ) -> HmsResult<Vec<Appointment>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM appointment \
                 WHERE hospital_id = $hospital_id AND doctor_id = $doctor_id \
                 ORDER BY date DESC",
            )
            .bind(("hospital_id", hospital_id.to_string()))
            .bind(("doctor_id", doctor_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AppointmentRow> = result.take(0).map_err(DbError::from)?;
        Ok(collect(rows)?)
    }

    async fn count(&self, hospital_id: Uuid) -> HmsResult<u64> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM appointment \
                 WHERE hospital_id = $hospital_id GROUP ALL",
            )
            .bind(("hospital_id", hospital_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }
}
