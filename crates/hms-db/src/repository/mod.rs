//! SurrealDB repository implementations.

mod appointment;
mod doctor;
mod hospital;
mod patient;
mod prescription;
mod user;

pub use appointment::SurrealAppointmentRepository;
pub use doctor::SurrealDoctorRepository;
pub use hospital::SurrealHospitalRepository;
pub use patient::SurrealPatientRepository;
pub use prescription::SurrealPrescriptionRepository;
pub use user::SurrealUserRepository;

use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// Parse a UUID stored as a string column.
fn parse_uuid(value: &str, column: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(value).map_err(|e| DbError::Decode(format!("invalid {column} UUID: {e}")))
}

/// The first row of a lookup, or `NotFound` keyed by `key`.
fn single<T>(rows: Vec<T>, entity: &str, key: impl Into<String>) -> Result<T, DbError> {
    rows.into_iter().next().ok_or_else(|| DbError::NotFound {
        entity: entity.into(),
        id: key.into(),
    })
}
