//! Hospital (tenant) domain model.
//!
//! A hospital is the isolation boundary for all users, doctors,
//! patients, appointments and prescriptions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hospital {
    pub id: Uuid,
    pub name: String,
    /// Login email for the hospital account. Unique across hospitals.
    pub email: String,
    /// Argon2id PHC string.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to register a new hospital.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateHospital {
    pub name: String,
    pub email: String,
    /// Raw password (will be hashed with Argon2id before storage).
    pub password: String,
}
