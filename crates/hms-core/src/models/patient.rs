//! Patient domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: Uuid,
    pub hospital_id: Uuid,
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub phone: String,
    /// The staff user who registered the patient.
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePatient {
    pub hospital_id: Uuid,
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub phone: String,
    pub created_by: Uuid,
}
