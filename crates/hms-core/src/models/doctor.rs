//! Doctor profile domain model.
//!
//! A doctor profile extends exactly one [`User`](super::user::User)
//! with role `DOCTOR`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub id: Uuid,
    pub hospital_id: Uuid,
    pub user_id: Uuid,
    pub specialization: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDoctor {
    pub hospital_id: Uuid,
    pub user_id: Uuid,
    pub specialization: String,
}
