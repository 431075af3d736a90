//! Staff endpoints: patient registration and the lists staff need to
//! book appointments.

use axum::Json;
use axum::extract::{Query, State};
use hms_core::error::HmsError;
use hms_core::models::patient::CreatePatient;
use hms_core::repository::{DoctorRepository, PatientRepository};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use super::PageParams;
use super::views::Lookup;
use crate::error::{ApiError, ApiResult};
use crate::extract::{Payload, Session, policy};
use crate::state::AppState;

/// Age as sent by forms: either a JSON number or a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AgeInput {
    Number(i64),
    Text(String),
}

impl AgeInput {
    pub fn into_years(self) -> Result<u32, HmsError> {
        let value = match self {
            AgeInput::Number(n) => n,
            AgeInput::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| HmsError::validation("age must be a whole number"))?,
        };
        if value < 0 {
            return Err(HmsError::validation("age must not be negative"));
        }
        u32::try_from(value).map_err(|_| HmsError::validation("age is out of range"))
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterPatientRequest {
    #[serde(default)]
    pub name: String,
    pub age: Option<AgeInput>,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub phone: String,
}

fn required(field: &str, value: &str) -> ApiResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ApiError::bad_request(format!("{field} is required")));
    }
    Ok(value.to_owned())
}

/// POST /api/staff/register-patient
pub async fn register_patient(
    session: Session<policy::Staff>,
    State(state): State<AppState>,
    Payload(req): Payload<RegisterPatientRequest>,
) -> ApiResult<Json<Value>> {
    let name = required("name", &req.name)?;
    let gender = required("gender", &req.gender)?;
    let phone = required("phone", &req.phone)?;
    let age = req
        .age
        .ok_or_else(|| ApiError::bad_request("age is required"))?
        .into_years()?;

    let patient = state
        .patients
        .create(CreatePatient {
            hospital_id: session.hospital_id,
            name,
            age,
            gender,
            phone,
            created_by: session.id,
        })
        .await?;

    info!(hospital_id = %session.hospital_id, patient_id = %patient.id, "patient registered");
    Ok(Json(json!({ "success": true, "patient": patient })))
}

/// GET /api/staff/patients
pub async fn patients(
    session: Session<policy::Staff>,
    State(state): State<AppState>,
    Query(page): Query<PageParams>,
) -> ApiResult<Json<Value>> {
    let result = state
        .patients
        .list(session.hospital_id, page.into())
        .await?;
    Ok(Json(json!({
        "success": true,
        "patients": result.items,
        "total": result.total,
    })))
}

/// GET /api/staff/doctors
pub async fn doctors(
    session: Session<policy::Staff>,
    State(state): State<AppState>,
) -> ApiResult<Json<Value>> {
    let doctors = state.doctors.list(session.hospital_id).await?;
    let doctors = Lookup::new(&state, session.hospital_id)
        .doctor_views(doctors)
        .await?;
    Ok(Json(json!({ "success": true, "doctors": doctors })))
}
