//! Appointment booking and listing.

use axum::Json;
use axum::extract::State;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use hms_core::error::HmsError;
use hms_core::models::appointment::CreateAppointment;
use hms_core::repository::{AppointmentRepository, DoctorRepository, PatientRepository};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;
use uuid::Uuid;

use super::views::Lookup;
use crate::error::{ApiError, ApiResult};
use crate::extract::{Payload, Session, policy};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentRequest {
    pub doctor_id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
    #[serde(default)]
    pub date: String,
    pub notes: Option<String>,
}

/// Accepts RFC 3339, an HTML `datetime-local` value (read as UTC), or a
/// bare date (midnight UTC).
pub fn parse_date(raw: &str) -> Result<DateTime<Utc>, HmsError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Some(naive) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(naive.and_utc());
    }
    Err(HmsError::validation(format!("invalid date: {raw}")))
}

/// POST /api/appointment/create
///
/// The doctor and patient must both belong to the caller's hospital.
pub async fn create(
    session: Session<policy::Staff>,
    State(state): State<AppState>,
    Payload(req): Payload<CreateAppointmentRequest>,
) -> ApiResult<Json<Value>> {
    let doctor_id = req
        .doctor_id
        .ok_or_else(|| ApiError::bad_request("doctorId is required"))?;
    let patient_id = req
        .patient_id
        .ok_or_else(|| ApiError::bad_request("patientId is required"))?;
    if req.date.trim().is_empty() {
        return Err(ApiError::bad_request("date is required"));
    }
    let date = parse_date(&req.date)?;
    let hospital_id = session.hospital_id;

    state.doctors.get_by_id(hospital_id, doctor_id).await?;
    state.patients.get_by_id(hospital_id, patient_id).await?;

    let notes = req
        .notes
        .map(|n| n.trim().to_owned())
        .filter(|n| !n.is_empty());

    let appointment = state
        .appointments
        .create(CreateAppointment {
            hospital_id,
            doctor_id,
            patient_id,
            date,
            notes,
        })
        .await?;

    info!(%hospital_id, appointment_id = %appointment.id, "appointment booked");
    Ok(Json(json!({ "success": true, "appointment": appointment })))
}

/// GET /api/appointment/fetchAll
pub async fn fetch_all(
    session: Session<policy::AdminOrStaff>,
    State(state): State<AppState>,
) -> ApiResult<Json<Value>> {
    let appointments = state.appointments.list(session.hospital_id).await?;
    let appointments = Lookup::new(&state, session.hospital_id)
        .appointment_views(appointments, true)
        .await?;
    Ok(Json(json!({ "appointments": appointments })))
}
