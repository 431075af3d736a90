//! Doctor endpoints. Every lookup starts from the doctor profile attached
//! to the caller's user id.

use std::collections::HashSet;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use hms_core::error::HmsResult;
use hms_core::models::doctor::Doctor;
use hms_core::models::hospital::Hospital;
use hms_core::models::prescription::CreatePrescription;
use hms_core::repository::{
    AppointmentRepository, DoctorRepository, HospitalRepository, PatientRepository,
    PrescriptionRepository,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;
use uuid::Uuid;

use super::PageParams;
use super::views::{AppointmentView, Lookup, PatientRef, PrescriptionView, UserRef, found};
use crate::error::{ApiError, ApiResult};
use crate::extract::{Payload, Session, policy};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePrescriptionRequest {
    pub patient_id: Option<Uuid>,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct DoctorProfile {
    #[serde(flatten)]
    pub doctor: Doctor,
    pub user: Option<UserRef>,
    pub hospital: Hospital,
    pub appointments: Vec<AppointmentView>,
    pub prescriptions: Vec<PrescriptionView>,
}

async fn profile(state: &AppState, session: &Session<policy::Doctor>) -> HmsResult<Option<Doctor>> {
    found(
        state
            .doctors
            .get_by_user(session.hospital_id, session.id)
            .await,
    )
}

/// GET /api/doctor/me
pub async fn me(
    session: Session<policy::Doctor>,
    State(state): State<AppState>,
) -> ApiResult<Json<DoctorProfile>> {
    let doctor = profile(&state, &session)
        .await?
        .ok_or_else(|| ApiError::not_found("Doctor not found"))?;
    let hospital_id = session.hospital_id;

    let hospital = state.hospitals.get_by_id(hospital_id).await?;
    let (appointments, prescriptions) = tokio::try_join!(
        state.appointments.list_by_doctor(hospital_id, doctor.id),
        state.prescriptions.list_by_doctor(hospital_id, doctor.id),
    )?;

    let mut lookup = Lookup::new(&state, hospital_id);
    let user = lookup.user(doctor.user_id).await?;
    let appointments = lookup.appointment_views(appointments, false).await?;
    let prescriptions = lookup.prescription_views(prescriptions).await?;

    Ok(Json(DoctorProfile {
        doctor,
        user,
        hospital,
        appointments,
        prescriptions,
    }))
}

/// GET /api/doctor/appointments
pub async fn appointments(
    session: Session<policy::Doctor>,
    State(state): State<AppState>,
) -> ApiResult<Json<Value>> {
    let Some(doctor) = profile(&state, &session).await? else {
        return Ok(Json(json!({ "appointments": [] })));
    };
    let appointments = state
        .appointments
        .list_by_doctor(session.hospital_id, doctor.id)
        .await?;
    let appointments = Lookup::new(&state, session.hospital_id)
        .appointment_views(appointments, false)
        .await?;
    Ok(Json(json!({ "appointments": appointments })))
}

/// GET /api/doctor/patients
///
/// Each patient appears once, in order of their latest appointment.
pub async fn patients(
    session: Session<policy::Doctor>,
    State(state): State<AppState>,
) -> ApiResult<Json<Value>> {
    let Some(doctor) = profile(&state, &session).await? else {
        return Ok(Json(json!({ "patients": [] })));
    };
    let appointments = state
        .appointments
        .list_by_doctor(session.hospital_id, doctor.id)
        .await?;

    let mut seen = HashSet::new();
    let mut lookup = Lookup::new(&state, session.hospital_id);
    let mut patients = Vec::new();
    for appointment in appointments {
        if !seen.insert(appointment.patient_id) {
            continue;
        }
        if let Some(patient) = lookup.patient(appointment.patient_id).await? {
            patients.push(patient);
        }
    }
    Ok(Json(json!({ "patients": patients })))
}

/// GET /api/doctor/prescriptions
pub async fn prescriptions(
    session: Session<policy::Doctor>,
    State(state): State<AppState>,
) -> ApiResult<Json<Value>> {
    let Some(doctor) = profile(&state, &session).await? else {
        return Ok(Json(json!({ "prescriptions": [] })));
    };
    let prescriptions = state
        .prescriptions
        .list_by_doctor(session.hospital_id, doctor.id)
        .await?;
    let prescriptions = Lookup::new(&state, session.hospital_id)
        .prescription_views(prescriptions)
        .await?;
    Ok(Json(json!({ "prescriptions": prescriptions })))
}

/// POST /api/doctor/prescriptions/create
pub async fn create_prescription(
    session: Session<policy::Doctor>,
    State(state): State<AppState>,
    Payload(req): Payload<CreatePrescriptionRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let patient_id = req
        .patient_id
        .ok_or_else(|| ApiError::bad_request("patientId is required"))?;
    let content = req.content.trim();
    if content.is_empty() {
        return Err(ApiError::bad_request("content is required"));
    }
    let hospital_id = session.hospital_id;

    state.patients.get_by_id(hospital_id, patient_id).await?;
    let doctor = profile(&state, &session)
        .await?
        .ok_or_else(|| ApiError::not_found("Doctor not found"))?;

    let prescription = state
        .prescriptions
        .create(CreatePrescription {
            hospital_id,
            doctor_id: doctor.id,
            patient_id,
            content: content.to_owned(),
        })
        .await?;

    info!(%hospital_id, prescription_id = %prescription.id, "prescription written");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "prescription": prescription })),
    ))
}

/// GET /api/patient/list
pub async fn patient_list(
    session: Session<policy::Doctor>,
    State(state): State<AppState>,
    Query(page): Query<PageParams>,
) -> ApiResult<Json<Value>> {
    let result = state
        .patients
        .list(session.hospital_id, page.into())
        .await?;
    let patients: Vec<PatientRef> = result.items.iter().map(PatientRef::from).collect();
    Ok(Json(json!({ "patients": patients })))
}
