//! Hospital-admin endpoints: member accounts, patient overview and
//! dashboard counters.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use hms_auth::NewMember;
use hms_core::models::doctor::CreateDoctor;
use hms_core::models::patient::Patient;
use hms_core::models::role::Role;
use hms_core::repository::{AppointmentRepository, DoctorRepository, PatientRepository};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{error, info};

use super::PageParams;
use super::views::{DoctorView, Lookup, PatientView, UserRef};
use crate::error::{ApiError, ApiResult};
use crate::extract::{Payload, Session, policy};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddDoctorRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub specialization: String,
}

#[derive(Debug, Deserialize)]
pub struct AddStaffRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct NameQuery {
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PatientPage {
    pub patients: Vec<PatientView>,
    pub total: u64,
}

#[derive(Debug, Serialize)]
pub struct Stats {
    pub doctors: u64,
    pub patients: u64,
    pub appointments: u64,
}

/// POST /api/admin/add-doctor
///
/// Creates the DOCTOR user, then its profile. The user is removed again
/// if the profile insert fails.
pub async fn add_doctor(
    session: Session<policy::HospitalAdmin>,
    State(state): State<AppState>,
    Payload(req): Payload<AddDoctorRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let specialization = req.specialization.trim();
    if specialization.is_empty() {
        return Err(ApiError::bad_request("specialization is required"));
    }
    let hospital_id = session.hospital_id;

    let user = state
        .auth
        .add_member(
            hospital_id,
            NewMember {
                name: req.name,
                email: req.email,
                password: req.password,
            },
            Role::Doctor,
        )
        .await?;

    let doctor = match state
        .doctors
        .create(CreateDoctor {
            hospital_id,
            user_id: user.id,
            specialization: specialization.to_owned(),
        })
        .await
    {
        Ok(doctor) => doctor,
        Err(e) => {
            if let Err(cleanup) = state.auth.remove_member(hospital_id, user.id).await {
                error!(
                    user_id = %user.id,
                    error = %cleanup,
                    "failed to roll back doctor user after profile insert failure"
                );
            }
            return Err(e.into());
        }
    };

    info!(%hospital_id, doctor_id = %doctor.id, "doctor added");
    let doctor = DoctorView {
        doctor,
        user: Some(UserRef::from(&user)),
    };
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Doctor created successfully", "doctor": doctor })),
    ))
}

/// POST /api/admin/add-staff
pub async fn add_staff(
    session: Session<policy::HospitalAdmin>,
    State(state): State<AppState>,
    Payload(req): Payload<AddStaffRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let staff = state
        .auth
        .add_member(
            session.hospital_id,
            NewMember {
                name: req.name,
                email: req.email,
                password: req.password,
            },
            Role::Staff,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Staff added successfully", "staff": staff })),
    ))
}

/// GET /api/admin/patients
pub async fn patients(
    session: Session<policy::HospitalAdmin>,
    State(state): State<AppState>,
    Query(page): Query<PageParams>,
) -> ApiResult<Json<PatientPage>> {
    let result = state
        .patients
        .list(session.hospital_id, page.into())
        .await?;
    let patients = Lookup::new(&state, session.hospital_id)
        .patient_views(result.items)
        .await?;

    Ok(Json(PatientPage {
        patients,
        total: result.total,
    }))
}

/// GET /api/admin/patients/getByName?name=
pub async fn patient_by_name(
    session: Session<policy::HospitalAdmin>,
    State(state): State<AppState>,
    Query(query): Query<NameQuery>,
) -> ApiResult<Json<Patient>> {
    let name = query
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing 'name' query parameter"))?;

    let patient = state.patients.find_by_name(session.hospital_id, name).await?;
    Ok(Json(patient))
}

/// GET /api/dashboard/stats
pub async fn stats(
    session: Session<policy::HospitalAdmin>,
    State(state): State<AppState>,
) -> ApiResult<Json<Stats>> {
    let hospital_id = session.hospital_id;
    let (doctors, patients, appointments) = tokio::try_join!(
        state.doctors.count(hospital_id),
        state.patients.count(hospital_id),
        state.appointments.count(hospital_id),
    )?;

    Ok(Json(Stats {
        doctors,
        patients,
        appointments,
    }))
}
