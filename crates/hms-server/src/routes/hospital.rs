//! Hospital registration, hospital-account login and the admin overview.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use hms_auth::{HospitalLoginInput, RegisterHospitalInput};
use hms_core::models::hospital::Hospital;
use hms_core::models::user::User;
use hms_core::repository::{
    AppointmentRepository, DoctorRepository, HospitalRepository, Pagination, PatientRepository,
    UserRepository,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::auth::with_session;
use super::views::{DoctorView, Lookup};
use crate::error::ApiResult;
use crate::extract::{Payload, Session, policy};
use crate::state::AppState;

const MEMBER_PAGE: Pagination = Pagination {
    offset: 0,
    limit: 500,
};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct HospitalLoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct Counts {
    pub users: u64,
    pub doctors: u64,
    pub patients: u64,
    pub appointments: u64,
}

#[derive(Debug, Serialize)]
pub struct HospitalInfo {
    #[serde(flatten)]
    pub hospital: Hospital,
    pub users: Vec<User>,
    pub doctors: Vec<DoctorView>,
    pub counts: Counts,
}

/// POST /api/hospitals/register
pub async fn register(
    State(state): State<AppState>,
    Payload(req): Payload<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let out = state
        .auth
        .register_hospital(RegisterHospitalInput {
            name: req.name,
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Hospital registered", "hospital": out.hospital })),
    ))
}

/// POST /api/hospitals/login
pub async fn login(
    State(state): State<AppState>,
    Payload(req): Payload<HospitalLoginRequest>,
) -> ApiResult<Response> {
    let out = state
        .auth
        .hospital_login(HospitalLoginInput {
            email: req.email,
            password: req.password,
        })
        .await?;

    with_session(
        &state,
        &out.token,
        json!({
            "message": "Login successful",
            "hospital": out.hospital,
            "token": out.token,
        }),
    )
}

/// GET /api/hospitals/info
pub async fn info(
    session: Session<policy::HospitalAdmin>,
    State(state): State<AppState>,
) -> ApiResult<Json<HospitalInfo>> {
    let hospital_id = session.hospital_id;
    let hospital = state.hospitals.get_by_id(hospital_id).await?;
    let users = state.users.list(hospital_id, None, MEMBER_PAGE).await?;
    let doctors = state.doctors.list(hospital_id).await?;

    let (patients, appointments) = tokio::try_join!(
        state.patients.count(hospital_id),
        state.appointments.count(hospital_id),
    )?;

    let counts = Counts {
        users: users.total,
        doctors: doctors.len() as u64,
        patients,
        appointments,
    };
    let doctors = Lookup::new(&state, hospital_id)
        .doctor_views(doctors)
        .await?;

    Ok(Json(HospitalInfo {
        hospital,
        users: users.items,
        doctors,
        counts,
    }))
}
