//! Login, logout and "who am I" endpoints.

use axum::Json;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::response::{IntoResponse, Response};
use hms_auth::LoginInput;
use hms_core::models::hospital::Hospital;
use hms_core::models::role::Role;
use hms_core::models::user::User;
use hms_core::repository::{HospitalRepository, UserRepository};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::cookie::{clear_session_cookie, session_cookie};
use crate::error::{ApiError, ApiResult};
use crate::extract::{Payload, Session, policy};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct DoctorLoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct MeView {
    #[serde(flatten)]
    pub user: User,
    pub hospital: Hospital,
}

/// JSON `body` with the session cookie for `token` attached.
pub(crate) fn with_session(state: &AppState, token: &str, body: Value) -> ApiResult<Response> {
    let cookie = session_cookie(token, state.session_lifetime_secs(), state.cookie_secure)
        .map_err(ApiError::internal)?;
    Ok(([(SET_COOKIE, cookie)], Json(body)).into_response())
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Payload(req): Payload<LoginRequest>,
) -> ApiResult<Response> {
    if req.role.trim().is_empty() {
        return Err(ApiError::bad_request("role is required"));
    }
    let role: Role = req.role.trim().parse()?;

    let out = state
        .auth
        .login(LoginInput {
            email: req.email,
            password: req.password,
            role,
        })
        .await?;

    with_session(&state, &out.token, json!({ "token": out.token }))
}

/// POST /api/doctor/login
pub async fn doctor_login(
    State(state): State<AppState>,
    Payload(req): Payload<DoctorLoginRequest>,
) -> ApiResult<Response> {
    let out = state
        .auth
        .login(LoginInput {
            email: req.email,
            password: req.password,
            role: Role::Doctor,
        })
        .await?;

    with_session(
        &state,
        &out.token,
        json!({ "message": "Doctor logged in", "token": out.token }),
    )
}

/// POST /api/auth/logout, GET /api/logout
///
/// Tokens are stateless, so logging out only clears the cookie.
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(SET_COOKIE, clear_session_cookie(state.cookie_secure))],
        Json(json!({ "message": "Logged out" })),
    )
}

/// GET /api/auth/session
pub async fn session(session: Session<policy::AnyRole>) -> Json<Value> {
    Json(json!({ "user": session.identity }))
}

/// GET /api/auth/user/me
pub async fn me(
    session: Session<policy::AnyRole>,
    State(state): State<AppState>,
) -> ApiResult<Json<Value>> {
    let user = state.users.get_by_id(session.hospital_id, session.id).await?;
    let hospital = state.hospitals.get_by_id(session.hospital_id).await?;
    Ok(Json(json!({ "user": MeView { user, hospital } })))
}
