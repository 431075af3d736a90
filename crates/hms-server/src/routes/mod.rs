//! HTTP routes, all mounted under `/api`.

mod admin;
mod appointment;
mod auth;
mod doctor;
mod health;
mod hospital;
mod staff;
pub mod views;

use axum::Router;
use axum::routing::{get, post};
use hms_core::repository::Pagination;
use serde::Deserialize;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::state::AppState;

const MAX_PAGE_SIZE: u64 = 200;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health::health))
        // Hospital account
        .route("/hospitals/register", post(hospital::register))
        .route("/hospitals/login", post(hospital::login))
        .route("/hospitals/info", get(hospital::info))
        .route("/hospitals/info/", get(hospital::info))
        // Sessions
        .route("/auth/login", post(auth::login))
        .route("/doctor/login", post(auth::doctor_login))
        .route("/auth/logout", post(auth::logout))
        .route("/logout", get(auth::logout))
        .route("/auth/session", get(auth::session))
        .route("/auth/user/me", get(auth::me))
        // Hospital admin
        .route("/admin/add-doctor", post(admin::add_doctor))
        .route("/admin/add-staff", post(admin::add_staff))
        .route("/admin/patients", get(admin::patients))
        .route("/admin/patients/getByName", get(admin::patient_by_name))
        .route("/dashboard/stats", get(admin::stats))
        // Staff
        .route("/staff/register-patient", post(staff::register_patient))
        .route("/staff/patients", get(staff::patients))
        .route("/staff/doctors", get(staff::doctors))
        .route("/appointment/create", post(appointment::create))
        .route("/appointment/fetchAll", get(appointment::fetch_all))
        // Doctor
        .route("/doctor/me", get(doctor::me))
        .route("/doctor/appointments", get(doctor::appointments))
        .route("/doctor/patients", get(doctor::patients))
        .route("/doctor/prescriptions", get(doctor::prescriptions))
        .route(
            "/doctor/prescriptions/create",
            post(doctor::create_prescription),
        )
        .route("/patient/list", get(doctor::patient_list));

    Router::new()
        .nest("/api", api)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

/// `?offset=&limit=` query parameters for list endpoints.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct PageParams {
    offset: Option<u64>,
    limit: Option<u64>,
}

impl From<PageParams> for Pagination {
    fn from(params: PageParams) -> Self {
        let defaults = Pagination::default();
        Pagination {
            offset: params.offset.unwrap_or(defaults.offset),
            limit: params
                .limit
                .unwrap_or(defaults.limit)
                .clamp(1, MAX_PAGE_SIZE),
        }
    }
}
