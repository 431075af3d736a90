//! Shared application state handed to every handler.

use std::sync::Arc;

use hms_auth::{AuthConfig, AuthService};
use hms_db::repository::{
    SurrealAppointmentRepository, SurrealDoctorRepository, SurrealHospitalRepository,
    SurrealPatientRepository, SurrealPrescriptionRepository, SurrealUserRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::any::Any;

pub type Auth = AuthService<SurrealHospitalRepository<Any>, SurrealUserRepository<Any>>;

/// Repositories and services built over one injected database handle.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<Auth>,
    pub hospitals: SurrealHospitalRepository<Any>,
    pub users: SurrealUserRepository<Any>,
    pub doctors: SurrealDoctorRepository<Any>,
    pub patients: SurrealPatientRepository<Any>,
    pub appointments: SurrealAppointmentRepository<Any>,
    pub prescriptions: SurrealPrescriptionRepository<Any>,
    pub cookie_secure: bool,
}

impl AppState {
    pub fn new(db: Surreal<Any>, auth_config: AuthConfig, cookie_secure: bool) -> Self {
        let pepper = auth_config.pepper.clone();
        let hospitals = SurrealHospitalRepository::with_pepper(db.clone(), pepper.clone());
        let users = SurrealUserRepository::with_pepper(db.clone(), pepper);
        let auth = AuthService::new(hospitals.clone(), users.clone(), auth_config);

        Self {
            auth: Arc::new(auth),
            hospitals,
            users,
            doctors: SurrealDoctorRepository::new(db.clone()),
            patients: SurrealPatientRepository::new(db.clone()),
            appointments: SurrealAppointmentRepository::new(db.clone()),
            prescriptions: SurrealPrescriptionRepository::new(db),
            cookie_secure,
        }
    }

    /// Session lifetime, used as the cookie `Max-Age`.
    pub fn session_lifetime_secs(&self) -> u64 {
        self.auth.config().session_lifetime_secs
    }
}
