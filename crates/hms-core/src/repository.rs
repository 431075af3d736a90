//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Tenant-scoped repositories
//! take a `hospital_id` parameter on every read so that records owned
//! by another hospital are never returned.

use uuid::Uuid;

use crate::error::HmsResult;
use crate::models::{
    appointment::{Appointment, CreateAppointment},
    doctor::{CreateDoctor, Doctor},
    hospital::{CreateHospital, Hospital},
    patient::{CreatePatient, Patient},
    prescription::{CreatePrescription, Prescription},
    role::Role,
    user::{CreateUser, User},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Hospital (global scope)
// ---------------------------------------------------------------------------

pub trait HospitalRepository: Send + Sync {
    fn create(&self, input: CreateHospital) -> impl Future<Output = HmsResult<Hospital>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = HmsResult<Hospital>> + Send;
    fn get_by_email(&self, email: &str) -> impl Future<Output = HmsResult<Hospital>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = HmsResult<()>> + Send;
}

// ---------------------------------------------------------------------------
// Tenant-scoped repositories
// ---------------------------------------------------------------------------

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = HmsResult<User>> + Send;
    fn get_by_id(
        &self,
        hospital_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = HmsResult<User>> + Send;
    /// Email is unique system-wide, so this lookup is not tenant-scoped.
    /// Used by login before the caller's tenant is known.
    fn get_by_email(&self, email: &str) -> impl Future<Output = HmsResult<User>> + Send;
    fn list(
        &self,
        hospital_id: Uuid,
        role: Option<Role>,
        pagination: Pagination,
    ) -> impl Future<Output = HmsResult<PaginatedResult<User>>> + Send;
    fn delete(&self, hospital_id: Uuid, id: Uuid) -> impl Future<Output = HmsResult<()>> + Send;
}

pub trait DoctorRepository: Send + Sync {
    fn create(&self, input: CreateDoctor) -> impl Future<Output = HmsResult<Doctor>> + Send;
    fn get_by_id(
        &self,
        hospital_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = HmsResult<Doctor>> + Send;
    /// Look up the doctor profile attached to a user account.
    fn get_by_user(
        &self,
        hospital_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = HmsResult<Doctor>> + Send;
    fn list(&self, hospital_id: Uuid) -> impl Future<Output = HmsResult<Vec<Doctor>>> + Send;
    fn count(&self, hospital_id: Uuid) -> impl Future<Output = HmsResult<u64>> + Send;
}

pub trait PatientRepository: Send + Sync {
    fn create(&self, input: CreatePatient) -> impl Future<Output = HmsResult<Patient>> + Send;
    fn get_by_id(
        &self,
        hospital_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = HmsResult<Patient>> + Send;
    /// Newest first.
    fn list(
        &self,
        hospital_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = HmsResult<PaginatedResult<Patient>>> + Send;
    /// First patient whose name contains `name`, case-insensitively.
    fn find_by_name(
        &self,
        hospital_id: Uuid,
        name: &str,
    ) -> impl Future<Output = HmsResult<Patient>> + Send;
    fn count(&self, hospital_id: Uuid) -> impl Future<Output = HmsResult<u64>> + Send;
}

pub trait AppointmentRepository: Send + Sync {
    fn create(
        &self,
        input: CreateAppointment,
    ) -> impl Future<Output = HmsResult<Appointment>> + Send;
    /// Ordered by appointment date, latest first.
    fn list(&self, hospital_id: Uuid) -> impl Future<Output = HmsResult<Vec<Appointment>>> + Send;
    fn list_by_doctor(
        &self,
        hospital_id: Uuid,
        doctor_id: Uuid,
    ) -> impl Future<Output = HmsResult<Vec<Appointment>>> + Send;
    fn count(&self, hospital_id: Uuid) -> impl Future<Output = HmsResult<u64>> + Send;
}

pub trait PrescriptionRepository: Send + Sync {
    fn create(
        &self,
        input: CreatePrescription,
    ) -> impl Future<Output = HmsResult<Prescription>> + Send;
    /// Newest first.
    fn list_by_doctor(
        &self,
        hospital_id: Uuid,
        doctor_id: Uuid,
    ) -> impl Future<Output = HmsResult<Vec<Prescription>>> + Send;
    fn list_by_patient(
        &self,
        hospital_id: Uuid,
        patient_id: Uuid,
    ) -> impl Future<Output = HmsResult<Vec<Prescription>>> + Send;
}
