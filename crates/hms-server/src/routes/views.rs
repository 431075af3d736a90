//! Response shapes that join a record with the related records a client
//! needs to render it.
//!
//! Joins go through [`Lookup`], which resolves ids inside one hospital
//! only and caches each id for the life of a request.

use std::collections::HashMap;

use hms_core::error::{HmsError, HmsResult};
use hms_core::models::appointment::Appointment;
use hms_core::models::doctor::Doctor;
use hms_core::models::patient::Patient;
use hms_core::models::prescription::Prescription;
use hms_core::models::user::User;
use hms_core::repository::{DoctorRepository, PatientRepository, UserRepository};
use serde::Serialize;
use uuid::Uuid;

use crate::state::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct UserRef {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<&User> for UserRef {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PatientRef {
    pub id: Uuid,
    pub name: String,
}

impl From<&Patient> for PatientRef {
    fn from(patient: &Patient) -> Self {
        Self {
            id: patient.id,
            name: patient.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DoctorView {
    #[serde(flatten)]
    pub doctor: Doctor,
    pub user: Option<UserRef>,
}

#[derive(Debug, Serialize)]
pub struct PatientView {
    #[serde(flatten)]
    pub patient: Patient,
    pub creator: Option<UserRef>,
}

#[derive(Debug, Serialize)]
pub struct AppointmentView {
    #[serde(flatten)]
    pub appointment: Appointment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor: Option<DoctorView>,
    pub patient: Option<Patient>,
}

#[derive(Debug, Serialize)]
pub struct PrescriptionView {
    #[serde(flatten)]
    pub prescription: Prescription,
    pub patient: Option<PatientRef>,
}

/// `NotFound` becomes `None`; other errors propagate.
pub fn found<T>(result: HmsResult<T>) -> HmsResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(HmsError::NotFound { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Per-request, tenant-scoped record resolver.
pub struct Lookup<'a> {
    state: &'a AppState,
    hospital_id: Uuid,
    users: HashMap<Uuid, Option<UserRef>>,
    doctors: HashMap<Uuid, Option<DoctorView>>,
    patients: HashMap<Uuid, Option<Patient>>,
}

impl<'a> Lookup<'a> {
    pub fn new(state: &'a AppState, hospital_id: Uuid) -> Self {
        Self {
            state,
            hospital_id,
            users: HashMap::new(),
            doctors: HashMap::new(),
            patients: HashMap::new(),
        }
    }

    pub async fn user(&mut self, id: Uuid) -> HmsResult<Option<UserRef>> {
        if let Some(cached) = self.users.get(&id) {
            return Ok(cached.clone());
        }
        let user = found(self.state.users.get_by_id(self.hospital_id, id).await)?
            .map(|u| UserRef::from(&u));
        self.users.insert(id, user.clone());
        Ok(user)
    }

    pub async fn patient(&mut self, id: Uuid) -> HmsResult<Option<Patient>> {
        if let Some(cached) = self.patients.get(&id) {
            return Ok(cached.clone());
        }
        let patient = found(self.state.patients.get_by_id(self.hospital_id, id).await)?;
        self.patients.insert(id, patient.clone());
        Ok(patient)
    }

    pub async fn doctor(&mut self, id: Uuid) -> HmsResult<Option<DoctorView>> {
        if let Some(cached) = self.doctors.get(&id) {
            return Ok(cached.clone());
        }
        let view = match found(self.state.doctors.get_by_id(self.hospital_id, id).await)? {
            Some(doctor) => Some(self.doctor_view(doctor).await?),
            None => None,
        };
        self.doctors.insert(id, view.clone());
        Ok(view)
    }

    pub async fn doctor_view(&mut self, doctor: Doctor) -> HmsResult<DoctorView> {
        let user = self.user(doctor.user_id).await?;
        Ok(DoctorView { doctor, user })
    }

    pub async fn doctor_views(&mut self, doctors: Vec<Doctor>) -> HmsResult<Vec<DoctorView>> {
        let mut views = Vec::with_capacity(doctors.len());
        for doctor in doctors {
            views.push(self.doctor_view(doctor).await?);
        }
        Ok(views)
    }

    pub async fn patient_views(&mut self, patients: Vec<Patient>) -> HmsResult<Vec<PatientView>> {
        let mut views = Vec::with_capacity(patients.len());
        for patient in patients {
            let creator = self.user(patient.created_by).await?;
            views.push(PatientView { patient, creator });
        }
        Ok(views)
    }

    /// Appointments joined with patient and, when `with_doctor` is set,
    /// the doctor.
    pub async fn appointment_views(
        &mut self,
        appointments: Vec<Appointment>,
        with_doctor: bool,
    ) -> HmsResult<Vec<AppointmentView>> {
        let mut views = Vec::with_capacity(appointments.len());
        for appointment in appointments {
            let doctor = if with_doctor {
                self.doctor(appointment.doctor_id).await?
            } else {
                None
            };
            let patient = self.patient(appointment.patient_id).await?;
            views.push(AppointmentView {
                appointment,
                doctor,
                patient,
            });
        }
        Ok(views)
    }

    pub async fn prescription_views(
        &mut self,
        prescriptions: Vec<Prescription>,
    ) -> HmsResult<Vec<PrescriptionView>> {
        let mut views = Vec::with_capacity(prescriptions.len());
        for prescription in prescriptions {
            let patient = self
                .patient(prescription.patient_id)
                .await?
                .as_ref()
                .map(PatientRef::from);
            views.push(PrescriptionView {
                prescription,
                patient,
            });
        }
        Ok(views)
    }
}
