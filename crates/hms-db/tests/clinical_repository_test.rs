//! Integration tests for Doctor, Patient, Appointment and Prescription
//! repositories using in-memory SurrealDB.

use chrono::{Duration, Utc};
use hms_core::error::HmsError;
use hms_core::models::appointment::CreateAppointment;
use hms_core::models::doctor::CreateDoctor;
use hms_core::models::patient::{CreatePatient, Patient};
use hms_core::models::prescription::CreatePrescription;
use hms_core::repository::{
    AppointmentRepository, DoctorRepository, Pagination, PatientRepository,
    PrescriptionRepository,
};
use hms_db::repository::{
    SurrealAppointmentRepository, SurrealDoctorRepository, SurrealPatientRepository,
    SurrealPrescriptionRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    hms_db::run_migrations(&db).await.unwrap();
    db
}

async fn register_patient(
    repo: &SurrealPatientRepository<Db>,
    hospital_id: Uuid,
    name: &str,
) -> Patient {
    repo.create(CreatePatient {
        hospital_id,
        name: name.into(),
        age: 42,
        gender: "female".into(),
        phone: "555-0100".into(),
        created_by: Uuid::new_v4(),
    })
    .await
    .unwrap()
}

// -----------------------------------------------------------------------
// Doctor tests
// -----------------------------------------------------------------------

#[tokio::test]
async fn create_and_lookup_doctor_profile() {
    let db = setup().await;
    let repo = SurrealDoctorRepository::new(db);
    let hospital_id = Uuid::new_v4();
    let user_id = Uuid::new_v4();

    let doctor = repo
        .create(CreateDoctor {
            hospital_id,
            user_id,
            specialization: "Cardiology".into(),
        })
        .await
        .unwrap();

    assert_eq!(doctor.user_id, user_id);
    assert_eq!(doctor.specialization, "Cardiology");

    let by_user = repo.get_by_user(hospital_id, user_id).await.unwrap();
    assert_eq!(by_user.id, doctor.id);

    let by_id = repo.get_by_id(hospital_id, doctor.id).await.unwrap();
    assert_eq!(by_id.user_id, user_id);

    assert_eq!(repo.count(hospital_id).await.unwrap(), 1);
    assert_eq!(repo.list(hospital_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn one_profile_per_user() {
    let db = setup().await;
    let repo = SurrealDoctorRepository::new(db);
    let hospital_id = Uuid::new_v4();
    let user_id = Uuid::new_v4();

    let input = CreateDoctor {
        hospital_id,
        user_id,
        specialization: "Oncology".into(),
    };
    repo.create(input.clone()).await.unwrap();
    let err = repo.create(input).await.unwrap_err();

    assert!(matches!(err, HmsError::AlreadyExists { .. }));
}

#[tokio::test]
async fn doctor_lookup_is_tenant_scoped() {
    let db = setup().await;
    let repo = SurrealDoctorRepository::new(db);
    let owner = Uuid::new_v4();
    let other = Uuid::new_v4();

    let doctor = repo
        .create(CreateDoctor {
            hospital_id: owner,
            user_id: Uuid::new_v4(),
            specialization: "Neurology".into(),
        })
        .await
        .unwrap();

    assert!(matches!(
        repo.get_by_id(other, doctor.id).await,
        Err(HmsError::NotFound { .. })
    ));
    assert!(matches!(
        repo.get_by_user(other, doctor.user_id).await,
        Err(HmsError::NotFound { .. })
    ));
    assert_eq!(repo.count(other).await.unwrap(), 0);
    assert!(repo.list(other).await.unwrap().is_empty());
}

// -----------------------------------------------------------------------
// Patient tests
// -----------------------------------------------------------------------

#[tokio::test]
async fn create_and_list_patients_newest_first() {
    let db = setup().await;
    let repo = SurrealPatientRepository::new(db);
    let hospital_id = Uuid::new_v4();

    let first = register_patient(&repo, hospital_id, "Ann Lee").await;
    tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    let second = register_patient(&repo, hospital_id, "Ben Ortiz").await;

    let fetched = repo.get_by_id(hospital_id, first.id).await.unwrap();
    assert_eq!(fetched.age, 42);
    assert_eq!(fetched.phone, "555-0100");

    let page = repo.list(hospital_id, Pagination::default()).await.unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.items[0].id, second.id);
    assert_eq!(page.items[1].id, first.id);
}

#[tokio::test]
async fn patients_never_leak_across_hospitals() {
    let db = setup().await;
    let repo = SurrealPatientRepository::new(db);
    let hospital_a = Uuid::new_v4();
    let hospital_b = Uuid::new_v4();

    let patient = register_patient(&repo, hospital_a, "Cara Diaz").await;
    register_patient(&repo, hospital_b, "Dan Park").await;

    let page = repo.list(hospital_b, Pagination::default()).await.unwrap();
    assert_eq!(page.total, 1);
    assert!(page.items.iter().all(|p| p.hospital_id == hospital_b));

    assert!(matches!(
        repo.get_by_id(hospital_b, patient.id).await,
        Err(HmsError::NotFound { .. })
    ));
    assert!(matches!(
        repo.find_by_name(hospital_b, "cara").await,
        Err(HmsError::NotFound { .. })
    ));
}

#[tokio::test]
async fn find_patient_by_name_is_case_insensitive() {
    let db = setup().await;
    let repo = SurrealPatientRepository::new(db);
    let hospital_id = Uuid::new_v4();

    let patient = register_patient(&repo, hospital_id, "Eliza Fontaine").await;

    let found = repo.find_by_name(hospital_id, "FONT").await.unwrap();
    assert_eq!(found.id, patient.id);

    assert!(matches!(
        repo.find_by_name(hospital_id, "zzz").await,
        Err(HmsError::NotFound { .. })
    ));
}

// -----------------------------------------------------------------------
// Appointment tests
// -----------------------------------------------------------------------

#[tokio::test]
async fn appointments_are_ordered_by_date_and_filtered_by_doctor() {
    let db = setup().await;
    let repo = SurrealAppointmentRepository::new(db);
    let hospital_id = Uuid::new_v4();
    let doctor_a = Uuid::new_v4();
    let doctor_b = Uuid::new_v4();
    let patient_id = Uuid::new_v4();
    let now = Utc::now();

    let early = repo
        .create(CreateAppointment {
            hospital_id,
            doctor_id: doctor_a,
            patient_id,
            date: now + Duration::days(1),
            notes: Some("follow-up".into()),
        })
        .await
        .unwrap();
    let late = repo
        .create(CreateAppointment {
            hospital_id,
            doctor_id: doctor_a,
            patient_id,
            date: now + Duration::days(7),
            notes: None,
        })
        .await
        .unwrap();
    repo.create(CreateAppointment {
        hospital_id,
        doctor_id: doctor_b,
        patient_id,
        date: now + Duration::days(3),
        notes: None,
    })
    .await
    .unwrap();

    assert_eq!(early.notes.as_deref(), Some("follow-up"));
    assert!(late.notes.is_none());

    let all = repo.list(hospital_id).await.unwrap();
    assert_eq!(all.len(), 3);
    assert!(all.windows(2).all(|w| w[0].date >= w[1].date));

    let for_a = repo.list_by_doctor(hospital_id, doctor_a).await.unwrap();
    assert_eq!(for_a.len(), 2);
    assert_eq!(for_a[0].id, late.id);
    assert_eq!(for_a[1].id, early.id);

    assert_eq!(repo.count(hospital_id).await.unwrap(), 3);
    assert_eq!(repo.count(Uuid::new_v4()).await.unwrap(), 0);
}

// -----------------------------------------------------------------------
// Prescription tests
// -----------------------------------------------------------------------

#[tokio::test]
async fn prescriptions_by_doctor_and_patient() {
    let db = setup().await;
    let repo = SurrealPrescriptionRepository::new(db);
    let hospital_id = Uuid::new_v4();
    let doctor_id = Uuid::new_v4();
    let patient_a = Uuid::new_v4();
    let patient_b = Uuid::new_v4();

    for (patient_id, content) in [
        (patient_a, "Amoxicillin 500mg, 3x daily"),
        (patient_b, "Ibuprofen 200mg as needed"),
        (patient_a, "Vitamin D 1000IU daily"),
    ] {
        repo.create(CreatePrescription {
            hospital_id,
            doctor_id,
            patient_id,
            content: content.into(),
        })
        .await
        .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }

    let by_doctor = repo.list_by_doctor(hospital_id, doctor_id).await.unwrap();
    assert_eq!(by_doctor.len(), 3);
    assert_eq!(by_doctor[0].content, "Vitamin D 1000IU daily");

    let by_patient = repo.list_by_patient(hospital_id, patient_a).await.unwrap();
    assert_eq!(by_patient.len(), 2);
    assert!(by_patient.iter().all(|p| p.patient_id == patient_a));

    let foreign = repo
        .list_by_doctor(Uuid::new_v4(), doctor_id)
        .await
        .unwrap();
    assert!(foreign.is_empty());
}
