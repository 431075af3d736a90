//! End-to-end tests for the HTTP surface against in-memory SurrealDB.

use axum::Router;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, Request, StatusCode};
use hms_auth::AuthConfig;
use hms_auth::token::decode_session_token;
use hms_db::{DbConfig, DbManager};
use hms_server::{AppState, router};
use serde_json::{Value, json};
use tower::ServiceExt;

const SECRET: &str = "api-test-secret";

fn auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: SECRET.into(),
        ..AuthConfig::default()
    }
}

async fn app() -> Router {
    let db = DbManager::connect(&DbConfig::in_memory()).await.unwrap();
    hms_db::run_migrations(db.client()).await.unwrap();
    router(AppState::new(db.client().clone(), auth_config(), false))
}

enum Cred<'a> {
    None,
    Bearer(&'a str),
    Cookie(&'a str),
}

fn request(method: &str, uri: &str, body: Option<Value>, cred: Cred<'_>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    match cred {
        Cred::None => {}
        Cred::Bearer(token) => builder = builder.header(AUTHORIZATION, format!("Bearer {token}")),
        Cred::Cookie(token) => builder = builder.header(COOKIE, format!("session={token}")),
    }
    match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, headers, body)
}

async fn register(app: &Router, name: &str, email: &str) -> Value {
    let (status, _, body) = send(
        app,
        request(
            "POST",
            "/api/hospitals/register",
            Some(json!({ "name": name, "email": email, "password": "secret1" })),
            Cred::None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

async fn login(app: &Router, email: &str, password: &str, role: &str) -> String {
    let (status, _, body) = send(
        app,
        request(
            "POST",
            "/api/auth/login",
            Some(json!({ "email": email, "password": password, "role": role })),
            Cred::None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["token"].as_str().unwrap().to_owned()
}

/// Registers a hospital and returns (hospital id, admin token).
async fn hospital_with_admin(app: &Router, name: &str, email: &str) -> (String, String) {
    let body = register(app, name, email).await;
    let id = body["hospital"]["id"].as_str().unwrap().to_owned();
    let token = login(app, email, "secret1", "HOSPITAL_ADMIN").await;
    (id, token)
}

async fn add_staff(app: &Router, admin: &str, email: &str) -> String {
    let (status, _, body) = send(
        app,
        request(
            "POST",
            "/api/admin/add-staff",
            Some(json!({ "name": "Sam Staff", "email": email, "password": "staffpass" })),
            Cred::Bearer(admin),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    login(app, email, "staffpass", "STAFF").await
}

/// Adds a doctor; returns (doctor profile id, doctor token).
async fn add_doctor(app: &Router, admin: &str, email: &str) -> (String, String) {
    let (status, _, body) = send(
        app,
        request(
            "POST",
            "/api/admin/add-doctor",
            Some(json!({
                "name": "Dr Grey",
                "email": email,
                "password": "doctorpass",
                "specialization": "Surgery",
            })),
            Cred::Bearer(admin),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["doctor"]["user"]["email"], email);
    let id = body["doctor"]["id"].as_str().unwrap().to_owned();
    let token = login(app, email, "doctorpass", "DOCTOR").await;
    (id, token)
}

async fn register_patient(app: &Router, staff: &str, name: &str, age: Value) -> String {
    let (status, _, body) = send(
        app,
        request(
            "POST",
            "/api/staff/register-patient",
            Some(json!({ "name": name, "age": age, "gender": "female", "phone": "555-0100" })),
            Cred::Bearer(staff),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["success"], true);
    body["patient"]["id"].as_str().unwrap().to_owned()
}

// -----------------------------------------------------------------------
// Registration and login
// -----------------------------------------------------------------------

#[tokio::test]
async fn health_is_public() {
    let app = app().await;
    let (status, _, body) = send(&app, request("GET", "/api/health", None, Cred::None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn register_then_duplicate_email_is_rejected() {
    let app = app().await;
    let body = register(&app, "A", "a@a.com").await;
    assert_eq!(body["message"], "Hospital registered");
    assert_eq!(body["hospital"]["email"], "a@a.com");
    assert!(body["hospital"].get("passwordHash").is_none());

    let (status, _, body) = send(
        &app,
        request(
            "POST",
            "/api/hospitals/register",
            Some(json!({ "name": "A", "email": "a@a.com", "password": "secret1" })),
            Cred::None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email already exists");
}

#[tokio::test]
async fn register_rejects_missing_fields() {
    let app = app().await;
    let (status, _, body) = send(
        &app,
        request(
            "POST",
            "/api/hospitals/register",
            Some(json!({ "name": "A" })),
            Cred::None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn login_token_carries_hospital_id_and_sets_cookie() {
    let app = app().await;
    let reg = register(&app, "A", "a@a.com").await;
    let hospital_id = reg["hospital"]["id"].as_str().unwrap();

    let (status, headers, body) = send(
        &app,
        request(
            "POST",
            "/api/auth/login",
            Some(json!({ "email": "a@a.com", "password": "secret1", "role": "HOSPITAL_ADMIN" })),
            Cred::None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let token = body["token"].as_str().unwrap();
    let claims = decode_session_token(token, &auth_config()).unwrap();
    assert_eq!(claims.hospital_id, hospital_id);

    let cookie = headers.get(SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cookie.starts_with(&format!("session={token}")));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
}

#[tokio::test]
async fn wrong_password_and_wrong_role_are_401() {
    let app = app().await;
    register(&app, "A", "a@a.com").await;

    for body in [
        json!({ "email": "a@a.com", "password": "nope", "role": "HOSPITAL_ADMIN" }),
        json!({ "email": "a@a.com", "password": "secret1", "role": "STAFF" }),
    ] {
        let (status, _, resp) =
            send(&app, request("POST", "/api/auth/login", Some(body), Cred::None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(resp["error"], "Invalid credentials");
    }

    let (status, _, _) = send(
        &app,
        request(
            "POST",
            "/api/auth/login",
            Some(json!({ "email": "a@a.com", "password": "secret1", "role": "JANITOR" })),
            Cred::None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn hospital_login_returns_hospital_and_admin_session() {
    let app = app().await;
    register(&app, "A", "a@a.com").await;

    let (status, headers, body) = send(
        &app,
        request(
            "POST",
            "/api/hospitals/login",
            Some(json!({ "email": "a@a.com", "password": "secret1" })),
            Cred::None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");
    assert!(headers.get(SET_COOKIE).is_some());

    let token = body["token"].as_str().unwrap();
    let (status, _, session) =
        send(&app, request("GET", "/api/auth/session", None, Cred::Cookie(token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["user"]["role"], "HOSPITAL_ADMIN");
    assert_eq!(session["user"]["hospitalId"], body["hospital"]["id"]);
}

// -----------------------------------------------------------------------
// Guard behavior
// -----------------------------------------------------------------------

const ADMIN: &str = "HOSPITAL_ADMIN";
const STAFF: &str = "STAFF";
const DOCTOR: &str = "DOCTOR";

/// Every guarded route with the roles its policy admits.
const GUARDED: &[(&str, &str, &[&str])] = &[
    ("GET", "/api/hospitals/info", &[ADMIN]),
    ("GET", "/api/hospitals/info/", &[ADMIN]),
    ("GET", "/api/auth/session", &[ADMIN, STAFF, DOCTOR]),
    ("GET", "/api/auth/user/me", &[ADMIN, STAFF, DOCTOR]),
    ("POST", "/api/admin/add-doctor", &[ADMIN]),
    ("POST", "/api/admin/add-staff", &[ADMIN]),
    ("GET", "/api/admin/patients", &[ADMIN]),
    ("GET", "/api/admin/patients/getByName?name=x", &[ADMIN]),
    ("GET", "/api/dashboard/stats", &[ADMIN]),
    ("POST", "/api/staff/register-patient", &[STAFF]),
    ("GET", "/api/staff/patients", &[STAFF]),
    ("GET", "/api/staff/doctors", &[STAFF]),
    ("POST", "/api/appointment/create", &[STAFF]),
    ("GET", "/api/appointment/fetchAll", &[ADMIN, STAFF]),
    ("GET", "/api/doctor/me", &[DOCTOR]),
    ("GET", "/api/doctor/appointments", &[DOCTOR]),
    ("GET", "/api/doctor/patients", &[DOCTOR]),
    ("GET", "/api/doctor/prescriptions", &[DOCTOR]),
    ("POST", "/api/doctor/prescriptions/create", &[DOCTOR]),
    ("GET", "/api/patient/list", &[DOCTOR]),
];

#[tokio::test]
async fn every_guarded_route_without_credential_is_401() {
    let app = app().await;
    for (method, uri, _) in GUARDED {
        let (status, _, body) = send(&app, request(method, uri, None, Cred::None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
        assert_eq!(body, json!({ "error": "Unauthorized" }), "{method} {uri}");
    }
}

#[tokio::test]
async fn every_guarded_route_enforces_its_roles() {
    let app = app().await;
    let (_, admin) = hospital_with_admin(&app, "A", "a@a.com").await;
    let staff = add_staff(&app, &admin, "staff@a.com").await;
    let (_, doctor) = add_doctor(&app, &admin, "doc@a.com").await;
    let tokens = [(ADMIN, &admin), (STAFF, &staff), (DOCTOR, &doctor)];

    for (method, uri, allowed) in GUARDED {
        for (role, token) in &tokens {
            let (status, _, body) =
                send(&app, request(method, uri, None, Cred::Bearer(token))).await;
            if allowed.contains(role) {
                assert!(
                    status != StatusCode::UNAUTHORIZED && status != StatusCode::FORBIDDEN,
                    "{role} should pass {method} {uri}, got {status}"
                );
            } else {
                assert_eq!(status, StatusCode::FORBIDDEN, "{role} on {method} {uri}");
                assert_eq!(body["error"], "Forbidden");
            }
        }
    }
}

#[tokio::test]
async fn forged_or_raw_cookie_values_are_401() {
    let app = app().await;
    let (hospital_id, _) = hospital_with_admin(&app, "A", "a@a.com").await;

    // A bare id in the cookie is not a credential.
    let (status, _, _) = send(
        &app,
        request("GET", "/api/dashboard/stats", None, Cred::Cookie(&hospital_id)),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let other = AuthConfig {
        jwt_secret: "not-the-server-secret".into(),
        ..AuthConfig::default()
    };
    let forged = hms_auth::token::issue_session_token(
        &hms_auth::SessionIdentity {
            id: uuid::Uuid::new_v4(),
            role: hms_core::models::role::Role::HospitalAdmin,
            hospital_id: hospital_id.parse().unwrap(),
        },
        &other,
    )
    .unwrap();
    let (status, _, _) = send(
        &app,
        request("GET", "/api/dashboard/stats", None, Cred::Bearer(&forged)),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_clears_cookie() {
    let app = app().await;
    for (method, uri) in [("POST", "/api/auth/logout"), ("GET", "/api/logout")] {
        let (status, headers, _) = send(&app, request(method, uri, None, Cred::None)).await;
        assert_eq!(status, StatusCode::OK);
        let cookie = headers.get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.starts_with("session=;"));
        assert!(cookie.contains("Max-Age=0"));
    }
}

// -----------------------------------------------------------------------
// Workflows
// -----------------------------------------------------------------------

#[tokio::test]
async fn clinical_workflow_end_to_end() {
    let app = app().await;
    let (hospital_id, admin) = hospital_with_admin(&app, "A", "a@a.com").await;
    let staff = add_staff(&app, &admin, "staff@a.com").await;
    let (doctor_id, doctor) = add_doctor(&app, &admin, "doc@a.com").await;

    let ann = register_patient(&app, &staff, "Ann Lee", json!("42")).await;
    let ben = register_patient(&app, &staff, "Ben Ortiz", json!(30)).await;

    for (patient, date) in [
        (&ann, "2026-03-01T09:00"),
        (&ann, "2026-03-08T09:00"),
        (&ben, "2026-03-02"),
    ] {
        let (status, _, body) = send(
            &app,
            request(
                "POST",
                "/api/appointment/create",
                Some(json!({ "doctorId": doctor_id, "patientId": patient, "date": date })),
                Cred::Bearer(&staff),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["appointment"]["hospitalId"], hospital_id);
    }

    let (status, _, body) = send(
        &app,
        request(
            "POST",
            "/api/doctor/prescriptions/create",
            Some(json!({ "patientId": ann, "content": "Rest and fluids" })),
            Cred::Cookie(&doctor),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let (_, _, body) =
        send(&app, request("GET", "/api/doctor/patients", None, Cred::Bearer(&doctor))).await;
    let patients = body["patients"].as_array().unwrap();
    assert_eq!(patients.len(), 2);
    assert_eq!(patients[0]["id"], ann.as_str());

    let (_, _, body) =
        send(&app, request("GET", "/api/doctor/me", None, Cred::Bearer(&doctor))).await;
    assert_eq!(body["specialization"], "Surgery");
    assert_eq!(body["appointments"].as_array().unwrap().len(), 3);
    assert_eq!(body["prescriptions"][0]["patient"]["name"], "Ann Lee");

    let (_, _, body) =
        send(&app, request("GET", "/api/dashboard/stats", None, Cred::Bearer(&admin))).await;
    assert_eq!(body, json!({ "doctors": 1, "patients": 2, "appointments": 3 }));

    let (_, _, body) = send(
        &app,
        request("GET", "/api/appointment/fetchAll", None, Cred::Bearer(&admin)),
    )
    .await;
    let appts = body["appointments"].as_array().unwrap();
    assert_eq!(appts.len(), 3);
    assert_eq!(appts[0]["doctor"]["user"]["name"], "Dr Grey");

    let (status, _, body) = send(
        &app,
        request(
            "GET",
            "/api/admin/patients/getByName?name=ortiz",
            None,
            Cred::Bearer(&admin),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Ben Ortiz");
    assert_eq!(body["age"], 30);

    let (_, _, body) =
        send(&app, request("GET", "/api/admin/patients", None, Cred::Bearer(&admin))).await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["patients"][0]["creator"]["name"], "Sam Staff");
}

#[tokio::test]
async fn tenants_are_isolated() {
    let app = app().await;
    let (_, admin_a) = hospital_with_admin(&app, "A", "a@a.com").await;
    let (_, admin_b) = hospital_with_admin(&app, "B", "b@b.com").await;
    let staff_a = add_staff(&app, &admin_a, "staff@a.com").await;
    let staff_b = add_staff(&app, &admin_b, "staff@b.com").await;
    let (doctor_a, _) = add_doctor(&app, &admin_a, "doc@a.com").await;

    let patient_a = register_patient(&app, &staff_a, "Ann Lee", json!(42)).await;

    let (_, _, body) =
        send(&app, request("GET", "/api/admin/patients", None, Cred::Bearer(&admin_b))).await;
    assert_eq!(body["total"], 0);

    let (status, _, _) = send(
        &app,
        request(
            "GET",
            "/api/admin/patients/getByName?name=ann",
            None,
            Cred::Bearer(&admin_b),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, _, body) =
        send(&app, request("GET", "/api/staff/doctors", None, Cred::Bearer(&staff_b))).await;
    assert!(body["doctors"].as_array().unwrap().is_empty());

    // Booking hospital A's doctor and patient from hospital B is refused.
    let (status, _, body) = send(
        &app,
        request(
            "POST",
            "/api/appointment/create",
            Some(json!({ "doctorId": doctor_a, "patientId": patient_a, "date": "2026-03-01" })),
            Cred::Bearer(&staff_b),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Doctor not found");
}

#[tokio::test]
async fn duplicate_doctor_email_leaves_no_partial_records() {
    let app = app().await;
    let (_, admin) = hospital_with_admin(&app, "A", "a@a.com").await;
    add_doctor(&app, &admin, "doc@a.com").await;

    let (status, _, body) = send(
        &app,
        request(
            "POST",
            "/api/admin/add-doctor",
            Some(json!({
                "name": "Dr Two",
                "email": "doc@a.com",
                "password": "doctorpass",
                "specialization": "Oncology",
            })),
            Cred::Bearer(&admin),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email already exists");

    let (_, _, stats) =
        send(&app, request("GET", "/api/dashboard/stats", None, Cred::Bearer(&admin))).await;
    assert_eq!(stats["doctors"], 1);
}

#[tokio::test]
async fn doctor_with_no_appointments_gets_empty_lists() {
    let app = app().await;
    let (_, admin) = hospital_with_admin(&app, "A", "a@a.com").await;
    let staff = add_staff(&app, &admin, "staff@a.com").await;
    let (_, doctor) = add_doctor(&app, &admin, "doc@a.com").await;

    let (_, _, body) =
        send(&app, request("GET", "/api/doctor/appointments", None, Cred::Bearer(&doctor))).await;
    assert_eq!(body, json!({ "appointments": [] }));

    let (_, _, body) =
        send(&app, request("GET", "/api/patient/list", None, Cred::Bearer(&doctor))).await;
    assert!(body["patients"].as_array().unwrap().is_empty());

    register_patient(&app, &staff, "Cara Diaz", json!(19)).await;
    let (_, _, body) =
        send(&app, request("GET", "/api/patient/list", None, Cred::Bearer(&doctor))).await;
    assert_eq!(body["patients"][0]["name"], "Cara Diaz");
    assert!(body["patients"][0].get("phone").is_none());
}

#[tokio::test]
async fn user_me_includes_hospital() {
    let app = app().await;
    let (hospital_id, admin) = hospital_with_admin(&app, "A", "a@a.com").await;

    let (status, _, body) =
        send(&app, request("GET", "/api/auth/user/me", None, Cred::Bearer(&admin))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["name"], "A Admin");
    assert_eq!(body["user"]["hospital"]["id"], hospital_id);

    let (_, _, info) =
        send(&app, request("GET", "/api/hospitals/info", None, Cred::Bearer(&admin))).await;
    assert_eq!(info["id"], hospital_id);
    assert_eq!(info["counts"]["users"], 1);
}

#[tokio::test]
async fn hospital_info_accepts_trailing_slash() {
    let app = app().await;
    let (hospital_id, admin) = hospital_with_admin(&app, "A", "a@a.com").await;

    let (status, _, body) =
        send(&app, request("GET", "/api/hospitals/info/", None, Cred::Bearer(&admin))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], hospital_id);
}

// -----------------------------------------------------------------------
// Request body validation
// -----------------------------------------------------------------------

#[tokio::test]
async fn wrong_field_types_are_400() {
    let app = app().await;
    let (_, admin) = hospital_with_admin(&app, "A", "a@a.com").await;
    let staff = add_staff(&app, &admin, "staff@a.com").await;
    let (doctor_id, _) = add_doctor(&app, &admin, "doc@a.com").await;
    let patient_id = register_patient(&app, &staff, "Pat", json!(30)).await;

    let cases = [
        (
            "/api/staff/register-patient",
            json!({ "name": "Pat", "age": true, "gender": "male", "phone": "1" }),
            Cred::Bearer(&staff),
        ),
        (
            "/api/appointment/create",
            json!({ "doctorId": "nope", "patientId": patient_id, "date": "2030-01-01" }),
            Cred::Bearer(&staff),
        ),
        (
            "/api/hospitals/register",
            json!({ "name": 1, "email": "b@b.com", "password": "secret1" }),
            Cred::None,
        ),
    ];
    for (uri, payload, cred) in cases {
        let (status, _, body) = send(&app, request("POST", uri, Some(payload), cred)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}: {body}");
        let message = body["error"].as_str().unwrap();
        assert!(!message.contains("untagged") && !message.contains("line 1"), "{message}");
    }

    // The valid doctor id still books.
    let (status, _, _) = send(
        &app,
        request(
            "POST",
            "/api/appointment/create",
            Some(json!({ "doctorId": doctor_id, "patientId": patient_id, "date": "2030-01-01" })),
            Cred::Bearer(&staff),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn oversized_age_is_400() {
    let app = app().await;
    let (_, admin) = hospital_with_admin(&app, "A", "a@a.com").await;
    let staff = add_staff(&app, &admin, "staff@a.com").await;

    let (status, _, body) = send(
        &app,
        request(
            "POST",
            "/api/staff/register-patient",
            Some(json!({ "name": "Pat", "age": 5_000_000_000_i64, "gender": "m", "phone": "1" })),
            Cred::Bearer(&staff),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "age is out of range");
}
