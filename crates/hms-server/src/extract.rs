//! Request extractors: the role-checked session guard and a JSON body
//! extractor that reports malformed input in the standard error shape.
//!
//! A handler gets the caller's identity only through [`Session`], and
//! `Session` cannot be named without a [`RolePolicy`]:
//!
//! ```ignore
//! async fn stats(session: Session<policy::HospitalAdmin>) -> ApiResult<Json<Stats>> {
//!     let hospital_id = session.hospital_id;
//!     // ...
//! }
//! ```

use std::marker::PhantomData;
use std::ops::Deref;

use axum::Json;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::extract::rejection::JsonRejection;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode};
use hms_auth::SessionIdentity;
use hms_core::models::role::Role;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::cookie::{SESSION_COOKIE, parse_cookie};
use crate::error::ApiError;
use crate::state::AppState;

/// Which roles may pass a [`Session`] guard.
pub trait RolePolicy: Send + Sync + 'static {
    const NAME: &'static str;
    fn allows(role: Role) -> bool;
}

/// Role policy markers.
pub mod policy {
    use super::{Role, RolePolicy};

    pub struct HospitalAdmin;
    pub struct Staff;
    pub struct Doctor;
    pub struct AdminOrStaff;
    pub struct AnyRole;

    impl RolePolicy for HospitalAdmin {
        const NAME: &'static str = "HOSPITAL_ADMIN";
        fn allows(role: Role) -> bool {
            role == Role::HospitalAdmin
        }
    }

    impl RolePolicy for Staff {
        const NAME: &'static str = "STAFF";
        fn allows(role: Role) -> bool {
            role == Role::Staff
        }
    }

    impl RolePolicy for Doctor {
        const NAME: &'static str = "DOCTOR";
        fn allows(role: Role) -> bool {
            role == Role::Doctor
        }
    }

    impl RolePolicy for AdminOrStaff {
        const NAME: &'static str = "HOSPITAL_ADMIN|STAFF";
        fn allows(role: Role) -> bool {
            matches!(role, Role::HospitalAdmin | Role::Staff)
        }
    }

    impl RolePolicy for AnyRole {
        const NAME: &'static str = "*";
        fn allows(_: Role) -> bool {
            true
        }
    }
}

/// A verified session whose role satisfies `P`.
///
/// Rejects with 401 when no credential verifies and 403 when the role
/// does not match.
pub struct Session<P: RolePolicy> {
    pub identity: SessionIdentity,
    _policy: PhantomData<P>,
}

impl<P: RolePolicy> Deref for Session<P> {
    type Target = SessionIdentity;

    fn deref(&self) -> &Self::Target {
        &self.identity
    }
}

impl<P: RolePolicy> FromRequestParts<AppState> for Session<P> {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let identity = credentials(&parts.headers)
            .into_iter()
            .flatten()
            .find_map(|token| state.auth.verify(&token))
            .ok_or_else(|| {
                warn!(path = %parts.uri.path(), "no valid session credential");
                ApiError::unauthorized()
            })?;

        if !P::allows(identity.role) {
            warn!(
                path = %parts.uri.path(),
                user_id = %identity.id,
                role = %identity.role,
                required = P::NAME,
                "role not permitted"
            );
            return Err(ApiError::forbidden());
        }

        Ok(Self {
            identity,
            _policy: PhantomData,
        })
    }
}

/// Candidate tokens in precedence order: `session` cookie, then
/// `Authorization: Bearer`.
fn credentials(headers: &HeaderMap) -> [Option<String>; 2] {
    [parse_cookie(headers, SESSION_COOKIE), bearer_token(headers)]
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_owned())
}

/// JSON request body. Malformed bodies become a 400 `{ "error": .. }`.
pub struct Payload<T>(pub T);

impl<S, T> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(json_rejection(rejection)),
        }
    }
}

/// Serde detail stays in the log; the client gets a short message.
fn json_rejection(rejection: JsonRejection) -> ApiError {
    debug!(error = %rejection.body_text(), "request body rejected");
    match rejection {
        JsonRejection::JsonDataError(_) => {
            ApiError::bad_request("Request body has a missing or invalid field")
        }
        JsonRejection::JsonSyntaxError(_) => ApiError::bad_request("Request body is not valid JSON"),
        JsonRejection::MissingJsonContentType(_) => ApiError::new(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "Expected Content-Type: application/json",
        ),
        other => ApiError::new(other.status(), other.body_text()),
    }
}
