//! HS256 session token issuance and verification.
//!
//! The same token travels in the `session` cookie and in an
//! `Authorization: Bearer` header. It carries the user id, role and
//! hospital id; nothing else from the request is trusted.

use chrono::Utc;
use hms_core::models::role::Role;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;

/// JWT claims embedded in every session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    /// Subject: user ID (UUID string).
    pub sub: String,
    pub role: Role,
    /// Hospital ID (UUID string).
    pub hospital_id: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// The authenticated principal recovered from a valid session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionIdentity {
    pub id: Uuid,
    pub role: Role,
    pub hospital_id: Uuid,
}

impl TryFrom<SessionClaims> for SessionIdentity {
    type Error = AuthError;

    fn try_from(claims: SessionClaims) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&claims.sub)
            .map_err(|e| AuthError::TokenInvalid(format!("bad sub: {e}")))?;
        let hospital_id = Uuid::parse_str(&claims.hospital_id)
            .map_err(|e| AuthError::TokenInvalid(format!("bad hospitalId: {e}")))?;
        Ok(Self {
            id,
            role: claims.role,
            hospital_id,
        })
    }
}

fn secret(config: &AuthConfig) -> Result<&[u8], AuthError> {
    if config.jwt_secret.is_empty() {
        return Err(AuthError::Crypto("JWT secret is not configured".into()));
    }
    Ok(config.jwt_secret.as_bytes())
}

/// Issue a signed HS256 session token for `identity`.
pub fn issue_session_token(
    identity: &SessionIdentity,
    config: &AuthConfig,
) -> Result<String, AuthError> {
    let now = Utc::now().timestamp();
    let exp = i64::try_from(config.session_lifetime_secs)
        .ok()
        .and_then(|ttl| now.checked_add(ttl))
        .ok_or_else(|| AuthError::Crypto("session lifetime out of range".into()))?;
    let claims = SessionClaims {
        sub: identity.id.to_string(),
        role: identity.role,
        hospital_id: identity.hospital_id.to_string(),
        iss: config.jwt_issuer.clone(),
        iat: now,
        exp,
        jti: Uuid::new_v4().to_string(),
    };

    let key = EncodingKey::from_secret(secret(config)?);
    jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &key)
        .map_err(|e| AuthError::Crypto(format!("JWT encode: {e}")))
}

/// Decode and verify a session token (signature, expiry, issuer).
pub fn decode_session_token(token: &str, config: &AuthConfig) -> Result<SessionClaims, AuthError> {
    let key = DecodingKey::from_secret(secret(config)?);

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[&config.jwt_issuer]);
    validation.set_required_spec_claims(&["sub", "exp", "iat", "iss"]);
    validation.leeway = 0;

    jsonwebtoken::decode::<SessionClaims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::TokenInvalid(e.to_string()),
        })
}

/// Verify a session token and return the identity it carries.
///
/// Returns `None` for any failure: bad signature, expired, malformed,
/// or an unparseable subject. Never errors.
pub fn verify_session_token(token: &str, config: &AuthConfig) -> Option<SessionIdentity> {
    match decode_session_token(token, config).and_then(SessionIdentity::try_from) {
        Ok(identity) => Some(identity),
        Err(e) => {
            tracing::debug!(error = %e, "session token rejected");
            None
        }
    }
}
