//! HMS Auth: password verification, session token issuance and
//! verification, and the login / registration flows.

pub mod config;
pub mod error;
pub mod password;
pub mod service;
pub mod token;

pub use config::AuthConfig;
pub use error::AuthError;
pub use service::{
    AuthService, HospitalLoginInput, HospitalLoginOutput, LoginInput, LoginOutput, NewMember,
    RegisterHospitalInput, RegistrationOutput,
};
pub use token::{SessionClaims, SessionIdentity};
