//! Authentication service: hospital registration, login and member
//! account creation.

use hms_core::error::{HmsError, HmsResult};
use hms_core::models::hospital::{CreateHospital, Hospital};
use hms_core::models::role::Role;
use hms_core::models::user::{CreateUser, User};
use hms_core::repository::{HospitalRepository, Pagination, UserRepository};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::token::{self, SessionIdentity};

/// Input for hospital registration.
#[derive(Debug)]
pub struct RegisterHospitalInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// A freshly registered hospital together with its admin account.
#[derive(Debug)]
pub struct RegistrationOutput {
    pub hospital: Hospital,
    pub admin: User,
}

/// Input for user login. The declared role must match the stored one.
#[derive(Debug)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Successful user login.
#[derive(Debug)]
pub struct LoginOutput {
    /// Signed session token.
    pub token: String,
    /// Token lifetime in seconds.
    pub expires_in: u64,
    pub identity: SessionIdentity,
    pub user: User,
}

/// Input for logging in with the hospital account itself.
#[derive(Debug)]
pub struct HospitalLoginInput {
    pub email: String,
    pub password: String,
}

/// Successful hospital login. The token is issued for the hospital's
/// admin user so that every credential names a user.
#[derive(Debug)]
pub struct HospitalLoginOutput {
    pub token: String,
    pub expires_in: u64,
    pub identity: SessionIdentity,
    pub hospital: Hospital,
}

/// A staff or doctor account to be created inside a hospital.
#[derive(Debug)]
pub struct NewMember {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Authentication service.
///
/// Generic over repository implementations so that the auth layer
/// has no dependency on the database crate.
pub struct AuthService<H: HospitalRepository, U: UserRepository> {
    hospital_repo: H,
    user_repo: U,
    config: AuthConfig,
}

impl<H: HospitalRepository, U: UserRepository> AuthService<H, U> {
    pub fn new(hospital_repo: H, user_repo: U, config: AuthConfig) -> Self {
        Self {
            hospital_repo,
            user_repo,
            config,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Register a hospital and its admin user.
    ///
    /// The admin shares the hospital's email and password and is named
    /// "`<name>` Admin". If the admin insert fails the hospital record is
    /// deleted again.
    pub async fn register_hospital(
        &self,
        input: RegisterHospitalInput,
    ) -> HmsResult<RegistrationOutput> {
        let name = required("name", &input.name)?;
        let email = normalize_email(required("email", &input.email)?);
        let password = secret("password", &input.password)?;
        password::check_policy(password, self.config.min_password_length)?;

        self.ensure_email_free(&email).await?;

        let hospital = self
            .hospital_repo
            .create(CreateHospital {
                name: name.to_owned(),
                email: email.clone(),
                password: password.to_owned(),
            })
            .await?;

        let admin = match self
            .user_repo
            .create(CreateUser {
                hospital_id: hospital.id,
                name: format!("{name} Admin"),
                email,
                password: password.to_owned(),
                role: Role::HospitalAdmin,
            })
            .await
        {
            Ok(user) => user,
            Err(e) => {
                if let Err(cleanup) = self.hospital_repo.delete(hospital.id).await {
                    tracing::error!(
                        hospital_id = %hospital.id,
                        error = %cleanup,
                        "failed to roll back hospital after admin insert failure"
                    );
                }
                return Err(e);
            }
        };

        tracing::info!(hospital_id = %hospital.id, admin_id = %admin.id, "hospital registered");
        Ok(RegistrationOutput { hospital, admin })
    }

    /// Authenticate a user by email, password and declared role.
    ///
    /// Unknown email, role mismatch and wrong password all produce the
    /// same `InvalidCredentials` error.
    pub async fn login(&self, input: LoginInput) -> HmsResult<LoginOutput> {
        let email = normalize_email(required("email", &input.email)?);
        let password = secret("password", &input.password)?;

        let user = match self.user_repo.get_by_email(&email).await {
            Ok(u) => u,
            Err(HmsError::NotFound { .. }) => {
                tracing::warn!("login rejected: unknown email");
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => return Err(e),
        };

        if user.role != input.role {
            tracing::warn!(user_id = %user.id, declared = %input.role, "login rejected: role mismatch");
            return Err(AuthError::InvalidCredentials.into());
        }

        if !password::verify_password(password, &user.password_hash, self.config.pepper.as_deref())?
        {
            tracing::warn!(user_id = %user.id, "login rejected: wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        let identity = SessionIdentity {
            id: user.id,
            role: user.role,
            hospital_id: user.hospital_id,
        };
        let token = token::issue_session_token(&identity, &self.config)?;

        tracing::info!(user_id = %user.id, role = %user.role, "user logged in");
        Ok(LoginOutput {
            token,
            expires_in: self.config.session_lifetime_secs,
            identity,
            user,
        })
    }

    /// Authenticate with the hospital account's own credentials.
    pub async fn hospital_login(&self, input: HospitalLoginInput) -> HmsResult<HospitalLoginOutput> {
        let email = normalize_email(required("email", &input.email)?);
        let password = secret("password", &input.password)?;

        let hospital = match self.hospital_repo.get_by_email(&email).await {
            Ok(h) => h,
            Err(HmsError::NotFound { .. }) => return Err(AuthError::InvalidCredentials.into()),
            Err(e) => return Err(e),
        };

        if !password::verify_password(
            password,
            &hospital.password_hash,
            self.config.pepper.as_deref(),
        )? {
            tracing::warn!(hospital_id = %hospital.id, "hospital login rejected");
            return Err(AuthError::InvalidCredentials.into());
        }

        let admins = self
            .user_repo
            .list(
                hospital.id,
                Some(Role::HospitalAdmin),
                Pagination {
                    offset: 0,
                    limit: 1,
                },
            )
            .await?;
        let admin = admins.items.into_iter().next().ok_or_else(|| {
            HmsError::Internal(format!("hospital {} has no admin account", hospital.id))
        })?;

        let identity = SessionIdentity {
            id: admin.id,
            role: Role::HospitalAdmin,
            hospital_id: hospital.id,
        };
        let token = token::issue_session_token(&identity, &self.config)?;

        tracing::info!(hospital_id = %hospital.id, "hospital logged in");
        Ok(HospitalLoginOutput {
            token,
            expires_in: self.config.session_lifetime_secs,
            identity,
            hospital,
        })
    }

    /// Create a staff or doctor account inside `hospital_id`.
    pub async fn add_member(
        &self,
        hospital_id: Uuid,
        member: NewMember,
        role: Role,
    ) -> HmsResult<User> {
        let name = required("name", &member.name)?;
        let email = normalize_email(required("email", &member.email)?);
        let password = secret("password", &member.password)?;
        password::check_policy(password, self.config.min_password_length)?;

        self.ensure_email_free(&email).await?;

        let user = self
            .user_repo
            .create(CreateUser {
                hospital_id,
                name: name.to_owned(),
                email,
                password: password.to_owned(),
                role,
            })
            .await?;

        tracing::info!(%hospital_id, user_id = %user.id, %role, "member account created");
        Ok(user)
    }

    /// Remove a member account; used to undo [`Self::add_member`] when a
    /// follow-up write fails.
    pub async fn remove_member(&self, hospital_id: Uuid, user_id: Uuid) -> HmsResult<()> {
        self.user_repo.delete(hospital_id, user_id).await
    }

    /// Verify a session token. `None` means unauthenticated.
    pub fn verify(&self, token: &str) -> Option<SessionIdentity> {
        token::verify_session_token(token, &self.config)
    }

    /// Hospital and user emails share one namespace.
    async fn ensure_email_free(&self, email: &str) -> HmsResult<()> {
        let hospital_taken = match self.hospital_repo.get_by_email(email).await {
            Ok(_) => true,
            Err(HmsError::NotFound { .. }) => false,
            Err(e) => return Err(e),
        };
        let user_taken = match self.user_repo.get_by_email(email).await {
            Ok(_) => true,
            Err(HmsError::NotFound { .. }) => false,
            Err(e) => return Err(e),
        };
        if hospital_taken || user_taken {
            return Err(HmsError::AlreadyExists {
                entity: "Email".into(),
            });
        }
        Ok(())
    }
}

fn required<'a>(field: &str, value: &'a str) -> HmsResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(HmsError::validation(format!("{field} is required")));
    }
    Ok(trimmed)
}

/// Passwords are taken verbatim; only emptiness is rejected.
fn secret<'a>(field: &str, value: &'a str) -> HmsResult<&'a str> {
    if value.is_empty() {
        return Err(HmsError::validation(format!("{field} is required")));
    }
    Ok(value)
}

fn normalize_email(email: &str) -> String {
    email.to_lowercase()
}
