//! Command-line and environment configuration.

use std::net::SocketAddr;

use clap::Parser;
use hms_auth::AuthConfig;
use hms_db::DbConfig;
use tracing_subscriber::EnvFilter;

/// Upper bound on the session lifetime: one year.
pub const MAX_SESSION_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Log directives applied on top of `RUST_LOG`. `tower_http` carries the
/// per-request spans.
const DEFAULT_LOG_DIRECTIVES: [&str; 2] = ["hms=info", "tower_http=info"];

/// The subscriber filter: `RUST_LOG` plus the default directives.
pub fn log_filter() -> anyhow::Result<EnvFilter> {
    DEFAULT_LOG_DIRECTIVES.iter().try_fold(
        EnvFilter::from_default_env(),
        |filter, directive| -> anyhow::Result<EnvFilter> {
            Ok(filter.add_directive(directive.parse()?))
        },
    )
}

/// Server configuration. Every option can also be set through the
/// environment variable named next to it.
#[derive(Debug, Clone, Parser)]
#[command(name = "hms", version, about = "Multi-tenant hospital administration backend")]
pub struct ServerConfig {
    /// Address the HTTP listener binds to.
    #[arg(long, env = "HMS_BIND", default_value = "0.0.0.0:3000")]
    pub bind: SocketAddr,

    /// SurrealDB endpoint (`ws://host:port` or `mem://`).
    #[arg(long, env = "HMS_DB_URL", default_value = "ws://127.0.0.1:8000")]
    pub db_url: String,

    #[arg(long, env = "HMS_DB_NS", default_value = "hms")]
    pub db_namespace: String,

    #[arg(long, env = "HMS_DB_NAME", default_value = "main")]
    pub db_name: String,

    #[arg(long, env = "HMS_DB_USER")]
    pub db_user: Option<String>,

    #[arg(long, env = "HMS_DB_PASS", hide_env_values = true)]
    pub db_pass: Option<String>,

    /// HMAC secret for session tokens. Required.
    #[arg(long, env = "HMS_JWT_SECRET", default_value = "", hide_env_values = true)]
    pub jwt_secret: String,

    #[arg(long, env = "HMS_JWT_ISSUER", default_value = "hms")]
    pub jwt_issuer: String,

    /// Session lifetime in seconds; also the cookie Max-Age.
    #[arg(long, env = "HMS_SESSION_TTL_SECS", default_value_t = 604_800)]
    pub session_ttl_secs: u64,

    #[arg(long, env = "HMS_PASSWORD_PEPPER", hide_env_values = true)]
    pub password_pepper: Option<String>,

    #[arg(long, env = "HMS_MIN_PASSWORD_LEN", default_value_t = 6)]
    pub min_password_length: usize,

    /// Add the `Secure` attribute to the session cookie.
    #[arg(long, env = "HMS_COOKIE_SECURE", default_value_t = false)]
    pub cookie_secure: bool,
}

impl ServerConfig {
    /// Reject configurations the server cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.jwt_secret.trim().is_empty() {
            anyhow::bail!("HMS_JWT_SECRET must be set to a non-empty value");
        }
        if self.session_ttl_secs == 0 || self.session_ttl_secs > MAX_SESSION_TTL_SECS {
            anyhow::bail!(
                "HMS_SESSION_TTL_SECS must be between 1 and {MAX_SESSION_TTL_SECS}"
            );
        }
        Ok(())
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig {
            url: self.db_url.clone(),
            namespace: self.db_namespace.clone(),
            database: self.db_name.clone(),
            username: self.db_user.clone(),
            password: self.db_pass.clone(),
        }
    }

    pub fn auth_config(&self) -> AuthConfig {
        AuthConfig {
            jwt_secret: self.jwt_secret.clone(),
            jwt_issuer: self.jwt_issuer.clone(),
            session_lifetime_secs: self.session_ttl_secs,
            pepper: self.password_pepper.clone(),
            min_password_length: self.min_password_length,
        }
    }
}
