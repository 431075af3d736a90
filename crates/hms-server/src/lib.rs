//! HMS Server: axum HTTP surface over the auth service and the
//! tenant-scoped repositories.

pub mod config;
pub mod cookie;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use error::ApiError;
pub use routes::router;
pub use state::AppState;
