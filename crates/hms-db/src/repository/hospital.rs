//! SurrealDB implementation of [`HospitalRepository`].

use chrono::{DateTime, Utc};
use hms_core::error::HmsResult;
use hms_core::models::hospital::{CreateHospital, Hospital};
use hms_core::repository::HospitalRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{parse_uuid, single};
use crate::error::DbError;
use crate::password::hash_password;

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct HospitalRow {
    record_id: String,
    name: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl HospitalRow {
    fn try_into_hospital(self) -> Result<Hospital, DbError> {
        Ok(Hospital {
            id: parse_uuid(&self.record_id, "hospital")?,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Hospital repository.
#[derive(Clone)]
pub struct SurrealHospitalRepository<C: Connection> {
    db: Surreal<C>,
    /// Optional server-side pepper for password hashing.
    pepper: Option<String>,
}

impl<C: Connection> SurrealHospitalRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db, pepper: None }
    }

    pub fn with_pepper(db: Surreal<C>, pepper: Option<String>) -> Self {
        Self { db, pepper }
    }
}

impl<C: Connection> HospitalRepository for SurrealHospitalRepository<C> {
    async fn create(&self, input: CreateHospital) -> HmsResult<Hospital> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let password_hash = hash_password(&input.password, self.pepper.as_deref())?;

        let result = self
            .db
            .query(
                "CREATE type::record('hospital', $id) SET \
                 name = $name, email = $email, \
                 password_hash = $password_hash \
                 RETURN NONE; \
                 SELECT meta::id(id) AS record_id, * \
                 FROM type::record('hospital', $id);",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("email", input.email))
            .bind(("password_hash", password_hash))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_check(e, "Email"))?;

        let rows: Vec<HospitalRow> = result.take(1).map_err(DbError::from)?;
        let row = single(rows, "hospital", id_str)?;

        Ok(row.try_into_hospital()?)
    }

    async fn get_by_id(&self, id: Uuid) -> HmsResult<Hospital> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM type::record('hospital', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<HospitalRow> = result.take(0).map_err(DbError::from)?;
        let row = single(rows, "hospital", id_str)?;

        Ok(row.try_into_hospital()?)
    }

    async fn get_by_email(&self, email: &str) -> HmsResult<Hospital> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM hospital WHERE email = $email")
            .bind(("email", email.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<HospitalRow> = result.take(0).map_err(DbError::from)?;
        let row = single(rows, "hospital", format!("email={email}"))?;

        Ok(row.try_into_hospital()?)
    }

    async fn delete(&self, id: Uuid) -> HmsResult<()> {
        self.db
            .query("DELETE type::record('hospital', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(())
    }
}
