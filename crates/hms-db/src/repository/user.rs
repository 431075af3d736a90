//! Staff, doctor and admin accounts.
//!
//! `create` hashes the password before it reaches the database. Email is
//! the global login key, so `get_by_email` is the one unscoped lookup.

use chrono::{DateTime, Utc};
use hms_core::error::HmsResult;
use hms_core::models::role::Role;
use hms_core::models::user::{CreateUser, User};
use hms_core::repository::{PaginatedResult, Pagination, UserRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, parse_uuid, single};
use crate::error::DbError;
use crate::password::hash_password;

#[derive(Debug, SurrealValue)]
struct UserRow {
    record_id: String,
    hospital_id: String,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn try_into_user(self) -> Result<User, DbError> {
        let role = self
            .role
            .parse::<Role>()
            .map_err(|_| DbError::Decode(format!("unknown user role: {}", self.role)))?;
        Ok(User {
            id: parse_uuid(&self.record_id, "user")?,
            hospital_id: parse_uuid(&self.hospital_id, "hospital")?,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            role,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Account store over the `user` table.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
    pepper: Option<String>,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db, pepper: None }
    }

    pub fn with_pepper(db: Surreal<C>, pepper: Option<String>) -> Self {
        Self { db, pepper }
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: CreateUser) -> HmsResult<User> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let password_hash = hash_password(&input.password, self.pepper.as_deref())?;

        let result = self
            .db
            .query(
                "CREATE type::record('user', $id) SET \
                 hospital_id = $hospital_id, \
                 name = $name, email = $email, \
                 password_hash = $password_hash, \
                 role = $role \
                 RETURN NONE; \
                 SELECT meta::id(id) AS record_id, * \
                 FROM type::record('user', $id);",
            )
            .bind(("id", id_str.clone()))
            .bind(("hospital_id", input.hospital_id.to_string()))
            .bind(("name", input.name))
            .bind(("email", input.email))
            .bind(("password_hash", password_hash))
            .bind(("role", input.role.as_str().to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_check(e, "Email"))?;

        let rows: Vec<UserRow> = result.take(1).map_err(DbError::from)?;
        let row = single(rows, "user", id_str)?;

        Ok(row.try_into_user()?)
    }

    async fn get_by_id(&self, hospital_id: Uuid, id: Uuid) -> HmsResult<User> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM type::record('user', $id) \
                 WHERE hospital_id = $hospital_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("hospital_id", hospital_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = single(rows, "user", id_str)?;

        Ok(row.try_into_user()?)
    }

    async fn get_by_email(&self, email: &str) -> HmsResult<User> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM user WHERE email = $email")
            .bind(("email", email.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = single(rows, "user", format!("email={email}"))?;

        Ok(row.try_into_user()?)
    }

    async fn list(
        &self,
        hospital_id: Uuid,
        role: Option<Role>,
        pagination: Pagination,
    ) -> HmsResult<PaginatedResult<User>> {
        let hospital_id_str = hospital_id.to_string();
        let filter = if role.is_some() {
            "WHERE hospital_id = $hospital_id AND role = $role"
        } else {
            "WHERE hospital_id = $hospital_id"
        };
        let role_str = role.map(|r| r.as_str().to_string());

        let mut count_result = self
            .db
            .query(format!("SELECT count() AS total FROM user {filter} GROUP ALL"))
            .bind(("hospital_id", hospital_id_str.clone()))
            .bind(("role", role_str.clone()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(format!(
                "SELECT meta::id(id) AS record_id, * FROM user {filter} \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset"
            ))
            .bind(("hospital_id", hospital_id_str))
            .bind(("role", role_str))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_user())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn delete(&self, hospital_id: Uuid, id: Uuid) -> HmsResult<()> {
        self.db
            .query(
                "DELETE type::record('user', $id) \
                 WHERE hospital_id = $hospital_id",
            )
            .bind(("id", id.to_string()))
            .bind(("hospital_id", hospital_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        Ok(())
    }
}
