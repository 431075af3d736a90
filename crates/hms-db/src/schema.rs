//! SurrealDB schema and the versioned migration runner.
//!
//! Tables are SCHEMAFULL. Ids, including foreign keys, are UUID strings;
//! roles are strings constrained by `ASSERT`.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::{debug, info};

use crate::error::DbError;

/// Bookkeeping table recording which schema versions have been applied.
const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS schema_history SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE schema_history TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE schema_history TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE schema_history TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS schema_history_version ON TABLE schema_history \
    COLUMNS version UNIQUE;
";

/// A numbered block of DDL, applied at most once per database.
struct Migration {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: [Migration; 1] = [Migration {
    version: 1,
    name: "hospital_tenancy",
    sql: SCHEMA_V1,
}];

#[derive(Debug, SurrealValue)]
struct AppliedVersion {
    version: i64,
}

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Hospitals (global scope; each hospital is a tenant)
-- =======================================================================
DEFINE TABLE hospital SCHEMAFULL;
DEFINE FIELD name ON TABLE hospital TYPE string;
DEFINE FIELD email ON TABLE hospital TYPE string;
DEFINE FIELD password_hash ON TABLE hospital TYPE string;
DEFINE FIELD created_at ON TABLE hospital TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE hospital TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_hospital_email ON TABLE hospital \
    COLUMNS email UNIQUE;

-- =======================================================================
-- Users (hospital scope; email unique system-wide)
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD hospital_id ON TABLE user TYPE string;
DEFINE FIELD name ON TABLE user TYPE string;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD password_hash ON TABLE user TYPE string;
DEFINE FIELD role ON TABLE user TYPE string \
    ASSERT $value IN ['HOSPITAL_ADMIN', 'STAFF', 'DOCTOR'];
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_email ON TABLE user \
    COLUMNS email UNIQUE;
DEFINE INDEX idx_user_hospital_role ON TABLE user \
    COLUMNS hospital_id, role;

-- =======================================================================
-- Doctor profiles (hospital scope, 1:1 with a DOCTOR user)
-- =======================================================================
DEFINE TABLE doctor SCHEMAFULL;
DEFINE FIELD hospital_id ON TABLE doctor TYPE string;
DEFINE FIELD user_id ON TABLE doctor TYPE string;
DEFINE FIELD specialization ON TABLE doctor TYPE string;
DEFINE FIELD created_at ON TABLE doctor TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_doctor_user ON TABLE doctor \
    COLUMNS user_id UNIQUE;
DEFINE INDEX idx_doctor_hospital ON TABLE doctor \
    COLUMNS hospital_id;

-- =======================================================================
-- Patients (hospital scope)
-- =======================================================================
DEFINE TABLE patient SCHEMAFULL;
DEFINE FIELD hospital_id ON TABLE patient TYPE string;
DEFINE FIELD name ON TABLE patient TYPE string;
DEFINE FIELD age ON TABLE patient TYPE int ASSERT $value >= 0;
DEFINE FIELD gender ON TABLE patient TYPE string;
DEFINE FIELD phone ON TABLE patient TYPE string;
DEFINE FIELD created_by ON TABLE patient TYPE string;
DEFINE FIELD created_at ON TABLE patient TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_patient_hospital ON TABLE patient \
    COLUMNS hospital_id;

-- =======================================================================
-- Appointments (hospital scope)
-- =======================================================================
DEFINE TABLE appointment SCHEMAFULL;
DEFINE FIELD hospital_id ON TABLE appointment TYPE string;
DEFINE FIELD doctor_id ON TABLE appointment TYPE string;
DEFINE FIELD patient_id ON TABLE appointment TYPE string;
DEFINE FIELD date ON TABLE appointment TYPE datetime;
DEFINE FIELD notes ON TABLE appointment TYPE option<string>;
DEFINE FIELD created_at ON TABLE appointment TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_appointment_hospital ON TABLE appointment \
    COLUMNS hospital_id;
DEFINE INDEX idx_appointment_doctor ON TABLE appointment \
    COLUMNS hospital_id, doctor_id;

-- =======================================================================
-- Prescriptions (hospital scope)
-- =======================================================================
DEFINE TABLE prescription SCHEMAFULL;
DEFINE FIELD hospital_id ON TABLE prescription TYPE string;
DEFINE FIELD doctor_id ON TABLE prescription TYPE string;
DEFINE FIELD patient_id ON TABLE prescription TYPE string;
DEFINE FIELD content ON TABLE prescription TYPE string;
DEFINE FIELD created_at ON TABLE prescription TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_prescription_doctor ON TABLE prescription \
    COLUMNS hospital_id, doctor_id;
DEFINE INDEX idx_prescription_patient ON TABLE prescription \
    COLUMNS hospital_id, patient_id;
";

/// Bring the schema up to the latest version.
///
/// Safe to call on every startup: versions already recorded in
/// `schema_history` are skipped.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(format!("tracking table: {e}")))?;

    let current = applied_version(db).await?;
    let pending = MIGRATIONS.iter().filter(|m| m.version > current);

    let mut applied = 0;
    for migration in pending {
        apply(db, migration).await?;
        applied += 1;
    }

    if applied == 0 {
        debug!(version = current, "schema up to date");
    } else {
        info!(from = current, applied, "schema migrated");
    }
    Ok(())
}

async fn applied_version<C: Connection>(db: &Surreal<C>) -> Result<i64, DbError> {
    let mut result = db
        .query("SELECT version FROM schema_history ORDER BY version DESC LIMIT 1")
        .await?;
    let rows: Vec<AppliedVersion> = result.take(0)?;
    Ok(rows.first().map_or(0, |r| r.version))
}

async fn apply<C: Connection>(db: &Surreal<C>, migration: &Migration) -> Result<(), DbError> {
    let failed = |stage: &str, e: surrealdb::Error| {
        DbError::Migration(format!(
            "v{} {} ({stage}): {e}",
            migration.version, migration.name
        ))
    };

    info!(version = migration.version, name = migration.name, "applying migration");

    db.query(migration.sql)
        .await?
        .check()
        .map_err(|e| failed("ddl", e))?;

    db.query("CREATE schema_history SET version = $version, name = $name")
        .bind(("version", migration.version))
        .bind(("name", migration.name))
        .await?
        .check()
        .map_err(|e| failed("record", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_start_at_one_and_increase() {
        assert_eq!(MIGRATIONS[0].version, 1);
        assert!(MIGRATIONS.windows(2).all(|w| w[0].version < w[1].version));
    }

    #[test]
    fn initial_schema_defines_every_table() {
        for table in [
            "hospital",
            "user",
            "doctor",
            "patient",
            "appointment",
            "prescription",
        ] {
            assert!(
                SCHEMA_V1.contains(&format!("DEFINE TABLE {table} SCHEMAFULL")),
                "missing table {table}"
            );
        }
    }
}
