//! Database open and schema bootstrap.

use std::path::Path;

use switchy_database::Database;
use switchy_database_connection::init_sqlite_rusqlite;

use crate::DbError;

/// Default path for the application database.
pub const DEFAULT_DB_PATH: &str = "data/billion_eye.db";

/// Opens the database at the path given by `DATABASE_PATH`, falling back to
/// [`DEFAULT_DB_PATH`].
///
/// # Errors
///
/// Returns [`DbError`] if the database cannot be opened or schema creation
/// fails.
pub async fn open_from_env() -> Result<Box<dyn Database>, DbError> {
    let path = std::env::var("DATABASE_PATH").unwrap_or_else(|_| DEFAULT_DB_PATH.to_string());
    open(Path::new(&path)).await
}

/// Opens an in-memory database with the schema applied. Used by tests and
/// ephemeral tooling.
///
/// # Errors
///
/// Returns [`DbError`] if the database cannot be opened or schema creation
/// fails.
pub async fn open_in_memory() -> Result<Box<dyn Database>, DbError> {
    let db = init_sqlite_rusqlite(None).map_err(|e| DbError::Conversion {
        message: format!("Failed to open in-memory database: {e}"),
    })?;

    ensure_schema(db.as_ref()).await?;

    Ok(db)
}

/// Opens (or creates) the `SQLite` database and ensures the schema exists.
///
/// # Errors
///
/// Returns [`DbError`] if the database cannot be opened or schema creation
/// fails.
pub async fn open(path: &Path) -> Result<Box<dyn Database>, DbError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| DbError::Conversion {
            message: format!("Failed to create database directory: {e}"),
        })?;
    }

    let db = init_sqlite_rusqlite(Some(path)).map_err(|e| DbError::Conversion {
        message: format!("Failed to open database: {e}"),
    })?;

    ensure_schema(db.as_ref()).await?;

    Ok(db)
}

/// Creates all tables if they don't already exist.
async fn ensure_schema(db: &dyn Database) -> Result<(), DbError> {
    db.exec_raw(
        "CREATE TABLE IF NOT EXISTS events (
            event_id          TEXT PRIMARY KEY,
            description       TEXT NOT NULL,
            status            TEXT NOT NULL,
            latitude          REAL NOT NULL,
            longitude         REAL NOT NULL,
            image_url         TEXT,
            agency_id         TEXT,
            assignment_time   TEXT,
            ground_staff_name TEXT,
            user_id           TEXT NOT NULL,
            reported_at       TEXT NOT NULL
        )",
    )
    .await?;

    db.exec_raw(
        "CREATE TABLE IF NOT EXISTS agencies (
            id                    TEXT PRIMARY KEY,
            agency_id             TEXT NOT NULL UNIQUE,
            agency_name           TEXT NOT NULL,
            mobile_number         TEXT NOT NULL UNIQUE,
            password              TEXT NOT NULL,
            event_responsible_for TEXT NOT NULL,
            latitude              REAL,
            longitude             REAL,
            jurisdiction_geojson  TEXT
        )",
    )
    .await?;

    db.exec_raw(
        "CREATE TABLE IF NOT EXISTS ground_staff (
            id        TEXT PRIMARY KEY,
            name      TEXT NOT NULL,
            number    TEXT NOT NULL,
            address   TEXT NOT NULL,
            agency_id TEXT NOT NULL
        )",
    )
    .await?;

    db.exec_raw(
        "CREATE TABLE IF NOT EXISTS auth_tokens (
            token     TEXT PRIMARY KEY,
            agency_id TEXT NOT NULL,
            issued_at TEXT NOT NULL
        )",
    )
    .await?;

    db.exec_raw("CREATE INDEX IF NOT EXISTS idx_events_agency ON events (agency_id, reported_at)")
        .await?;

    db.exec_raw(
        "CREATE INDEX IF NOT EXISTS idx_ground_staff_agency ON ground_staff (agency_id)",
    )
    .await?;

    log::info!("Database schema ready");
    Ok(())
}
