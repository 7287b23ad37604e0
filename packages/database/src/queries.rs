//! Query functions for events, agencies, ground staff, and session tokens.
//!
//! All queries go through `query_raw_params()` / `exec_raw_params()` with
//! `$n` placeholders. Status mutations validate the requested transition
//! against the state machine before writing.

use billion_eye_database_models::{
    AgencyRow, AgencyUpdate, EventRow, GroundStaffRow, NewEvent, StatusChange,
};
use billion_eye_event_models::EventStatus;
use chrono::{DateTime, SecondsFormat, Utc};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue, Row};

use crate::DbError;

fn format_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_ts(text: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DbError::Conversion {
            message: format!("Failed to parse timestamp '{text}': {e}"),
        })
}

fn parse_status(text: &str) -> Result<EventStatus, DbError> {
    text.parse().map_err(|_| DbError::Conversion {
        message: format!("Unknown event status '{text}'"),
    })
}

fn required<T, E: std::fmt::Display>(value: Result<T, E>, column: &str) -> Result<T, DbError> {
    value.map_err(|e| DbError::Conversion {
        message: format!("Failed to read column '{column}': {e}"),
    })
}

fn event_from_row(row: &Row) -> Result<EventRow, DbError> {
    let status_text: String = required(row.to_value("status"), "status")?;
    let assignment_time: Option<String> = row.to_value("assignment_time").unwrap_or(None);
    let reported_at: String = required(row.to_value("reported_at"), "reported_at")?;

    Ok(EventRow {
        event_id: required(row.to_value("event_id"), "event_id")?,
        description: required(row.to_value("description"), "description")?,
        status: parse_status(&status_text)?,
        latitude: required(row.to_value("latitude"), "latitude")?,
        longitude: required(row.to_value("longitude"), "longitude")?,
        image_url: row.to_value("image_url").unwrap_or(None),
        agency_id: row.to_value("agency_id").unwrap_or(None),
        assignment_time: assignment_time.as_deref().map(parse_ts).transpose()?,
        ground_staff_name: row.to_value("ground_staff_name").unwrap_or(None),
        user_id: required(row.to_value("user_id"), "user_id")?,
        reported_at: parse_ts(&reported_at)?,
    })
}

fn agency_from_row(row: &Row) -> Result<AgencyRow, DbError> {
    let categories_json: String =
        required(row.to_value("event_responsible_for"), "event_responsible_for")?;
    let event_responsible_for: Vec<String> =
        serde_json::from_str(&categories_json).map_err(|e| DbError::Conversion {
            message: format!("Failed to parse event_responsible_for: {e}"),
        })?;

    Ok(AgencyRow {
        id: required(row.to_value("id"), "id")?,
        agency_id: required(row.to_value("agency_id"), "agency_id")?,
        agency_name: required(row.to_value("agency_name"), "agency_name")?,
        mobile_number: required(row.to_value("mobile_number"), "mobile_number")?,
        password: required(row.to_value("password"), "password")?,
        event_responsible_for,
        latitude: row.to_value("latitude").unwrap_or(None),
        longitude: row.to_value("longitude").unwrap_or(None),
        jurisdiction_geojson: row.to_value("jurisdiction_geojson").unwrap_or(None),
    })
}

fn staff_from_row(row: &Row) -> Result<GroundStaffRow, DbError> {
    Ok(GroundStaffRow {
        id: required(row.to_value("id"), "id")?,
        name: required(row.to_value("name"), "name")?,
        number: required(row.to_value("number"), "number")?,
        address: required(row.to_value("address"), "address")?,
        agency_id: required(row.to_value("agency_id"), "agency_id")?,
    })
}

fn opt_string(value: Option<&String>) -> DatabaseValue {
    value.map_or(DatabaseValue::Null, |s| DatabaseValue::String(s.clone()))
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Inserts a freshly captured event with status `open`.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn insert_event(db: &dyn Database, event: &NewEvent) -> Result<(), DbError> {
    db.exec_raw_params(
        "INSERT INTO events (
            event_id, description, status, latitude, longitude,
            image_url, agency_id, user_id, reported_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        &[
            DatabaseValue::String(event.event_id.clone()),
            DatabaseValue::String(event.description.clone()),
            DatabaseValue::String(EventStatus::Open.to_string()),
            DatabaseValue::Real64(event.latitude),
            DatabaseValue::Real64(event.longitude),
            opt_string(event.image_url.as_ref()),
            opt_string(event.agency_id.as_ref()),
            DatabaseValue::String(event.user_id.clone()),
            DatabaseValue::String(format_ts(event.reported_at)),
        ],
    )
    .await?;

    Ok(())
}

/// Fetches a single event by its public id.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails or the row cannot be
/// converted.
pub async fn get_event(db: &dyn Database, event_id: &str) -> Result<Option<EventRow>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT * FROM events WHERE event_id = $1",
            &[DatabaseValue::String(event_id.to_string())],
        )
        .await?;

    rows.first().map(event_from_row).transpose()
}

/// All events attributed to an agency, newest first.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails or a row cannot be
/// converted.
pub async fn events_for_agency(
    db: &dyn Database,
    agency_id: &str,
) -> Result<Vec<EventRow>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT * FROM events WHERE agency_id = $1 ORDER BY reported_at DESC",
            &[DatabaseValue::String(agency_id.to_string())],
        )
        .await?;

    rows.iter().map(event_from_row).collect()
}

/// Applies a status mutation to an event after validating the transition.
///
/// Returns the updated row.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the event does not exist,
/// [`DbError::InvalidTransition`] if the state machine forbids the move, and
/// [`DbError`] for database failures.
pub async fn update_event_status(
    db: &dyn Database,
    event_id: &str,
    change: &StatusChange,
) -> Result<EventRow, DbError> {
    let current = get_event(db, event_id)
        .await?
        .ok_or_else(|| DbError::NotFound {
            what: format!("event {event_id}"),
        })?;

    if !current.status.can_transition_to(change.status) {
        return Err(DbError::InvalidTransition {
            from: current.status,
            to: change.status,
        });
    }

    // An omitted agency id keeps the existing association. Assignment
    // fields are only written by the transitions that own them: assign sets
    // them, unassign clears them, everything else leaves them alone.
    let agency_id = change.agency_id.clone().or(current.agency_id);
    let (ground_staff_name, assignment_time) = match change.status {
        EventStatus::Unassigned => (None, None),
        EventStatus::Assigned => (change.ground_staff_name.clone(), change.assignment_time),
        _ => (current.ground_staff_name, current.assignment_time),
    };

    db.exec_raw_params(
        "UPDATE events SET
            status = $1,
            ground_staff_name = $2,
            assignment_time = $3,
            agency_id = $4
         WHERE event_id = $5",
        &[
            DatabaseValue::String(change.status.to_string()),
            opt_string(ground_staff_name.as_ref()),
            assignment_time
                .map_or(DatabaseValue::Null, |ts| DatabaseValue::String(format_ts(ts))),
            opt_string(agency_id.as_ref()),
            DatabaseValue::String(event_id.to_string()),
        ],
    )
    .await?;

    get_event(db, event_id)
        .await?
        .ok_or_else(|| DbError::NotFound {
            what: format!("event {event_id} after update"),
        })
}

// ---------------------------------------------------------------------------
// Agencies
// ---------------------------------------------------------------------------

/// Inserts a new agency.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails (including a unique
/// violation on the mobile number).
pub async fn create_agency(db: &dyn Database, agency: &AgencyRow) -> Result<(), DbError> {
    let categories = serde_json::to_string(&agency.event_responsible_for).map_err(|e| {
        DbError::Conversion {
            message: format!("Failed to serialize event_responsible_for: {e}"),
        }
    })?;

    db.exec_raw_params(
        "INSERT INTO agencies (
            id, agency_id, agency_name, mobile_number, password,
            event_responsible_for, latitude, longitude, jurisdiction_geojson
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        &[
            DatabaseValue::String(agency.id.clone()),
            DatabaseValue::String(agency.agency_id.clone()),
            DatabaseValue::String(agency.agency_name.clone()),
            DatabaseValue::String(agency.mobile_number.clone()),
            DatabaseValue::String(agency.password.clone()),
            DatabaseValue::String(categories),
            agency.latitude.map_or(DatabaseValue::Null, DatabaseValue::Real64),
            agency.longitude.map_or(DatabaseValue::Null, DatabaseValue::Real64),
            opt_string(agency.jurisdiction_geojson.as_ref()),
        ],
    )
    .await?;

    Ok(())
}

/// All agencies, ordered by name.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails or a row cannot be
/// converted.
pub async fn list_agencies(db: &dyn Database) -> Result<Vec<AgencyRow>, DbError> {
    let rows = db
        .query_raw_params("SELECT * FROM agencies ORDER BY agency_name", &[])
        .await?;

    rows.iter().map(agency_from_row).collect()
}

/// Looks up an agency by its public id.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails or the row cannot be
/// converted.
pub async fn get_agency(db: &dyn Database, agency_id: &str) -> Result<Option<AgencyRow>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT * FROM agencies WHERE agency_id = $1",
            &[DatabaseValue::String(agency_id.to_string())],
        )
        .await?;

    rows.first().map(agency_from_row).transpose()
}

/// Looks up an agency by its login mobile number.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails or the row cannot be
/// converted.
pub async fn get_agency_by_mobile(
    db: &dyn Database,
    mobile_number: &str,
) -> Result<Option<AgencyRow>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT * FROM agencies WHERE mobile_number = $1",
            &[DatabaseValue::String(mobile_number.to_string())],
        )
        .await?;

    rows.first().map(agency_from_row).transpose()
}

/// Applies a partial agency update. Returns the number of updated rows.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn update_agency(
    db: &dyn Database,
    agency_id: &str,
    update: &AgencyUpdate,
) -> Result<u64, DbError> {
    let mut sets: Vec<String> = Vec::new();
    let mut params: Vec<DatabaseValue> = Vec::new();

    let push = |sets: &mut Vec<String>, params: &mut Vec<DatabaseValue>, column: &str, value: DatabaseValue| {
        params.push(value);
        sets.push(format!("{column} = ${}", params.len()));
    };

    if let Some(name) = &update.agency_name {
        push(&mut sets, &mut params, "agency_name", DatabaseValue::String(name.clone()));
    }
    if let Some(mobile) = &update.mobile_number {
        push(&mut sets, &mut params, "mobile_number", DatabaseValue::String(mobile.clone()));
    }
    if let Some(password) = &update.password {
        push(&mut sets, &mut params, "password", DatabaseValue::String(password.clone()));
    }
    if let Some(categories) = &update.event_responsible_for {
        let json = serde_json::to_string(categories).map_err(|e| DbError::Conversion {
            message: format!("Failed to serialize event_responsible_for: {e}"),
        })?;
        push(&mut sets, &mut params, "event_responsible_for", DatabaseValue::String(json));
    }
    if let Some(location) = update.location {
        push(&mut sets, &mut params, "latitude", DatabaseValue::Real64(location.latitude));
        push(&mut sets, &mut params, "longitude", DatabaseValue::Real64(location.longitude));
    }
    if let Some(geojson) = &update.jurisdiction_geojson {
        push(
            &mut sets,
            &mut params,
            "jurisdiction_geojson",
            DatabaseValue::String(geojson.clone()),
        );
    }

    if sets.is_empty() {
        return Ok(0);
    }

    params.push(DatabaseValue::String(agency_id.to_string()));
    let sql = format!(
        "UPDATE agencies SET {} WHERE agency_id = ${}",
        sets.join(", "),
        params.len()
    );

    Ok(db.exec_raw_params(&sql, &params).await?)
}

/// Deletes an agency by its public id. Returns the number of deleted rows.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn delete_agency(db: &dyn Database, agency_id: &str) -> Result<u64, DbError> {
    Ok(db
        .exec_raw_params(
            "DELETE FROM agencies WHERE agency_id = $1",
            &[DatabaseValue::String(agency_id.to_string())],
        )
        .await?)
}

// ---------------------------------------------------------------------------
// Ground staff
// ---------------------------------------------------------------------------

/// Inserts a ground-staff member.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn add_ground_staff(db: &dyn Database, staff: &GroundStaffRow) -> Result<(), DbError> {
    db.exec_raw_params(
        "INSERT INTO ground_staff (id, name, number, address, agency_id)
         VALUES ($1, $2, $3, $4, $5)",
        &[
            DatabaseValue::String(staff.id.clone()),
            DatabaseValue::String(staff.name.clone()),
            DatabaseValue::String(staff.number.clone()),
            DatabaseValue::String(staff.address.clone()),
            DatabaseValue::String(staff.agency_id.clone()),
        ],
    )
    .await?;

    Ok(())
}

/// All ground staff belonging to an agency, ordered by name.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails or a row cannot be
/// converted.
pub async fn ground_staff_for_agency(
    db: &dyn Database,
    agency_id: &str,
) -> Result<Vec<GroundStaffRow>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT * FROM ground_staff WHERE agency_id = $1 ORDER BY name",
            &[DatabaseValue::String(agency_id.to_string())],
        )
        .await?;

    rows.iter().map(staff_from_row).collect()
}

// ---------------------------------------------------------------------------
// Session tokens
// ---------------------------------------------------------------------------

/// Records a newly issued login token.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn insert_token(
    db: &dyn Database,
    token: &str,
    agency_id: &str,
    issued_at: DateTime<Utc>,
) -> Result<(), DbError> {
    db.exec_raw_params(
        "INSERT INTO auth_tokens (token, agency_id, issued_at) VALUES ($1, $2, $3)",
        &[
            DatabaseValue::String(token.to_string()),
            DatabaseValue::String(agency_id.to_string()),
            DatabaseValue::String(format_ts(issued_at)),
        ],
    )
    .await?;

    Ok(())
}

/// Revokes a token. Returns the number of deleted rows (0 if the token was
/// unknown).
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn revoke_token(db: &dyn Database, token: &str) -> Result<u64, DbError> {
    Ok(db
        .exec_raw_params(
            "DELETE FROM auth_tokens WHERE token = $1",
            &[DatabaseValue::String(token.to_string())],
        )
        .await?)
}

/// The agency a token belongs to, or `None` if unknown/revoked.
///
/// # Errors
///
/// Returns [`DbError`] if the database operation fails.
pub async fn token_agency(db: &dyn Database, token: &str) -> Result<Option<String>, DbError> {
    let rows = db
        .query_raw_params(
            "SELECT agency_id FROM auth_tokens WHERE token = $1",
            &[DatabaseValue::String(token.to_string())],
        )
        .await?;

    rows.first()
        .map(|row| required(row.to_value("agency_id"), "agency_id"))
        .transpose()
}
