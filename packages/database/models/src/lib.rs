#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Database row types and query parameter definitions.
//!
//! These types represent data as stored in and retrieved from the `SQLite`
//! database. They are distinct from the wire types in
//! `billion_eye_server_models` so the API contract can evolve independently
//! of the storage schema.

use billion_eye_event_models::EventStatus;
use billion_eye_geofence::LatLng;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An incident event row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRow {
    /// Public event identifier.
    pub event_id: String,
    /// Free-text category label, e.g. "Road Damage".
    pub description: String,
    /// Lifecycle status.
    pub status: EventStatus,
    /// Capture latitude (WGS84).
    pub latitude: f64,
    /// Capture longitude (WGS84).
    pub longitude: f64,
    /// Public URL of the incident image.
    pub image_url: Option<String>,
    /// Public id of the agency responsible for this event, if attributed.
    pub agency_id: Option<String>,
    /// When ground staff was assigned (operator wall-clock time).
    pub assignment_time: Option<DateTime<Utc>>,
    /// Assigned ground-staff name.
    pub ground_staff_name: Option<String>,
    /// Reporting user's id.
    pub user_id: String,
    /// When the incident was captured.
    pub reported_at: DateTime<Utc>,
}

/// Fields for inserting a freshly captured event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEvent {
    /// Public event identifier.
    pub event_id: String,
    /// Free-text category label.
    pub description: String,
    /// Capture latitude.
    pub latitude: f64,
    /// Capture longitude.
    pub longitude: f64,
    /// Public URL of the incident image.
    pub image_url: Option<String>,
    /// Attributed agency, if jurisdiction lookup succeeded.
    pub agency_id: Option<String>,
    /// Reporting user's id.
    pub user_id: String,
    /// When the incident was captured.
    pub reported_at: DateTime<Utc>,
}

/// Fields applied by a status mutation.
///
/// `assign` sets the assignment fields, `unassign` clears them, and every
/// other transition leaves the stored values untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusChange {
    /// New status.
    pub status: EventStatus,
    /// Assigned ground-staff name, if any.
    pub ground_staff_name: Option<String>,
    /// Assignment wall-clock time, if any.
    pub assignment_time: Option<DateTime<Utc>>,
    /// Deciding agency to associate, if any.
    pub agency_id: Option<String>,
}

/// An agency row, including the stored jurisdiction GeoJSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgencyRow {
    /// Storage primary key.
    pub id: String,
    /// Public agency identifier, e.g. `agency-121`.
    pub agency_id: String,
    /// Display name.
    pub agency_name: String,
    /// 10-digit login mobile number.
    pub mobile_number: String,
    /// Login credential.
    pub password: String,
    /// Event categories this agency responds to.
    pub event_responsible_for: Vec<String>,
    /// Point location latitude.
    pub latitude: Option<f64>,
    /// Point location longitude.
    pub longitude: Option<f64>,
    /// Jurisdiction polygon as GeoJSON text, if configured.
    pub jurisdiction_geojson: Option<String>,
}

impl AgencyRow {
    /// Point location as a [`LatLng`], if both components are present.
    #[must_use]
    pub fn location(&self) -> Option<LatLng> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(LatLng {
                latitude,
                longitude,
            }),
            _ => None,
        }
    }
}

/// A ground-staff row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundStaffRow {
    /// Storage primary key.
    pub id: String,
    /// Full name.
    pub name: String,
    /// 10-digit phone number.
    pub number: String,
    /// Postal address.
    pub address: String,
    /// Owning agency's public id.
    pub agency_id: String,
}

/// Partial agency update from the admin manager; `None` fields are left
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgencyUpdate {
    /// New display name.
    pub agency_name: Option<String>,
    /// New login mobile number.
    pub mobile_number: Option<String>,
    /// New login credential.
    pub password: Option<String>,
    /// New category list.
    pub event_responsible_for: Option<Vec<String>>,
    /// New point location.
    pub location: Option<LatLng>,
    /// New jurisdiction polygon as GeoJSON text.
    pub jurisdiction_geojson: Option<String>,
}
