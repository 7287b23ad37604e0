#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the BillionEye server.
//!
//! These types are serialized to JSON for the `backend/...` REST contract.
//! Field names are part of that contract and intentionally inconsistent
//! (`AgencyName` next to `mobileNumber` next to `event_id`) — they mirror
//! what the deployed front end sends and expects, so every rename here is
//! explicit rather than via a blanket `rename_all`.

use billion_eye_database_models::{EventRow, GroundStaffRow};
use billion_eye_event_models::EventStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// Generic `{success}` acknowledgement.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SuccessResponse {
    /// Whether the operation succeeded.
    pub success: bool,
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// `POST backend/agency/login` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    /// 10-digit login mobile number.
    #[serde(rename = "mobileNumber")]
    pub mobile_number: String,
    /// Login credential.
    pub password: String,
}

/// The agency summary embedded in a login response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginAgency {
    /// Public agency identifier.
    #[serde(rename = "AgencyId")]
    pub agency_id: String,
}

/// `POST backend/agency/login` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Opaque bearer token.
    pub token: String,
    /// The authenticated agency.
    pub agency: LoginAgency,
}

// ---------------------------------------------------------------------------
// Agencies
// ---------------------------------------------------------------------------

/// A jurisdiction polygon on the wire: a single closed ring of GeoJSON
/// `[lng, lat]` pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiJurisdiction {
    /// Ring vertices in `[lng, lat]` order, first pair repeated as the last.
    pub coordinates: Vec<[f64; 2]>,
    /// Always `"Polygon"`.
    #[serde(rename = "type")]
    pub kind: String,
}

/// A point location on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ApiLocation {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

/// `POST backend/agency` request body.
///
/// The public registration flow sends only name/mobile/password/lat/lng; the
/// admin manager additionally sends the category list and an optional
/// jurisdiction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAgencyRequest {
    /// Display name.
    #[serde(rename = "AgencyName")]
    pub agency_name: String,
    /// 10-digit login mobile number.
    #[serde(rename = "mobileNumber")]
    pub mobile_number: String,
    /// Login credential.
    pub password: String,
    /// Point latitude, if registering with a single location.
    #[serde(default)]
    pub lat: Option<f64>,
    /// Point longitude, if registering with a single location.
    #[serde(default)]
    pub lng: Option<f64>,
    /// Event categories this agency responds to (admin flow).
    #[serde(rename = "eventResponsibleFor", default)]
    pub event_responsible_for: Option<Vec<String>>,
    /// Jurisdiction polygon (admin flow).
    #[serde(default)]
    pub jurisdiction: Option<ApiJurisdiction>,
}

/// `PUT backend/agencies/{agencyId}` request body; omitted fields are left
/// untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAgencyRequest {
    /// New display name.
    #[serde(rename = "AgencyName", default, skip_serializing_if = "Option::is_none")]
    pub agency_name: Option<String>,
    /// New login mobile number.
    #[serde(rename = "mobileNumber", default, skip_serializing_if = "Option::is_none")]
    pub mobile_number: Option<String>,
    /// New login credential.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// New category list.
    #[serde(rename = "eventResponsibleFor", default, skip_serializing_if = "Option::is_none")]
    pub event_responsible_for: Option<Vec<String>>,
    /// New point latitude.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    /// New point longitude.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    /// New jurisdiction polygon.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<ApiJurisdiction>,
}

/// An agency as returned by the admin list.
///
/// The stored password is deliberately absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiAgency {
    /// Storage primary key.
    #[serde(rename = "_id")]
    pub id: String,
    /// Public agency identifier.
    #[serde(rename = "AgencyId")]
    pub agency_id: String,
    /// Display name.
    #[serde(rename = "AgencyName")]
    pub agency_name: String,
    /// Login mobile number.
    #[serde(rename = "mobileNumber")]
    pub mobile_number: String,
    /// Event categories this agency responds to.
    #[serde(rename = "eventResponsibleFor")]
    pub event_responsible_for: Vec<String>,
    /// Point location, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<ApiLocation>,
    /// Jurisdiction polygon, if configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<ApiJurisdiction>,
}

/// `GET backend/agencies` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgencyListResponse {
    /// Whether the query succeeded.
    pub success: bool,
    /// The agencies.
    pub data: Vec<ApiAgency>,
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// An event as returned by the dashboard and event-report endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEvent {
    /// Public event identifier.
    pub event_id: String,
    /// Free-text category label.
    pub description: String,
    /// Lifecycle status.
    pub status: EventStatus,
    /// Capture latitude.
    pub latitude: f64,
    /// Capture longitude.
    pub longitude: f64,
    /// Public URL of the incident image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Responsible agency's public id.
    #[serde(rename = "AgencyId", skip_serializing_if = "Option::is_none")]
    pub agency_id: Option<String>,
    /// When ground staff was assigned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignment_time: Option<DateTime<Utc>>,
    /// Assigned ground-staff name.
    #[serde(rename = "groundStaffName", skip_serializing_if = "Option::is_none")]
    pub ground_staff_name: Option<String>,
}

impl From<EventRow> for ApiEvent {
    fn from(row: EventRow) -> Self {
        Self {
            event_id: row.event_id,
            description: row.description,
            status: row.status,
            latitude: row.latitude,
            longitude: row.longitude,
            image_url: row.image_url,
            agency_id: row.agency_id,
            assignment_time: row.assignment_time,
            ground_staff_name: row.ground_staff_name,
        }
    }
}

/// `GET backend/agency-dashboard/{agencyId}` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardResponse {
    /// Display name of the agency.
    #[serde(rename = "AgencyName")]
    pub agency_name: String,
    /// Events attributed to the agency, newest first.
    #[serde(rename = "assignedEvents")]
    pub assigned_events: Vec<ApiEvent>,
}

/// `PUT backend/events/status/{event_id}` request body.
///
/// `assign` sends a staff name and the operator's wall-clock time; `unassign`
/// sends `Unassigned` with both fields null; the dashboard's accept re-posts
/// `open` with an `agencyId`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    /// Requested status.
    pub status: EventStatus,
    /// Ground-staff name for `assign`, null for `unassign`.
    #[serde(rename = "groundStaffName", default)]
    pub ground_staff_name: Option<String>,
    /// Assignment wall-clock time for `assign`, null for `unassign`.
    #[serde(default)]
    pub assignment_time: Option<DateTime<Utc>>,
    /// Deciding agency to associate.
    #[serde(rename = "agencyId", default)]
    pub agency_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Ground staff
// ---------------------------------------------------------------------------

/// A ground-staff member as returned by the list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiGroundStaff {
    /// Storage primary key.
    #[serde(rename = "_id")]
    pub id: String,
    /// Full name.
    pub name: String,
    /// 10-digit phone number.
    pub number: String,
    /// Postal address.
    pub address: String,
}

impl From<GroundStaffRow> for ApiGroundStaff {
    fn from(row: GroundStaffRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            number: row.number,
            address: row.address,
        }
    }
}

/// `GET backend/{agencyId}/groundstaff` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundStaffListResponse {
    /// Whether the query succeeded.
    pub success: bool,
    /// The agency's ground staff.
    pub data: Vec<ApiGroundStaff>,
}

/// `POST backend/agency/addgroundstaff` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddGroundStaffRequest {
    /// Full name.
    pub name: String,
    /// 10-digit phone number starting 6-9.
    pub number: String,
    /// Postal address.
    pub address: String,
    /// Owning agency's public id.
    #[serde(rename = "agencyId")]
    pub agency_id: String,
}

// ---------------------------------------------------------------------------
// Capture upload
// ---------------------------------------------------------------------------

/// A GeoJSON point as submitted by the capture flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Always `"Point"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// `[lng, lat]`.
    pub coordinates: [f64; 2],
}

impl GeoPoint {
    /// Builds a GeoJSON point from latitude/longitude.
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            kind: "Point".to_string(),
            coordinates: [longitude, latitude],
        }
    }

    /// Latitude component.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.coordinates[1]
    }

    /// Longitude component.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.coordinates[0]
    }
}

/// `POST backend/user/upload-image` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadImageRequest {
    /// Reporting user's id.
    #[serde(rename = "userId")]
    pub user_id: String,
    /// Capture location.
    pub location: GeoPoint,
    /// Capture timestamp (ISO 8601).
    pub timestamp: String,
    /// Base64-encoded JPEG.
    #[serde(rename = "base64String")]
    pub base64_string: String,
}

/// `POST backend/user/upload-image` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadImageResponse {
    /// Id of the stored image (and of the created event).
    #[serde(rename = "imageId")]
    pub image_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_request_uses_contract_field_names() {
        let json = r#"{"mobileNumber": "1234567892", "password": "password123"}"#;
        let request: LoginRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.mobile_number, "1234567892");
    }

    #[test]
    fn event_serializes_with_contract_field_names() {
        let event = ApiEvent {
            event_id: "evt-1".to_string(),
            description: "Road Damage".to_string(),
            status: EventStatus::Open,
            latitude: 20.2961,
            longitude: 85.8245,
            image_url: None,
            agency_id: Some("agency-121".to_string()),
            assignment_time: None,
            ground_staff_name: None,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["status"], "open");
        assert_eq!(value["AgencyId"], "agency-121");
        assert!(value.get("groundStaffName").is_none());
    }

    #[test]
    fn unassign_body_with_nulls_deserializes() {
        let json = r#"{"status": "Unassigned", "groundStaffName": null, "assignment_time": null}"#;
        let request: StatusUpdateRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.status, EventStatus::Unassigned);
        assert_eq!(request.ground_staff_name, None);
        assert_eq!(request.assignment_time, None);
    }

    #[test]
    fn geo_point_orders_lng_lat() {
        let point = GeoPoint::new(20.2961, 85.8245);
        assert_eq!(point.coordinates, [85.8245, 20.2961]);
        let value = serde_json::to_value(&point).unwrap();
        assert_eq!(value["type"], "Point");
    }
}
