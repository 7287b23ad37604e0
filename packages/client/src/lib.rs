#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Typed API client for the BillionEye `backend/...` contract.
//!
//! Every call is a single attempt: failures are surfaced to the caller and
//! the action becomes re-attemptable, never retried or queued behind the
//! operator's back. Validation failures (mobile-number shape, missing
//! coordinates, empty fields) short-circuit before any network call.
//!
//! Status mutations go through a per-event in-flight guard so a double-click
//! can't issue duplicate mutations for the same event.

pub mod capture;
pub mod dashboard;

use std::collections::HashSet;
use std::sync::Mutex;

use billion_eye_agency_models::is_valid_agency_mobile;
use billion_eye_event_models::EventStatus;
use billion_eye_server_models::{
    AddGroundStaffRequest, AgencyListResponse, ApiEvent, ApiGroundStaff, CreateAgencyRequest,
    DashboardResponse, GroundStaffListResponse, LoginRequest, LoginResponse, StatusUpdateRequest,
    SuccessResponse, UpdateAgencyRequest, UploadImageRequest, UploadImageResponse,
};
use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Errors from API client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request could not be sent or the response body not read.
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    UnexpectedStatus {
        /// HTTP status code.
        status: u16,
        /// Server-provided message, if any.
        message: String,
    },

    /// The input failed validation before any network call was made.
    #[error("{message}")]
    Validation {
        /// Operator-facing description.
        message: String,
    },

    /// A status mutation for this event has not settled yet.
    #[error("A mutation for event {event_id} is already in flight")]
    MutationInFlight {
        /// The contended event id.
        event_id: String,
    },
}

pub(crate) fn validation(message: impl Into<String>) -> ClientError {
    ClientError::Validation {
        message: message.into(),
    }
}

/// Releases the in-flight slot for an event id when a mutation settles,
/// whichever way it settles.
#[derive(Debug)]
struct MutationGuard<'a> {
    in_flight: &'a Mutex<HashSet<String>>,
    event_id: String,
}

impl Drop for MutationGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut set) = self.in_flight.lock() {
            set.remove(&self.event_id);
        }
    }
}

/// Client for the BillionEye backend API.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    in_flight: Mutex<HashSet<String>>,
}

impl ApiClient {
    /// Default API base when `BILLION_EYE_API_BASE` is unset.
    pub const DEFAULT_BASE: &'static str = "http://127.0.0.1:5000/backend";

    /// Creates a client for the given base URL (up to and including the
    /// `backend` path segment, no trailing slash).
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Creates a client from the `BILLION_EYE_API_BASE` environment
    /// variable, falling back to [`Self::DEFAULT_BASE`].
    #[must_use]
    pub fn from_env() -> Self {
        let base =
            std::env::var("BILLION_EYE_API_BASE").unwrap_or_else(|_| Self::DEFAULT_BASE.to_string());
        Self::new(&base)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    async fn read_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|value| {
                    value
                        .get("message")
                        .or_else(|| value.get("error"))
                        .and_then(serde_json::Value::as_str)
                        .map(str::to_string)
                })
                .unwrap_or(body);
            log::error!("API call failed with HTTP {status}: {message}");
            return Err(ClientError::UnexpectedStatus {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.http.get(self.url(path)).send().await?;
        Self::read_response(response).await
    }

    async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let response = self.http.post(self.url(path)).json(body).send().await?;
        Self::read_response(response).await
    }

    async fn put_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let response = self.http.put(self.url(path)).json(body).send().await?;
        Self::read_response(response).await
    }

    // ── Auth ─────────────────────────────────────────────────────────

    /// `POST agency/login`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] for an empty or malformed mobile
    /// number or empty password (no request is sent), and the usual
    /// network/status errors otherwise.
    pub async fn login(
        &self,
        mobile_number: &str,
        password: &str,
    ) -> Result<LoginResponse, ClientError> {
        if mobile_number.is_empty() {
            return Err(validation("Mobile number is required."));
        }
        if !is_valid_agency_mobile(mobile_number) {
            return Err(validation("Please enter a valid 10-digit mobile number"));
        }
        if password.is_empty() {
            return Err(validation("Password is required."));
        }

        self.post_json(
            "agency/login",
            &LoginRequest {
                mobile_number: mobile_number.trim().to_string(),
                password: password.to_string(),
            },
        )
        .await
    }

    /// `POST agency/logout` with a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on network failure or a non-success status.
    pub async fn logout(&self, token: &str) -> Result<SuccessResponse, ClientError> {
        let response = self
            .http
            .post(self.url("agency/logout"))
            .bearer_auth(token)
            .json(&serde_json::json!({}))
            .send()
            .await?;
        Self::read_response(response).await
    }

    // ── Agencies ─────────────────────────────────────────────────────

    /// `POST agency` (registration and admin create).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] for a malformed mobile number,
    /// and the usual network/status errors otherwise.
    pub async fn create_agency(
        &self,
        request: &CreateAgencyRequest,
    ) -> Result<SuccessResponse, ClientError> {
        if !is_valid_agency_mobile(&request.mobile_number) {
            return Err(validation("Please enter a valid 10-digit mobile number"));
        }
        self.post_json("agency", request).await
    }

    /// `GET agencies` (admin list).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on network failure or a non-success status.
    pub async fn list_agencies(&self) -> Result<AgencyListResponse, ClientError> {
        self.get_json("agencies").await
    }

    /// `PUT agencies/{agencyId}` (admin partial update).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] for a malformed mobile number,
    /// and the usual network/status errors otherwise.
    pub async fn update_agency(
        &self,
        agency_id: &str,
        request: &UpdateAgencyRequest,
    ) -> Result<SuccessResponse, ClientError> {
        if let Some(mobile) = &request.mobile_number {
            if !is_valid_agency_mobile(mobile) {
                return Err(validation("Please enter a valid 10-digit mobile number"));
            }
        }
        self.put_json(&format!("agencies/{agency_id}"), request).await
    }

    /// `DELETE agencies/{agencyId}` (admin delete).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on network failure or a non-success status.
    pub async fn delete_agency(&self, agency_id: &str) -> Result<SuccessResponse, ClientError> {
        let response = self
            .http
            .delete(self.url(&format!("agencies/{agency_id}")))
            .send()
            .await?;
        Self::read_response(response).await
    }

    // ── Dashboard & events ───────────────────────────────────────────

    /// `GET agency-dashboard/{agencyId}`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on network failure or a non-success status.
    pub async fn dashboard(&self, agency_id: &str) -> Result<DashboardResponse, ClientError> {
        self.get_json(&format!("agency-dashboard/{agency_id}")).await
    }

    /// `GET event-report/{event_id}`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on network failure or a non-success status.
    pub async fn event_report(&self, event_id: &str) -> Result<ApiEvent, ClientError> {
        self.get_json(&format!("event-report/{event_id}")).await
    }

    /// `PUT events/status/{event_id}`, guarded so only one mutation per
    /// event can be in flight at a time.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::MutationInFlight`] if a previous mutation for
    /// this event has not settled, and the usual network/status errors
    /// otherwise.
    pub async fn update_status(
        &self,
        event_id: &str,
        request: &StatusUpdateRequest,
    ) -> Result<ApiEvent, ClientError> {
        let _guard = self.begin_mutation(event_id)?;
        self.put_json(&format!("events/status/{event_id}"), request)
            .await
    }

    fn begin_mutation(&self, event_id: &str) -> Result<MutationGuard<'_>, ClientError> {
        let mut set = self
            .in_flight
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if !set.insert(event_id.to_string()) {
            return Err(ClientError::MutationInFlight {
                event_id: event_id.to_string(),
            });
        }
        Ok(MutationGuard {
            in_flight: &self.in_flight,
            event_id: event_id.to_string(),
        })
    }

    /// Accept: associates the deciding agency; the operator then proceeds to
    /// the detail flow for ground-staff assignment.
    ///
    /// # Errors
    ///
    /// See [`Self::update_status`].
    pub async fn accept_event(
        &self,
        event_id: &str,
        agency_id: &str,
    ) -> Result<ApiEvent, ClientError> {
        self.update_status(
            event_id,
            &StatusUpdateRequest {
                status: EventStatus::Accepted,
                ground_staff_name: None,
                assignment_time: None,
                agency_id: Some(agency_id.to_string()),
            },
        )
        .await
    }

    /// Reject, legal from any non-terminal state.
    ///
    /// # Errors
    ///
    /// See [`Self::update_status`].
    pub async fn reject_event(&self, event_id: &str) -> Result<ApiEvent, ClientError> {
        self.update_status(
            event_id,
            &StatusUpdateRequest {
                status: EventStatus::Rejected,
                ground_staff_name: None,
                assignment_time: None,
                agency_id: None,
            },
        )
        .await
    }

    /// Assign ground staff. The assignment time is the operator's wall-clock
    /// time at the moment of the action, not server time.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] when no staff name is given; see
    /// [`Self::update_status`] for the rest.
    pub async fn assign_event(
        &self,
        event_id: &str,
        ground_staff_name: &str,
    ) -> Result<ApiEvent, ClientError> {
        if ground_staff_name.trim().is_empty() {
            return Err(validation("Select a ground staff member first."));
        }
        self.update_status(
            event_id,
            &StatusUpdateRequest {
                status: EventStatus::Assigned,
                ground_staff_name: Some(ground_staff_name.to_string()),
                assignment_time: Some(Utc::now()),
                agency_id: None,
            },
        )
        .await
    }

    /// Unassign: clears the staff name and assignment time. The event lands
    /// in `Unassigned`, not `open`.
    ///
    /// # Errors
    ///
    /// See [`Self::update_status`].
    pub async fn unassign_event(&self, event_id: &str) -> Result<ApiEvent, ClientError> {
        self.update_status(
            event_id,
            &StatusUpdateRequest {
                status: EventStatus::Unassigned,
                ground_staff_name: None,
                assignment_time: None,
                agency_id: None,
            },
        )
        .await
    }

    /// Complete: `Assigned -> closed`.
    ///
    /// # Errors
    ///
    /// See [`Self::update_status`].
    pub async fn complete_event(&self, event_id: &str) -> Result<ApiEvent, ClientError> {
        self.update_status(
            event_id,
            &StatusUpdateRequest {
                status: EventStatus::Closed,
                ground_staff_name: None,
                assignment_time: None,
                agency_id: None,
            },
        )
        .await
    }

    // ── Ground staff ─────────────────────────────────────────────────

    /// `GET {agencyId}/groundstaff`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on network failure or a non-success status.
    pub async fn ground_staff(&self, agency_id: &str) -> Result<Vec<ApiGroundStaff>, ClientError> {
        let response: GroundStaffListResponse =
            self.get_json(&format!("{agency_id}/groundstaff")).await?;
        Ok(response.data)
    }

    /// `POST agency/addgroundstaff`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] when any field is empty or the
    /// number is malformed, and the usual network/status errors otherwise.
    pub async fn add_ground_staff(
        &self,
        request: &AddGroundStaffRequest,
    ) -> Result<SuccessResponse, ClientError> {
        if request.name.trim().is_empty()
            || request.number.trim().is_empty()
            || request.address.trim().is_empty()
        {
            return Err(validation("Please fill all fields before submitting."));
        }
        if !billion_eye_agency_models::is_valid_staff_number(&request.number) {
            return Err(validation(
                "Enter a valid 10-digit mobile number starting with 6-9",
            ));
        }
        self.post_json("agency/addgroundstaff", request).await
    }

    // ── Capture upload ───────────────────────────────────────────────

    /// `POST user/upload-image`. Use [`capture::build_capture_request`] to
    /// construct a validated payload.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on network failure or a non-success status.
    pub async fn upload_image(
        &self,
        request: &UploadImageRequest,
    ) -> Result<UploadImageResponse, ClientError> {
        self.post_json("user/upload-image", request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mutation_guard_blocks_duplicates_and_releases_on_drop() {
        let client = ApiClient::new("http://example.invalid/backend");

        let guard = client.begin_mutation("evt-1").unwrap();
        assert!(matches!(
            client.begin_mutation("evt-1").unwrap_err(),
            ClientError::MutationInFlight { .. }
        ));
        // A different event is unaffected.
        let other = client.begin_mutation("evt-2").unwrap();
        drop(other);
        drop(guard);

        // Settled mutations release the slot.
        assert!(client.begin_mutation("evt-1").is_ok());
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let client = ApiClient::new("http://example.invalid/backend/");
        assert_eq!(
            client.url("agency/login"),
            "http://example.invalid/backend/agency/login"
        );
    }
}
