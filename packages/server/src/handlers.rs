//! HTTP handler functions for the BillionEye API.

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, web};
use billion_eye_agency_models::{is_valid_agency_mobile, is_valid_staff_number};
use billion_eye_database::{DbError, attribution, queries};
use billion_eye_database_models::{
    AgencyRow, AgencyUpdate, GroundStaffRow, NewEvent, StatusChange,
};
use billion_eye_geofence::{JurisdictionPolygon, LatLng};
use billion_eye_server_models::{
    AddGroundStaffRequest, AgencyListResponse, ApiAgency, ApiEvent, ApiGroundStaff, ApiHealth,
    ApiJurisdiction, ApiLocation, CreateAgencyRequest, DashboardResponse, LoginAgency,
    LoginRequest, LoginResponse, StatusUpdateRequest, SuccessResponse, UpdateAgencyRequest,
    UploadImageRequest, UploadImageResponse,
};
use chrono::Utc;

use crate::AppState;

/// `GET /backend/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn bad_request(message: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({ "message": message.into() }))
}

fn internal_error(message: &str) -> HttpResponse {
    HttpResponse::InternalServerError().json(serde_json::json!({ "error": message }))
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// `POST /backend/agency/login`
///
/// Issues an opaque bearer token for a matching mobile/password pair.
/// Brute-force throttling is an operator-side concern; this endpoint only
/// verifies credentials.
pub async fn login(state: web::Data<AppState>, body: web::Json<LoginRequest>) -> HttpResponse {
    let agency = match queries::get_agency_by_mobile(state.db.as_ref(), &body.mobile_number).await
    {
        Ok(agency) => agency,
        Err(e) => {
            log::error!("Failed to look up agency: {e}");
            return internal_error("Failed to look up agency");
        }
    };

    let Some(agency) = agency else {
        return HttpResponse::Unauthorized()
            .json(serde_json::json!({ "message": "Invalid credentials!" }));
    };

    if agency.password != body.password {
        return HttpResponse::Unauthorized()
            .json(serde_json::json!({ "message": "Invalid credentials!" }));
    }

    let token = uuid::Uuid::new_v4().to_string();
    if let Err(e) =
        queries::insert_token(state.db.as_ref(), &token, &agency.agency_id, Utc::now()).await
    {
        log::error!("Failed to record login token: {e}");
        return internal_error("Failed to record login token");
    }

    HttpResponse::Ok().json(LoginResponse {
        token,
        agency: LoginAgency {
            agency_id: agency.agency_id,
        },
    })
}

/// `POST /backend/agency/logout`
///
/// Revokes the bearer token from the `Authorization` header.
pub async fn logout(state: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    let Some(token) = token else {
        return HttpResponse::Unauthorized()
            .json(serde_json::json!({ "message": "Missing bearer token" }));
    };

    match queries::revoke_token(state.db.as_ref(), token).await {
        Ok(_) => HttpResponse::Ok().json(SuccessResponse { success: true }),
        Err(e) => {
            log::error!("Failed to revoke token: {e}");
            internal_error("Failed to revoke token")
        }
    }
}

// ---------------------------------------------------------------------------
// Agencies
// ---------------------------------------------------------------------------

fn parse_wire_jurisdiction(
    jurisdiction: &ApiJurisdiction,
) -> Result<JurisdictionPolygon, HttpResponse> {
    let vertices = jurisdiction
        .coordinates
        .iter()
        .map(|&pair| LatLng::from_position(pair))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| bad_request(format!("Invalid jurisdiction coordinate: {e}")))?;

    JurisdictionPolygon::from_vertices(&vertices)
        .map_err(|e| bad_request(format!("Invalid jurisdiction: {e}")))
}

fn wire_jurisdiction(polygon: &JurisdictionPolygon) -> ApiJurisdiction {
    ApiJurisdiction {
        coordinates: polygon.ring().iter().map(|p| p.to_position()).collect(),
        kind: "Polygon".to_string(),
    }
}

fn api_agency(row: &AgencyRow) -> ApiAgency {
    let catchment = attribution::catchment_of(row);
    ApiAgency {
        id: row.id.clone(),
        agency_id: row.agency_id.clone(),
        agency_name: row.agency_name.clone(),
        mobile_number: row.mobile_number.clone(),
        event_responsible_for: row.event_responsible_for.clone(),
        location: catchment.location.map(|point| ApiLocation {
            latitude: point.latitude,
            longitude: point.longitude,
        }),
        jurisdiction: catchment.jurisdiction.as_ref().map(wire_jurisdiction),
    }
}

/// `POST /backend/agency`
///
/// Shared by the public registration form (name/mobile/password + a point
/// location) and the admin manager (categories and an optional jurisdiction
/// polygon, whose centroid becomes the point location).
pub async fn create_agency(
    state: web::Data<AppState>,
    body: web::Json<CreateAgencyRequest>,
) -> HttpResponse {
    if body.agency_name.trim().is_empty() {
        return bad_request("Agency name is required.");
    }
    if !is_valid_agency_mobile(&body.mobile_number) {
        return bad_request("Please enter a valid 10-digit mobile number");
    }
    if body.password.is_empty() {
        return bad_request("Password is required.");
    }

    let (latitude, longitude, jurisdiction_geojson) = match &body.jurisdiction {
        Some(jurisdiction) => {
            let polygon = match parse_wire_jurisdiction(jurisdiction) {
                Ok(polygon) => polygon,
                Err(response) => return response,
            };
            let centroid = polygon.centroid();
            (
                Some(centroid.latitude),
                Some(centroid.longitude),
                Some(polygon.to_geojson().to_string()),
            )
        }
        None => (body.lat, body.lng, None),
    };

    let suffix = uuid::Uuid::new_v4().simple().to_string();
    let agency = AgencyRow {
        id: uuid::Uuid::new_v4().to_string(),
        agency_id: format!("agency-{}", &suffix[..6]),
        agency_name: body.agency_name.trim().to_string(),
        mobile_number: body.mobile_number.clone(),
        password: body.password.clone(),
        event_responsible_for: body.event_responsible_for.clone().unwrap_or_default(),
        latitude,
        longitude,
        jurisdiction_geojson,
    };

    match queries::create_agency(state.db.as_ref(), &agency).await {
        Ok(()) => HttpResponse::Ok().json(SuccessResponse { success: true }),
        Err(e) => {
            log::error!("Failed to create agency: {e}");
            internal_error("Failed to create agency")
        }
    }
}

/// `GET /backend/agencies`
///
/// Admin listing. Stored passwords are never echoed back.
pub async fn list_agencies(state: web::Data<AppState>) -> HttpResponse {
    match queries::list_agencies(state.db.as_ref()).await {
        Ok(rows) => HttpResponse::Ok().json(AgencyListResponse {
            success: true,
            data: rows.iter().map(api_agency).collect(),
        }),
        Err(e) => {
            log::error!("Failed to list agencies: {e}");
            internal_error("Failed to list agencies")
        }
    }
}

/// `PUT /backend/agencies/{agencyId}`
pub async fn update_agency(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<UpdateAgencyRequest>,
) -> HttpResponse {
    let agency_id = path.into_inner();

    if let Some(mobile) = &body.mobile_number {
        if !is_valid_agency_mobile(mobile) {
            return bad_request("Please enter a valid 10-digit mobile number");
        }
    }

    let (location, jurisdiction_geojson) = match &body.jurisdiction {
        Some(jurisdiction) => {
            let polygon = match parse_wire_jurisdiction(jurisdiction) {
                Ok(polygon) => polygon,
                Err(response) => return response,
            };
            (Some(polygon.centroid()), Some(polygon.to_geojson().to_string()))
        }
        None => {
            let location = match (body.lat, body.lng) {
                (Some(lat), Some(lng)) => match LatLng::new(lat, lng) {
                    Ok(point) => Some(point),
                    Err(e) => return bad_request(format!("Invalid location: {e}")),
                },
                _ => None,
            };
            (location, None)
        }
    };

    let update = AgencyUpdate {
        agency_name: body.agency_name.clone(),
        mobile_number: body.mobile_number.clone(),
        password: body.password.clone(),
        event_responsible_for: body.event_responsible_for.clone(),
        location,
        jurisdiction_geojson,
    };

    match queries::update_agency(state.db.as_ref(), &agency_id, &update).await {
        Ok(0) => HttpResponse::NotFound()
            .json(serde_json::json!({ "error": format!("Agency {agency_id} not found") })),
        Ok(_) => HttpResponse::Ok().json(SuccessResponse { success: true }),
        Err(e) => {
            log::error!("Failed to update agency {agency_id}: {e}");
            internal_error("Failed to update agency")
        }
    }
}

/// `DELETE /backend/agencies/{agencyId}`
pub async fn delete_agency(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let agency_id = path.into_inner();

    match queries::delete_agency(state.db.as_ref(), &agency_id).await {
        Ok(0) => HttpResponse::NotFound()
            .json(serde_json::json!({ "error": format!("Agency {agency_id} not found") })),
        Ok(_) => HttpResponse::Ok().json(SuccessResponse { success: true }),
        Err(e) => {
            log::error!("Failed to delete agency {agency_id}: {e}");
            internal_error("Failed to delete agency")
        }
    }
}

// ---------------------------------------------------------------------------
// Dashboard & events
// ---------------------------------------------------------------------------

/// `GET /backend/agency-dashboard/{agencyId}`
pub async fn dashboard(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let agency_id = path.into_inner();

    let agency = match queries::get_agency(state.db.as_ref(), &agency_id).await {
        Ok(Some(agency)) => agency,
        Ok(None) => {
            return HttpResponse::NotFound()
                .json(serde_json::json!({ "error": format!("Agency {agency_id} not found") }));
        }
        Err(e) => {
            log::error!("Failed to fetch agency {agency_id}: {e}");
            return internal_error("Failed to fetch agency");
        }
    };

    match queries::events_for_agency(state.db.as_ref(), &agency_id).await {
        Ok(rows) => HttpResponse::Ok().json(DashboardResponse {
            agency_name: agency.agency_name,
            assigned_events: rows.into_iter().map(ApiEvent::from).collect(),
        }),
        Err(e) => {
            log::error!("Failed to fetch dashboard events for {agency_id}: {e}");
            internal_error("Failed to fetch dashboard events")
        }
    }
}

/// `GET /backend/event-report/{event_id}`
pub async fn event_report(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let event_id = path.into_inner();

    match queries::get_event(state.db.as_ref(), &event_id).await {
        Ok(Some(row)) => HttpResponse::Ok().json(ApiEvent::from(row)),
        Ok(None) => HttpResponse::NotFound()
            .json(serde_json::json!({ "error": format!("Event {event_id} not found") })),
        Err(e) => {
            log::error!("Failed to fetch event {event_id}: {e}");
            internal_error("Failed to fetch event")
        }
    }
}

/// `PUT /backend/events/status/{event_id}`
///
/// Applies one state-machine transition. Illegal transitions come back as
/// 409 so a stale dashboard doesn't silently clobber a newer status.
pub async fn update_event_status(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<StatusUpdateRequest>,
) -> HttpResponse {
    let event_id = path.into_inner();

    let change = StatusChange {
        status: body.status,
        ground_staff_name: body.ground_staff_name.clone(),
        assignment_time: body.assignment_time,
        agency_id: body.agency_id.clone(),
    };

    match queries::update_event_status(state.db.as_ref(), &event_id, &change).await {
        Ok(row) => HttpResponse::Ok().json(ApiEvent::from(row)),
        Err(DbError::NotFound { what }) => {
            HttpResponse::NotFound().json(serde_json::json!({ "error": what }))
        }
        Err(e @ DbError::InvalidTransition { .. }) => {
            HttpResponse::Conflict().json(serde_json::json!({ "error": e.to_string() }))
        }
        Err(e) => {
            log::error!("Failed to update status of event {event_id}: {e}");
            internal_error("Failed to update event status")
        }
    }
}

// ---------------------------------------------------------------------------
// Ground staff
// ---------------------------------------------------------------------------

/// `GET /backend/{agencyId}/groundstaff`
pub async fn ground_staff(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let agency_id = path.into_inner();

    match queries::ground_staff_for_agency(state.db.as_ref(), &agency_id).await {
        Ok(rows) => HttpResponse::Ok().json(
            billion_eye_server_models::GroundStaffListResponse {
                success: true,
                data: rows.into_iter().map(ApiGroundStaff::from).collect(),
            },
        ),
        Err(e) => {
            log::error!("Failed to list ground staff for {agency_id}: {e}");
            internal_error("Failed to list ground staff")
        }
    }
}

/// `POST /backend/agency/addgroundstaff`
pub async fn add_ground_staff(
    state: web::Data<AppState>,
    body: web::Json<AddGroundStaffRequest>,
) -> HttpResponse {
    if body.name.trim().is_empty() || body.address.trim().is_empty() {
        return bad_request("Please fill all fields before submitting.");
    }
    if !is_valid_staff_number(&body.number) {
        return bad_request("Enter a valid 10-digit mobile number starting with 6-9");
    }

    let staff = GroundStaffRow {
        id: uuid::Uuid::new_v4().to_string(),
        name: body.name.trim().to_string(),
        number: body.number.clone(),
        address: body.address.trim().to_string(),
        agency_id: body.agency_id.clone(),
    };

    match queries::add_ground_staff(state.db.as_ref(), &staff).await {
        Ok(()) => HttpResponse::Ok().json(SuccessResponse { success: true }),
        Err(e) => {
            log::error!("Failed to add ground staff: {e}");
            internal_error("Failed to add ground staff")
        }
    }
}

// ---------------------------------------------------------------------------
// Capture upload
// ---------------------------------------------------------------------------

/// `POST /backend/user/upload-image`
///
/// Validates the capture payload, stores the image, attributes the incident
/// to an agency by jurisdiction, and creates an `open` event.
pub async fn upload_image(
    state: web::Data<AppState>,
    body: web::Json<UploadImageRequest>,
) -> HttpResponse {
    if body.location.kind != "Point" {
        return bad_request(format!(
            "location must be a GeoJSON Point, got '{}'",
            body.location.kind
        ));
    }

    let point = match LatLng::new(body.location.latitude(), body.location.longitude()) {
        Ok(point) => point,
        Err(e) => return bad_request(format!("Invalid capture location: {e}")),
    };

    let bytes = match billion_eye_storage::decode_image(&body.base64_string) {
        Ok(bytes) => bytes,
        Err(e) => return bad_request(e.to_string()),
    };
    if bytes.is_empty() {
        return bad_request("Empty image payload");
    }

    let reported_at = chrono::DateTime::parse_from_rfc3339(&body.timestamp)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now());

    let image_id = uuid::Uuid::new_v4().simple().to_string();

    let image_url = if let Some(images) = &state.images {
        match images.put_image(&image_id, bytes).await {
            Ok(url) => Some(url),
            Err(e) => {
                log::error!("Failed to store image {image_id}: {e}");
                return internal_error("Failed to store image");
            }
        }
    } else {
        Some(format!("/billion-eyes-images/{image_id}.jpg"))
    };

    let agency_id = match queries::list_agencies(state.db.as_ref()).await {
        Ok(agencies) => attribution::attribute_agency(&agencies, point)
            .map(|agency| agency.agency_id.clone()),
        Err(e) => {
            log::error!("Failed to list agencies for attribution: {e}");
            None
        }
    };

    let event = NewEvent {
        event_id: image_id.clone(),
        description: "Unclassified".to_string(),
        latitude: point.latitude,
        longitude: point.longitude,
        image_url,
        agency_id,
        user_id: body.user_id.clone(),
        reported_at,
    };

    match queries::insert_event(state.db.as_ref(), &event).await {
        Ok(()) => HttpResponse::Ok().json(UploadImageResponse { image_id }),
        Err(e) => {
            log::error!("Failed to record incident {image_id}: {e}");
            internal_error("Failed to record incident")
        }
    }
}

// ---------------------------------------------------------------------------
// HTTP -> HTTPS redirect
// ---------------------------------------------------------------------------

/// Default service for the plain-HTTP listener: 301 to the HTTPS equivalent
/// of the requested URL, preserving host, path, and query string.
pub async fn redirect_to_https(req: HttpRequest) -> HttpResponse {
    let host = req.connection_info().host().to_string();
    let location = format!("https://{host}{}", req.uri());

    HttpResponse::MovedPermanently()
        .insert_header((header::LOCATION, location))
        .finish()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::{App, test};
    use billion_eye_database::db;
    use billion_eye_event_models::EventStatus;
    use billion_eye_server_models::GroundStaffListResponse;

    use super::*;
    use crate::configure_api;

    async fn seeded_state() -> web::Data<AppState> {
        let database = db::open_in_memory().await.unwrap();

        let agency = AgencyRow {
            id: "68494141fa7e1500079ec953".to_string(),
            agency_id: "agency-121".to_string(),
            agency_name: "City Maintenance".to_string(),
            mobile_number: "1234567892".to_string(),
            password: "password123".to_string(),
            event_responsible_for: vec!["Road Damage".to_string()],
            latitude: Some(20.277_679),
            longitude: Some(85.834_779),
            jurisdiction_geojson: Some(
                r#"{"type":"Polygon","coordinates":[[
                    [85.83, 20.27], [85.83, 20.28], [85.84, 20.28], [85.84, 20.27], [85.83, 20.27]
                ]]}"#
                    .to_string(),
            ),
        };
        queries::create_agency(database.as_ref(), &agency)
            .await
            .unwrap();

        web::Data::new(AppState {
            db: Arc::from(database),
            images: None,
        })
    }

    #[actix_web::test]
    async fn login_then_dashboard_flow() {
        let state = seeded_state().await;
        let app = test::init_service(
            App::new().app_data(state.clone()).configure(configure_api),
        )
        .await;

        // Wrong password is a 401 without a token.
        let req = test::TestRequest::post()
            .uri("/backend/agency/login")
            .set_json(serde_json::json!({
                "mobileNumber": "1234567892",
                "password": "wrong"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);

        // Correct credentials yield a token and the agency id.
        let req = test::TestRequest::post()
            .uri("/backend/agency/login")
            .set_json(serde_json::json!({
                "mobileNumber": "1234567892",
                "password": "password123"
            }))
            .to_request();
        let login: LoginResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(login.agency.agency_id, "agency-121");
        assert!(!login.token.is_empty());

        let req = test::TestRequest::get()
            .uri("/backend/agency-dashboard/agency-121")
            .to_request();
        let dashboard: DashboardResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(dashboard.agency_name, "City Maintenance");
        assert!(dashboard.assigned_events.is_empty());

        // Logout with the issued token.
        let req = test::TestRequest::post()
            .uri("/backend/agency/logout")
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", login.token)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
    }

    #[actix_web::test]
    async fn upload_is_attributed_and_reaches_the_dashboard() {
        let state = seeded_state().await;
        let app = test::init_service(
            App::new().app_data(state.clone()).configure(configure_api),
        )
        .await;

        // Inside agency-121's jurisdiction square.
        let req = test::TestRequest::post()
            .uri("/backend/user/upload-image")
            .set_json(serde_json::json!({
                "userId": "12345",
                "location": { "type": "Point", "coordinates": [85.835, 20.275] },
                "timestamp": "2025-06-11T09:30:00.000Z",
                "base64String": "aGVsbG8="
            }))
            .to_request();
        let upload: UploadImageResponse = test::call_and_read_body_json(&app, req).await;
        assert!(!upload.image_id.is_empty());

        let req = test::TestRequest::get()
            .uri("/backend/agency-dashboard/agency-121")
            .to_request();
        let dashboard: DashboardResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(dashboard.assigned_events.len(), 1);
        let event = &dashboard.assigned_events[0];
        assert_eq!(event.event_id, upload.image_id);
        assert_eq!(event.status, EventStatus::Open);
        assert_eq!(event.agency_id.as_deref(), Some("agency-121"));
    }

    #[actix_web::test]
    async fn upload_rejects_bad_payloads() {
        let state = seeded_state().await;
        let app = test::init_service(
            App::new().app_data(state.clone()).configure(configure_api),
        )
        .await;

        // Out-of-range latitude.
        let req = test::TestRequest::post()
            .uri("/backend/user/upload-image")
            .set_json(serde_json::json!({
                "userId": "12345",
                "location": { "type": "Point", "coordinates": [85.835, 120.0] },
                "timestamp": "2025-06-11T09:30:00.000Z",
                "base64String": "aGVsbG8="
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);

        // Not a Point.
        let req = test::TestRequest::post()
            .uri("/backend/user/upload-image")
            .set_json(serde_json::json!({
                "userId": "12345",
                "location": { "type": "Polygon", "coordinates": [85.835, 20.275] },
                "timestamp": "2025-06-11T09:30:00.000Z",
                "base64String": "aGVsbG8="
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);

        // Invalid base64.
        let req = test::TestRequest::post()
            .uri("/backend/user/upload-image")
            .set_json(serde_json::json!({
                "userId": "12345",
                "location": { "type": "Point", "coordinates": [85.835, 20.275] },
                "timestamp": "2025-06-11T09:30:00.000Z",
                "base64String": "not!!base64??"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }

    #[actix_web::test]
    async fn status_transitions_follow_the_state_machine() {
        let state = seeded_state().await;
        let app = test::init_service(
            App::new().app_data(state.clone()).configure(configure_api),
        )
        .await;

        let event = NewEvent {
            event_id: "evt-1".to_string(),
            description: "Road Damage".to_string(),
            latitude: 20.275,
            longitude: 85.835,
            image_url: None,
            agency_id: Some("agency-121".to_string()),
            user_id: "12345".to_string(),
            reported_at: Utc::now(),
        };
        queries::insert_event(state.db.as_ref(), &event)
            .await
            .unwrap();

        // open -> Accepted -> Assigned -> closed
        for (status, extra) in [
            ("Accepted", serde_json::json!({"agencyId": "agency-121"})),
            (
                "Assigned",
                serde_json::json!({
                    "groundStaffName": "Ravi Kumar",
                    "assignment_time": "2025-06-11T10:00:00.000Z"
                }),
            ),
            ("closed", serde_json::json!({})),
        ] {
            let mut body = serde_json::json!({ "status": status });
            body.as_object_mut()
                .unwrap()
                .extend(extra.as_object().unwrap().clone());
            let req = test::TestRequest::put()
                .uri("/backend/events/status/evt-1")
                .set_json(body)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), 200, "transition to {status}");
        }

        // Completing keeps the assignment fields from the assign step.
        let req = test::TestRequest::get()
            .uri("/backend/event-report/evt-1")
            .to_request();
        let event: ApiEvent = test::call_and_read_body_json(&app, req).await;
        assert_eq!(event.status, EventStatus::Closed);
        assert_eq!(event.ground_staff_name.as_deref(), Some("Ravi Kumar"));
        assert!(event.assignment_time.is_some());

        // closed is terminal.
        let req = test::TestRequest::put()
            .uri("/backend/events/status/evt-1")
            .set_json(serde_json::json!({ "status": "Assigned" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 409);

        // Unknown event is a 404.
        let req = test::TestRequest::put()
            .uri("/backend/events/status/missing")
            .set_json(serde_json::json!({ "status": "Rejected" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);
    }

    #[actix_web::test]
    async fn unassign_clears_assignment_fields() {
        let state = seeded_state().await;
        let app = test::init_service(
            App::new().app_data(state.clone()).configure(configure_api),
        )
        .await;

        let event = NewEvent {
            event_id: "evt-2".to_string(),
            description: "Flooding".to_string(),
            latitude: 20.275,
            longitude: 85.835,
            image_url: None,
            agency_id: Some("agency-121".to_string()),
            user_id: "12345".to_string(),
            reported_at: Utc::now(),
        };
        queries::insert_event(state.db.as_ref(), &event)
            .await
            .unwrap();

        let req = test::TestRequest::put()
            .uri("/backend/events/status/evt-2")
            .set_json(serde_json::json!({
                "status": "Assigned",
                "groundStaffName": "Sunita Das",
                "assignment_time": "2025-06-11T10:00:00.000Z"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        // Unassign sends explicit nulls, exactly as the detail page does.
        let req = test::TestRequest::put()
            .uri("/backend/events/status/evt-2")
            .set_json(serde_json::json!({
                "status": "Unassigned",
                "groundStaffName": null,
                "assignment_time": null
            }))
            .to_request();
        let updated: ApiEvent = test::call_and_read_body_json(&app, req).await;
        assert_eq!(updated.status, EventStatus::Unassigned);
        assert_eq!(updated.ground_staff_name, None);
        assert_eq!(updated.assignment_time, None);

        // Re-assignment from Unassigned is legal.
        let req = test::TestRequest::put()
            .uri("/backend/events/status/evt-2")
            .set_json(serde_json::json!({
                "status": "Assigned",
                "groundStaffName": "Sunita Das",
                "assignment_time": "2025-06-11T11:00:00.000Z"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
    }

    #[actix_web::test]
    async fn ground_staff_add_and_list() {
        let state = seeded_state().await;
        let app = test::init_service(
            App::new().app_data(state.clone()).configure(configure_api),
        )
        .await;

        // Number not starting 6-9 is rejected before any write.
        let req = test::TestRequest::post()
            .uri("/backend/agency/addgroundstaff")
            .set_json(serde_json::json!({
                "name": "Ravi Kumar",
                "number": "1234567890",
                "address": "Bhubaneswar",
                "agencyId": "agency-121"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);

        let req = test::TestRequest::post()
            .uri("/backend/agency/addgroundstaff")
            .set_json(serde_json::json!({
                "name": "Ravi Kumar",
                "number": "9861374962",
                "address": "Bhubaneswar",
                "agencyId": "agency-121"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let req = test::TestRequest::get()
            .uri("/backend/agency-121/groundstaff")
            .to_request();
        let list: GroundStaffListResponse = test::call_and_read_body_json(&app, req).await;
        assert!(list.success);
        assert_eq!(list.data.len(), 1);
        assert_eq!(list.data[0].name, "Ravi Kumar");
    }

    #[actix_web::test]
    async fn agency_list_never_exposes_passwords() {
        let state = seeded_state().await;
        let app = test::init_service(
            App::new().app_data(state.clone()).configure(configure_api),
        )
        .await;

        let req = test::TestRequest::get().uri("/backend/agencies").to_request();
        let body = test::call_and_read_body(&app, req).await;
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(!text.contains("password123"));
        assert!(text.contains("agency-121"));
    }
}
