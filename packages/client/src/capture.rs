//! Capture submission helpers.
//!
//! The capture flow acquires an image and a one-shot location fix, then
//! submits `{userId, location, timestamp, base64String}`. Coordinates are
//! validated *before* the payload is built: a NaN or missing fix must
//! short-circuit with an operator-visible error and no network call, while
//! the image stays in memory for a retry.

use billion_eye_geofence::LatLng;
use billion_eye_server_models::{GeoPoint, UploadImageRequest};
use chrono::{DateTime, Utc};

use crate::{ClientError, validation};

/// Validates a location fix for submission.
///
/// # Errors
///
/// Returns [`ClientError::Validation`] for NaN, infinite, or out-of-range
/// coordinates — the same message the capture page shows when GPS hands back
/// garbage.
pub fn validate_capture_coordinates(latitude: f64, longitude: f64) -> Result<LatLng, ClientError> {
    LatLng::new(latitude, longitude).map_err(|_| {
        validation("Failed to get valid location. Please enable GPS and try again.")
    })
}

/// Builds a validated upload payload.
///
/// The location is embedded as a GeoJSON `Point` in `[lng, lat]` order; the
/// timestamp is the capture wall-clock time.
///
/// # Errors
///
/// Returns [`ClientError::Validation`] if the coordinates are invalid or the
/// image payload is empty. Nothing is sent in either case.
pub fn build_capture_request(
    user_id: &str,
    latitude: f64,
    longitude: f64,
    captured_at: DateTime<Utc>,
    base64_string: &str,
) -> Result<UploadImageRequest, ClientError> {
    let point = validate_capture_coordinates(latitude, longitude)?;

    if base64_string.is_empty() {
        return Err(validation("Invalid image: nothing was captured."));
    }

    Ok(UploadImageRequest {
        user_id: user_id.to_string(),
        location: GeoPoint::new(point.latitude, point.longitude),
        timestamp: captured_at.to_rfc3339(),
        base64_string: base64_string.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nan_latitude_short_circuits() {
        // (NaN, 85.82) must fail validation before any request is built.
        let err = build_capture_request("12345", f64::NAN, 85.82, Utc::now(), "aGVsbG8=")
            .unwrap_err();
        assert!(matches!(err, ClientError::Validation { .. }));
    }

    #[test]
    fn missing_image_short_circuits() {
        let err =
            build_capture_request("12345", 20.2961, 85.8245, Utc::now(), "").unwrap_err();
        assert!(matches!(err, ClientError::Validation { .. }));
    }

    #[test]
    fn valid_capture_builds_a_geojson_point() {
        let request =
            build_capture_request("12345", 20.2961, 85.8245, Utc::now(), "aGVsbG8=").unwrap();
        assert_eq!(request.location.kind, "Point");
        // GeoJSON order: [lng, lat]
        assert_eq!(request.location.coordinates, [85.8245, 20.2961]);
        assert_eq!(request.user_id, "12345");
    }
}
