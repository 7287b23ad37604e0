//! Incident-to-agency attribution.
//!
//! A newly captured incident is routed to the first agency whose
//! jurisdiction polygon contains the capture point. If no polygon matches,
//! it falls back to the agency with the nearest point location. Distance is
//! compared in squared degrees, which is adequate at municipal scale.

use billion_eye_database_models::AgencyRow;
use billion_eye_geofence::{Catchment, JurisdictionPolygon, LatLng};

/// Parses an agency row's stored jurisdiction GeoJSON into a [`Catchment`].
///
/// A malformed stored polygon is logged and treated as absent rather than
/// failing the whole lookup.
#[must_use]
pub fn catchment_of(agency: &AgencyRow) -> Catchment {
    let jurisdiction = agency.jurisdiction_geojson.as_deref().and_then(|text| {
        let geometry: geojson::Geometry = match text.parse::<geojson::GeoJson>() {
            Ok(geojson::GeoJson::Geometry(geometry)) => geometry,
            Ok(_) | Err(_) => {
                log::warn!(
                    "Agency {} has malformed jurisdiction GeoJSON, ignoring",
                    agency.agency_id
                );
                return None;
            }
        };
        match JurisdictionPolygon::from_geojson(&geometry) {
            Ok(polygon) => Some(polygon),
            Err(e) => {
                log::warn!(
                    "Agency {} jurisdiction rejected: {e}",
                    agency.agency_id
                );
                None
            }
        }
    });

    Catchment {
        location: agency.location(),
        jurisdiction,
    }
}

/// Picks the agency responsible for an incident at `point`.
///
/// Jurisdiction containment wins; otherwise the nearest point location.
/// Returns `None` only when no agency has any usable catchment.
#[must_use]
pub fn attribute_agency<'a>(agencies: &'a [AgencyRow], point: LatLng) -> Option<&'a AgencyRow> {
    let catchments: Vec<(&AgencyRow, Catchment)> = agencies
        .iter()
        .map(|agency| (agency, catchment_of(agency)))
        .collect();

    if let Some((agency, _)) = catchments
        .iter()
        .find(|(_, catchment)| catchment.contains(point))
    {
        return Some(agency);
    }

    catchments
        .iter()
        .filter_map(|(agency, catchment)| {
            catchment
                .anchor()
                .map(|anchor| (*agency, anchor.distance_sq(point)))
        })
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(agency, _)| agency)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agency(agency_id: &str, lat: f64, lng: f64, jurisdiction: Option<&str>) -> AgencyRow {
        AgencyRow {
            id: format!("id-{agency_id}"),
            agency_id: agency_id.to_string(),
            agency_name: agency_id.to_uppercase(),
            mobile_number: "1234567890".to_string(),
            password: "secret".to_string(),
            event_responsible_for: vec!["Road Damage".to_string()],
            latitude: Some(lat),
            longitude: Some(lng),
            jurisdiction_geojson: jurisdiction.map(str::to_string),
        }
    }

    const SQUARE: &str = r#"{"type":"Polygon","coordinates":[[
        [85.83, 20.27], [85.83, 20.28], [85.84, 20.28], [85.84, 20.27], [85.83, 20.27]
    ]]}"#;

    #[test]
    fn jurisdiction_containment_wins_over_distance() {
        let agencies = vec![
            // Nearest by point, but no jurisdiction.
            agency("agency-125", 20.275, 85.835, None),
            // Further point, but the polygon contains the capture.
            agency("agency-121", 20.34, 85.80, Some(SQUARE)),
        ];
        let point = LatLng::new(20.275, 85.835).unwrap();
        let chosen = attribute_agency(&agencies, point).unwrap();
        assert_eq!(chosen.agency_id, "agency-121");
    }

    #[test]
    fn falls_back_to_nearest_point() {
        let agencies = vec![
            agency("agency-125", 20.34, 85.80, None),
            agency("agency-126", 20.275, 85.835, None),
        ];
        let point = LatLng::new(20.276, 85.836).unwrap();
        let chosen = attribute_agency(&agencies, point).unwrap();
        assert_eq!(chosen.agency_id, "agency-126");
    }

    #[test]
    fn malformed_jurisdiction_is_ignored() {
        let agencies = vec![agency("agency-121", 20.275, 85.835, Some("{broken"))];
        let point = LatLng::new(20.275, 85.835).unwrap();
        assert!(attribute_agency(&agencies, point).is_some());
    }

    #[test]
    fn no_catchment_means_no_attribution() {
        let mut row = agency("agency-121", 0.0, 0.0, None);
        row.latitude = None;
        row.longitude = None;
        let point = LatLng::new(20.275, 85.835).unwrap();
        assert!(attribute_agency(&[row], point).is_none());
    }
}
