//! Catchment import parsers.
//!
//! The data entry flow accepts pasted geometry in several formats. Each
//! parser validates independently and reports a format error instead of
//! panicking:
//!
//! - GeoJSON `Point`/`Polygon` `Feature` (or a bare geometry)
//! - ad-hoc `{"latitude": .., "longitude": ..}` JSON
//! - ad-hoc `{"coordinates": [[lat, lng], ..]}` JSON
//! - CSV with header-detected lat/lng columns

use crate::{GeofenceError, JurisdictionPolygon, LatLng, MIN_POLYGON_POINTS, position_to_latlng};

/// A successfully parsed import payload.
#[derive(Debug, Clone, PartialEq)]
pub enum CatchmentImport {
    /// A single point location.
    Point(LatLng),
    /// A jurisdiction polygon (ring already closed).
    Polygon(JurisdictionPolygon),
}

/// Parses pasted catchment data, trying JSON formats first and falling back
/// to CSV.
///
/// # Errors
///
/// Returns [`GeofenceError::Import`] when no format matches,
/// [`GeofenceError::TooFewPoints`] when a polygon payload has fewer than
/// three valid vertices, or [`GeofenceError::InvalidCoordinate`] for
/// non-finite values.
pub fn parse_import(input: &str) -> Result<CatchmentImport, GeofenceError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(GeofenceError::Import {
            message: "empty input".to_string(),
        });
    }

    if trimmed.starts_with('{') {
        return parse_json(trimmed);
    }

    parse_csv(trimmed)
}

fn parse_json(input: &str) -> Result<CatchmentImport, GeofenceError> {
    let value: serde_json::Value =
        serde_json::from_str(input).map_err(|e| GeofenceError::Import {
            message: format!("invalid JSON: {e}"),
        })?;

    match value.get("type").and_then(serde_json::Value::as_str) {
        Some("Feature") => return parse_geojson_feature(input),
        Some("Point" | "Polygon") => return parse_geojson_geometry(input),
        _ => {}
    }

    // Ad-hoc {latitude, longitude}
    if let (Some(lat), Some(lng)) = (
        value.get("latitude").and_then(serde_json::Value::as_f64),
        value.get("longitude").and_then(serde_json::Value::as_f64),
    ) {
        return Ok(CatchmentImport::Point(LatLng::new(lat, lng)?));
    }

    // Ad-hoc {coordinates: [[lat, lng], ...]} — note lat-first, this shape
    // comes from the legacy entry tooling, not GeoJSON.
    if let Some(pairs) = value.get("coordinates").and_then(serde_json::Value::as_array) {
        let vertices = pairs
            .iter()
            .map(parse_adhoc_pair)
            .collect::<Result<Vec<_>, _>>()?;
        if vertices.len() < MIN_POLYGON_POINTS {
            return Err(GeofenceError::TooFewPoints {
                minimum: MIN_POLYGON_POINTS,
                actual: vertices.len(),
            });
        }
        return Ok(CatchmentImport::Polygon(JurisdictionPolygon::from_vertices(
            &vertices,
        )?));
    }

    Err(GeofenceError::Import {
        message: "JSON object is neither GeoJSON nor a known ad-hoc shape".to_string(),
    })
}

fn parse_adhoc_pair(pair: &serde_json::Value) -> Result<LatLng, GeofenceError> {
    let components = pair.as_array().ok_or_else(|| GeofenceError::Import {
        message: "coordinates entries must be [lat, lng] arrays".to_string(),
    })?;
    if components.len() < 2 {
        return Err(GeofenceError::Import {
            message: format!("coordinate pair has {} components", components.len()),
        });
    }
    let lat = components[0].as_f64().ok_or_else(|| GeofenceError::Import {
        message: "non-numeric latitude in coordinate pair".to_string(),
    })?;
    let lng = components[1].as_f64().ok_or_else(|| GeofenceError::Import {
        message: "non-numeric longitude in coordinate pair".to_string(),
    })?;
    LatLng::new(lat, lng)
}

fn parse_geojson_feature(input: &str) -> Result<CatchmentImport, GeofenceError> {
    let geojson: geojson::GeoJson = input.parse().map_err(|e| GeofenceError::Import {
        message: format!("invalid GeoJSON: {e}"),
    })?;
    let geojson::GeoJson::Feature(feature) = geojson else {
        return Err(GeofenceError::Import {
            message: "expected a GeoJSON Feature".to_string(),
        });
    };
    let geometry = feature.geometry.ok_or_else(|| GeofenceError::Import {
        message: "Feature has no geometry".to_string(),
    })?;
    import_from_geometry(&geometry)
}

fn parse_geojson_geometry(input: &str) -> Result<CatchmentImport, GeofenceError> {
    let geojson: geojson::GeoJson = input.parse().map_err(|e| GeofenceError::Import {
        message: format!("invalid GeoJSON: {e}"),
    })?;
    let geojson::GeoJson::Geometry(geometry) = geojson else {
        return Err(GeofenceError::Import {
            message: "expected a GeoJSON geometry".to_string(),
        });
    };
    import_from_geometry(&geometry)
}

fn import_from_geometry(geometry: &geojson::Geometry) -> Result<CatchmentImport, GeofenceError> {
    match &geometry.value {
        geojson::Value::Point(position) => {
            Ok(CatchmentImport::Point(position_to_latlng(position)?))
        }
        geojson::Value::Polygon(_) => Ok(CatchmentImport::Polygon(
            JurisdictionPolygon::from_geojson(geometry)?,
        )),
        other => Err(GeofenceError::Import {
            message: format!("unsupported geometry type {}", other.type_name()),
        }),
    }
}

/// Parses CSV input with header-detected latitude/longitude columns.
///
/// A header cell counts as a latitude column if it contains `lat` and as a
/// longitude column if it contains `lng` or `lon` (case-insensitive, so
/// `Latitude`/`LONGITUDE` both work). One row yields a point; three or more
/// yield a polygon.
fn parse_csv(input: &str) -> Result<CatchmentImport, GeofenceError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(input.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| GeofenceError::Import {
            message: format!("invalid CSV: {e}"),
        })?
        .clone();

    let mut lat_col = None;
    let mut lng_col = None;
    for (idx, header) in headers.iter().enumerate() {
        let lower = header.to_lowercase();
        if lat_col.is_none() && lower.contains("lat") {
            lat_col = Some(idx);
        } else if lng_col.is_none() && (lower.contains("lng") || lower.contains("lon")) {
            lng_col = Some(idx);
        }
    }
    let (Some(lat_col), Some(lng_col)) = (lat_col, lng_col) else {
        return Err(GeofenceError::Import {
            message: "CSV headers do not include lat/lng columns".to_string(),
        });
    };

    let mut vertices = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| GeofenceError::Import {
            message: format!("invalid CSV row: {e}"),
        })?;
        let (Some(lat_str), Some(lng_str)) = (record.get(lat_col), record.get(lng_col)) else {
            continue;
        };
        if lat_str.is_empty() && lng_str.is_empty() {
            continue;
        }
        let lat = lat_str.parse::<f64>().map_err(|_| GeofenceError::Import {
            message: format!("non-numeric latitude '{lat_str}'"),
        })?;
        let lng = lng_str.parse::<f64>().map_err(|_| GeofenceError::Import {
            message: format!("non-numeric longitude '{lng_str}'"),
        })?;
        vertices.push(LatLng::new(lat, lng)?);
    }

    match vertices.len() {
        0 => Err(GeofenceError::Import {
            message: "CSV contains no coordinate rows".to_string(),
        }),
        1 => Ok(CatchmentImport::Point(vertices[0])),
        2 => Err(GeofenceError::TooFewPoints {
            minimum: MIN_POLYGON_POINTS,
            actual: 2,
        }),
        _ => Ok(CatchmentImport::Polygon(JurisdictionPolygon::from_vertices(
            &vertices,
        )?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_geojson_point_feature() {
        let input = r#"{
            "type": "Feature",
            "properties": {},
            "geometry": { "type": "Point", "coordinates": [85.8245, 20.2961] }
        }"#;
        let CatchmentImport::Point(point) = parse_import(input).unwrap() else {
            panic!("expected point import");
        };
        assert!((point.latitude - 20.2961).abs() < f64::EPSILON);
        assert!((point.longitude - 85.8245).abs() < f64::EPSILON);
    }

    #[test]
    fn parses_geojson_polygon_feature() {
        let input = r#"{
            "type": "Feature",
            "properties": {},
            "geometry": {
                "type": "Polygon",
                "coordinates": [[
                    [85.83, 20.27], [85.83, 20.28], [85.84, 20.28], [85.83, 20.27]
                ]]
            }
        }"#;
        let CatchmentImport::Polygon(polygon) = parse_import(input).unwrap() else {
            panic!("expected polygon import");
        };
        assert_eq!(polygon.ring().len(), 4);
    }

    #[test]
    fn parses_adhoc_lat_lng_object() {
        let input = r#"{"latitude": 20.2961, "longitude": 85.8245}"#;
        let CatchmentImport::Point(point) = parse_import(input).unwrap() else {
            panic!("expected point import");
        };
        assert!((point.latitude - 20.2961).abs() < f64::EPSILON);
    }

    #[test]
    fn parses_adhoc_coordinates_object() {
        let input = r#"{"coordinates": [[20.27, 85.83], [20.28, 85.83], [20.28, 85.84]]}"#;
        let CatchmentImport::Polygon(polygon) = parse_import(input).unwrap() else {
            panic!("expected polygon import");
        };
        // lat-first in the ad-hoc shape
        assert!((polygon.ring()[0].latitude - 20.27).abs() < f64::EPSILON);
    }

    #[test]
    fn adhoc_coordinates_require_three_points() {
        let input = r#"{"coordinates": [[20.27, 85.83], [20.28, 85.83]]}"#;
        assert!(matches!(
            parse_import(input).unwrap_err(),
            GeofenceError::TooFewPoints { actual: 2, .. }
        ));
    }

    #[test]
    fn parses_csv_with_detected_headers() {
        let input = "name,Latitude,Longitude\na,20.27,85.83\nb,20.28,85.83\nc,20.28,85.84\n";
        let CatchmentImport::Polygon(polygon) = parse_import(input).unwrap() else {
            panic!("expected polygon import");
        };
        assert_eq!(polygon.ring().len(), 4);
    }

    #[test]
    fn csv_single_row_is_a_point() {
        let input = "lat,lon\n20.27,85.83\n";
        assert!(matches!(
            parse_import(input).unwrap(),
            CatchmentImport::Point(_)
        ));
    }

    #[test]
    fn csv_without_coordinate_headers_is_rejected() {
        let input = "a,b\n1,2\n";
        assert!(matches!(
            parse_import(input).unwrap_err(),
            GeofenceError::Import { .. }
        ));
    }

    #[test]
    fn garbage_is_rejected_not_panicked() {
        assert!(parse_import("{not json").is_err());
        assert!(parse_import("").is_err());
        assert!(parse_import("{\"type\": \"LineString\", \"coordinates\": []}").is_err());
    }
}
