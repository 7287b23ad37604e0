#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Catchment geometry for agency jurisdictions.
//!
//! The canonical in-memory representation is [`LatLng`] everywhere; GeoJSON
//! `[lng, lat]` position order exists only at the wire edge, via
//! [`LatLng::to_position`] / [`LatLng::from_position`]. Historical data entry
//! tooling disagreed on coordinate order, so keeping the conversion in one
//! place is the point of this crate.

pub mod import;

use geo::Contains as _;
use serde::{Deserialize, Serialize};

/// Errors from catchment geometry handling and import parsing.
#[derive(Debug, thiserror::Error)]
pub enum GeofenceError {
    /// A coordinate was missing, non-finite, or out of range.
    #[error("Invalid coordinate: {message}")]
    InvalidCoordinate {
        /// Description of what was wrong.
        message: String,
    },

    /// A polygon ring had fewer than the minimum number of vertices.
    #[error("Jurisdiction polygon needs at least {minimum} points, got {actual}")]
    TooFewPoints {
        /// Required minimum vertex count.
        minimum: usize,
        /// Vertices actually supplied.
        actual: usize,
    },

    /// An import payload could not be parsed in any supported format.
    #[error("Unrecognized import format: {message}")]
    Import {
        /// Description of the parse failure.
        message: String,
    },
}

/// Minimum number of distinct vertices for a jurisdiction polygon.
pub const MIN_POLYGON_POINTS: usize = 3;

/// A WGS84 coordinate pair, latitude first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl LatLng {
    /// Creates a coordinate, rejecting non-finite or out-of-range values.
    ///
    /// # Errors
    ///
    /// Returns [`GeofenceError::InvalidCoordinate`] if either component is
    /// NaN/infinite or outside the valid degree range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeofenceError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(GeofenceError::InvalidCoordinate {
                message: format!("non-finite pair ({latitude}, {longitude})"),
            });
        }
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(GeofenceError::InvalidCoordinate {
                message: format!("out of range ({latitude}, {longitude})"),
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// GeoJSON position order: `[lng, lat]`.
    #[must_use]
    pub const fn to_position(self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }

    /// Builds a coordinate from a GeoJSON `[lng, lat]` position.
    ///
    /// # Errors
    ///
    /// Returns [`GeofenceError::InvalidCoordinate`] on non-finite or
    /// out-of-range values.
    pub fn from_position(position: [f64; 2]) -> Result<Self, GeofenceError> {
        Self::new(position[1], position[0])
    }

    /// Squared distance in degrees. Only meaningful for comparing distances
    /// at municipal scale; never use for real geodesy.
    #[must_use]
    pub fn distance_sq(self, other: Self) -> f64 {
        let dlat = self.latitude - other.latitude;
        let dlng = self.longitude - other.longitude;
        dlat.mul_add(dlat, dlng * dlng)
    }
}

/// A closed jurisdiction polygon (first vertex repeated as the last).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JurisdictionPolygon {
    ring: Vec<LatLng>,
}

impl JurisdictionPolygon {
    /// Builds a polygon from distinct vertices, closing the ring by
    /// appending the first vertex if the input is not already closed.
    ///
    /// # Errors
    ///
    /// Returns [`GeofenceError::TooFewPoints`] if fewer than
    /// [`MIN_POLYGON_POINTS`] distinct vertices remain.
    pub fn from_vertices(vertices: &[LatLng]) -> Result<Self, GeofenceError> {
        let mut distinct: Vec<LatLng> = vertices.to_vec();
        if distinct.len() > 1 && distinct.first() == distinct.last() {
            distinct.pop();
        }
        if distinct.len() < MIN_POLYGON_POINTS {
            return Err(GeofenceError::TooFewPoints {
                minimum: MIN_POLYGON_POINTS,
                actual: distinct.len(),
            });
        }
        let mut ring = distinct;
        ring.push(ring[0]);
        Ok(Self { ring })
    }

    /// The closed ring, first vertex repeated as the last.
    #[must_use]
    pub fn ring(&self) -> &[LatLng] {
        &self.ring
    }

    /// Vertex-average centroid over the closed ring.
    ///
    /// The closing vertex is included in the average on purpose — the data
    /// entry tooling always computed it this way, and stored locations must
    /// stay stable across round-trips.
    #[must_use]
    pub fn centroid(&self) -> LatLng {
        #[allow(clippy::cast_precision_loss)]
        let n = self.ring.len() as f64;
        let lat = self.ring.iter().map(|p| p.latitude).sum::<f64>() / n;
        let lng = self.ring.iter().map(|p| p.longitude).sum::<f64>() / n;
        LatLng {
            latitude: lat,
            longitude: lng,
        }
    }

    /// Point-in-polygon test.
    #[must_use]
    pub fn contains(&self, point: LatLng) -> bool {
        self.to_geo().contains(&geo::Point::new(
            point.longitude,
            point.latitude,
        ))
    }

    /// GeoJSON `Polygon` geometry, positions in `[lng, lat]` order.
    #[must_use]
    pub fn to_geojson(&self) -> geojson::Geometry {
        let exterior: Vec<Vec<f64>> = self.ring.iter().map(|p| p.to_position().to_vec()).collect();
        geojson::Geometry::new(geojson::Value::Polygon(vec![exterior]))
    }

    /// Parses a GeoJSON `Polygon` geometry (exterior ring only).
    ///
    /// # Errors
    ///
    /// Returns [`GeofenceError::Import`] if the geometry is not a polygon or
    /// contains invalid positions.
    pub fn from_geojson(geometry: &geojson::Geometry) -> Result<Self, GeofenceError> {
        let geojson::Value::Polygon(rings) = &geometry.value else {
            return Err(GeofenceError::Import {
                message: format!("expected Polygon geometry, got {}", geometry.value.type_name()),
            });
        };
        let exterior = rings.first().ok_or_else(|| GeofenceError::Import {
            message: "Polygon has no exterior ring".to_string(),
        })?;
        let vertices = exterior
            .iter()
            .map(|pos| position_to_latlng(pos))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_vertices(&vertices)
    }

    fn to_geo(&self) -> geo::Polygon<f64> {
        let coords: Vec<(f64, f64)> = self
            .ring
            .iter()
            .map(|p| (p.longitude, p.latitude))
            .collect();
        geo::Polygon::new(geo::LineString::from(coords), vec![])
    }
}

/// An agency's catchment: a point location and/or a jurisdiction polygon.
///
/// Agencies registered through the public flow only have a point; agencies
/// configured by an administrator may carry a polygon, in which case the
/// point is the polygon centroid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catchment {
    /// Point location, if known.
    pub location: Option<LatLng>,
    /// Jurisdiction polygon, if configured.
    pub jurisdiction: Option<JurisdictionPolygon>,
}

impl Catchment {
    /// Catchment consisting of a single point.
    #[must_use]
    pub const fn from_point(point: LatLng) -> Self {
        Self {
            location: Some(point),
            jurisdiction: None,
        }
    }

    /// Catchment from a jurisdiction polygon; the point location becomes the
    /// polygon centroid, matching what the data entry tooling submits.
    #[must_use]
    pub fn from_polygon(polygon: JurisdictionPolygon) -> Self {
        let centroid = polygon.centroid();
        Self {
            location: Some(centroid),
            jurisdiction: Some(polygon),
        }
    }

    /// Returns `true` if the jurisdiction polygon contains `point`.
    /// Point-only catchments contain nothing.
    #[must_use]
    pub fn contains(&self, point: LatLng) -> bool {
        self.jurisdiction
            .as_ref()
            .is_some_and(|poly| poly.contains(point))
    }

    /// The representative point: the location, or the polygon centroid.
    #[must_use]
    pub fn anchor(&self) -> Option<LatLng> {
        self.location
            .or_else(|| self.jurisdiction.as_ref().map(JurisdictionPolygon::centroid))
    }
}

pub(crate) fn position_to_latlng(position: &[f64]) -> Result<LatLng, GeofenceError> {
    if position.len() < 2 {
        return Err(GeofenceError::Import {
            message: format!("position has {} components, expected 2", position.len()),
        });
    }
    LatLng::from_position([position[0], position[1]])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(lat: f64, lng: f64) -> LatLng {
        LatLng::new(lat, lng).unwrap()
    }

    #[test]
    fn rejects_non_finite_coordinates() {
        assert!(LatLng::new(f64::NAN, 85.82).is_err());
        assert!(LatLng::new(20.29, f64::INFINITY).is_err());
        assert!(LatLng::new(91.0, 0.0).is_err());
        assert!(LatLng::new(0.0, 181.0).is_err());
    }

    #[test]
    fn position_order_is_lng_lat() {
        let point = p(20.2961, 85.8245);
        assert_eq!(point.to_position(), [85.8245, 20.2961]);
        assert_eq!(LatLng::from_position([85.8245, 20.2961]).unwrap(), point);
    }

    #[test]
    fn ring_auto_closes() {
        let polygon =
            JurisdictionPolygon::from_vertices(&[p(20.27, 85.83), p(20.28, 85.83), p(20.28, 85.84)])
                .unwrap();
        let ring = polygon.ring();
        assert_eq!(ring.len(), 4);
        assert_eq!(ring.first(), ring.last());
    }

    #[test]
    fn already_closed_ring_is_not_double_closed() {
        let polygon = JurisdictionPolygon::from_vertices(&[
            p(20.27, 85.83),
            p(20.28, 85.83),
            p(20.28, 85.84),
            p(20.27, 85.83),
        ])
        .unwrap();
        assert_eq!(polygon.ring().len(), 4);
    }

    #[test]
    fn fewer_than_three_points_is_rejected() {
        let err = JurisdictionPolygon::from_vertices(&[p(20.27, 85.83), p(20.28, 85.83)])
            .unwrap_err();
        assert!(matches!(
            err,
            GeofenceError::TooFewPoints {
                minimum: 3,
                actual: 2
            }
        ));
    }

    #[test]
    fn containment() {
        let polygon = JurisdictionPolygon::from_vertices(&[
            p(20.27, 85.83),
            p(20.28, 85.83),
            p(20.28, 85.84),
            p(20.27, 85.84),
        ])
        .unwrap();
        assert!(polygon.contains(p(20.275, 85.835)));
        assert!(!polygon.contains(p(20.30, 85.85)));

        let catchment = Catchment::from_polygon(polygon);
        assert!(catchment.contains(p(20.275, 85.835)));
        assert!(!Catchment::from_point(p(20.275, 85.835)).contains(p(20.275, 85.835)));
    }

    #[test]
    fn polygon_catchment_location_is_centroid() {
        let polygon = JurisdictionPolygon::from_vertices(&[
            p(20.27, 85.83),
            p(20.28, 85.83),
            p(20.28, 85.84),
            p(20.27, 85.84),
        ])
        .unwrap();
        let centroid = polygon.centroid();
        let catchment = Catchment::from_polygon(polygon);
        assert_eq!(catchment.location, Some(centroid));
    }

    #[test]
    fn geojson_round_trip() {
        let polygon = JurisdictionPolygon::from_vertices(&[
            p(20.27, 85.83),
            p(20.28, 85.83),
            p(20.28, 85.84),
        ])
        .unwrap();
        let geometry = polygon.to_geojson();
        let parsed = JurisdictionPolygon::from_geojson(&geometry).unwrap();
        assert_eq!(parsed, polygon);
    }
}
