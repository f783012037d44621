use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

mod intersection;
mod point_in_polygon;

pub use intersection::intersects;
pub use point_in_polygon::contains;

/// A geographic point. GeoJSON positions are `[lng, lat]` arrays, so `lng`
/// is the x axis and `lat` the y axis.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct GeoPoint {
    pub lng: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Returns the coordinates of the `GeoPoint` as a `(lng, lat)` tuple.
    pub fn as_tuple(&self) -> (f64, f64) {
        (self.lng, self.lat)
    }
}

impl From<(f64, f64)> for GeoPoint {
    fn from((lng, lat): (f64, f64)) -> Self {
        Self::new(lng, lat)
    }
}

/// An ordered list of coordinates describing a closed outline. The first and
/// last point need not be identical; the algorithms tolerate either form.
pub type Ring = Vec<GeoPoint>;

/// Extracts the exterior ring from a GeoJSON geometry value.
///
/// `Polygon` yields its first (exterior) ring; `MultiPolygon` yields the
/// first member's exterior ring. Holes and secondary members are ignored.
/// The value may be a bare geometry object or a Feature wrapping one.
///
/// Coordinate entries that are not `[number, number]` pairs are skipped with
/// a warning. Returns `None` for absent, unsupported, or malformed geometry,
/// and for anything that yields fewer than 3 usable vertices.
pub fn exterior_ring(value: &Value) -> Option<Ring> {
    let geometry = value.get("geometry").unwrap_or(value);

    let coordinates = geometry.get("coordinates")?;
    let raw_ring = match geometry.get("type").and_then(Value::as_str) {
        Some("Polygon") => coordinates.get(0)?,
        Some("MultiPolygon") => coordinates.get(0)?.get(0)?,
        other => {
            warn!(geometry_type = ?other, "unsupported geometry type, skipping");
            return None;
        }
    };

    let mut ring = Ring::new();
    for position in raw_ring.as_array()? {
        match parse_position(position) {
            Some(point) => ring.push(point),
            None => warn!(?position, "non-numeric coordinate entry, skipping"),
        }
    }

    if ring.len() < 3 {
        return None;
    }
    Some(ring)
}

fn parse_position(position: &Value) -> Option<GeoPoint> {
    let entries = position.as_array()?;
    let lng = entries.first()?.as_f64()?;
    let lat = entries.get(1)?.as_f64()?;
    Some(GeoPoint::new(lng, lat))
}
