use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::geometry::{exterior_ring, GeoPoint};

/// An axis-aligned bounding box over geographic coordinates, used by the
/// application to fit the map view to one or more geometries.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min_lng: f64,
    pub min_lat: f64,
    pub max_lng: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Creates a bounding box from a single point. The box has zero area.
    pub fn from_point(point: GeoPoint) -> Self {
        Self {
            min_lng: point.lng,
            min_lat: point.lat,
            max_lng: point.lng,
            max_lat: point.lat,
        }
    }

    /// Extends the box so it covers the given point.
    pub fn extend_point(&mut self, point: GeoPoint) {
        self.min_lng = self.min_lng.min(point.lng);
        self.min_lat = self.min_lat.min(point.lat);
        self.max_lng = self.max_lng.max(point.lng);
        self.max_lat = self.max_lat.max(point.lat);
    }

    /// Returns `(min_lng, min_lat, max_lng, max_lat)`.
    pub fn as_tuple(&self) -> (f64, f64, f64, f64) {
        (self.min_lng, self.min_lat, self.max_lng, self.max_lat)
    }
}

/// Accumulates coordinates into a [`BoundingBox`].
///
/// The builder starts uninitialized and yields `None` if no point was ever
/// added, so callers never see a box built from infinity sentinels.
#[derive(Debug, Default, Clone, Copy)]
pub struct BoundingBoxBuilder {
    inner: Option<BoundingBox>,
}

impl BoundingBoxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_point(&mut self, point: GeoPoint) {
        match self.inner.as_mut() {
            Some(bbox) => bbox.extend_point(point),
            None => self.inner = Some(BoundingBox::from_point(point)),
        }
    }

    pub fn build(self) -> Option<BoundingBox> {
        self.inner
    }
}

/// Computes the bounding box over the exterior rings of the given GeoJSON
/// geometries.
///
/// Geometries that are absent, malformed, or of an unsupported type are
/// skipped with a warning rather than failing the batch. Returns `None`
/// when no valid coordinate was found at all.
pub fn bounding_box_of<'a, I>(geometries: I) -> Option<BoundingBox>
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut builder = BoundingBoxBuilder::new();

    for geometry in geometries {
        let Some(ring) = exterior_ring(geometry) else {
            warn!("geometry yields no exterior ring, skipping in bounds scan");
            continue;
        };
        for point in ring {
            builder.add_point(point);
        }
    }

    builder.build()
}
