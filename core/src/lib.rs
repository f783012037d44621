//! Polygon intersection and spatial lookup over a zip-code reference
//! dataset.
//!
//! This crate is the algorithmic core of a map-based area search: the
//! surrounding application lets a user draw a boundary or type zip codes,
//! and asks this crate which zip-code polygons from a remote GeoJSON
//! reference dataset match, plus a bounding box to frame the map view.
//!
//! The three entry points the application calls:
//!
//! - [`ZipMatcher::find_intersecting`]: drawn polygon to matching
//!   [`ZipRecord`]s, in dataset order.
//! - [`ZipMatcher::lookup_by_code`]: manual zip entry to a single record.
//! - [`bounding_box_of`]: fit-to-view box over any set of geometries.
//!
//! Intersection uses vertex sampling on top of ray-casting containment,
//! matching the selection behavior the application was built against; see
//! [`geometry::intersects`] for the limitation this implies.

pub mod bounds;
pub mod error;
pub mod geometry;
pub mod matcher;
pub mod store;

pub use bounds::{bounding_box_of, BoundingBox, BoundingBoxBuilder};
pub use error::{Error, SourceError};
pub use geometry::{contains, exterior_ring, intersects, GeoPoint, Ring};
pub use matcher::ZipMatcher;
pub use store::{
    Dataset, DatasetEntry, DatasetFetcher, FetchError, GeometryStore, HttpFetcher, ZipCode,
    ZipRecord, DEFAULT_DATASET_URL,
};
