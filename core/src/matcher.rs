use std::fmt;
use std::sync::Arc;

use itertools::Itertools;
use serde_json::Value;
use tracing::debug;

use crate::error::Error;
use crate::geometry::{exterior_ring, intersects};
use crate::store::{GeometryStore, ZipRecord};

/// Turns a user-drawn polygon into the list of reference zip codes it
/// intersects, and resolves manually typed zip codes.
///
/// The matcher owns no state beyond a handle to its [`GeometryStore`]; it
/// never mutates a caller's selection set. Merging results into an existing
/// selection (and deduplicating against it) is the caller's job.
pub struct ZipMatcher {
    store: Arc<GeometryStore>,
}

impl ZipMatcher {
    pub fn new(store: Arc<GeometryStore>) -> Self {
        Self { store }
    }

    /// Finds all reference zip codes whose polygon intersects the drawn
    /// one, in the dataset's original order.
    ///
    /// `drawn` is a GeoJSON Feature or bare geometry. If it yields no
    /// usable exterior ring the result is empty, as it is when nothing
    /// intersects; neither case is an error. Candidates whose geometry
    /// yields no ring are skipped. The result never contains the same
    /// zip code twice, and every record has `found == true`.
    pub async fn find_intersecting(&self, drawn: &Value) -> Result<Vec<ZipRecord>, Error> {
        let Some(drawn_ring) = exterior_ring(drawn) else {
            debug!("drawn polygon yields no exterior ring");
            return Ok(Vec::new());
        };

        let dataset = self.store.load().await?;

        let matches: Vec<ZipRecord> = dataset
            .entries()
            .iter()
            .filter(|entry| {
                entry
                    .geometry
                    .as_ref()
                    .and_then(exterior_ring)
                    .is_some_and(|candidate| intersects(&drawn_ring, &candidate))
            })
            .unique_by(|entry| entry.zip_code.clone())
            .map(|entry| ZipRecord::hit(entry.zip_code.clone(), entry.geometry.clone()))
            .collect();

        debug!(
            candidates = dataset.len(),
            matches = matches.len(),
            "polygon match complete"
        );
        Ok(matches)
    }

    /// Resolves a manually entered zip code against the reference dataset.
    /// No intersection test is involved; a missing code comes back as a
    /// `found == false` record.
    pub async fn lookup_by_code(&self, zip: impl fmt::Display) -> Result<ZipRecord, Error> {
        self.store.lookup(zip).await
    }
}
