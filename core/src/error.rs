use thiserror::Error;

/// Errors surfaced by the zipmatch core.
///
/// A zip code that is simply absent from the reference dataset is *not* an
/// error; it is reported as a [`ZipRecord`](crate::store::ZipRecord) with
/// `found == false`.
#[derive(Debug, Error)]
pub enum Error {
    /// The reference dataset could not be fetched or parsed. The failure is
    /// not cached; a later call may retry and succeed.
    #[error("reference dataset unavailable")]
    SourceUnavailable(#[from] SourceError),
}

/// The underlying cause of a [`Error::SourceUnavailable`].
#[derive(Debug, Error)]
pub enum SourceError {
    /// The HTTP request for the dataset failed.
    #[error("request to {url} failed: {message}")]
    Fetch { url: String, message: String },

    /// The dataset document was not a valid FeatureCollection.
    #[error("malformed dataset document")]
    Parse(#[from] serde_json::Error),
}
