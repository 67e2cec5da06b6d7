//! Module fetching: one blocking GET per call, no retries.
//!
//! [`Fetch`] is the seam the module table depends on; [`CurlFetcher`] is the
//! libcurl-backed implementation used by the CLI.

mod curl_fetcher;

pub use curl_fetcher::CurlFetcher;

use crate::error::FetchError;

/// Retrieves the full text of a module URL.
///
/// Implementations must be callable from several worker threads at once.
pub trait Fetch: Send + Sync {
    fn fetch(&self, url: &str) -> Result<String, FetchError>;
}
