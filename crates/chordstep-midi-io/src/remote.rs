//! Remote sequence retrieval over HTTP.
//!
//! Fetches are blocking; callers that must stay responsive run them on a
//! worker thread. No timeout is applied.

use crate::error::{Error, Result};
use std::io::Read;
use tracing::debug;

/// GET `url` and return the response body.
pub fn fetch(url: &str) -> Result<Vec<u8>> {
    debug!("Fetching {}", url);
    let response = ureq::get(url).call()?;

    let mut body = Vec::new();
    response
        .into_reader()
        .read_to_end(&mut body)
        .map_err(|e| Error::Fetch(format!("reading body of {}: {}", url, e)))?;

    debug!("Fetched {} bytes from {}", body.len(), url);
    Ok(body)
}
