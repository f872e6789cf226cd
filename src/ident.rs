//! Identifier Normalizer.
//!
//! Arte page URLs look like
//! `http://www.arte.tv/guide/fr/055969-002-A/tracks?autoplay=1`: the program
//! identifier is the path segment before the trailing slug. The metadata
//! endpoint wants only the first two hyphen-delimited segments of it
//! (`055969-002-A` → `055969-002`).

use crate::error::{Error, Result};

/// Extract the program identifier from a page URL.
///
/// Strips the query string and any trailing slash, then returns the path
/// segment immediately preceding the final one. Fails with
/// [`Error::MalformedUrl`] when fewer than two path segments remain.
pub fn id_from_url(url: &str) -> Result<String> {
    let stripped = url.split('?').next().unwrap_or(url);
    let stripped = stripped.trim_end_matches('/');

    // Drop scheme + host; relative URLs keep an empty leading segment
    // that stands in for the host.
    let path = match stripped.find("://") {
        Some(idx) => &stripped[idx + 3..],
        None => stripped,
    };

    let segments: Vec<&str> = path.split('/').collect();
    // segments[0] is the host
    if segments.len() < 3 {
        return Err(Error::MalformedUrl(url.to_string()));
    }

    Ok(segments[segments.len() - 2].to_string())
}

/// Derive the short identifier the metadata endpoint expects: the first two
/// hyphen-delimited tokens. Identifiers with fewer than two tokens pass
/// through unchanged.
pub fn short_id(id: &str) -> String {
    let mut tokens = id.splitn(3, '-');
    match (tokens.next(), tokens.next()) {
        (Some(first), Some(second)) => format!("{first}-{second}"),
        _ => id.to_string(),
    }
}
