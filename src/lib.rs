//! Resolver and downloader for Arte's "+7" catch-up service.
//!
//! Given a page URL, a known program name, or a free-text query, the crate
//! resolves one or more [`models::ProgramRecord`]s — validated, immutable
//! maps of (language, quality) → stream URL — and can download a selected
//! variant through the [`http::Save`] collaborator.

pub mod config;
pub mod error;
pub mod http;
pub mod ident;
pub mod models;
pub mod player;
pub mod resolver;
pub mod search;

#[cfg(test)]
pub(crate) mod testutil;
