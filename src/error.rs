use thiserror::Error;

use crate::http::FetchError;

#[derive(Debug, Error)]
pub enum Error {
    /// No program identifier could be extracted from a page URL.
    #[error("malformed program URL: {0}")]
    MalformedUrl(String),

    /// A single program could not be resolved: the upstream document is
    /// missing, incomplete, flagged as unavailable, or has no usable
    /// streams. Always fatal for that one program, never for a search.
    #[error("could not resolve program: {0}")]
    Resolution(String),

    /// Requested short name is not in the known-program table.
    #[error("unknown program name: {0}")]
    UnknownProgram(String),

    /// The resolved record has no stream for the requested pair.
    /// There is no fallback to another quality or language.
    #[error("no {quality} variant for language {lang}")]
    VariantNotFound { lang: String, quality: String },

    #[error(transparent)]
    Transport(#[from] FetchError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Process exit code the CLI maps this error to. Malformed requests
    /// (bad URL, unknown name, missing variant) are distinguished from
    /// transport and internal failures; "nothing found" is not an error
    /// and is handled by the caller.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::MalformedUrl(_) | Error::UnknownProgram(_) | Error::VariantNotFound { .. } => 2,
            _ => 1,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
