// File: crates/tradeviz-core/src/error.rs
// Summary: Error taxonomy shared by every loader (fetch, parse, data, target, render).

use thiserror::Error;

/// Why a loader could not produce its visualization.
///
/// Loaders never retry and never render partial output; the page runner logs
/// the error and moves on, so one failing chart leaves the others untouched.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The source answered with a non-success status.
    #[error("HTTP error! Status: {status} ({location})")]
    Status { location: String, status: u16 },

    #[error("failed to read {location}")]
    Io {
        location: String,
        #[source]
        source: std::io::Error,
    },

    #[error("request for {location} failed")]
    Http {
        location: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("malformed JSON in {location}")]
    Json {
        location: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed CSV in {location}")]
    Csv {
        location: String,
        #[source]
        source: csv::Error,
    },

    /// Well-formed payload that does not have the expected shape.
    #[error("unusable data in {location}: {reason}")]
    Data { location: String, reason: String },

    #[error("no render target with id `{0}`")]
    MissingTarget(String),

    #[error(transparent)]
    Render(#[from] anyhow::Error),
}

impl LoadError {
    pub fn data(location: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Data { location: location.into(), reason: reason.into() }
    }

    /// Message followed by every `source()` in the chain, `: `-separated.
    pub fn report(&self) -> String {
        let mut out = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(s) = source {
            out.push_str(": ");
            out.push_str(&s.to_string());
            source = s.source();
        }
        out
    }

    /// HTTP-like status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
