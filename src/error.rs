//! Error types shared across the crate.
//!
//! Each stage of the pipeline has its own error so the orchestrator can tell
//! fatal failures (configuration, authorization, listing) from per-message ones
//! (fetching or decoding a single message).

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::{ContinuationToken, MessageId};

/// Loading or validating configuration failed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {message}")]
    Invalid { message: String },
}

/// Obtaining or persisting OAuth credentials failed.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("unable to read client secret file {path}")]
    ClientSecretRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to parse client secret file {path}")]
    ClientSecretParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("client secret file {path} has neither an \"installed\" nor a \"web\" section")]
    ClientSecretMissingSection { path: PathBuf },

    #[error("invalid OAuth endpoint url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("unable to read authorization code: {message}")]
    CodeUnavailable { message: String },

    #[error("token exchange failed: {message}")]
    Exchange { message: String },

    #[error("unable to cache oauth token at {path}")]
    TokenWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to encode oauth token")]
    TokenEncode(#[source] serde_json::Error),
}

/// A call to the mail provider failed.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed")]
    Transport(#[from] reqwest::Error),

    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed provider response")]
    Malformed(#[source] serde_json::Error),
}

/// Body data of a message part was not valid base64url.
#[derive(Debug, Error)]
#[error("unable to decode message body")]
pub struct DecodeError(#[from] pub base64::DecodeError);

/// A list call failed; carries the cursor that was being fetched so a caller
/// can resume from the same page.
#[derive(Debug, Error)]
#[error("unable to retrieve messages (page {page})")]
pub struct PageFetchError {
    pub page: usize,
    pub token: ContinuationToken,
    #[source]
    pub source: ProviderError,
}

/// A single message could not be processed.
#[derive(Debug, Error)]
pub enum MessageError {
    #[error("unable to fetch message {id}")]
    Fetch {
        id: MessageId,
        #[source]
        source: ProviderError,
    },

    #[error("unable to decode message {id}")]
    Decode {
        id: MessageId,
        #[source]
        source: DecodeError,
    },
}

/// The run had to stop before every page was processed.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Page(#[from] PageFetchError),

    #[error("unable to write output")]
    Output(#[from] std::io::Error),

    #[error("unable to encode output record")]
    Encode(#[from] serde_json::Error),
}
