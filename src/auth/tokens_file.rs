use chrono::{DateTime, Datelike, Duration, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::AuthError;

/// Tokens are treated as expired this long before their actual expiry.
const EXPIRY_SLACK_SECS: i64 = 10;

/// OAuth token as cached on disk. The field names follow the common
/// `token.json` layout so files written by other Google quickstart tools load too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl StoredToken {
    /// A zero-year expiry (as written for tokens without one) counts as "never".
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expiry {
            Some(exp) if exp.year() > 1 => now + Duration::seconds(EXPIRY_SLACK_SECS) >= exp,
            _ => false,
        }
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref().filter(|t| !t.is_empty())
    }
}

/// Cached token at `path`; `None` when the file is absent or unreadable.
pub fn load_token(path: &Path) -> Option<StoredToken> {
    let s = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            debug!("no cached token at {}: {e}", path.display());
            return None;
        }
    };
    match serde_json::from_str(&s) {
        Ok(t) => Some(t),
        Err(e) => {
            debug!("ignoring invalid token file {}: {e}", path.display());
            None
        }
    }
}

/// Writes the token, replacing any previous file. Owner read/write only on Unix.
pub fn save_token(path: &Path, token: &StoredToken) -> Result<(), AuthError> {
    info!("Saving credential file to: {}", path.display());
    let json = serde_json::to_string_pretty(token).map_err(AuthError::TokenEncode)?;

    let write_err = |source| AuthError::TokenWrite {
        path: path.to_path_buf(),
        source,
    };

    let mut opts = fs::OpenOptions::new();
    opts.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(0o600);
    }
    let mut f = opts.open(path).map_err(write_err)?;
    f.write_all(json.as_bytes()).map_err(write_err)?;
    Ok(())
}
