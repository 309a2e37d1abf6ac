use chrono::Utc;
use log::{info, warn};
use std::path::PathBuf;

use crate::auth::code_source::AuthorizationCodeSource;
use crate::auth::oauth::OAuthFlow;
use crate::auth::tokens_file::{self, StoredToken};
use crate::error::AuthError;

/// Hands out a usable access token, from the cache file, a refresh, or the
/// interactive flow, in that order. New tokens are written back to the cache.
pub struct TokenManager {
    flow: OAuthFlow,
    token_path: PathBuf,
}

impl TokenManager {
    pub fn new(flow: OAuthFlow, token_path: impl Into<PathBuf>) -> Self {
        Self {
            flow,
            token_path: token_path.into(),
        }
    }

    pub fn access_token(
        &self,
        code_source: &mut dyn AuthorizationCodeSource,
    ) -> Result<String, AuthError> {
        let cached = tokens_file::load_token(&self.token_path);

        if let Some(tok) = &cached {
            if !tok.is_expired(Utc::now()) {
                info!("Using cached access token from {}", self.token_path.display());
                return Ok(tok.access_token.clone());
            }

            if let Some(rt) = tok.refresh_token() {
                info!("Cached token expired; refreshing");
                match self.flow.refresh(rt) {
                    Ok(fresh) => return self.store(fresh),
                    Err(e) => warn!("Refresh failed: {e}, falling back to interactive auth"),
                }
            }
        }

        info!("No usable cached token; running interactive authorization");
        let pending = self.flow.begin(code_source.redirect_uri())?;
        let code = code_source.obtain_code(&pending.url, &pending.csrf)?;
        let fresh = pending.exchange(code)?;
        self.store(fresh)
    }

    fn store(&self, token: StoredToken) -> Result<String, AuthError> {
        tokens_file::save_token(&self.token_path, &token)?;
        Ok(token.access_token)
    }
}
