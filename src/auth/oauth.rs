use chrono::{Duration, Utc};
use log::debug;
use oauth2::TokenResponse;
use oauth2::basic::{BasicClient, BasicTokenResponse};
use oauth2::reqwest::http_client;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret as OAuthClientSecret, CsrfToken,
    PkceCodeChallenge, PkceCodeVerifier, RedirectUrl, RefreshToken, Scope, TokenUrl,
};
use url::Url;

use crate::auth::client_secret::ClientSecret;
use crate::auth::tokens_file::StoredToken;
use crate::error::AuthError;

/// Read-only mailbox access. Changing it invalidates previously saved tokens.
pub const GMAIL_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/gmail.readonly";

/// OAuth client for one registered application.
#[derive(Clone)]
pub struct OAuthFlow {
    client: BasicClient,
    scope: String,
}

/// An authorization URL handed to the user, with the state needed to finish it.
pub struct PendingAuthorization {
    pub url: Url,
    pub csrf: CsrfToken,
    verifier: PkceCodeVerifier,
    client: BasicClient,
}

impl OAuthFlow {
    pub fn new(secret: &ClientSecret) -> Result<Self, AuthError> {
        let client = BasicClient::new(
            ClientId::new(secret.client_id.clone()),
            secret.client_secret.clone().map(OAuthClientSecret::new),
            AuthUrl::new(secret.auth_uri.clone())?,
            Some(TokenUrl::new(secret.token_uri.clone())?),
        );
        Ok(Self {
            client,
            scope: GMAIL_READONLY_SCOPE.to_string(),
        })
    }

    /// Authorization code + PKCE, asking for offline access so a refresh token is issued.
    pub fn begin(&self, redirect_uri: &str) -> Result<PendingAuthorization, AuthError> {
        let client = self
            .client
            .clone()
            .set_redirect_uri(RedirectUrl::new(redirect_uri.to_string())?);

        let (pkce_challenge, verifier) = PkceCodeChallenge::new_random_sha256();
        let (url, csrf) = client
            .authorize_url(CsrfToken::new_random)
            .add_scope(Scope::new(self.scope.clone()))
            .add_extra_param("access_type", "offline")
            .set_pkce_challenge(pkce_challenge)
            .url();

        Ok(PendingAuthorization {
            url,
            csrf,
            verifier,
            client,
        })
    }

    /// Exchange a refresh token for a new access token. Google does not send
    /// the refresh token again, so the one passed in is kept.
    pub fn refresh(&self, refresh_token: &str) -> Result<StoredToken, AuthError> {
        let token = self
            .client
            .exchange_refresh_token(&RefreshToken::new(refresh_token.to_string()))
            .request(http_client)
            .map_err(|e| {
                debug!("refresh failed: {e:#?}");
                AuthError::Exchange {
                    message: e.to_string(),
                }
            })?;

        Ok(keep_refresh_token(stored_token(&token), refresh_token))
    }
}

impl PendingAuthorization {
    pub fn exchange(self, code: String) -> Result<StoredToken, AuthError> {
        let token = self
            .client
            .exchange_code(AuthorizationCode::new(code))
            .set_pkce_verifier(self.verifier)
            .request(http_client)
            .map_err(|e| {
                debug!("token exchange failed: {e:#?}");
                AuthError::Exchange {
                    message: e.to_string(),
                }
            })?;
        Ok(stored_token(&token))
    }
}

/// A refresh response without a refresh token keeps using the previous one.
fn keep_refresh_token(mut fresh: StoredToken, previous: &str) -> StoredToken {
    if fresh.refresh_token().is_none() {
        fresh.refresh_token = Some(previous.to_string());
    }
    fresh
}

fn stored_token(token: &BasicTokenResponse) -> StoredToken {
    StoredToken {
        access_token: token.access_token().secret().to_string(),
        token_type: "Bearer".to_string(),
        refresh_token: token.refresh_token().map(|r| r.secret().to_string()),
        expiry: token
            .expires_in()
            .and_then(|d| Duration::from_std(d).ok())
            .map(|d| Utc::now() + d),
    }
}
