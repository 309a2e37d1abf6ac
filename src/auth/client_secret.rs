use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::AuthError;

const GOOGLE_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// The OAuth client registration from a Google `credentials.json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientSecret {
    pub client_id: String,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

fn default_auth_uri() -> String {
    GOOGLE_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_string()
}

#[derive(Deserialize)]
struct ClientSecretFile {
    installed: Option<ClientSecret>,
    web: Option<ClientSecret>,
}

impl ClientSecret {
    pub fn load(path: &Path) -> Result<Self, AuthError> {
        let s = fs::read_to_string(path).map_err(|source| AuthError::ClientSecretRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&s, path)
    }

    pub fn parse(json: &str, path: &Path) -> Result<Self, AuthError> {
        let file: ClientSecretFile =
            serde_json::from_str(json).map_err(|source| AuthError::ClientSecretParse {
                path: path.to_path_buf(),
                source,
            })?;
        file.installed
            .or(file.web)
            .ok_or_else(|| AuthError::ClientSecretMissingSection {
                path: path.to_path_buf(),
            })
    }

    /// Redirect used by the copy-the-code console flow.
    pub fn console_redirect_uri(&self) -> &str {
        self.redirect_uris
            .first()
            .map(String::as_str)
            .unwrap_or("http://localhost")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn installed_app_secret() {
        let json = r#"{"installed":{
            "client_id":"abc.apps.googleusercontent.com",
            "project_id":"recipes",
            "auth_uri":"https://accounts.google.com/o/oauth2/auth",
            "token_uri":"https://oauth2.googleapis.com/token",
            "client_secret":"s3cret",
            "redirect_uris":["http://localhost"]
        }}"#;
        let cs = ClientSecret::parse(json, Path::new("credentials.json")).unwrap();
        assert_eq!(cs.client_id, "abc.apps.googleusercontent.com");
        assert_eq!(cs.client_secret.as_deref(), Some("s3cret"));
        assert_eq!(cs.console_redirect_uri(), "http://localhost");
    }

    #[test]
    fn web_secret_with_defaults() {
        let json = r#"{"web":{"client_id":"id"}}"#;
        let cs = ClientSecret::parse(json, Path::new("c.json")).unwrap();
        assert_eq!(cs.token_uri, GOOGLE_TOKEN_URI);
        assert_eq!(cs.auth_uri, GOOGLE_AUTH_URI);
        assert!(cs.client_secret.is_none());
    }

    #[test]
    fn unknown_layout_is_rejected() {
        let err = ClientSecret::parse(r#"{"other":{}}"#, Path::new("c.json")).unwrap_err();
        assert!(matches!(err, AuthError::ClientSecretMissingSection { .. }));

        let err = ClientSecret::parse("not json", Path::new("c.json")).unwrap_err();
        assert!(matches!(err, AuthError::ClientSecretParse { .. }));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let path = std::env::temp_dir().join("label-links-missing-credentials.json");
        let err = ClientSecret::load(&path).unwrap_err();
        assert!(matches!(err, AuthError::ClientSecretRead { .. }));
    }
}
