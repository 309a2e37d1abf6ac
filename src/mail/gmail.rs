use log::debug;
use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;

use crate::domain::{ContinuationToken, ListPage, Message};
use crate::error::ProviderError;
use crate::mail::provider::MailProvider;

pub const DEFAULT_API_BASE: &str = "https://gmail.googleapis.com/gmail/v1";

/// Blocking client for the Gmail REST API, authenticated with a bearer token.
pub struct GmailClient {
    http: Client,
    base_url: String,
    user: String,
    access_token: String,
}

impl GmailClient {
    pub fn new(base_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user: "me".to_string(),
            access_token: access_token.into(),
        }
    }

    fn messages_url(&self) -> String {
        format!("{}/users/{}/messages", self.base_url, self.user)
    }

    fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T, ProviderError> {
        let status = resp.status();
        let body = resp.text()?;
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_str(&body).map_err(ProviderError::Malformed)
    }
}

impl MailProvider for GmailClient {
    fn list(
        &self,
        query: &str,
        page_size: u32,
        token: &ContinuationToken,
    ) -> Result<ListPage, ProviderError> {
        let mut params = vec![
            ("q", query.to_string()),
            ("maxResults", page_size.to_string()),
        ];
        if !token.is_empty() {
            params.push(("pageToken", token.as_str().to_string()));
        }

        let resp = self
            .http
            .get(self.messages_url())
            .bearer_auth(&self.access_token)
            .query(&params)
            .send()?;
        let page: ListPage = Self::read_json(resp)?;
        debug!(
            "page token {:?} -> next page token {:?}",
            token.as_str(),
            page.next_page_token
        );
        Ok(page)
    }

    fn get(&self, id: &str) -> Result<Message, ProviderError> {
        let resp = self
            .http
            .get(format!("{}/{}", self.messages_url(), id))
            .bearer_auth(&self.access_token)
            .query(&[("format", "full")])
            .send()?;
        Self::read_json(resp)
    }
}
