use serde::Deserialize;

pub type MessageId = String;

/// One entry of a `messages.list` page. Only the id is needed to fetch the full message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSummary {
    pub id: MessageId,
    #[serde(default)]
    pub thread_id: String,
}

impl MessageSummary {
    pub fn new(id: impl Into<MessageId>) -> Self {
        Self {
            id: id.into(),
            thread_id: String::new(),
        }
    }
}

/// Opaque cursor returned by `messages.list`. Empty means there are no further pages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContinuationToken(String);

impl ContinuationToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A single page of search results plus the cursor for the next one.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPage {
    #[serde(default)]
    pub messages: Vec<MessageSummary>,
    #[serde(default)]
    pub next_page_token: Option<String>,
    #[serde(default)]
    pub result_size_estimate: u32,
}

impl ListPage {
    pub fn next_token(&self) -> ContinuationToken {
        ContinuationToken::new(self.next_page_token.clone().unwrap_or_default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MessageHeader {
    pub name: String,
    pub value: String,
}

impl MessageHeader {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePartBody {
    #[serde(default)]
    pub attachment_id: Option<String>,
    #[serde(default)]
    pub size: u64,
    /// base64url encoded
    #[serde(default)]
    pub data: Option<String>,
}

/// A message payload as returned with `format=full`. Sub-parts share the same shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePayload {
    #[serde(default)]
    pub part_id: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub headers: Vec<MessageHeader>,
    #[serde(default)]
    pub body: Option<MessagePartBody>,
    #[serde(default)]
    pub parts: Vec<MessagePayload>,
}

impl MessagePayload {
    /// Single-part payload carrying its own (already encoded) body data.
    pub fn single(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            body: Some(MessagePartBody {
                data: Some(data.into()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    pub fn body_data(&self) -> Option<&str> {
        self.body.as_ref().and_then(|b| b.data.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    #[serde(default)]
    pub thread_id: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub payload: MessagePayload,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_page_without_token_is_last() {
        let page: ListPage = serde_json::from_str(
            r#"{"messages":[{"id":"a","threadId":"t"}],"resultSizeEstimate":1}"#,
        )
        .unwrap();
        assert_eq!(page.messages, vec![MessageSummary {
            id: "a".into(),
            thread_id: "t".into()
        }]);
        assert!(page.next_token().is_empty());
    }

    #[test]
    fn empty_result_has_no_messages_field() {
        let page: ListPage = serde_json::from_str(r#"{"resultSizeEstimate":0}"#).unwrap();
        assert!(page.messages.is_empty());
    }

    #[test]
    fn full_message_parses_nested_parts() {
        let json = r#"{
            "id": "m1",
            "threadId": "t1",
            "payload": {
                "partId": "",
                "mimeType": "multipart/alternative",
                "headers": [{"name": "Subject", "value": "Hi"}],
                "body": {"size": 0},
                "parts": [
                    {"partId": "0", "mimeType": "text/plain", "body": {"size": 2, "data": "aGk="}},
                    {"partId": "1", "mimeType": "text/html", "body": {"size": 2, "data": "aGk="}}
                ]
            }
        }"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert_eq!(msg.payload.parts.len(), 2);
        assert_eq!(msg.payload.parts[1].mime_type, "text/html");
        assert_eq!(msg.payload.parts[1].body_data(), Some("aGk="));
        assert_eq!(msg.payload.body_data(), None);
    }
}
