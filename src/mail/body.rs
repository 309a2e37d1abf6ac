use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

use crate::domain::MessagePayload;
use crate::error::DecodeError;

/// URL-safe alphabet; Gmail sends body data without padding, older exports keep it.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

pub fn decode_base64url(data: &str) -> Result<String, DecodeError> {
    let bytes = URL_SAFE_LENIENT.decode(data)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Decoded body text of a message.
///
/// Multipart payloads only look at their direct children: the content comes
/// from the last `text/html` part, and stays empty if there is none (a
/// plain-text-only message yields nothing). Single-part payloads decode their
/// own body data.
pub fn decode_body(payload: &MessagePayload) -> Result<String, DecodeError> {
    if payload.parts.is_empty() {
        return decode_base64url(payload.body_data().unwrap_or_default());
    }

    match payload
        .parts
        .iter()
        .rev()
        .find(|part| part.mime_type == "text/html")
    {
        Some(html) => decode_base64url(html.body_data().unwrap_or_default()),
        None => Ok(String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    fn enc(s: &str) -> String {
        URL_SAFE_NO_PAD.encode(s)
    }

    fn multipart(parts: Vec<MessagePayload>) -> MessagePayload {
        MessagePayload {
            mime_type: "multipart/alternative".into(),
            parts,
            ..Default::default()
        }
    }

    #[test]
    fn single_part_is_decoded() {
        let p = MessagePayload::single("text/plain", enc("See http://example.com/pasta"));
        assert_eq!(decode_body(&p).unwrap(), "See http://example.com/pasta");
    }

    #[test]
    fn padded_and_unpadded_both_decode() {
        assert_eq!(decode_base64url("aGk=").unwrap(), "hi");
        assert_eq!(decode_base64url("aGk").unwrap(), "hi");
    }

    #[test]
    fn url_safe_alphabet() {
        // 0xfb 0xff encodes to "-_8" in the URL-safe alphabet
        let p = MessagePayload::single("text/plain", "-_8");
        let text = decode_body(&p).unwrap();
        assert_eq!(text, String::from_utf8_lossy(&[0xfb, 0xff]));
    }

    #[test]
    fn missing_body_is_empty() {
        assert_eq!(decode_body(&MessagePayload::default()).unwrap(), "");
    }

    #[test]
    fn html_part_is_chosen_regardless_of_order() {
        let plain = MessagePayload::single("text/plain", enc("plain"));
        let html = MessagePayload::single("text/html", enc("<b>html</b>"));

        let a = multipart(vec![plain.clone(), html.clone()]);
        let b = multipart(vec![html, plain]);
        assert_eq!(decode_body(&a).unwrap(), "<b>html</b>");
        assert_eq!(decode_body(&b).unwrap(), "<b>html</b>");
    }

    #[test]
    fn last_html_part_wins() {
        let p = multipart(vec![
            MessagePayload::single("text/html", enc("one")),
            MessagePayload::single("text/html", enc("two")),
        ]);
        assert_eq!(decode_body(&p).unwrap(), "two");
    }

    #[test]
    fn plain_only_multipart_is_empty() {
        let p = multipart(vec![MessagePayload::single("text/plain", enc("plain"))]);
        assert_eq!(decode_body(&p).unwrap(), "");
    }

    #[test]
    fn malformed_data_is_an_error() {
        let p = MessagePayload::single("text/plain", "not*base64!");
        assert!(decode_body(&p).is_err());
    }
}
