//! Search → fetch → extract → print.

use std::io::Write;

use log::{info, warn};
use serde::Serialize;

use crate::config::OutputFormat;
use crate::domain::{Message, MessageId};
use crate::error::{MessageError, PipelineError};
use crate::mail::provider::MailProvider;
use crate::mail::{body, headers, urls};
use crate::pagination::Pages;

const NOT_AVAILABLE: &str = "N/A";

/// What the pipeline pulls out of one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub id: MessageId,
    pub subject: Option<String>,
    pub from: Option<String>,
    pub urls: Vec<String>,
}

impl Extracted {
    pub fn from_message(message: &Message) -> Result<Self, MessageError> {
        let mut out = Self::headers_only(message);
        let text = body::decode_body(&message.payload).map_err(|source| MessageError::Decode {
            id: message.id.clone(),
            source,
        })?;
        out.urls = urls::extract_urls(&text);
        Ok(out)
    }

    /// Subject and sender without looking at the body.
    pub fn headers_only(message: &Message) -> Self {
        let hs = &message.payload.headers;
        Self {
            id: message.id.clone(),
            subject: headers::subject(hs).map(str::to_string),
            from: headers::from(hs).map(str::to_string),
            urls: Vec::new(),
        }
    }

    pub fn first_url(&self) -> Option<&str> {
        self.urls.first().map(String::as_str)
    }
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    id: &'a str,
    subject: &'a str,
    from: &'a str,
    url: Option<&'a str>,
    urls: &'a [String],
}

/// Totals for one run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub pages: usize,
    pub printed: usize,
    pub skipped: usize,
    pub decode_failures: usize,
}

pub struct Pipeline<'a, P: MailProvider + ?Sized, W: Write> {
    provider: &'a P,
    out: W,
    format: OutputFormat,
}

impl<'a, P: MailProvider + ?Sized, W: Write> Pipeline<'a, P, W> {
    pub fn new(provider: &'a P, out: W, format: OutputFormat) -> Self {
        Self {
            provider,
            out,
            format,
        }
    }

    /// Walks every page of `query`. A failed list call stops the run; a
    /// message that cannot be fetched is skipped, one whose body cannot be
    /// decoded is still printed, without a URL.
    pub fn run(&mut self, query: &str, page_size: u32) -> Result<RunReport, PipelineError> {
        let mut report = RunReport::default();

        for batch in Pages::new(self.provider, query, page_size) {
            let batch = batch?;
            report.pages += 1;
            self.write_page_header(batch.len())?;

            for summary in &batch {
                let message = match self.provider.get(&summary.id) {
                    Ok(m) => m,
                    Err(source) => {
                        let err = MessageError::Fetch {
                            id: summary.id.clone(),
                            source,
                        };
                        warn!("skipping: {:#}", anyhow::Error::from(err));
                        report.skipped += 1;
                        continue;
                    }
                };

                let record = match Extracted::from_message(&message) {
                    Ok(r) => r,
                    Err(err) => {
                        warn!("{:#}", anyhow::Error::from(err));
                        report.decode_failures += 1;
                        Extracted::headers_only(&message)
                    }
                };
                self.write_record(&record)?;
                report.printed += 1;
            }
        }

        self.out.flush()?;
        info!(
            "{} pages, {} messages printed, {} skipped, {} undecodable bodies",
            report.pages, report.printed, report.skipped, report.decode_failures
        );
        Ok(report)
    }

    fn write_page_header(&mut self, count: usize) -> Result<(), PipelineError> {
        if self.format == OutputFormat::Text {
            writeln!(self.out, "{count} messages found")?;
        }
        Ok(())
    }

    fn write_record(&mut self, record: &Extracted) -> Result<(), PipelineError> {
        match self.format {
            OutputFormat::Text => {
                writeln!(self.out)?;
                writeln!(
                    self.out,
                    "--- {}",
                    record.subject.as_deref().unwrap_or_default()
                )?;
                writeln!(
                    self.out,
                    "\t{}",
                    record.first_url().unwrap_or(NOT_AVAILABLE)
                )?;
            }
            OutputFormat::Json => {
                let json = JsonRecord {
                    id: &record.id,
                    subject: record.subject.as_deref().unwrap_or_default(),
                    from: record.from.as_deref().unwrap_or_default(),
                    url: record.first_url(),
                    urls: &record.urls,
                };
                serde_json::to_writer(&mut self.out, &json)?;
                writeln!(self.out)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MessageHeader, MessagePayload};
    use base64::Engine as _;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    fn message(id: &str, subject: &str, body: &str) -> Message {
        let mut payload = MessagePayload::single("text/plain", URL_SAFE_NO_PAD.encode(body));
        payload.headers = vec![
            MessageHeader::new("From", "cook@example.com"),
            MessageHeader::new("Subject", subject),
        ];
        Message {
            id: id.into(),
            payload,
            ..Default::default()
        }
    }

    #[test]
    fn extracts_subject_sender_and_urls() {
        let m = message("a", "Pasta", "See http://example.com/pasta or https://b.example");
        let e = Extracted::from_message(&m).unwrap();
        assert_eq!(e.subject.as_deref(), Some("Pasta"));
        assert_eq!(e.from.as_deref(), Some("cook@example.com"));
        assert_eq!(e.first_url(), Some("http://example.com/pasta"));
        assert_eq!(e.urls.len(), 2);
    }

    #[test]
    fn decode_failure_names_the_message() {
        let mut m = message("bad", "Broken", "");
        m.payload.body.as_mut().unwrap().data = Some("%%%".into());
        let err = Extracted::from_message(&m).unwrap_err();
        assert!(matches!(err, MessageError::Decode { ref id, .. } if id == "bad"));
        let chain = format!("{:#}", anyhow::Error::from(err));
        assert!(chain.starts_with("unable to decode message bad: "));
    }

    struct Empty;

    impl MailProvider for Empty {
        fn list(
            &self,
            _query: &str,
            _page_size: u32,
            _token: &crate::domain::ContinuationToken,
        ) -> Result<crate::domain::ListPage, crate::error::ProviderError> {
            Ok(Default::default())
        }

        fn get(&self, _id: &str) -> Result<Message, crate::error::ProviderError> {
            unreachable!()
        }
    }

    #[test]
    fn missing_subject_prints_empty() {
        let m = Message {
            id: "x".into(),
            ..Default::default()
        };
        let mut out = Vec::new();
        Pipeline::new(&Empty, &mut out, OutputFormat::Text)
            .write_record(&Extracted::headers_only(&m))
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "\n--- \n\tN/A\n");
    }

    #[test]
    fn empty_search_prints_zero_count() {
        let mut out = Vec::new();
        let report = Pipeline::new(&Empty, &mut out, OutputFormat::Text)
            .run("label:Nothing", 25)
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "0 messages found\n");
        assert_eq!(report.pages, 1);
        assert_eq!(report.printed, 0);
    }

    #[test]
    fn json_format_has_no_page_lines() {
        let m = message("a", "Pasta", "See http://example.com/pasta");
        let mut out = Vec::new();
        Pipeline::new(&Empty, &mut out, OutputFormat::Json)
            .write_record(&Extracted::from_message(&m).unwrap())
            .unwrap();
        let line = String::from_utf8(out).unwrap();
        let v: serde_json::Value = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(v["id"], "a");
        assert_eq!(v["subject"], "Pasta");
        assert_eq!(v["from"], "cook@example.com");
        assert_eq!(v["url"], "http://example.com/pasta");
        assert_eq!(v["urls"][0], "http://example.com/pasta");
    }
}
