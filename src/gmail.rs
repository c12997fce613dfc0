use crate::models::{EmailRecord, Origin};
use crate::source::EmailSource;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use google_gmail1::Gmail;
use hyper::client::HttpConnector;
use hyper_rustls::HttpsConnector;

pub type GmailHub = Gmail<HttpsConnector<HttpConnector>>;

const INBOX_LABEL: &str = "INBOX";
const UNREAD_LABEL: &str = "UNREAD";

#[derive(Clone)]
pub struct GmailClient {
    hub: GmailHub,
}

impl GmailClient {
    pub fn new(hub: GmailHub) -> Self {
        Self { hub }
    }

    pub async fn list_messages(&self, max_results: u32, unread_only: bool) -> Result<Vec<String>> {
        let mut req = self
            .hub
            .users()
            .messages_list("me")
            .add_label_ids(INBOX_LABEL)
            .max_results(max_results);

        if unread_only {
            req = req.q("is:unread");
        }

        let (_, message_list) = req.doit().await.context("Failed to list messages")?;

        let ids = message_list
            .messages
            .unwrap_or_default()
            .into_iter()
            .filter_map(|m| m.id)
            .collect();

        Ok(ids)
    }

    pub async fn get_message(&self, id: &str) -> Result<EmailRecord> {
        let (_, msg) = self
            .hub
            .users()
            .messages_get("me", id)
            .format("full")
            .doit()
            .await
            .context(format!("Failed to get message {}", id))?;

        let mut from = None;
        let mut subject = None;

        if let Some(payload) = &msg.payload {
            if let Some(headers) = &payload.headers {
                for header in headers {
                    match header.name.as_deref() {
                        Some("From") => from = header.value.clone(),
                        Some("Subject") => subject = header.value.clone(),
                        _ => {}
                    }
                }
            }
        }

        let snippet = msg.snippet.unwrap_or_default();
        let body = msg
            .payload
            .as_ref()
            .and_then(|p| extract_text_body(p, "text/plain"))
            .unwrap_or_else(|| snippet.clone());

        let date = msg
            .internal_date
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|d| d.to_rfc3339_opts(SecondsFormat::Secs, true))
            .unwrap_or_default();

        Ok(EmailRecord {
            id: msg.id.unwrap_or_else(|| id.to_string()),
            from: from.unwrap_or_default(),
            subject: subject.unwrap_or_default(),
            snippet,
            body,
            date,
            read: !msg
                .label_ids
                .unwrap_or_default()
                .iter()
                .any(|l| l == UNREAD_LABEL),
        })
    }
}

#[async_trait]
impl EmailSource for GmailClient {
    async fn fetch(&self, max_results: usize, unread_only: bool) -> Result<Vec<EmailRecord>> {
        if max_results == 0 {
            return Ok(Vec::new());
        }

        let limit = u32::try_from(max_results).unwrap_or(u32::MAX);
        let ids = self.list_messages(limit, unread_only).await?;
        tracing::debug!(count = ids.len(), unread_only, "listed Gmail messages");

        // One request per message, in listing order; any failure aborts the batch.
        let mut emails = Vec::with_capacity(ids.len());
        for id in ids.iter().take(max_results) {
            emails.push(self.get_message(id).await?);
        }

        Ok(emails)
    }

    fn origin(&self) -> Origin {
        Origin::Live
    }
}

fn extract_text_body(part: &google_gmail1::api::MessagePart, mime_type: &str) -> Option<String> {
    if let Some(mime) = &part.mime_type {
        if mime == mime_type {
            if let Some(body) = &part.body {
                if let Some(data) = &body.data {
                    return Some(decode_body_data(data));
                }
            }
        }
    }

    if let Some(parts) = &part.parts {
        let mut full_body = String::new();
        for p in parts {
            if let Some(body) = extract_text_body(p, mime_type) {
                full_body.push_str(&body);
            }
        }
        if !full_body.is_empty() {
            return Some(full_body);
        }
    }

    None
}

/// Gmail usually hands back base64url, but some parts arrive already decoded.
fn decode_body_data(data: &[u8]) -> String {
    use base64::{Engine as _, engine::general_purpose};

    let data_str = String::from_utf8_lossy(data);
    let trimmed = data_str.trim();
    let decoded = general_purpose::URL_SAFE_NO_PAD
        .decode(trimmed)
        .or_else(|_| general_purpose::URL_SAFE.decode(trimmed))
        .or_else(|_| general_purpose::STANDARD_NO_PAD.decode(trimmed))
        .or_else(|_| general_purpose::STANDARD.decode(trimmed));

    match decoded.ok().and_then(|bytes| String::from_utf8(bytes).ok()) {
        Some(text) => text,
        None => data_str.into_owned(),
    }
}
