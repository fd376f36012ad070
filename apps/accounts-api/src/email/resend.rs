//! Direct Resend API client
//!
//! Sends emails via a plain HTTP POST to https://api.resend.com/emails.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{EmailSendRequest, EmailSendResult, Mailer};

/// Resend API endpoint
const RESEND_API_URL: &str = "https://api.resend.com/emails";

/// Resend API request payload
#[derive(Debug, Serialize)]
struct ResendPayload<'a> {
    from: &'a str,
    to: &'a [String],
    subject: &'a str,
    html: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tags: Vec<ResendTag<'a>>,
}

/// Resend tag for tracking
#[derive(Debug, Serialize)]
struct ResendTag<'a> {
    name: &'a str,
    value: &'a str,
}

/// Resend API success response
#[derive(Debug, Deserialize)]
struct ResendSuccessResponse {
    id: String,
}

/// Resend API error response
#[derive(Debug, Deserialize)]
struct ResendErrorResponse {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Mailer backed by the Resend API
pub struct ResendMailer {
    client: reqwest::Client,
    api_key: Option<String>,
    from_address: String,
}

impl ResendMailer {
    pub fn new(api_key: Option<String>, from_address: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            from_address,
        }
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, request: EmailSendRequest) -> EmailSendResult {
        let api_key = match &self.api_key {
            Some(key) => key,
            None => {
                tracing::error!("RESEND_API_KEY not configured");
                return EmailSendResult::error(
                    "Email service not configured. Please contact support.",
                );
            }
        };

        let tags: Vec<ResendTag> = request
            .tags
            .iter()
            .map(|(name, value)| ResendTag {
                name: name.as_str(),
                value: value.as_str(),
            })
            .collect();

        let payload = ResendPayload {
            from: &self.from_address,
            to: &request.to,
            subject: &request.subject,
            html: &request.html,
            text: request.text.as_deref(),
            reply_to: request.reply_to.as_deref(),
            tags,
        };

        tracing::debug!("Sending email via Resend to: {:?}", request.to);

        let response = match self
            .client
            .post(RESEND_API_URL)
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::error!("Resend request failed: {}", e);
                return EmailSendResult::error("Failed to connect to email service.");
            }
        };

        let status = response.status();

        if status.is_success() {
            return match response.json::<ResendSuccessResponse>().await {
                Ok(success) => {
                    tracing::info!("Email sent via Resend: id={}", success.id);
                    EmailSendResult::success(success.id)
                }
                Err(e) => {
                    // Response parse error but email likely sent
                    tracing::warn!("Resend response parse error: {}", e);
                    EmailSendResult::success("resend:unknown".to_string())
                }
            };
        }

        let error_text = response.text().await.unwrap_or_default();
        tracing::error!("Resend error ({}): {}", status, error_text);

        let error_message =
            if let Ok(err) = serde_json::from_str::<ResendErrorResponse>(&error_text) {
                err.message
                    .or(err.name)
                    .unwrap_or_else(|| format!("HTTP {}", status))
            } else {
                format!("HTTP {}: {}", status, error_text)
            };

        // User-friendly error messages
        let user_message = match status.as_u16() {
            401 => "Email service authentication failed.".to_string(),
            403 => "Email service access denied.".to_string(),
            422 => format!("Invalid email request: {}", error_message),
            429 => "Email rate limit exceeded. Please try again later.".to_string(),
            500..=599 => "Email service temporarily unavailable.".to_string(),
            _ => error_message,
        };

        EmailSendResult::error(user_message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resend_payload_serialization() {
        let to = vec!["recipient@example.com".to_string()];
        let payload = ResendPayload {
            from: "sender@example.com",
            to: &to,
            subject: "Test Subject",
            html: "<p>Hello</p>",
            text: None,
            reply_to: None,
            tags: vec![],
        };

        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.contains("sender@example.com"));
        assert!(json.contains("recipient@example.com"));
        assert!(json.contains("Test Subject"));
        // text and reply_to should be omitted (skip_serializing_if)
        assert!(!json.contains("\"text\""));
        assert!(!json.contains("\"reply_to\""));
        // Empty tags should be omitted
        assert!(!json.contains("\"tags\""));
    }

    #[test]
    fn test_resend_payload_with_optional_fields() {
        let to = vec!["recipient@example.com".to_string()];
        let payload = ResendPayload {
            from: "sender@example.com",
            to: &to,
            subject: "Test",
            html: "<p>Hello</p>",
            text: Some("Hello"),
            reply_to: Some("reply@example.com"),
            tags: vec![ResendTag {
                name: "type",
                value: "verification",
            }],
        };

        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.contains("\"text\":\"Hello\""));
        assert!(json.contains("\"reply_to\":\"reply@example.com\""));
        assert!(json.contains("\"tags\""));
        assert!(json.contains("\"verification\""));
    }

    #[test]
    fn test_resend_error_response_parsing() {
        let error_json = r#"{"statusCode":422,"message":"Invalid email address","name":"validation_error"}"#;
        let error: ResendErrorResponse = serde_json::from_str(error_json).unwrap();
        assert_eq!(error.message.as_deref(), Some("Invalid email address"));
        assert_eq!(error.name.as_deref(), Some("validation_error"));
    }

    #[tokio::test]
    async fn test_unconfigured_mailer_reports_error() {
        let mailer = ResendMailer::new(None, "Phonebook <noreply@phonebook.app>".to_string());
        let result = mailer
            .send(EmailSendRequest {
                to: vec!["user@example.com".to_string()],
                subject: "Test".to_string(),
                html: "<p>Test</p>".to_string(),
                text: None,
                reply_to: None,
                tags: vec![],
            })
            .await;

        assert!(!result.success);
        assert!(result.error.unwrap().contains("not configured"));
    }
}
