//! Email delivery for the verification workflow
//!
//! The service only needs "send this templated message to an address";
//! transport is the Resend API behind the [`Mailer`] trait so handlers
//! (and tests) depend on the contract alone.

pub mod resend;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Default from address for emails
pub const DEFAULT_FROM_ADDRESS: &str = "Phonebook <noreply@phonebook.app>";

/// Request to send an email
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailSendRequest {
    /// Recipient email addresses
    pub to: Vec<String>,
    /// Email subject line
    pub subject: String,
    /// HTML body content
    pub html: String,
    /// Optional plain text body (for clients that don't support HTML)
    #[serde(default)]
    pub text: Option<String>,
    /// Optional reply-to address
    #[serde(default)]
    pub reply_to: Option<String>,
    /// Optional tags for tracking (name, value pairs)
    #[serde(default)]
    pub tags: Vec<(String, String)>,
}

/// Result of sending an email
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailSendResult {
    /// Provider-assigned message ID
    pub id: String,
    /// Whether the send was successful
    pub success: bool,
    /// Error message if send failed
    #[serde(default)]
    pub error: Option<String>,
}

impl EmailSendResult {
    /// Create a successful result
    pub fn success(id: String) -> Self {
        Self {
            id,
            success: true,
            error: None,
        }
    }

    /// Create a failed result
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            success: false,
            error: Some(message.into()),
        }
    }
}

/// Outbound mail contract: send never panics and never returns Err;
/// delivery failure is data in the result.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, request: EmailSendRequest) -> EmailSendResult;
}

/// Build the address-verification message for an account
pub fn verification_email(base_url: &str, to: &str, token: &str) -> EmailSendRequest {
    let verification_url = format!("{}/users/verify/{}", base_url, token);

    EmailSendRequest {
        to: vec![to.to_string()],
        subject: "Verification email".to_string(),
        html: format!(
            r#"<h2>Welcome to Phonebook!</h2>
            <p>Please click the link below to verify your email address:</p>
            <p><a target="_blank" href="{}" style="background-color: #4F46E5; color: white; padding: 12px 24px; text-decoration: none; border-radius: 6px; display: inline-block;">Verify Email</a></p>
            <p>Or copy and paste this link into your browser:</p>
            <p>{}</p>
            <p>If you didn't create this account, you can safely ignore this email.</p>"#,
            verification_url, verification_url
        ),
        text: Some(format!(
            "Welcome to Phonebook!\n\nPlease verify your email by visiting: {}\n\nIf you didn't create this account, ignore this email.",
            verification_url
        )),
        reply_to: None,
        tags: vec![("type".to_string(), "verification".to_string())],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_send_result_success() {
        let result = EmailSendResult::success("msg-123".to_string());
        assert!(result.success);
        assert_eq!(result.id, "msg-123");
        assert!(result.error.is_none());
    }

    #[test]
    fn test_email_send_result_error() {
        let result = EmailSendResult::error("Something went wrong");
        assert!(!result.success);
        assert!(result.id.is_empty());
        assert_eq!(result.error.as_deref(), Some("Something went wrong"));
    }

    #[test]
    fn test_verification_email_embeds_link() {
        let request = verification_email("http://localhost:3000", "user@example.com", "tok-1");

        assert_eq!(request.to, vec!["user@example.com".to_string()]);
        assert!(request.html.contains("http://localhost:3000/users/verify/tok-1"));
        assert!(request
            .text
            .as_deref()
            .unwrap()
            .contains("http://localhost:3000/users/verify/tok-1"));
    }

    #[test]
    fn test_email_send_request_serialization() {
        let request = EmailSendRequest {
            to: vec!["test@example.com".to_string()],
            subject: "Test Subject".to_string(),
            html: "<p>Test</p>".to_string(),
            text: Some("Test".to_string()),
            reply_to: None,
            tags: vec![("type".to_string(), "test".to_string())],
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("test@example.com"));
        assert!(json.contains("Test Subject"));
    }
}
