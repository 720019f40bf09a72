//! Outbound notification relay for the site's forms.
//!
//! The two public forms (newsletter signup, contact message) turn into an
//! [`EmailMessage`] — a subject/text/html triple — and go out through a
//! [`NotificationRelay`]. The relay shares no state with the project
//! store; a transport failure is reported to the caller and nothing else.
//!
//! Production transport: [`SmtpRelay`](smtp::SmtpRelay). Deployments
//! without mail settings get [`DisabledRelay`], which fails every send.

pub mod smtp;

pub use smtp::SmtpRelay;

use async_trait::async_trait;

use crate::error::RelayError;

/// A formatted notification, ready for transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmailMessage {
    /// Subject line.
    pub subject: String,

    /// Plain-text body.
    pub text_body: String,

    /// HTML alternative body.
    pub html_body: String,
}

impl EmailMessage {
    /// Builds a message from its three parts.
    pub fn new(
        subject: impl Into<String>,
        text_body: impl Into<String>,
        html_body: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            text_body: text_body.into(),
            html_body: html_body.into(),
        }
    }

    /// Notification for a newsletter signup.
    pub fn subscription(email: &str) -> Self {
        Self::new(
            "New Newsletter Subscription",
            format!("A new user subscribed: {email}"),
            format!("<p>A new user subscribed: <strong>{email}</strong></p>"),
        )
    }

    /// Notification for a contact-form submission.
    pub fn contact(name: &str, email: &str, message: &str) -> Self {
        Self::new(
            "New Contact Form Submission",
            format!("Name: {name}\nEmail: {email}\nMessage: {message}"),
            format!(
                "<p><strong>Name:</strong> {name}</p>\
                 <p><strong>Email:</strong> {email}</p>\
                 <p><strong>Message:</strong> {message}</p>"
            ),
        )
    }
}

/// Transport for outbound notifications.
///
/// Implementations must be `Send + Sync`; the relay is shared across
/// request handlers behind an `Arc`.
#[async_trait]
pub trait NotificationRelay: Send + Sync {
    /// Transmits the message.
    ///
    /// # Errors
    ///
    /// Returns a [`RelayError`] if the message cannot be built or the
    /// transport rejects it. The error is terminal for the request; no
    /// retry happens here.
    async fn send(&self, message: &EmailMessage) -> Result<(), RelayError>;
}

/// Relay used when no mail settings are configured: every send fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct DisabledRelay;

#[async_trait]
impl NotificationRelay for DisabledRelay {
    async fn send(&self, _message: &EmailMessage) -> Result<(), RelayError> {
        Err(RelayError::transport("mail relay is not configured"))
    }
}
