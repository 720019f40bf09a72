//! SMTP transport for the notification relay.
//!
//! Submits through a STARTTLS relay (gmail-style submission on port 587)
//! with the account from [`MailConfig`] as both the authenticated user
//! and the `From` address, mirroring how the site's forms have always
//! been delivered.

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials as SmtpCredentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{info, instrument};

use crate::config::MailConfig;
use crate::error::RelayError;
use crate::relay::{EmailMessage, NotificationRelay};

/// Production relay: async SMTP submission via `lettre`.
pub struct SmtpRelay {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpRelay {
    /// Builds the relay from mail settings.
    ///
    /// # Errors
    ///
    /// Returns a [`RelayError`] if either address fails to parse or the
    /// relay host is rejected by the transport builder.
    pub fn new(config: &MailConfig) -> Result<Self, RelayError> {
        let from: Mailbox = config
            .username
            .parse()
            .map_err(|_| RelayError::address(format!("sender: {}", config.username)))?;
        let to: Mailbox = config
            .recipient
            .parse()
            .map_err(|_| RelayError::address(format!("recipient: {}", config.recipient)))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_relay)
            .map_err(|err| RelayError::transport(err.to_string()))?
            .credentials(SmtpCredentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            from,
            to,
        })
    }
}

impl std::fmt::Debug for SmtpRelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpRelay")
            .field("from", &self.from)
            .field("to", &self.to)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl NotificationRelay for SmtpRelay {
    #[instrument(skip_all, fields(subject = %message.subject))]
    async fn send(&self, message: &EmailMessage) -> Result<(), RelayError> {
        let email = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(message.subject.clone())
            .multipart(MultiPart::alternative_plain_html(
                message.text_body.clone(),
                message.html_body.clone(),
            ))
            .map_err(|err| RelayError::message(err.to_string()))?;

        self.transport
            .send(email)
            .await
            .map_err(|err| RelayError::transport(err.to_string()))?;

        info!("Notification sent");
        Ok(())
    }
}
