//! Best-effort outbound email.
//!
//! A [`NotificationService`] wraps at most one [`Mailer`]. The SMTP provider is picked
//! once at startup: the primary `SMTP_*` settings when complete, otherwise the Gmail
//! fallback, otherwise none, in which case every send reports `false`. Delivery failures
//! are logged and never returned to callers.

use std::sync::Arc;

use async_trait::async_trait;
use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use secrecy::ExposeSecret;

use crate::config::{Config, SmtpSettings};

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Email build error: {0}")]
    Build(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl EmailMessage {
    pub fn new(to: &str, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.to_string(),
            subject: subject.into(),
            body: body.into(),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError>;
    fn provider(&self) -> &'static str;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    provider: &'static str,
}

impl SmtpMailer {
    pub fn new(settings: &SmtpSettings, provider: &'static str) -> Result<Self, EmailError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)?
            .port(settings.port)
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.expose_secret().to_string(),
            ))
            .build();

        Ok(Self {
            transport,
            from_address: settings.from_address.clone(),
            provider,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(self.from_address.parse()?)
            .to(message.to.parse()?)
            .subject(message.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(message.body)
            .map_err(|e| EmailError::Build(e.to_string()))?;

        self.transport.send(email).await?;
        Ok(())
    }

    fn provider(&self) -> &'static str {
        self.provider
    }
}

/// Primary provider when configured, else the fallback.
pub fn select_provider(config: &Config) -> Option<(&'static str, &SmtpSettings)> {
    config
        .smtp_primary
        .as_ref()
        .map(|s| ("smtp", s))
        .or_else(|| config.smtp_fallback.as_ref().map(|s| ("gmail", s)))
}

#[derive(Clone)]
pub struct NotificationService {
    mailer: Option<Arc<dyn Mailer>>,
    admin_email: Option<String>,
}

impl NotificationService {
    pub fn new(mailer: Option<Arc<dyn Mailer>>, admin_email: Option<String>) -> Self {
        Self {
            mailer,
            admin_email,
        }
    }

    /// A service that never sends anything.
    pub fn disabled() -> Self {
        Self::new(None, None)
    }

    pub fn from_config(config: &Config) -> Self {
        let mailer: Option<Arc<dyn Mailer>> = match select_provider(config) {
            Some((provider, settings)) => match SmtpMailer::new(settings, provider) {
                Ok(mailer) => {
                    log::info!("Email notifications enabled via {} ({})", provider, settings.host);
                    Some(Arc::new(mailer))
                }
                Err(e) => {
                    log::error!("Failed to set up {} mailer: {}", provider, e);
                    None
                }
            },
            None => {
                log::warn!("No SMTP provider configured; email notifications are disabled");
                None
            }
        };

        Self::new(mailer, config.admin_email.clone())
    }

    pub fn is_enabled(&self) -> bool {
        self.mailer.is_some()
    }

    pub fn admin_email(&self) -> Option<&str> {
        self.admin_email.as_deref()
    }

    /// Sends and reports whether the provider accepted the message.
    pub async fn send(&self, message: EmailMessage) -> bool {
        match &self.mailer {
            Some(mailer) => deliver(mailer.as_ref(), message).await,
            None => {
                log::debug!("Email to {} skipped: notifications disabled", message.to);
                false
            }
        }
    }

    /// Fire-and-forget send on the runtime.
    pub fn dispatch(&self, message: EmailMessage) {
        let Some(mailer) = self.mailer.clone() else {
            log::debug!("Email to {} skipped: notifications disabled", message.to);
            return;
        };

        tokio::spawn(async move {
            deliver(mailer.as_ref(), message).await;
        });
    }

    /// Fire-and-forget message to the configured admin address, if any.
    pub fn dispatch_to_admin(&self, subject: String, body: String) {
        match &self.admin_email {
            Some(admin) => self.dispatch(EmailMessage::new(admin, subject, body)),
            None => log::debug!("Admin notification '{}' skipped: ADMIN_EMAIL not set", subject),
        }
    }
}

async fn deliver(mailer: &dyn Mailer, message: EmailMessage) -> bool {
    let to = message.to.clone();
    let subject = message.subject.clone();

    match mailer.send(message).await {
        Ok(()) => {
            log::info!("Sent '{}' to {} via {}", subject, to, mailer.provider());
            true
        }
        Err(e) => {
            log::error!(
                "Failed to send '{}' to {} via {}: {}",
                subject,
                to,
                mailer.provider(),
                e
            );
            false
        }
    }
}
