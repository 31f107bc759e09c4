use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::{
    address::Envelope,
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use log::{error, info};

use crate::config::SmtpConfig;

#[async_trait]
pub trait Notifier: Sync + Send {
    async fn notify(&self, application: &str, error: &str, original_text: &str);
}

pub struct SmtpNotifier {
    config: SmtpConfig,
    timeout: Duration,
}

impl SmtpNotifier {
    pub fn new(config: SmtpConfig, timeout: Duration) -> SmtpNotifier {
        SmtpNotifier { config, timeout }
    }

    fn envelope(&self) -> Result<Envelope> {
        let sender: Address = self
            .config
            .user
            .parse()
            .context("SMTP: invalid sender address")?;
        let receiver: Address = self
            .config
            .receiver
            .parse()
            .context("SMTP: invalid receiver address")?;
        Ok(Envelope::new(Some(sender), vec![receiver])?)
    }

    fn build_message(&self, application: &str, error: &str, original_text: &str) -> Result<Message> {
        let from = self.config.from.as_deref().unwrap_or(&self.config.user);
        Ok(Message::builder()
            .from(
                from.parse::<Mailbox>()
                    .context("SMTP: invalid From header")?,
            )
            .to(self
                .config
                .receiver
                .parse::<Mailbox>()
                .context("SMTP: invalid receiver address")?)
            .subject(format!("Error from {}", application))
            .header(ContentType::TEXT_PLAIN)
            .body(format!(
                "Error message: {}\nTry to send: {}",
                error, original_text
            ))?)
    }

    async fn send(&self, application: &str, error: &str, original_text: &str) -> Result<()> {
        let message = self.build_message(application, error, original_text)?;
        let envelope = self.envelope()?;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.server)?
            .port(self.config.port)
            .credentials(Credentials::new(
                self.config.user.clone(),
                self.config.password.clone(),
            ))
            .timeout(Some(self.timeout))
            .build();
        transport
            .send_raw(&envelope, &message.formatted())
            .await
            .context("SMTP: send failed")?;
        Ok(())
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn notify(&self, application: &str, error: &str, original_text: &str) {
        match self.send(application, error, original_text).await {
            Ok(()) => info!("Sent {} error notification to {}", application, self.config.receiver),
            Err(e) => error!("SMTP Error: {:#}", e),
        }
    }
}
