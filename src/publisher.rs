use anyhow::Result;
use async_trait::async_trait;
use log::{error, info, warn};

use crate::notifier::Notifier;
use crate::retry::RetryPolicy;

/// Name reported to the notifier when posting fails.
pub const APPLICATION: &str = "Twitter";

#[async_trait]
pub trait StatusPoster: Sync + Send {
    async fn post(&self, text: &str) -> Result<()>;
}

/// Posts statuses through `poster`; without one it only logs them.
pub struct Publisher {
    poster: Option<Box<dyn StatusPoster>>,
    notifier: Option<Box<dyn Notifier>>,
    retry: RetryPolicy,
}

impl Publisher {
    pub fn new(
        poster: Option<Box<dyn StatusPoster>>,
        notifier: Option<Box<dyn Notifier>>,
        retry: RetryPolicy,
    ) -> Publisher {
        Publisher {
            poster,
            notifier,
            retry,
        }
    }

    pub async fn publish(&self, text: &str) {
        info!("----\nBot Twitter: {}", text);
        let poster = match &self.poster {
            Some(poster) => poster,
            None => return,
        };
        let notifier = self.notifier.as_deref();
        let sent = self
            .retry
            .run(
                move |attempt| {
                    info!("Posting status, attempt {}", attempt);
                    poster.post(text)
                },
                move |attempt, e| async move {
                    warn!("Posting attempt {} failed: {:#}", attempt, e);
                    if let Some(notifier) = notifier {
                        notifier
                            .notify(APPLICATION, &format!("{:#}", e), text)
                            .await;
                    }
                },
            )
            .await;
        if sent.is_none() {
            error!(
                "Giving up on status after {} attempts",
                self.retry.max_attempts
            );
        }
    }
}
