use anyhow::Result;
use futures::try_join;
use log::{debug, info};

use crate::datasources::{FieldSource, PoolStats, TokenTicker};
use crate::publisher::Publisher;
use crate::status::build_message;

pub struct StatsBot {
    pool_source: Box<dyn FieldSource>,
    ticker_source: Box<dyn FieldSource>,
    ticker_pair: String,
    publisher: Publisher,
}

impl StatsBot {
    pub fn new(
        pool_source: Box<dyn FieldSource>,
        ticker_source: Box<dyn FieldSource>,
        ticker_pair: String,
        publisher: Publisher,
    ) -> StatsBot {
        StatsBot {
            pool_source,
            ticker_source,
            ticker_pair,
            publisher,
        }
    }

    pub async fn tick(&self) -> Result<()> {
        let (pool_object, ticker_object) = try_join!(
            self.pool_source.fetch_object(),
            self.ticker_source.fetch_object()
        )?;
        let stats = PoolStats::from_object(&pool_object);
        let ticker = TokenTicker::from_object(&ticker_object, &self.ticker_pair);
        debug!("{:?} {:?}", stats, ticker);
        info!(
            "Difficulty {}, {} at {} ({} % 24h)",
            stats.difficulty, ticker.currency_pair, ticker.last, ticker.change_percentage
        );
        let message = build_message(&stats, &ticker);
        self.publisher.publish(&message).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publisher::tests::{FlakyPoster, RecordingNotifier};
    use crate::retry::RetryPolicy;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use serde_json::{json, Value as JsonValue};
    use std::sync::Arc;
    use std::time::Duration;

    struct StaticSource(Option<JsonValue>);

    #[async_trait]
    impl FieldSource for StaticSource {
        async fn fetch_object(&self) -> Result<JsonValue> {
            self.0.clone().ok_or(anyhow!("connection reset"))
        }
    }

    fn bot(
        pool: Option<JsonValue>,
        ticker: Option<JsonValue>,
        poster: &Arc<FlakyPoster>,
        notifier: &Arc<RecordingNotifier>,
    ) -> StatsBot {
        StatsBot::new(
            Box::new(StaticSource(pool)),
            Box::new(StaticSource(ticker)),
            "ALPH_USDT".to_owned(),
            Publisher::new(
                Some(Box::new(poster.clone())),
                Some(Box::new(notifier.clone())),
                RetryPolicy {
                    max_attempts: 3,
                    backoff: Duration::ZERO,
                },
            ),
        )
    }

    #[tokio::test]
    async fn publishes_rendered_stats() {
        let poster = Arc::new(FlakyPoster::new(0));
        let notifier = Arc::new(RecordingNotifier::default());
        let bot = bot(
            Some(json!({
                "global_hashrate": 2e12,
                "num_workers": 10,
                "pool_hashrate": 5e10,
                "total_pending_payout": 100,
                "total_payout_amount": 5000,
            })),
            Some(json!({"currency_pair": "ALPH_USDT", "last": "0.05", "change_percentage": "1.2"})),
            &poster,
            &notifier,
        );

        bot.tick().await.unwrap();

        let posted = poster.posted.lock().unwrap();
        assert_eq!(posted.len(), 1);
        let message = &posted[0];
        assert!(message.contains("2.5 %"), "{}", message);
        assert!(message.contains("Current Miners : 10"));
        assert!(message.contains("5.00 USDT"));
        assert!(message.chars().count() <= 280);
        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_stats_still_publish() {
        let poster = Arc::new(FlakyPoster::new(0));
        let notifier = Arc::new(RecordingNotifier::default());
        let bot = bot(Some(json!({})), Some(JsonValue::Null), &poster, &notifier);

        bot.tick().await.unwrap();

        let posted = poster.posted.lock().unwrap();
        assert!(posted[0].contains("undefined % of total"));
        assert!(!posted[0].contains("Current Miners"));
    }

    #[tokio::test]
    async fn fetch_error_skips_publishing() {
        let poster = Arc::new(FlakyPoster::new(0));
        let notifier = Arc::new(RecordingNotifier::default());
        let bot = bot(None, Some(json!({})), &poster, &notifier);

        assert!(bot.tick().await.is_err());
        assert_eq!(*poster.attempts.lock().unwrap(), 0);
        assert!(notifier.sent.lock().unwrap().is_empty());
    }
}
