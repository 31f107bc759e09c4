use std::env;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveTime;

pub const DEFAULT_STATS_URL: &str = "https://api.metapool.tech/pool/stats";
pub const DEFAULT_TICKER_URL: &str = "http://alephium.ono.re/api/ticker";
pub const DEFAULT_TICKER_PAIR: &str = "ALPH_USDT";
pub const DEFAULT_TWITTER_URL: &str = "https://api.twitter.com/2/tweets";
pub const DEFAULT_SCHEDULE: &str = "*:00";
pub const DEFAULT_SMTP_PORT: u16 = 465;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TwitterCredentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_secret: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SmtpConfig {
    pub server: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub receiver: String,
    /// Overrides the `From` header; the envelope sender stays `user`.
    pub from: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub stats_url: String,
    pub ticker_url: String,
    pub ticker_pair: String,
    pub twitter_url: String,
    pub twitter: Option<TwitterCredentials>,
    pub smtp: Option<SmtpConfig>,
    pub schedule: Vec<NaiveTime>,
    pub poll_interval: Duration,
    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Config> {
        Config::from_lookup(|key| env::var(key).ok().filter(|v| !v.is_empty()))
    }

    /// Builds the config from `lookup`, which maps variable names to values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Config> {
        let or_default = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_owned());
        let require = |key: &str| lookup(key).ok_or(anyhow!("{} is not set", key));

        let twitter = match (
            lookup("TWITTER_CONSUMER_API_KEY"),
            lookup("TWITTER_CONSUMER_SECRET"),
            lookup("TWITTER_ACCESS_TOKEN"),
            lookup("TWITTER_ACCESS_SECRET"),
        ) {
            (Some(consumer_key), Some(consumer_secret), Some(access_token), Some(access_secret)) => {
                Some(TwitterCredentials {
                    consumer_key,
                    consumer_secret,
                    access_token,
                    access_secret,
                })
            }
            _ => None,
        };

        let smtp = match lookup("SMTP_SERVER") {
            Some(server) => Some(SmtpConfig {
                server,
                port: match lookup("SMTP_PORT") {
                    Some(port) => port.parse().context("Invalid SMTP_PORT")?,
                    None => DEFAULT_SMTP_PORT,
                },
                user: require("SMTP_USER")?,
                password: require("SMTP_PASSWORD")?,
                receiver: require("SMTP_RECEIVER")?,
                from: lookup("SMTP_FROM"),
            }),
            None => None,
        };

        let poll_secs: u64 = or_default("SCHEDULE_POLL_SECS", "1")
            .parse()
            .context("Invalid SCHEDULE_POLL_SECS")?;
        let timeout_secs: u64 = or_default("HTTP_TIMEOUT_SECS", "30")
            .parse()
            .context("Invalid HTTP_TIMEOUT_SECS")?;

        Ok(Config {
            stats_url: or_default("METAPOOL_STATS_URL", DEFAULT_STATS_URL),
            ticker_url: or_default("TICKER_URL", DEFAULT_TICKER_URL),
            ticker_pair: or_default("TICKER_PAIR", DEFAULT_TICKER_PAIR),
            twitter_url: or_default("TWITTER_API_URL", DEFAULT_TWITTER_URL),
            twitter,
            smtp,
            schedule: parse_schedule(&or_default("STATS_SCHEDULE", DEFAULT_SCHEDULE))?,
            poll_interval: Duration::from_secs(poll_secs.clamp(1, 60)),
            http_timeout: Duration::from_secs(timeout_secs.max(1)),
        })
    }
}

/// Parses a comma-separated list of `HH:MM` times of day. `*:MM` stands for
/// minute `MM` of every hour.
pub fn parse_schedule(list: &str) -> Result<Vec<NaiveTime>> {
    let mut times = Vec::new();
    for entry in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        match entry.strip_prefix("*:") {
            Some(minute) => {
                let minute: u32 = minute
                    .parse()
                    .with_context(|| format!("Invalid schedule time {:?}", entry))?;
                for hour in 0..24 {
                    times.push(
                        NaiveTime::from_hms_opt(hour, minute, 0)
                            .ok_or(anyhow!("Invalid schedule time {:?}", entry))?,
                    );
                }
            }
            None => times.push(
                NaiveTime::parse_from_str(entry, "%H:%M")
                    .with_context(|| format!("Invalid schedule time {:?}", entry))?,
            ),
        }
    }
    if times.is_empty() {
        return Err(anyhow!("Schedule is empty"));
    }
    times.sort();
    times.dedup();
    Ok(times)
}
