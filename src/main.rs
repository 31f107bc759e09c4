use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::Local;
use clap::Parser;
use log::{error, info};
use reqwest::Client;

mod config;
mod datasources;
mod notifier;
mod publisher;
mod retry;
mod scheduler;
mod stats;
mod status;
mod twitter;

use config::Config;
use datasources::{MetapoolDataSource, TickerDataSource};
use notifier::{Notifier, SmtpNotifier};
use publisher::{Publisher, StatusPoster};
use retry::RetryPolicy;
use scheduler::Scheduler;
use stats::StatsBot;
use twitter::TwitterClient;

/// Posts Metapool statistics to Twitter on a schedule.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Post messages to Twitter (default)
    #[arg(long = "bot", overrides_with = "no_bot")]
    bot: bool,
    /// Only log messages instead of posting them
    #[arg(long = "no-bot", overrides_with = "bot")]
    no_bot: bool,
    /// Schedule stats messages (default)
    #[arg(long = "stat", overrides_with = "no_stat")]
    stat: bool,
    /// Do not schedule stats messages
    #[arg(long = "no-stat", overrides_with = "stat")]
    no_stat: bool,
}

impl Cli {
    fn bot_enabled(&self) -> bool {
        self.bot || !self.no_bot
    }

    fn stats_enabled(&self) -> bool {
        self.stat || !self.no_stat
    }
}

fn build_poster(
    config: &Config,
    client: &Arc<Client>,
    bot_enabled: bool,
) -> Result<Option<Box<dyn StatusPoster>>> {
    if !bot_enabled {
        return Ok(None);
    }
    let credentials = config
        .twitter
        .clone()
        .ok_or(anyhow!("Twitter credentials are required unless --no-bot is given"))?;
    Ok(Some(Box::new(TwitterClient::new(
        client.clone(),
        config.twitter_url.clone(),
        credentials,
    ))))
}

async fn run(cli: Cli, config: Config) -> Result<()> {
    let bot_enabled = cli.bot_enabled();
    let stats_enabled = cli.stats_enabled();
    info!(
        "Start options: bot enabled: {}, stats enabled: {}",
        bot_enabled, stats_enabled
    );

    if !stats_enabled {
        info!("Stats messages disabled, idling");
        futures::future::pending::<()>().await;
    }

    let client = Arc::new(
        Client::builder()
            .user_agent(concat!("metapool-bot ", env!("CARGO_PKG_VERSION")))
            .timeout(config.http_timeout)
            .build()?,
    );

    let poster = build_poster(&config, &client, bot_enabled)?;
    let notifier: Option<Box<dyn Notifier>> = match config.smtp.clone() {
        Some(smtp) => Some(Box::new(SmtpNotifier::new(smtp, config.http_timeout))),
        None => {
            info!("SMTP_SERVER not set, error notifications disabled");
            None
        }
    };

    let bot = StatsBot::new(
        Box::new(MetapoolDataSource::new(
            client.clone(),
            config.stats_url.clone(),
        )),
        Box::new(TickerDataSource::new(
            client.clone(),
            config.ticker_url.clone(),
            config.ticker_pair.clone(),
        )),
        config.ticker_pair.clone(),
        Publisher::new(poster, notifier, RetryPolicy::default()),
    );

    let bot = &bot;
    let scheduler = Scheduler::new(config.schedule.clone(), Local::now().naive_local());
    scheduler
        .run_forever(config.poll_interval, move || async move {
            if let Err(e) = bot.tick().await {
                error!("Stats run failed: {:#}", e);
            }
        })
        .await;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    run(cli, config).await
}
