use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use log::info;
use reqwest::{header::CONTENT_TYPE, Client};
use reqwest_oauth1::{OAuthClientProvider, Secrets};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::config::TwitterCredentials;
use crate::publisher::StatusPoster;

#[derive(Serialize)]
struct CreateTweet<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct CreatedTweet {
    data: TweetData,
}

#[derive(Deserialize)]
struct TweetData {
    id: String,
}

pub struct TwitterClient {
    client: Arc<Client>,
    url: String,
    credentials: TwitterCredentials,
}

impl TwitterClient {
    pub fn new(client: Arc<Client>, url: String, credentials: TwitterCredentials) -> TwitterClient {
        TwitterClient {
            client,
            url,
            credentials,
        }
    }
}

#[async_trait]
impl StatusPoster for TwitterClient {
    async fn post(&self, text: &str) -> Result<()> {
        let secrets = Secrets::new(
            self.credentials.consumer_key.as_str(),
            self.credentials.consumer_secret.as_str(),
        )
        .token(
            self.credentials.access_token.as_str(),
            self.credentials.access_secret.as_str(),
        );
        let resp_payload = (*self.client)
            .clone()
            .oauth1(secrets)
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .body(serde_json::to_string(&CreateTweet { text })?)
            .send()
            .await
            .context("Twitter: request failed")?;
        let status = resp_payload.status();
        let body = resp_payload.text().await.unwrap_or_default();
        if !status.is_success() {
            let detail = serde_json::from_str::<JsonValue>(&body)
                .ok()
                .and_then(|v| v["detail"].as_str().map(str::to_owned))
                .unwrap_or(body);
            return Err(anyhow!("Twitter: HTTP {}: {}", status, detail));
        }
        match serde_json::from_str::<CreatedTweet>(&body) {
            Ok(created) => info!("Twitter: posted tweet {}", created.data.id),
            Err(_) => info!("Twitter: posted tweet ({})", status),
        }
        Ok(())
    }
}
