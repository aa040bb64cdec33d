//! Twitter/X v2 client for publishing posts and listing connections

use crate::config::TwitterConfig;
use crate::error::{HeraldError, Result};
use crate::workflow::traits::{Publisher, SocialGraph};
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

pub struct TwitterClient {
    bearer_token: String,
    user_id: String,
    base_url: String,
    http_client: HttpClient,
}

#[derive(Debug, Deserialize)]
struct TweetResponse {
    data: TweetData,
}

#[derive(Debug, Deserialize)]
struct TweetData {
    id: String,
}

#[derive(Debug, Deserialize)]
struct UserListResponse {
    #[serde(default)]
    data: Vec<UserData>,
}

#[derive(Debug, Deserialize)]
struct UserData {
    username: String,
}

impl TwitterClient {
    pub fn new(config: TwitterConfig) -> Result<Self> {
        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(HeraldError::Http)?;

        Ok(Self {
            bearer_token: config.bearer_token,
            user_id: config.user_id,
            base_url: config.base_url,
            http_client,
        })
    }

    async fn list_usernames(&self, endpoint: &str, max: usize) -> Result<Vec<String>> {
        if self.user_id.is_empty() {
            log::debug!("No twitter user_id configured; skipping {} lookup", endpoint);
            return Ok(Vec::new());
        }

        let url = format!(
            "{}/2/users/{}/{}?max_results=100",
            self.base_url, self.user_id, endpoint
        );

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.bearer_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(HeraldError::ServiceUnavailable(format!(
                "Twitter {} returned {}: {}",
                endpoint, status, body
            )));
        }

        let list: UserListResponse = response.json().await?;
        Ok(list
            .data
            .into_iter()
            .take(max)
            .map(|u| u.username)
            .collect())
    }

    /// Usernames of accounts the configured account follows
    pub async fn following(&self, max: usize) -> Result<Vec<String>> {
        self.list_usernames("following", max).await
    }

    /// Usernames following the configured account
    pub async fn followers(&self, max: usize) -> Result<Vec<String>> {
        self.list_usernames("followers", max).await
    }
}

#[async_trait]
impl Publisher for TwitterClient {
    /// Create a tweet. Non-idempotent: the caller must not retry on
    /// failure, or the platform may end up with duplicate posts.
    async fn publish(&self, content: &str) -> Result<String> {
        let url = format!("{}/2/tweets", self.base_url);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.bearer_token)
            .json(&json!({ "text": content }))
            .send()
            .await
            .map_err(|e| HeraldError::Publish(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(HeraldError::Publish(format!(
                "Twitter returned {}: {}",
                status, body
            )));
        }

        let tweet: TweetResponse = response
            .json()
            .await
            .map_err(|e| HeraldError::Publish(format!("Unreadable tweet response: {}", e)))?;

        log::info!("Published tweet {}", tweet.data.id);
        Ok(tweet.data.id)
    }
}

#[async_trait]
impl SocialGraph for TwitterClient {
    async fn follower_usernames(&self, max: usize) -> Result<Vec<String>> {
        self.followers(max).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_list_deserialization() {
        let json = r#"{"data": [{"id": "1", "username": "alice"}, {"id": "2", "username": "bob"}]}"#;
        let list: UserListResponse = serde_json::from_str(json).unwrap();

        let names: Vec<_> = list.data.into_iter().map(|u| u.username).collect();
        assert_eq!(names, ["alice", "bob"]);
    }

    #[test]
    fn test_empty_user_list_deserialization() {
        // The v2 API omits `data` entirely when there are no results
        let list: UserListResponse = serde_json::from_str("{}").unwrap();
        assert!(list.data.is_empty());
    }

    #[test]
    fn test_tweet_response_deserialization() {
        let json = r#"{"data": {"id": "1790000000000000000", "text": "hello"}}"#;
        let tweet: TweetResponse = serde_json::from_str(json).unwrap();

        assert_eq!(tweet.data.id, "1790000000000000000");
    }
}
