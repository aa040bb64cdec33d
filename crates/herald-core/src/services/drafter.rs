//! Post drafting and enhancement

use crate::error::Result;
use crate::workflow::traits::{SocialGraph, TextGenerator};
use std::sync::Arc;

/// Mentions appended to a draft for engagement
const MAX_MENTIONS: usize = 3;

pub struct PostDrafter {
    generator: Arc<dyn TextGenerator>,
    social: Arc<dyn SocialGraph>,
}

impl PostDrafter {
    pub fn new(generator: Arc<dyn TextGenerator>, social: Arc<dyn SocialGraph>) -> Self {
        Self { generator, social }
    }

    /// Draft a fresh post about a topic
    pub async fn draft(&self, topic: &str) -> Result<String> {
        let prompt = format!(
            "Write a short, engaging social media post about: {}",
            topic
        );
        let text = self.generator.generate(&prompt).await?;
        Ok(self.decorate(text).await)
    }

    /// Rework an existing draft for better engagement
    pub async fn enhance(&self, draft: &str) -> Result<String> {
        let prompt = format!("Improve this tweet for better engagement: \"{}\"", draft);
        let text = self.generator.generate(&prompt).await?;
        Ok(self.decorate(text).await)
    }

    /// Append follower mentions. Best effort: a failed lookup degrades
    /// to an undecorated post.
    async fn decorate(&self, text: String) -> String {
        let followers = match self.social.follower_usernames(MAX_MENTIONS).await {
            Ok(followers) => followers,
            Err(e) => {
                log::warn!("Skipping mention decoration: {}", e);
                Vec::new()
            }
        };

        if followers.is_empty() {
            return text.trim().to_string();
        }

        let mentions: Vec<String> = followers
            .iter()
            .take(MAX_MENTIONS)
            .map(|u| format!("@{}", u))
            .collect();

        format!("{}\n\n{}", text.trim(), mentions.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HeraldError;
    use async_trait::async_trait;

    struct StubGenerator;

    #[async_trait]
    impl TextGenerator for StubGenerator {
        async fn generate(&self, prompt: &str) -> Result<String> {
            assert!(!prompt.is_empty());
            Ok("A post about the community. ".to_string())
        }
    }

    struct StubSocialGraph {
        followers: Result<Vec<String>>,
    }

    #[async_trait]
    impl SocialGraph for StubSocialGraph {
        async fn follower_usernames(&self, _max: usize) -> Result<Vec<String>> {
            match &self.followers {
                Ok(followers) => Ok(followers.clone()),
                Err(_) => Err(HeraldError::ServiceUnavailable("rate limited".to_string())),
            }
        }
    }

    #[tokio::test]
    async fn test_draft_appends_mentions() {
        let drafter = PostDrafter::new(
            Arc::new(StubGenerator),
            Arc::new(StubSocialGraph {
                followers: Ok(vec!["alice".to_string(), "bob".to_string()]),
            }),
        );

        let post = drafter.draft("hackathons").await.unwrap();

        assert_eq!(post, "A post about the community.\n\n@alice @bob");
    }

    #[tokio::test]
    async fn test_failed_follower_lookup_degrades_to_plain_post() {
        let drafter = PostDrafter::new(
            Arc::new(StubGenerator),
            Arc::new(StubSocialGraph {
                followers: Err(HeraldError::ServiceUnavailable("rate limited".to_string())),
            }),
        );

        let post = drafter.draft("hackathons").await.unwrap();

        assert_eq!(post, "A post about the community.");
    }

    #[tokio::test]
    async fn test_no_followers_means_no_trailing_mentions() {
        let drafter = PostDrafter::new(
            Arc::new(StubGenerator),
            Arc::new(StubSocialGraph {
                followers: Ok(Vec::new()),
            }),
        );

        let post = drafter.enhance("old draft").await.unwrap();

        assert!(!post.contains('@'));
    }
}
