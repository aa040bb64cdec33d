//! Query answering: knowledge-base hit or generated fallback

use super::knowledge::KnowledgeBase;
use crate::workflow::traits::TextGenerator;
use std::sync::Arc;

/// Reply used whenever generation fails; generation errors never
/// propagate past this service.
pub const FALLBACK_REPLY: &str = "Sorry, I couldn't generate a response.";

pub struct QueryResponder {
    knowledge: KnowledgeBase,
    generator: Arc<dyn TextGenerator>,
    similarity_threshold: f64,
}

impl QueryResponder {
    pub fn new(
        knowledge: KnowledgeBase,
        generator: Arc<dyn TextGenerator>,
        similarity_threshold: f64,
    ) -> Self {
        Self {
            knowledge,
            generator,
            similarity_threshold,
        }
    }

    /// Answer a user question. A knowledge entry at or above the
    /// threshold is returned verbatim; anything else goes to the
    /// generator.
    pub async fn answer(&self, query: &str) -> String {
        if let Some(m) = self.knowledge.best_match(query) {
            if m.score >= self.similarity_threshold {
                log::debug!(
                    "Knowledge hit for query (score {:.2}): {}",
                    m.score,
                    m.question
                );
                return m.answer;
            }
            log::debug!("Best knowledge score {:.2} below threshold", m.score);
        }

        match self.generator.generate(query).await {
            Ok(text) => text,
            Err(e) => {
                log::warn!("Falling back to canned reply: {}", e);
                FALLBACK_REPLY.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{HeraldError, Result};
    use crate::services::knowledge::KnowledgeEntry;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubGenerator {
        reply: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl StubGenerator {
        fn answering(reply: &'static str) -> Self {
            Self {
                reply: Some(reply),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                reply: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for StubGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.reply {
                Some(reply) => Ok(reply.to_string()),
                None => Err(HeraldError::Generation("model offline".to_string())),
            }
        }
    }

    fn corpus() -> KnowledgeBase {
        KnowledgeBase::new(vec![KnowledgeEntry {
            question: "What is Superteam?".to_string(),
            answer: "A community.".to_string(),
        }])
    }

    #[tokio::test]
    async fn test_knowledge_hit_returns_answer_verbatim() {
        let generator = Arc::new(StubGenerator::answering("generated"));
        let responder = QueryResponder::new(corpus(), generator.clone(), 0.3);

        let reply = responder.answer("What is Superteam?").await;

        assert_eq!(reply, "A community.");
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_low_score_falls_through_to_generator() {
        let generator = Arc::new(StubGenerator::answering("generated"));
        let responder = QueryResponder::new(corpus(), generator.clone(), 0.3);

        let reply = responder.answer("asdkjasd").await;

        assert_eq!(reply, "generated");
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_generation_failure_yields_fixed_fallback() {
        let generator = Arc::new(StubGenerator::failing());
        let responder = QueryResponder::new(corpus(), generator, 0.3);

        let reply = responder.answer("asdkjasd").await;

        assert_eq!(reply, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn test_empty_corpus_always_generates() {
        let generator = Arc::new(StubGenerator::answering("generated"));
        let responder = QueryResponder::new(KnowledgeBase::new(Vec::new()), generator, 0.3);

        assert_eq!(responder.answer("hello").await, "generated");
    }
}
