//! Knowledge base lookup with string-similarity matching
//!
//! Scores every stored question against the query with the
//! Sørensen–Dice coefficient and returns the single best match. The
//! threshold policy lives with the caller; the corpus only ranks.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone)]
pub struct KnowledgeMatch {
    pub question: String,
    pub answer: String,
    pub score: f64,
}

pub struct KnowledgeBase {
    entries: Vec<KnowledgeEntry>,
}

impl KnowledgeBase {
    pub fn new(entries: Vec<KnowledgeEntry>) -> Self {
        Self { entries }
    }

    /// Load the corpus from a JSON file. A missing file is an empty
    /// corpus, not an error.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            log::warn!(
                "Knowledge base file {} not found; starting with an empty corpus",
                path.display()
            );
            return Ok(Self::new(Vec::new()));
        }

        let json = std::fs::read_to_string(path)?;
        let entries: Vec<KnowledgeEntry> = serde_json::from_str(&json)?;

        log::info!(
            "Loaded {} knowledge entries from {}",
            entries.len(),
            path.display()
        );
        Ok(Self::new(entries))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Best-scoring entry for the query, or `None` on an empty corpus
    pub fn best_match(&self, query: &str) -> Option<KnowledgeMatch> {
        let query = query.to_lowercase();

        self.entries
            .iter()
            .map(|entry| KnowledgeMatch {
                question: entry.question.clone(),
                answer: entry.answer.clone(),
                score: strsim::sorensen_dice(&query, &entry.question.to_lowercase()),
            })
            .max_by(|a, b| a.score.total_cmp(&b.score))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn superteam_corpus() -> KnowledgeBase {
        KnowledgeBase::new(vec![
            KnowledgeEntry {
                question: "What is Superteam?".to_string(),
                answer: "A community.".to_string(),
            },
            KnowledgeEntry {
                question: "How do I join?".to_string(),
                answer: "Apply through the website.".to_string(),
            },
        ])
    }

    #[test]
    fn test_exact_question_scores_above_threshold() {
        let kb = superteam_corpus();
        let m = kb.best_match("What is Superteam?").unwrap();

        assert!(m.score >= 0.3, "score was {}", m.score);
        assert_eq!(m.answer, "A community.");
    }

    #[test]
    fn test_gibberish_scores_below_threshold() {
        let kb = superteam_corpus();
        let m = kb.best_match("asdkjasd").unwrap();

        assert!(m.score < 0.3, "score was {}", m.score);
    }

    #[test]
    fn test_empty_corpus_has_no_match() {
        let kb = KnowledgeBase::new(Vec::new());
        assert!(kb.best_match("anything").is_none());
    }

    #[test]
    fn test_best_of_multiple_entries_wins() {
        let kb = superteam_corpus();
        let m = kb.best_match("how do i join").unwrap();

        assert_eq!(m.question, "How do I join?");
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let kb = superteam_corpus();
        let m = kb.best_match("WHAT IS SUPERTEAM?").unwrap();

        assert!(m.score >= 0.9, "score was {}", m.score);
        assert_eq!(m.answer, "A community.");
    }

    #[test]
    fn test_load_missing_file_is_empty_corpus() {
        let kb = KnowledgeBase::load("/nonexistent/knowledge_base.json").unwrap();
        assert!(kb.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("kb.json");
        std::fs::write(
            &path,
            r#"[{"question": "What is Superteam?", "answer": "A community."}]"#,
        )
        .unwrap();

        let kb = KnowledgeBase::load(&path).unwrap();
        assert_eq!(kb.len(), 1);
    }
}
