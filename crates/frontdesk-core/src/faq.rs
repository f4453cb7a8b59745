//! Keyword-scored lookup over a static FAQ list.
//!
//! Matching is a length-filtered keyword scan, not search: query words longer
//! than three characters are matched as substrings of each entry's lowercased
//! question and answer. It is deterministic and cheap, which is what lets the
//! resolver consult it on every message before paying for a provider call.

use crate::error::FaqError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One question/answer record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub id: u32,
    pub question: String,
    pub answer: String,
    pub category: String,
}

/// A scored hit returned by [`FaqIndex::search`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaqMatch<'a> {
    pub entry: &'a FaqEntry,
    pub score: u32,
}

/// Immutable index over the FAQ list, loaded once at startup.
#[derive(Debug)]
pub struct FaqIndex {
    entries: Vec<FaqEntry>,
}

impl FaqIndex {
    pub fn new(entries: Vec<FaqEntry>) -> Self {
        Self { entries }
    }

    /// Build the index from the built-in starter set.
    pub fn with_defaults() -> Self {
        Self::new(default_entries())
    }

    /// Parse a JSON array of entries.
    pub fn from_json_str(raw: &str) -> Result<Self, FaqError> {
        let entries: Vec<FaqEntry> = serde_json::from_str(raw)?;
        Ok(Self::new(entries))
    }

    /// Load a JSON entry file from disk.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, FaqError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn all(&self) -> &[FaqEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in the given category, in list order.
    pub fn by_category(&self, category: &str) -> Vec<&FaqEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.category == category)
            .collect()
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if !seen.contains(&entry.category.as_str()) {
                seen.push(&entry.category);
            }
        }
        seen
    }

    /// Score every entry against the query and return the hits, best first.
    ///
    /// Each query word longer than three characters adds 3 to an entry's
    /// score when it occurs in the lowercased question and 1 when it occurs
    /// in the lowercased answer. Entries scoring 0 are dropped; ties keep
    /// list order.
    pub fn search(&self, query: &str) -> Vec<FaqMatch<'_>> {
        let words = keywords(query);
        if words.is_empty() {
            return Vec::new();
        }

        let mut matches: Vec<FaqMatch<'_>> = self
            .entries
            .iter()
            .filter_map(|entry| {
                let question = entry.question.to_lowercase();
                let answer = entry.answer.to_lowercase();
                let mut score = 0;
                for word in &words {
                    if question.contains(word.as_str()) {
                        score += 3;
                    }
                    if answer.contains(word.as_str()) {
                        score += 1;
                    }
                }
                (score > 0).then_some(FaqMatch { entry, score })
            })
            .collect();
        matches.sort_by(|a, b| b.score.cmp(&a.score));
        matches
    }

    /// The top hit, if it scores at least `threshold`.
    pub fn best_match(&self, query: &str, threshold: u32) -> Option<FaqMatch<'_>> {
        self.search(query)
            .into_iter()
            .next()
            .filter(|hit| hit.score >= threshold)
    }
}

/// Lowercased query words that survive the length filter. Words keep their
/// punctuation so `password?` matches a question ending the same way.
fn keywords(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .filter(|word| word.chars().count() > 3)
        .map(str::to_string)
        .collect()
}

fn default_entries() -> Vec<FaqEntry> {
    vec![
        FaqEntry {
            id: 1,
            question: "How can I reset my password?".to_string(),
            answer: "Visit Settings > Reset Password.".to_string(),
            category: "account".to_string(),
        },
        FaqEntry {
            id: 2,
            question: "How long does shipping take?".to_string(),
            answer: "Standard shipping takes 5-7 business days. Express shipping arrives in 1-2 business days.".to_string(),
            category: "shipping".to_string(),
        },
        FaqEntry {
            id: 3,
            question: "Which payment methods do you accept?".to_string(),
            answer: "We accept credit cards, debit cards, and PayPal.".to_string(),
            category: "billing".to_string(),
        },
        FaqEntry {
            id: 4,
            question: "How do I request a refund?".to_string(),
            answer: "Refunds can be requested within 30 days of purchase from your order page.".to_string(),
            category: "billing".to_string(),
        },
        FaqEntry {
            id: 5,
            question: "How do I contact customer support?".to_string(),
            answer: "You can reach our support team through this chat or by email at support@example.com.".to_string(),
            category: "support".to_string(),
        },
        FaqEntry {
            id: 6,
            question: "When is customer support available?".to_string(),
            answer: "Our support team is available Monday to Friday, 9am to 6pm.".to_string(),
            category: "support".to_string(),
        },
    ]
}
