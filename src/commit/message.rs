//! Classification of the model's reply.

use std::sync::LazyLock;

use regex_lite::Regex;

static SPLIT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)split|separate commit|multiple commit|should be committed separately")
        .unwrap_or_else(|e| panic!("invalid split pattern: {e}"))
});

/// What the model produced for the staged diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratedMessage {
    /// A commit message, possibly with a body.
    Commit(String),
    /// A suggestion to break the staged changes into several commits.
    SplitSuggestion(String),
}

impl GeneratedMessage {
    /// Classify the trimmed model output.
    pub fn classify(text: &str) -> Self {
        if SPLIT_PATTERN.is_match(text) {
            GeneratedMessage::SplitSuggestion(text.to_string())
        } else {
            GeneratedMessage::Commit(text.to_string())
        }
    }

    pub fn text(&self) -> &str {
        match self {
            GeneratedMessage::Commit(text) | GeneratedMessage::SplitSuggestion(text) => text,
        }
    }

    pub fn is_split_suggestion(&self) -> bool {
        matches!(self, GeneratedMessage::SplitSuggestion(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_commit_message() {
        let message = GeneratedMessage::classify("feat(auth): added login endpoint");
        assert_eq!(
            message,
            GeneratedMessage::Commit("feat(auth): added login endpoint".to_string())
        );
        assert!(!message.is_split_suggestion());
    }

    #[test]
    fn test_classify_split_suggestions() {
        let cases = [
            "This diff can be SPLIT into two commits",
            "Consider a separate commit for the docs",
            "These are multiple commits worth of work",
            "The config change should be committed separately.",
        ];

        for text in cases {
            let message = GeneratedMessage::classify(text);
            assert!(message.is_split_suggestion(), "expected split for: {}", text);
            assert_eq!(message.text(), text);
        }
    }
}
