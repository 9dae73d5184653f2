//! Transcript words and sentence boundaries.

use serde::{Deserialize, Serialize};

/// One transcribed token with millisecond timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    /// Token text, trimmed, possibly carrying trailing punctuation
    pub text: String,
    /// Start time in milliseconds
    pub start_ms: u64,
    /// End time in milliseconds
    pub end_ms: u64,
}

impl Word {
    /// Create a new word.
    pub fn new(text: impl Into<String>, start_ms: u64, end_ms: u64) -> Self {
        Self {
            text: text.into(),
            start_ms,
            end_ms,
        }
    }

    /// Whether the word text ends a sentence (terminal `.`, `?` or `!`).
    pub fn ends_sentence(&self) -> bool {
        self.terminal_punctuation().is_some()
    }

    /// The terminal punctuation kind, if any.
    pub fn terminal_punctuation(&self) -> Option<PunctuationKind> {
        match self.text.trim_end().chars().last() {
            Some('.') => Some(PunctuationKind::Period),
            Some('?') => Some(PunctuationKind::Question),
            Some('!') => Some(PunctuationKind::Exclamation),
            _ => None,
        }
    }

    /// Whether `t_ms` falls strictly inside this word (not on a boundary).
    pub fn contains_interior(&self, t_ms: u64) -> bool {
        t_ms > self.start_ms && t_ms < self.end_ms
    }
}

/// Terminal punctuation that closes a sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PunctuationKind {
    Period,
    Question,
    Exclamation,
}

/// A position at which a sentence ends, derived from word text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentenceBoundary {
    /// Timestamp of the boundary (end of the sentence-final word), ms
    pub at_ms: u64,
    /// The punctuation that closed the sentence
    pub kind: PunctuationKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_punctuation() {
        assert_eq!(
            Word::new("done.", 0, 100).terminal_punctuation(),
            Some(PunctuationKind::Period)
        );
        assert_eq!(
            Word::new("really?", 0, 100).terminal_punctuation(),
            Some(PunctuationKind::Question)
        );
        assert_eq!(
            Word::new("wow! ", 0, 100).terminal_punctuation(),
            Some(PunctuationKind::Exclamation)
        );
        assert_eq!(Word::new("and", 0, 100).terminal_punctuation(), None);
    }

    #[test]
    fn test_contains_interior() {
        let w = Word::new("hello", 100, 400);
        assert!(w.contains_interior(250));
        assert!(!w.contains_interior(100));
        assert!(!w.contains_interior(400));
        assert!(!w.contains_interior(500));
    }
}
