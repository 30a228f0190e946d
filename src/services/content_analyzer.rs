use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    constants::prompts::ACADEMIC_KEYWORDS,
    models::domain::{Complexity, ContentAnalysis, ContentType},
};

const MAX_ADAPTIVE_ITEMS: usize = 30;

static SENTENCE_BREAKS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+").expect("SENTENCE_BREAKS is a valid regex pattern"));

static KEYWORDS: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(r"(?i)\b(?:{})\b", ACADEMIC_KEYWORDS.join("|"));
    Regex::new(&pattern).expect("KEYWORDS is a valid regex pattern")
});

/// How many flashcards and quiz items to request for a piece of text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SizingPolicy {
    /// Word, keyword, sentence and line driven target, capped at 30.
    /// Flashcards and quiz share the same target.
    #[default]
    Adaptive,
    /// Independent clamps on word count: flashcards in 5..=20, quiz in 3..=12.
    Proportional,
}

impl FromStr for SizingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "adaptive" => Ok(SizingPolicy::Adaptive),
            "proportional" => Ok(SizingPolicy::Proportional),
            other => Err(format!("unknown sizing policy '{}'", other)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextMetrics {
    pub word_count: usize,
    pub sentence_count: usize,
    pub line_count: usize,
    pub keyword_hits: usize,
}

impl TextMetrics {
    pub fn measure(text: &str) -> Self {
        Self {
            word_count: text.split_whitespace().count(),
            // Trailing text after the last terminator counts as a segment,
            // so "One. Two." yields 3.
            sentence_count: SENTENCE_BREAKS.split(text).count(),
            line_count: text.lines().filter(|l| !l.trim().is_empty()).count(),
            keyword_hits: KEYWORDS.find_iter(text).count(),
        }
    }
}

pub fn analyze(text: &str) -> ContentAnalysis {
    analyze_with(text, SizingPolicy::Adaptive)
}

pub fn analyze_with(text: &str, policy: SizingPolicy) -> ContentAnalysis {
    let metrics = TextMetrics::measure(text);
    let non_empty = !text.trim().is_empty();

    let (target_flashcard_count, target_quiz_count) = match policy {
        SizingPolicy::Adaptive => {
            let target = adaptive_target(&metrics, non_empty);
            (target, target)
        }
        SizingPolicy::Proportional => proportional_targets(metrics.word_count),
    };

    ContentAnalysis {
        word_count: metrics.word_count,
        sentence_count: metrics.sentence_count,
        line_count: metrics.line_count,
        keyword_hits: metrics.keyword_hits,
        target_flashcard_count,
        target_quiz_count,
        content_type: classify_content(&metrics),
        complexity: classify_complexity(metrics.word_count),
    }
}

pub fn adaptive_target(metrics: &TextMetrics, non_empty: bool) -> usize {
    let mut target = metrics.word_count / 25 + metrics.keyword_hits / 2;
    if target == 0 && non_empty {
        target = 1;
    }
    if metrics.sentence_count > 20 {
        target += 2;
    }
    if metrics.line_count > 15 {
        target += 2;
    }
    if metrics.keyword_hits > 10 {
        target += 3;
    }
    target.min(MAX_ADAPTIVE_ITEMS)
}

pub fn proportional_targets(word_count: usize) -> (usize, usize) {
    let flashcards = (word_count / 40).clamp(5, 20);
    let questions = (word_count / 80).clamp(3, 12);
    (flashcards, questions)
}

fn classify_content(metrics: &TextMetrics) -> ContentType {
    if metrics.keyword_hits > 5 {
        ContentType::Academic
    } else if metrics.word_count > 200 {
        ContentType::Detailed
    } else {
        ContentType::Basic
    }
}

fn classify_complexity(word_count: usize) -> Complexity {
    if word_count > 500 {
        Complexity::Advanced
    } else if word_count > 200 {
        Complexity::Intermediate
    } else {
        Complexity::Beginner
    }
}
