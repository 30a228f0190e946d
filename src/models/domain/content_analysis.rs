use std::fmt;

use serde::{Deserialize, Serialize};

/// Shape metrics derived from submitted text, plus the item counts and labels
/// the prompt asks the model for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentAnalysis {
    pub word_count: usize,
    pub sentence_count: usize,
    pub line_count: usize,
    pub keyword_hits: usize,
    pub target_flashcard_count: usize,
    pub target_quiz_count: usize,
    pub content_type: ContentType,
    pub complexity: Complexity,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Basic,
    Detailed,
    Academic,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Beginner,
    Intermediate,
    Advanced,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Basic => "basic",
            ContentType::Detailed => "detailed",
            ContentType::Academic => "academic",
        }
    }
}

impl Complexity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Beginner => "beginner",
            Complexity::Intermediate => "intermediate",
            Complexity::Advanced => "advanced",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
