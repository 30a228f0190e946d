use serde::{Deserialize, Serialize};

pub const QUIZ_OPTION_COUNT: usize = 4;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct StudyPack {
    pub summary: Summary,
    pub flashcards: Vec<Flashcard>,
    pub quiz: Vec<QuizItem>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub overview: String,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub definitions: Vec<Definition>,
    #[serde(default)]
    pub important_concepts: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Definition {
    pub term: String,
    pub definition: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Flashcard {
    pub question: String,
    pub answer: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuizItem {
    pub question: String,
    pub options: Vec<String>,
    pub correct: usize, // index into options
    #[serde(default)]
    pub explanation: String,
}

impl StudyPack {
    /// Checks every item against the output contract and returns the first
    /// violation found, described with its position.
    pub fn check_items(&self) -> Result<(), String> {
        if self.summary.overview.trim().is_empty() {
            return Err("summary.overview is empty".to_string());
        }

        for (i, definition) in self.summary.definitions.iter().enumerate() {
            if definition.term.trim().is_empty() || definition.definition.trim().is_empty() {
                return Err(format!("summary.definitions[{}] has an empty field", i));
            }
        }

        for (i, card) in self.flashcards.iter().enumerate() {
            if card.question.trim().is_empty() {
                return Err(format!("flashcards[{}].question is empty", i));
            }
            if card.answer.trim().is_empty() {
                return Err(format!("flashcards[{}].answer is empty", i));
            }
        }

        for (i, item) in self.quiz.iter().enumerate() {
            item.check().map_err(|reason| format!("quiz[{}] {}", i, reason))?;
        }

        Ok(())
    }
}

impl QuizItem {
    fn check(&self) -> Result<(), String> {
        if self.question.trim().is_empty() {
            return Err("question is empty".to_string());
        }
        if self.options.len() != QUIZ_OPTION_COUNT {
            return Err(format!(
                "has {} options, expected {}",
                self.options.len(),
                QUIZ_OPTION_COUNT
            ));
        }
        if self.options.iter().any(|o| o.trim().is_empty()) {
            return Err("has an empty option".to_string());
        }
        if self.correct >= self.options.len() {
            return Err(format!("correct index {} is out of range", self.correct));
        }
        Ok(())
    }
}
