use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

use crate::models::domain::StudyPack;

static CODE_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^\s*```(?:json|JSON)?[ \t]*\r?\n?(.*?)\r?\n?\s*```\s*$")
        .expect("CODE_FENCE is a valid regex pattern")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("model output is not valid JSON: {0}")]
    MalformedJson(String),
    #[error("model output is missing summary, flashcards or quiz")]
    IncompleteStructure,
    #[error("model output has no flashcards")]
    EmptyFlashcards,
    #[error("model output has no quiz questions")]
    EmptyQuiz,
    #[error("model output has an invalid item: {0}")]
    InvalidItem(String),
}

/// Removes a surrounding ```json / ``` fence. Unfenced input is returned as is.
pub fn strip_code_fence(raw: &str) -> &str {
    CODE_FENCE
        .captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(raw)
}

pub fn normalize(raw: &str) -> Result<StudyPack, ValidationError> {
    let body = strip_code_fence(raw).trim();

    let value: Value =
        serde_json::from_str(body).map_err(|e| ValidationError::MalformedJson(e.to_string()))?;

    if !["summary", "flashcards", "quiz"]
        .iter()
        .all(|field| is_truthy(value.get(field)))
    {
        return Err(ValidationError::IncompleteStructure);
    }

    if !is_non_empty_array(value.get("flashcards")) {
        return Err(ValidationError::EmptyFlashcards);
    }
    if !is_non_empty_array(value.get("quiz")) {
        return Err(ValidationError::EmptyQuiz);
    }

    let pack: StudyPack =
        serde_json::from_value(value).map_err(|e| ValidationError::InvalidItem(e.to_string()))?;
    pack.check_items().map_err(ValidationError::InvalidItem)?;

    Ok(pack)
}

fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

fn is_non_empty_array(value: Option<&Value>) -> bool {
    value
        .and_then(Value::as_array)
        .is_some_and(|items| !items.is_empty())
}
