use crate::{
    constants::prompts::{
        CONTENT_FOCUS_DIRECTIVES, OUTPUT_RULES, STUDY_PACK_OUTPUT_TEMPLATE, STUDY_PACK_ROLE,
    },
    models::domain::ContentAnalysis,
};

/// Renders the generation prompt. The text is interpolated verbatim; the
/// consumer is a model, not an interpreter.
pub fn build_prompt(text: &str, analysis: &ContentAnalysis) -> String {
    format!(
        "{role}

## CONTENT ANALYSIS

- Content type: {content_type}
- Complexity: {complexity}
- Length: {words} words, {sentences} sentences, {lines} lines
- Academic keyword occurrences: {keywords}

## REQUIREMENTS

- Write a summary with an overview, key points, definitions of important terms and the important concepts.
- Create exactly {flashcards} flashcards.
- Create exactly {questions} quiz questions.
- Pitch explanations and wording at a {complexity} level.

{focus}

## CONTENT

{text}

{rules}

## JSON TEMPLATE

{template}
",
        role = STUDY_PACK_ROLE,
        content_type = analysis.content_type,
        complexity = analysis.complexity,
        words = analysis.word_count,
        sentences = analysis.sentence_count,
        lines = analysis.line_count,
        keywords = analysis.keyword_hits,
        flashcards = analysis.target_flashcard_count,
        questions = analysis.target_quiz_count,
        focus = CONTENT_FOCUS_DIRECTIVES,
        text = text,
        rules = OUTPUT_RULES,
        template = STUDY_PACK_OUTPUT_TEMPLATE,
    )
}
