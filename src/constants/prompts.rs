/// Academic and structural terms whose presence marks study material as dense.
pub const ACADEMIC_KEYWORDS: [&str; 32] = [
    "concept",
    "definition",
    "theory",
    "principle",
    "process",
    "mechanism",
    "function",
    "structure",
    "system",
    "method",
    "analysis",
    "example",
    "characteristic",
    "property",
    "factor",
    "element",
    "component",
    "relationship",
    "cause",
    "effect",
    "result",
    "conclusion",
    "hypothesis",
    "evidence",
    "research",
    "study",
    "experiment",
    "model",
    "framework",
    "approach",
    "technique",
    "strategy",
];

pub const STUDY_PACK_ROLE: &str = "You are an expert educator and study-guide author. You turn study material into accurate, well-structured learning resources: a summary, flashcards and a multiple-choice quiz. Every fact you use must come from the provided content.";

pub const CONTENT_FOCUS_DIRECTIVES: &str = "## CONTENT FOCUS

- Key concepts and the definitions that introduce them
- Mechanisms and processes, including the order of their steps
- Relationships between ideas: causes, effects, comparisons and dependencies
- Practical applications and worked examples present in the content
- Vary question difficulty; avoid trivia and questions answerable without the content";

pub const OUTPUT_RULES: &str = "## OUTPUT RULES

- Return ONLY a single JSON object. No markdown, no code fences, no commentary.
- Use exactly the field names shown in the template.
- Every quiz item has exactly 4 options and \"correct\" is the zero-based index of the right option.
- Every explanation says why the correct option is right.";

pub const STUDY_PACK_OUTPUT_TEMPLATE: &str = r#"{
  "summary": {
    "overview": "A comprehensive 2-3 paragraph overview of the content",
    "keyPoints": ["Key point 1", "Key point 2"],
    "definitions": [
      { "term": "Term", "definition": "Definition of the term" }
    ],
    "importantConcepts": ["Concept 1", "Concept 2"]
  },
  "flashcards": [
    { "question": "Question testing one idea", "answer": "Concise answer" }
  ],
  "quiz": [
    {
      "question": "Multiple-choice question",
      "options": ["Option A", "Option B", "Option C", "Option D"],
      "correct": 0,
      "explanation": "Why this option is correct"
    }
  ]
}"#;

/// Tiny prompt for the connectivity check; keeps token usage negligible.
pub const CONNECTIVITY_PROMPT: &str = "Reply with the single word OK.";

pub const TRUNCATION_NOTE: &str =
    "\n\n[Note: this content was truncated because it exceeded the maximum length. Focus on the material above.]";
