pub mod content_analysis;
pub mod raw_input;
pub mod study_pack;
pub use content_analysis::{Complexity, ContentAnalysis, ContentType};
pub use raw_input::RawInput;
pub use study_pack::{Definition, Flashcard, QuizItem, StudyPack, Summary};
