pub mod alternatives;
pub mod grammar_service;
pub mod llm_service;
pub mod reviewer;
pub mod rubric;
pub mod segmenter;

pub use grammar_service::GrammarService;
pub use llm_service::LlmService;
pub use reviewer::{ExamReviewer, StatementReviewer};
pub use rubric::RubricEvaluator;
pub use segmenter::{match_alternative, match_marker, MarkerKind, MarkerMatch, Segmenter};
