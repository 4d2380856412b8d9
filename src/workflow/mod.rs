pub mod answer_validator;
pub mod classifier;
pub mod survey_flow;

pub use classifier::{InputHint, KeywordClassifier, QuestionClassifier, TextRule};
pub use survey_flow::{FlowState, SurveyFlow};
