pub mod answer;
pub mod location;
pub mod payload;
pub mod question;
pub mod session;

pub use answer::{Answer, AnswerCollection, RawInput};
pub use location::{Area, UserProfile, Ward};
pub use payload::{AnswerDto, AnswerValue, SubmissionPayload};
pub use question::{Question, QuestionKind, QuestionOption};
pub use session::{FlowContext, Session};
