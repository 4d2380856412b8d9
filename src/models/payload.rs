use serde::{Deserialize, Serialize};

use super::answer::Answer;
use super::session::FlowContext;

/// 单个答案的载荷值，三者有且只有一个
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerValue {
    AnswerText(String),
    SelectedOptionId(i64),
    SelectedOptionIds(Vec<i64>),
}

/// 提交接口中的一条答案
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerDto {
    pub question_id: i64,
    #[serde(flatten)]
    pub value: AnswerValue,
}

impl AnswerDto {
    /// 由答案构造载荷
    ///
    /// 文本为空白、多选为空时返回 `None`，调用方丢弃该条
    pub fn from_answer(answer: &Answer) -> Option<Self> {
        let value = match answer {
            Answer::Text { value, .. } => {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    return None;
                }
                AnswerValue::AnswerText(trimmed.to_string())
            }
            Answer::SingleChoice {
                selected_option_id, ..
            } => AnswerValue::SelectedOptionId(*selected_option_id),
            Answer::MultipleChoice {
                selected_option_ids,
                ..
            } => {
                if selected_option_ids.is_empty() {
                    return None;
                }
                AnswerValue::SelectedOptionIds(selected_option_ids.clone())
            }
        };

        Some(Self {
            question_id: answer.question_id(),
            value,
        })
    }
}

/// 提交到 `POST /api/responses` 的完整载荷
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionPayload {
    pub user_id: i64,
    pub survey_id: i64,
    pub area_id: i64,
    pub ward_id: i64,
    pub answers: Vec<AnswerDto>,
}

impl SubmissionPayload {
    pub fn new(context: &FlowContext, answers: Vec<AnswerDto>) -> Self {
        Self {
            user_id: context.user_id,
            survey_id: context.survey_id,
            area_id: context.area_id,
            ward_id: context.ward_id,
            answers,
        }
    }
}
