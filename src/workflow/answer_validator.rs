//! 答案采集与校验
//!
//! 把表现层的原始输入转成 `Answer`，规则按题型区分

use regex::Regex;

use crate::error::ValidationError;
use crate::models::{Answer, Question, QuestionKind, RawInput};
use crate::workflow::classifier::{QuestionClassifier, TextRule};

const PHONE_PATTERN: &str = r"^[0-9]{10}$";

/// 校验原始输入并生成答案
pub fn capture(
    question: &Question,
    raw: &RawInput,
    classifier: &dyn QuestionClassifier,
) -> Result<Answer, ValidationError> {
    match (question.kind, raw) {
        (QuestionKind::Text, RawInput::Text(value)) => capture_text(question, value, classifier),
        (QuestionKind::SingleChoice, RawInput::Choice(selected)) => {
            capture_single(question, *selected)
        }
        (QuestionKind::MultipleChoice, RawInput::Choices(selected)) => {
            capture_multiple(question, selected)
        }
        (expected, _) => Err(ValidationError::KindMismatch { expected }),
    }
}

fn capture_text(
    question: &Question,
    value: &str,
    classifier: &dyn QuestionClassifier,
) -> Result<Answer, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::EmptyRequired);
    }

    if classifier.validation_rule(question) == TextRule::PhoneNumber && !is_phone_number(value) {
        return Err(ValidationError::FormatMismatch("phone".to_string()));
    }

    Ok(Answer::Text {
        question_id: question.id,
        value: value.to_string(),
    })
}

fn capture_single(question: &Question, selected: Option<i64>) -> Result<Answer, ValidationError> {
    match selected {
        Some(option_id) if question.has_option(option_id) => Ok(Answer::SingleChoice {
            question_id: question.id,
            selected_option_id: option_id,
        }),
        _ => Err(ValidationError::NoSelection),
    }
}

fn capture_multiple(question: &Question, selected: &[i64]) -> Result<Answer, ValidationError> {
    if selected.is_empty() || selected.iter().any(|id| !question.has_option(*id)) {
        return Err(ValidationError::NoSelection);
    }

    // 去重并按题目中的选项顺序排列
    let selected_option_ids = question
        .options
        .iter()
        .map(|o| o.id)
        .filter(|id| selected.contains(id))
        .collect();

    Ok(Answer::MultipleChoice {
        question_id: question.id,
        selected_option_ids,
    })
}

/// 恰好 10 位 ASCII 数字
pub fn is_phone_number(value: &str) -> bool {
    Regex::new(PHONE_PATTERN)
        .map(|re| re.is_match(value))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuestionOption;
    use crate::workflow::classifier::KeywordClassifier;

    fn text(id: i64, text: &str) -> Question {
        Question {
            id,
            text: text.to_string(),
            kind: QuestionKind::Text,
            options: Vec::new(),
        }
    }

    fn choice(id: i64, kind: QuestionKind, option_ids: &[i64]) -> Question {
        Question {
            id,
            text: "Issues".to_string(),
            kind,
            options: option_ids
                .iter()
                .map(|&id| QuestionOption {
                    id,
                    text: format!("Option {}", id),
                })
                .collect(),
        }
    }

    fn run(question: &Question, raw: RawInput) -> Result<Answer, ValidationError> {
        capture(question, &raw, &KeywordClassifier)
    }

    #[test]
    fn test_plain_text_accepts_any_non_empty() {
        let question = text(1, "Full Name");
        for value in ["Asha Rao", "x", "  42  ", "名字"] {
            assert!(run(&question, RawInput::text(value)).is_ok(), "{}", value);
        }
        assert_eq!(
            run(&question, RawInput::text("  Asha Rao  ")),
            Ok(Answer::Text {
                question_id: 1,
                value: "Asha Rao".to_string()
            })
        );
    }

    #[test]
    fn test_text_empty_after_trim() {
        let question = text(1, "Full Name");
        assert_eq!(
            run(&question, RawInput::text("   \t ")),
            Err(ValidationError::EmptyRequired)
        );
    }

    #[test]
    fn test_phone_requires_ten_digits() {
        let question = text(4, "Mobile Number");
        for value in ["12345", "12345678901", "12345abcde", "98765", "٩٨٧٦٥٤٣٢١٠"] {
            assert_eq!(
                run(&question, RawInput::text(value)),
                Err(ValidationError::FormatMismatch("phone".to_string())),
                "{}",
                value
            );
        }
        assert!(run(&question, RawInput::text("9876543210")).is_ok());
        assert!(run(&question, RawInput::text(" 9876543210 ")).is_ok());
    }

    #[test]
    fn test_age_has_no_core_validation() {
        let question = text(5, "Age");
        assert!(run(&question, RawInput::text("forty")).is_ok());
    }

    #[test]
    fn test_single_choice() {
        let question = choice(2, QuestionKind::SingleChoice, &[10, 11]);
        assert_eq!(
            run(&question, RawInput::choice(10)),
            Ok(Answer::SingleChoice {
                question_id: 2,
                selected_option_id: 10
            })
        );
        assert_eq!(
            run(&question, RawInput::choice(12)),
            Err(ValidationError::NoSelection)
        );
        assert_eq!(
            run(&question, RawInput::Choice(None)),
            Err(ValidationError::NoSelection)
        );
    }

    #[test]
    fn test_multiple_choice() {
        let question = choice(3, QuestionKind::MultipleChoice, &[20, 21, 22]);
        assert_eq!(
            run(&question, RawInput::choices([22, 20, 22])),
            Ok(Answer::MultipleChoice {
                question_id: 3,
                selected_option_ids: vec![20, 22]
            })
        );
        assert_eq!(
            run(&question, RawInput::Choices(Vec::new())),
            Err(ValidationError::NoSelection)
        );
        assert_eq!(
            run(&question, RawInput::choices([20, 99])),
            Err(ValidationError::NoSelection)
        );
    }

    #[test]
    fn test_kind_mismatch() {
        let question = choice(2, QuestionKind::SingleChoice, &[10, 11]);
        assert_eq!(
            run(&question, RawInput::text("10")),
            Err(ValidationError::KindMismatch {
                expected: QuestionKind::SingleChoice
            })
        );
    }
}
