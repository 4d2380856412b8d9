use std::collections::HashMap;

use super::question::QuestionKind;

/// 已通过校验的答案，题型决定变体
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Text {
        question_id: i64,
        value: String,
    },
    SingleChoice {
        question_id: i64,
        selected_option_id: i64,
    },
    /// `selected_option_ids` 非空、无重复，按题目中的选项顺序排列
    MultipleChoice {
        question_id: i64,
        selected_option_ids: Vec<i64>,
    },
}

impl Answer {
    pub fn question_id(&self) -> i64 {
        match self {
            Answer::Text { question_id, .. }
            | Answer::SingleChoice { question_id, .. }
            | Answer::MultipleChoice { question_id, .. } => *question_id,
        }
    }

    pub fn kind(&self) -> QuestionKind {
        match self {
            Answer::Text { .. } => QuestionKind::Text,
            Answer::SingleChoice { .. } => QuestionKind::SingleChoice,
            Answer::MultipleChoice { .. } => QuestionKind::MultipleChoice,
        }
    }
}

/// 表现层交给流程的原始输入
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawInput {
    /// 文本框内容（未修剪）
    Text(String),
    /// 单选：当前选中的选项，`None` 表示未选择
    Choice(Option<i64>),
    /// 多选：当前勾选的选项
    Choices(Vec<i64>),
}

impl RawInput {
    pub fn text(value: impl Into<String>) -> Self {
        RawInput::Text(value.into())
    }

    pub fn choice(option_id: i64) -> Self {
        RawInput::Choice(Some(option_id))
    }

    pub fn choices(option_ids: impl IntoIterator<Item = i64>) -> Self {
        RawInput::Choices(option_ids.into_iter().collect())
    }
}

/// 答案集合：每道题最多一个答案
///
/// 离开题目时整条插入或替换，不做合并
#[derive(Debug, Clone, Default)]
pub struct AnswerCollection {
    entries: HashMap<i64, Answer>,
}

impl AnswerCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入答案，返回被替换的旧答案
    pub fn upsert(&mut self, answer: Answer) -> Option<Answer> {
        self.entries.insert(answer.question_id(), answer)
    }

    pub fn get(&self, question_id: i64) -> Option<&Answer> {
        self.entries.get(&question_id)
    }

    pub fn contains(&self, question_id: i64) -> bool {
        self.entries.contains_key(&question_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
