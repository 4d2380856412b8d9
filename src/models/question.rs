use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// 题型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionKind {
    /// 填空
    #[serde(rename = "text")]
    Text,
    /// 单选
    #[serde(rename = "single")]
    SingleChoice,
    /// 多选
    #[serde(rename = "multiple")]
    MultipleChoice,
}

impl QuestionKind {
    /// 是否为选择题
    pub fn is_choice(self) -> bool {
        !matches!(self, QuestionKind::Text)
    }

    pub fn name(self) -> &'static str {
        match self {
            QuestionKind::Text => "填空",
            QuestionKind::SingleChoice => "单选",
            QuestionKind::MultipleChoice => "多选",
        }
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub id: i64,
    #[serde(rename = "option_text")]
    pub text: String,
}

/// 题目
///
/// 目录加载后不可变，目录中的顺序即展示顺序
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    #[serde(rename = "question_text")]
    pub text: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    /// 缺省时视为空列表（填空题）
    #[serde(default)]
    pub options: Vec<QuestionOption>,
}

impl Question {
    /// 检查题目结构：选择题必须有选项，选项 ID 在题内唯一
    ///
    /// 填空题携带的选项会被清空
    pub fn normalized(mut self) -> Result<Self, String> {
        if !self.kind.is_choice() {
            self.options.clear();
            return Ok(self);
        }

        if self.options.is_empty() {
            return Err(format!("{}题 {} 没有选项", self.kind, self.id));
        }

        let mut seen = HashSet::new();
        for option in &self.options {
            if !seen.insert(option.id) {
                return Err(format!("题目 {} 的选项 ID {} 重复", self.id, option.id));
            }
        }

        Ok(self)
    }

    pub fn has_option(&self, option_id: i64) -> bool {
        self.options.iter().any(|o| o.id == option_id)
    }

    pub fn option_text(&self, option_id: i64) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.id == option_id)
            .map(|o| o.text.as_str())
    }
}
