//! 题目分类
//!
//! 根据题干关键词决定填空题的校验规则与输入提示。两者刻意分开：
//! 只有手机号参与校验，姓名、年龄只影响输入方式

use phf::phf_set;

use crate::models::Question;

/// 填空题的校验规则
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRule {
    /// 非空即可
    Required,
    /// 10 位数字手机号
    PhoneNumber,
}

/// 表现层的输入提示
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputHint {
    /// 只允许字母和空格
    Name,
    /// 只允许数字
    Age,
    /// 只允许数字，最多 10 位
    Phone,
    FreeText,
}

impl InputHint {
    pub fn placeholder(self) -> &'static str {
        match self {
            InputHint::Name => "请输入姓名",
            InputHint::Age => "请输入年龄",
            InputHint::Phone => "请输入手机号（10位数字）",
            InputHint::FreeText => "请输入答案",
        }
    }

    /// 按提示过滤输入，丢弃不允许的字符
    pub fn filter(self, raw: &str) -> String {
        match self {
            InputHint::Name => raw
                .chars()
                .filter(|c| c.is_alphabetic() || *c == ' ')
                .collect(),
            InputHint::Age => raw.chars().filter(|c| c.is_ascii_digit()).collect(),
            InputHint::Phone => raw
                .chars()
                .filter(|c| c.is_ascii_digit())
                .take(10)
                .collect(),
            InputHint::FreeText => raw.to_string(),
        }
    }
}

/// 可替换的题目分类器
///
/// 默认实现按题干关键词判断，日后可换成题目自带的校验字段
pub trait QuestionClassifier: Send + Sync {
    fn validation_rule(&self, question: &Question) -> TextRule;

    fn input_hint(&self, question: &Question) -> InputHint;
}

static PHONE_KEYWORDS: phf::Set<&'static str> = phf_set! {
    "mobile",
    "phone",
    "contact",
};

/// 基于题干关键词的分类器（不区分大小写的子串匹配）
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    fn is_phone(text: &str) -> bool {
        PHONE_KEYWORDS.iter().any(|keyword| text.contains(keyword))
    }
}

impl QuestionClassifier for KeywordClassifier {
    fn validation_rule(&self, question: &Question) -> TextRule {
        if Self::is_phone(&question.text.to_lowercase()) {
            TextRule::PhoneNumber
        } else {
            TextRule::Required
        }
    }

    fn input_hint(&self, question: &Question) -> InputHint {
        let text = question.text.to_lowercase();
        // 顺序有意义：姓名优先于年龄，年龄优先于手机号
        if text.contains("name") {
            InputHint::Name
        } else if text.contains("age") {
            InputHint::Age
        } else if Self::is_phone(&text) {
            InputHint::Phone
        } else {
            InputHint::FreeText
        }
    }
}
