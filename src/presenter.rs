//! 终端表现层
//!
//! 负责把题目渲染成文本，以及把用户输入的一行文字转成 `RawInput`

use std::fmt::Write;

use crate::models::{Answer, Question, QuestionKind, RawInput};
use crate::workflow::InputHint;

/// 渲染一道题
pub fn render_question(
    question: &Question,
    progress: (usize, usize),
    hint: InputHint,
    previous: Option<&Answer>,
) -> String {
    let (current, total) = progress;
    let mut out = String::new();

    let _ = writeln!(out, "\n第 {} 题 / 共 {} 题", current, total);
    let _ = writeln!(out, "{}", question.text);

    match question.kind {
        QuestionKind::Text => {
            let _ = writeln!(out, "（{}）", hint.placeholder());
        }
        QuestionKind::SingleChoice | QuestionKind::MultipleChoice => {
            for (i, option) in question.options.iter().enumerate() {
                let _ = writeln!(out, "  {}. {}", i + 1, option.text);
            }
            let tip = if question.kind == QuestionKind::SingleChoice {
                "（输入选项编号）"
            } else {
                "（输入一个或多个选项编号，用逗号或空格分隔）"
            };
            let _ = writeln!(out, "{}", tip);
        }
    }

    if let Some(answer) = previous {
        let _ = writeln!(out, "已保存: {}", describe_answer(question, answer));
    }

    out
}

/// 答案的可读描述
pub fn describe_answer(question: &Question, answer: &Answer) -> String {
    match answer {
        Answer::Text { value, .. } => value.clone(),
        Answer::SingleChoice {
            selected_option_id, ..
        } => question
            .option_text(*selected_option_id)
            .unwrap_or("?")
            .to_string(),
        Answer::MultipleChoice {
            selected_option_ids,
            ..
        } => selected_option_ids
            .iter()
            .map(|id| question.option_text(*id).unwrap_or("?"))
            .collect::<Vec<_>>()
            .join(", "),
    }
}

/// 把一行输入转成原始输入
///
/// 填空题按输入提示过滤字符；选择题按 1 开始的编号映射到选项 ID，
/// 编号无效时视为未选择
pub fn parse_line(question: &Question, line: &str, hint: InputHint) -> RawInput {
    match question.kind {
        QuestionKind::Text => RawInput::Text(hint.filter(line)),
        QuestionKind::SingleChoice => {
            RawInput::Choice(parse_number(line.trim()).and_then(|n| option_id_at(question, n)))
        }
        QuestionKind::MultipleChoice => {
            let mut ids = Vec::new();
            for token in line
                .split(|c: char| c == ',' || c == '，' || c.is_whitespace())
                .filter(|t| !t.is_empty())
            {
                match parse_number(token).and_then(|n| option_id_at(question, n)) {
                    Some(id) => ids.push(id),
                    None => return RawInput::Choices(Vec::new()),
                }
            }
            RawInput::Choices(ids)
        }
    }
}

/// 从列表中按编号选择一项（1 开始）
pub fn pick<'a, T>(items: &'a [T], line: &str) -> Option<&'a T> {
    parse_number(line.trim()).and_then(|n| items.get(n - 1))
}

/// 列表菜单中的一次输入
#[derive(Debug, PartialEq, Eq)]
pub enum MenuChoice<'a, T> {
    Pick(&'a T),
    /// `b`：返回上一级
    Back,
    /// `q`：退出
    Quit,
    Invalid,
}

/// 解析列表菜单输入：编号、`b` 或 `q`
pub fn menu_choice<'a, T>(items: &'a [T], line: &str) -> MenuChoice<'a, T> {
    match line.trim() {
        "q" | "Q" => MenuChoice::Quit,
        "b" | "B" => MenuChoice::Back,
        other => pick(items, other).map_or(MenuChoice::Invalid, MenuChoice::Pick),
    }
}

/// y/Y 视为确认，其余输入（包括输入结束）都视为否
pub fn is_yes(line: Option<&str>) -> bool {
    matches!(line.map(str::trim), Some("y" | "Y"))
}

fn parse_number(token: &str) -> Option<usize> {
    token.parse::<usize>().ok().filter(|n| *n >= 1)
}

fn option_id_at(question: &Question, number: usize) -> Option<i64> {
    question.options.get(number - 1).map(|o| o.id)
}
