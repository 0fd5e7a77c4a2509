//! 题目转换服务 - 业务能力层
//!
//! 只负责把一行规范化数据转换成待写入的题目

use crate::models::question::{ParsedRow, Question, QuestionType};
use tracing::warn;

/// 选项字母 → 从 1 开始的序号
pub fn answer_index(letter: &str) -> Option<&'static str> {
    match letter {
        "A" => Some("1"),
        "B" => Some("2"),
        "C" => Some("3"),
        "D" => Some("4"),
        _ => None,
    }
}

/// 把 `ParsedRow` 转换成 `Question`
///
/// - 四个选项按 A、B、C、D 顺序保留非空项
/// - 没有选项时是数值题，正确答案原样保留
/// - 有选项时是选择题，正确答案映射为序号；无法识别的字母按 "1" 处理
pub fn convert_to_question(row: &ParsedRow) -> Question {
    let answer_choices: Vec<String> = row
        .answers()
        .into_iter()
        .filter(|answer| !answer.is_empty())
        .map(str::to_string)
        .collect();

    let (question_type, correct_answer) = if answer_choices.is_empty() {
        (QuestionType::Numeric, row.correct_answer.clone())
    } else {
        let index = match answer_index(&row.correct_answer) {
            Some(index) => index,
            None => {
                warn!(
                    "⚠️ 题目 {} 的正确答案 '{}' 无法识别，按选项 A 处理",
                    row.reference_id, row.correct_answer
                );
                "1"
            }
        };
        (QuestionType::MultipleChoice, index.to_string())
    };

    Question {
        reference_id: row.reference_id.clone(),
        question_type,
        question_text: row.question_text.clone(),
        instructions: row.instructions.clone(),
        explanation: row.explanation.clone(),
        difficulty: row.difficulty.clone(),
        tag: row.tag.clone(),
        answer_choices,
        correct_answer,
    }
}
