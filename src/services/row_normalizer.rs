//! 行规范化服务 - 业务能力层
//!
//! 把表格里的任意列名映射到规范字段，并清理文本

use crate::error::ImportError;
use crate::models::question::{ParsedRow, RawRow};
use crate::services::sheet_reader::Sheet;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// 每行首尾的空格和制表符（保留换行和 `\r`）
static LINE_EDGES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]+|[ \t]+(\r?)$").expect("静态正则"));

/// 需要换成显示尺寸的数学宏
const INLINE_FRACTION: &str = r"\frac";
const DISPLAY_FRACTION: &str = r"\dfrac";

/// 规范字段及其可接受的列名（按优先级）
pub mod aliases {
    pub const REFERENCE_ID: &[&str] = &["question_id", "reference_id", "question id", "reference id"];
    pub const TAG: &[&str] = &["tag", "sat_tag", "sat tag", "category"];
    pub const DIFFICULTY: &[&str] = &["difficulty"];
    pub const INSTRUCTIONS: &[&str] = &["instructions", "instruction", "passage"];
    pub const QUESTION_TEXT: &[&str] = &["question_text", "question", "question text"];
    pub const ANSWER_A: &[&str] = &["answer_a", "option_a", "option_1", "answer a", "option a", "option 1"];
    pub const ANSWER_B: &[&str] = &["answer_b", "option_b", "option_2", "answer b", "option b", "option 2"];
    pub const ANSWER_C: &[&str] = &["answer_c", "option_c", "option_3", "answer c", "option c", "option 3"];
    pub const ANSWER_D: &[&str] = &["answer_d", "option_d", "option_4", "answer d", "option d", "option 4"];
    pub const CORRECT_ANSWER: &[&str] = &["correct_answer", "correct answer"];
    pub const EXPLANATION: &[&str] = &["explanation", "solution"];

    /// 判断文件是否含有题目标识列时使用的规范化列名
    pub const IDENTIFIER_KEYS: &[&str] = &["questionid", "referenceid"];
}

/// 解析后的单个表格
#[derive(Debug, Clone, Default)]
pub struct ParsedSheet {
    pub rows: Vec<ParsedRow>,
    /// 因缺少题目标识被跳过的行数
    pub skipped: usize,
    /// 检测到的原始列名
    pub headers: Vec<String>,
}

/// 列名规范化：小写，去掉空白和下划线
///
/// `"Question_ID"`、`"question id"`、`"QuestionId"` 都得到 `"questionid"`
pub fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// 按别名顺序查找第一个非空的值，找不到时返回空字符串
///
/// 同一别名匹配到多列时按表头顺序取第一个非空值
pub fn get_field(row: &RawRow, field_aliases: &[&str]) -> String {
    for alias in field_aliases {
        let target = normalize_key(alias);
        let found = row
            .iter()
            .find(|(key, value)| !value.is_empty() && normalize_key(key) == target);
        if let Some((_, value)) = found {
            return value.to_string();
        }
    }
    String::new()
}

/// 清理自由文本字段
///
/// 逐行去掉首尾空格/制表符，保留换行，再把 `\frac` 换成 `\dfrac`
pub fn clean_text(text: &str) -> String {
    LINE_EDGES
        .replace_all(text, "$1")
        .replace(INLINE_FRACTION, DISPLAY_FRACTION)
}

/// 难度规范化：小写、去空白，`hard` 子串替换为 `intense`
pub fn normalize_difficulty(difficulty: &str) -> String {
    difficulty.to_lowercase().trim().replace("hard", "intense")
}

/// 正确答案：去空白并转大写
pub fn normalize_answer_letter(answer: &str) -> String {
    answer.trim().to_uppercase()
}

/// 检查列名中是否有题目标识列
pub fn has_identifier_header(headers: &[String]) -> bool {
    headers
        .iter()
        .any(|header| aliases::IDENTIFIER_KEYS.contains(&normalize_key(header).as_str()))
}

/// 规范化一行，缺少题目标识时返回 `None`
pub fn parse_row(row: &RawRow) -> Option<ParsedRow> {
    let reference_id = get_field(row, aliases::REFERENCE_ID).trim().to_string();
    if reference_id.is_empty() {
        return None;
    }

    Some(ParsedRow {
        reference_id,
        tag: get_field(row, aliases::TAG).trim().to_string(),
        difficulty: normalize_difficulty(&get_field(row, aliases::DIFFICULTY)),
        instructions: clean_text(&get_field(row, aliases::INSTRUCTIONS)),
        question_text: clean_text(&get_field(row, aliases::QUESTION_TEXT)),
        answer_a: clean_text(&get_field(row, aliases::ANSWER_A)),
        answer_b: clean_text(&get_field(row, aliases::ANSWER_B)),
        answer_c: clean_text(&get_field(row, aliases::ANSWER_C)),
        answer_d: clean_text(&get_field(row, aliases::ANSWER_D)),
        correct_answer: normalize_answer_letter(&get_field(row, aliases::CORRECT_ANSWER)),
        explanation: clean_text(&get_field(row, aliases::EXPLANATION)),
    })
}

/// 校验并解析整个表格
///
/// # 参数
/// - `file`: 文件名（仅用于错误信息）
/// - `sheet`: 读取到的表格
///
/// # 返回
/// 全部有效行和跳过的行数；没有有效行时返回错误
pub fn parse_sheet(file: &str, sheet: &Sheet) -> Result<ParsedSheet, ImportError> {
    if sheet.rows.is_empty() {
        return Err(ImportError::EmptyFile {
            file: file.to_string(),
        });
    }

    if !has_identifier_header(&sheet.headers) {
        return Err(ImportError::MissingIdentifierHeader {
            file: file.to_string(),
            headers: sheet.headers.clone(),
        });
    }

    let mut parsed = ParsedSheet {
        headers: sheet.headers.clone(),
        ..Default::default()
    };

    for (idx, raw) in sheet.rows.iter().enumerate() {
        match parse_row(raw) {
            Some(row) => parsed.rows.push(row),
            None => {
                // 表头占第 1 行
                debug!("[{}] 第 {} 行缺少 question_id，已跳过", file, idx + 2);
                parsed.skipped += 1;
            }
        }
    }

    if parsed.rows.is_empty() {
        return Err(ImportError::NoValidRows {
            file: file.to_string(),
            headers: parsed.headers,
            skipped: parsed.skipped,
        });
    }

    if parsed.skipped > 0 {
        warn!(
            "[{}] ⚠️ 跳过 {} 行（缺少 question_id），有效 {} 行",
            file,
            parsed.skipped,
            parsed.rows.len()
        );
    }

    Ok(parsed)
}
