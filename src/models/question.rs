use serde::{Deserialize, Serialize};

/// 表格中的一行原始数据：按表头顺序排列的 (列名, 单元格文本)
///
/// 列名大小写、空格、下划线都不固定，缺失的单元格为空字符串。
/// 保留列顺序，多个列名等价时总是靠前的列优先
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    cells: Vec<(String, String)>,
}

impl RawRow {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cells: Vec::with_capacity(capacity),
        }
    }

    /// 在行尾追加一列
    pub fn push(&mut self, header: impl Into<String>, value: impl Into<String>) {
        self.cells.push((header.into(), value.into()));
    }

    /// 按表头顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells
            .iter()
            .map(|(header, value)| (header.as_str(), value.as_str()))
    }

    /// 按原始列名取值；同名列取第一个非空值
    pub fn get(&self, header: &str) -> Option<&str> {
        let mut matches = self.iter().filter(|(h, _)| *h == header).map(|(_, v)| v);
        let first = matches.next()?;
        if !first.is_empty() {
            return Some(first);
        }
        Some(matches.find(|v| !v.is_empty()).unwrap_or(first))
    }

    pub fn contains_key(&self, header: &str) -> bool {
        self.iter().any(|(h, _)| h == header)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            cells: iter
                .into_iter()
                .map(|(header, value)| (header.into(), value.into()))
                .collect(),
        }
    }
}

/// 规范化后的一行题目数据
///
/// 只在导入过程中短暂存在，不会直接写入存储
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedRow {
    pub reference_id: String,
    pub tag: String,
    pub difficulty: String,
    pub instructions: String,
    pub question_text: String,
    pub answer_a: String,
    pub answer_b: String,
    pub answer_c: String,
    pub answer_d: String,
    /// 已去除首尾空白并转为大写
    pub correct_answer: String,
    pub explanation: String,
}

impl ParsedRow {
    /// 按 A、B、C、D 顺序返回四个选项
    pub fn answers(&self) -> [&str; 4] {
        [
            self.answer_a.as_str(),
            self.answer_b.as_str(),
            self.answer_c.as_str(),
            self.answer_d.as_str(),
        ]
    }
}

/// 题目类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    /// 选择题
    MultipleChoice,
    /// 填空（数值）题，没有选项
    Numeric,
}

impl QuestionType {
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "multiple_choice",
            QuestionType::Numeric => "numeric",
        }
    }
}

impl std::fmt::Display for QuestionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 待写入 `questions` 集合的题目
///
/// `answer_choices` 为空当且仅当 `question_type` 为 `Numeric`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub reference_id: String,
    pub question_type: QuestionType,
    pub question_text: String,
    pub instructions: String,
    pub explanation: String,
    pub difficulty: String,
    pub tag: String,
    pub answer_choices: Vec<String>,
    /// 选择题为 "1".."4"，数值题为原始答案
    pub correct_answer: String,
}
