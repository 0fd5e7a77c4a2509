use crate::models::question::Question;
use serde::{Deserialize, Serialize};

/// 一套完整试卷的模块数量
pub const FULL_TEST_MODULES: usize = 4;

/// 一个模块：编号（1..=4）加上该位置的题目列表
///
/// 模块只是上传时的分组，不会单独写入存储
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    pub number: u8,
    pub questions: Vec<Question>,
}

impl Module {
    pub fn new(number: u8, questions: Vec<Question>) -> Self {
        Self { number, questions }
    }

    /// 模块对应的固定章节 id
    pub fn section_id(&self) -> String {
        section_id(self.number)
    }

    /// 第 3、4 模块对应数学章节
    pub fn is_math_module(&self) -> bool {
        matches!(self.number, 3 | 4)
    }
}

/// `TESTSECTION1`..`TESTSECTION4`
pub fn section_id(module_number: u8) -> String {
    format!("TESTSECTION{}", module_number)
}

/// 待写入 `tests` 集合的试卷记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTest {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_full_test: bool,
}

impl NewTest {
    pub fn new(title: &str, description: Option<&str>, module_count: usize) -> Self {
        Self {
            title: title.trim().to_string(),
            description: description
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            is_full_test: module_count == FULL_TEST_MODULES,
        }
    }
}

/// 待写入 `test_questions` 集合的关联记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTestQuestion {
    pub question_id: String,
    pub test_section_id: String,
    pub test_id: String,
    pub order_in_test: usize,
}

/// 对 `test_sections` 的补丁：标记为数学章节
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MathSectionPatch {
    pub is_desmos_allowed: bool,
    pub is_math_section: bool,
}

impl Default for MathSectionPatch {
    fn default() -> Self {
        Self {
            is_desmos_allowed: true,
            is_math_section: true,
        }
    }
}

/// 上传成功后的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadOutcome {
    pub test_id: String,
    pub total_questions: usize,
}
