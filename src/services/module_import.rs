//! 模块导入服务 - 业务能力层
//!
//! 读取一个模块文件：读表 → 校验 → 规范化 → 转换

use crate::error::ImportError;
use crate::models::question::{Question, QuestionType};
use crate::services::question_converter::convert_to_question;
use crate::services::row_normalizer::parse_sheet;
use crate::services::sheet_reader::read_sheet;
use std::path::Path;

/// 一个模块文件的导入结果
#[derive(Debug, Clone)]
pub struct ImportedModule {
    pub questions: Vec<Question>,
    pub skipped: usize,
    pub headers: Vec<String>,
}

impl ImportedModule {
    pub fn numeric_count(&self) -> usize {
        self.questions
            .iter()
            .filter(|q| q.question_type == QuestionType::Numeric)
            .count()
    }
}

/// 导入单个模块文件
///
/// 不访问存储，出错时可以直接修正文件后重试
pub fn import_module(path: &Path) -> Result<ImportedModule, ImportError> {
    let file = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    let sheet = read_sheet(path)?;
    let parsed = parse_sheet(&file, &sheet)?;

    Ok(ImportedModule {
        questions: parsed.rows.iter().map(convert_to_question).collect(),
        skipped: parsed.skipped,
        headers: parsed.headers,
    })
}
