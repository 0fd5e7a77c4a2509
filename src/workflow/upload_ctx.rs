//! 上传上下文
//!
//! 封装「我正在上传哪套试卷」这一信息，只用于日志

use crate::models::test::Module;
use std::fmt::Display;

#[derive(Debug, Clone)]
pub struct UploadCtx {
    /// 试卷标题
    pub title: String,

    /// 模块数量
    pub module_count: usize,

    /// 全部模块的题目总数
    pub total_questions: usize,
}

impl UploadCtx {
    pub fn new(title: &str, modules: &[&Module]) -> Self {
        Self {
            title: title.trim().to_string(),
            module_count: modules.len(),
            total_questions: modules.iter().map(|m| m.questions.len()).sum(),
        }
    }
}

impl Display for UploadCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[上传 {}]", self.title)
    }
}
