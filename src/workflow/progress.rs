//! 上传进度通知
//!
//! 同步调用，不等待、不回压

use serde::Serialize;
use tracing::info;

/// 上传阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStage {
    Questions,
    Test,
    TestQuestions,
    Complete,
}

impl UploadStage {
    pub fn as_str(self) -> &'static str {
        match self {
            UploadStage::Questions => "questions",
            UploadStage::Test => "test",
            UploadStage::TestQuestions => "test_questions",
            UploadStage::Complete => "complete",
        }
    }
}

impl std::fmt::Display for UploadStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 一次进度事件
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadProgress {
    pub stage: UploadStage,
    pub current: usize,
    pub total: usize,
    pub message: String,
}

/// 进度接收方
pub trait ProgressSink {
    fn on_progress(&self, progress: &UploadProgress);
}

impl<F> ProgressSink for F
where
    F: Fn(&UploadProgress),
{
    fn on_progress(&self, progress: &UploadProgress) {
        self(progress)
    }
}

/// 把进度写到日志里
pub struct LogProgress {
    label: String,
}

impl LogProgress {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl ProgressSink for LogProgress {
    fn on_progress(&self, progress: &UploadProgress) {
        info!(
            "[{}] ({}) {}/{} {}",
            self.label, progress.stage, progress.current, progress.total, progress.message
        );
    }
}
