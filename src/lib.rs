//! # Bulk Question Upload
//!
//! 把表格中的考试题目批量导入关系型存储，并组装成由若干模块组成的试卷
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（HTTP Client），只暴露能力
//! - `RecordStore` - 只有 insert / update 两种能力
//! - `RestStore` / `MemoryStore` - 远端存储和内存存储
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个文件或单行
//! - `sheet_reader` - 读取 xlsx / csv
//! - `row_normalizer` - 列名匹配和文本清理
//! - `question_converter` - 行 → 题目
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一次上传"的完整流程
//! - `UploadFlow` - 题目 → 试卷 → 章节标记 → 关联
//! - `ProgressSink` - 进度通知
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/app` - 加载清单、导入模块、调用上传流程

pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{ConfigError, ImportError, StoreError, UploadError};
pub use infrastructure::{Collection, MemoryStore, RecordStore, RestStore};
pub use models::{Module, ParsedRow, Question, QuestionType, UploadOutcome};
pub use orchestrator::App;
pub use services::{convert_to_question, import_module};
pub use workflow::{ProgressSink, UploadFlow, UploadProgress, UploadStage};
