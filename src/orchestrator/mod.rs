//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责一次上传的资源管理和调度，是整个系统的"指挥中心"。
//!
//! ## 层次关系
//!
//! ```text
//! app (上传清单 → Vec<Module>)
//!     ↓
//! workflow::UploadFlow (三阶段写入)
//!     ↓
//! services (能力层：读表 / 规范化 / 转换)
//!     ↓
//! infrastructure (基础设施：RecordStore)
//! ```
//!
//! ## 设计原则
//!
//! 1. **资源隔离**：只有编排层创建存储
//! 2. **向下依赖**：编排层 → workflow → services → infrastructure
//! 3. **先导入后写入**：所有文件校验通过后才开始写入

pub mod app;

pub use app::App;
