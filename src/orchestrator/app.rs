//! 上传应用 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责一次完整上传的资源管理和调度。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：校验配置、初始化日志文件、创建存储
//! 2. **清单加载**：读取上传清单（标题、描述、模块文件）
//! 3. **模块导入**：逐个文件校验、规范化、转换，任何写入之前完成
//! 4. **上传**：委托 `UploadFlow` 执行三阶段写入
//! 5. **统计输出**：成功时输出试卷 id，失败时列出孤立记录

use crate::config::Config;
use crate::error::UploadError;
use crate::infrastructure::{Collection, MemoryStore, RecordStore, RestStore};
use crate::models::test::{Module, UploadOutcome};
use crate::models::{load_manifest, UploadManifest};
use crate::services::import_module;
use crate::utils::logging::{
    append_log_line, init_log_file, log_module_imported, log_startup, print_final_stats,
    truncate_text,
};
use crate::workflow::{LogProgress, ProgressSink, UploadFlow};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{error, info, warn};

/// 存储句柄：远端存储或演练用的内存存储
enum StoreHandle {
    Remote(RestStore),
    DryRun(MemoryStore),
}

impl StoreHandle {
    fn as_store(&self) -> &dyn RecordStore {
        match self {
            StoreHandle::Remote(store) => store,
            StoreHandle::DryRun(store) => store,
        }
    }
}

/// 应用主结构
pub struct App {
    config: Config,
    store: StoreHandle,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> Result<Self> {
        config.validate().context("配置不完整")?;

        // 初始化日志文件
        init_log_file(&config.output_log_file)
            .with_context(|| format!("无法创建日志文件: {}", config.output_log_file))?;

        log_startup(&config.upload_manifest, config.dry_run);

        let store = if config.dry_run {
            StoreHandle::DryRun(MemoryStore::with_test_sections())
        } else {
            StoreHandle::Remote(RestStore::new(&config).context("无法创建存储客户端")?)
        };

        Ok(Self { config, store })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<UploadOutcome> {
        let manifest = load_manifest(Path::new(&self.config.upload_manifest)).await?;

        // 导入所有模块（不访问存储）
        let modules = self.import_modules(&manifest)?;

        let flow = UploadFlow::new(self.store.as_store());
        let progress = LogProgress::new(manifest.title.trim());

        let result = flow
            .upload_bulk_data(
                &modules,
                &manifest.title,
                manifest.description.as_deref(),
                Some(&progress as &dyn ProgressSink),
            )
            .await;

        match result {
            Ok(outcome) => {
                append_log_line(
                    &self.config.output_log_file,
                    &format!(
                        "上传成功: 试卷 {} ({} 道题目)",
                        outcome.test_id, outcome.total_questions
                    ),
                )?;
                self.log_dry_run_summary();
                print_final_stats(
                    &outcome.test_id,
                    outcome.total_questions,
                    &self.config.output_log_file,
                );
                Ok(outcome)
            }
            Err(e) => {
                error!("❌ 上传失败: {}", e);
                append_log_line(&self.config.output_log_file, &format!("上传失败: {}", e))?;
                self.report_orphans(&e)?;
                Err(e).context(format!("上传试卷失败: {}", manifest.title))
            }
        }
    }

    /// 导入清单中的所有模块
    fn import_modules(&self, manifest: &UploadManifest) -> Result<Vec<Module>> {
        info!(
            "\n📁 正在导入 {} 个模块 (清单: {})...",
            manifest.modules.len(),
            manifest.file_path.as_deref().unwrap_or(&self.config.upload_manifest)
        );

        let mut modules = Vec::with_capacity(manifest.modules.len());
        for (number, path) in manifest.numbered_modules() {
            let imported = import_module(path)
                .with_context(|| format!("模块 {} 导入失败: {}", number, path.display()))?;

            log_module_imported(
                number,
                &path.display().to_string(),
                imported.questions.len(),
                imported.numeric_count(),
                imported.skipped,
            );

            if self.config.verbose_logging {
                info!("  列: [{}]", imported.headers.join(", "));
                for question in imported.questions.iter().take(2) {
                    info!(
                        "  {} [{}] {}",
                        question.reference_id,
                        question.question_type,
                        truncate_text(&question.question_text, 80)
                    );
                }
            }

            modules.push(Module::new(number, imported.questions));
        }

        Ok(modules)
    }

    /// 失败时把已写入的记录 id 写到日志里，方便人工清理
    fn report_orphans(&self, err: &UploadError) -> Result<()> {
        let (test_id, question_ids) = match err {
            UploadError::TestInsertFailed {
                orphaned_question_ids,
                ..
            } => (None, orphaned_question_ids),
            UploadError::LinkInsertFailed {
                test_id,
                orphaned_question_ids,
                ..
            } => (Some(test_id), orphaned_question_ids),
            _ => return Ok(()),
        };

        warn!(
            "⚠️ 已写入 {} 道题目但没有完成关联，需要人工清理",
            question_ids.len()
        );
        if let Some(test_id) = test_id {
            warn!("⚠️ 已创建的试卷: {}", test_id);
            append_log_line(&self.config.output_log_file, &format!("孤立试卷: {}", test_id))?;
        }
        append_log_line(
            &self.config.output_log_file,
            &format!("孤立题目: {}", question_ids.join(", ")),
        )?;
        Ok(())
    }

    fn log_dry_run_summary(&self) {
        if let StoreHandle::DryRun(store) = &self.store {
            info!("🧪 演练结果（未写入远端存储）:");
            for collection in [
                Collection::Questions,
                Collection::Tests,
                Collection::TestQuestions,
            ] {
                info!("  {}: {} 条", collection, store.records(collection).len());
            }
            let math_sections = store
                .records(Collection::TestSections)
                .iter()
                .filter(|section| section["is_math_section"] == serde_json::json!(true))
                .count();
            info!("  test_sections (数学章节): {} 个", math_sections);
        }
    }
}
