//! 批量上传流程 - 流程层
//!
//! 核心职责：把若干模块的题目写成三类关联记录
//!
//! 流程顺序：
//! 1. questions：逐题插入，收集存储分配的 id
//! 2. tests：插入一条试卷记录
//! 3. test_sections：把第 3、4 模块的章节标为数学章节（失败只记日志）
//! 4. test_questions：逐题插入关联，`order_in_test` 跨模块递增
//!
//! 所有写入严格串行。阶段之间没有事务，中途失败不会回滚已写入的记录，
//! 错误中会带上已写入的 id 方便人工清理。

use tracing::{debug, info, warn};

use crate::error::UploadError;
use crate::infrastructure::{insert_record, update_records, Collection, Filter, RecordStore};
use crate::models::test::{
    MathSectionPatch, Module, NewTest, NewTestQuestion, UploadOutcome, FULL_TEST_MODULES,
};
use crate::workflow::progress::{ProgressSink, UploadProgress, UploadStage};
use crate::workflow::upload_ctx::UploadCtx;

/// 批量上传流程
///
/// - 不持有存储，只借用注入的 `RecordStore`
/// - 一次调用对应一次上传，调用之间没有共享状态
pub struct UploadFlow<'a> {
    store: &'a dyn RecordStore,
}

impl<'a> UploadFlow<'a> {
    pub fn new(store: &'a dyn RecordStore) -> Self {
        Self { store }
    }

    /// 上传全部模块
    ///
    /// # 参数
    /// - `modules`: 模块列表，按模块编号升序处理
    /// - `title`: 试卷标题，不能为空
    /// - `description`: 试卷描述（可选）
    /// - `on_progress`: 进度接收方（可选）
    ///
    /// # 返回
    /// 新试卷的 id 和题目总数
    pub async fn upload_bulk_data(
        &self,
        modules: &[Module],
        title: &str,
        description: Option<&str>,
        on_progress: Option<&dyn ProgressSink>,
    ) -> Result<UploadOutcome, UploadError> {
        let ordered = validate(modules, title)?;
        let ctx = UploadCtx::new(title, &ordered);
        let total = ctx.total_questions;

        let emit = |stage: UploadStage, current: usize, total: usize, message: String| {
            if let Some(sink) = on_progress {
                sink.on_progress(&UploadProgress {
                    stage,
                    current,
                    total,
                    message,
                });
            }
        };

        info!(
            "{} 开始上传: {} 个模块, {} 道题目",
            ctx, ctx.module_count, total
        );

        // ========== 阶段 1: 题目 ==========
        let mut question_ids: Vec<String> = Vec::with_capacity(total);
        let all_questions = ordered.iter().flat_map(|module| module.questions.iter());
        for (idx, question) in all_questions.enumerate() {
            let position = idx + 1;
            emit(
                UploadStage::Questions,
                position,
                total,
                format!("正在上传第 {}/{} 道题目", position, total),
            );

            let id = insert_record(self.store, Collection::Questions, question)
                .await
                .map_err(|source| UploadError::QuestionInsertFailed {
                    position,
                    total,
                    source,
                })?;
            debug!("{} 题目 {} → {}", ctx, question.reference_id, id);
            question_ids.push(id);
        }
        info!("{} ✓ 题目写入完成: {} 道", ctx, question_ids.len());

        // ========== 阶段 2: 试卷 ==========
        emit(UploadStage::Test, 1, 1, "正在创建试卷".to_string());
        let test = NewTest::new(title, description, ordered.len());
        let test_id = insert_record(self.store, Collection::Tests, &test)
            .await
            .map_err(|source| UploadError::TestInsertFailed {
                orphaned_question_ids: question_ids.clone(),
                source,
            })?;
        info!(
            "{} ✓ 试卷创建成功: {} (完整试卷: {})",
            ctx, test_id, test.is_full_test
        );

        // ========== 阶段 3: 数学章节标记 ==========
        self.mark_math_sections(&ordered, &ctx).await;

        // ========== 阶段 4: 试卷题目关联 ==========
        let mut remaining = question_ids.as_slice();
        let mut order_in_test = 0;
        for module in &ordered {
            let (module_ids, rest) = remaining.split_at(module.questions.len());
            remaining = rest;
            let test_section_id = module.section_id();

            for question_id in module_ids {
                order_in_test += 1;
                emit(
                    UploadStage::TestQuestions,
                    order_in_test,
                    total,
                    format!("正在关联第 {}/{} 道题目", order_in_test, total),
                );

                let link = NewTestQuestion {
                    question_id: question_id.clone(),
                    test_section_id: test_section_id.clone(),
                    test_id: test_id.clone(),
                    order_in_test,
                };
                insert_record(self.store, Collection::TestQuestions, &link)
                    .await
                    .map_err(|source| UploadError::LinkInsertFailed {
                        position: order_in_test,
                        total,
                        test_id: test_id.clone(),
                        orphaned_question_ids: question_ids.clone(),
                        source,
                    })?;
            }
        }

        emit(
            UploadStage::Complete,
            order_in_test,
            order_in_test,
            "上传完成".to_string(),
        );
        info!("{} ✅ 上传完成: 试卷 {}, {} 道题目", ctx, test_id, total);

        Ok(UploadOutcome {
            test_id,
            total_questions: total,
        })
    }

    /// 把第 3、4 模块的章节标为数学章节
    ///
    /// 失败只写日志，不影响上传结果
    async fn mark_math_sections(&self, modules: &[&Module], ctx: &UploadCtx) {
        for module in modules.iter().filter(|m| m.is_math_module()) {
            let section_id = module.section_id();
            let result = update_records(
                self.store,
                Collection::TestSections,
                &Filter::eq("id", section_id.as_str()),
                &MathSectionPatch::default(),
            )
            .await;

            match result {
                Ok(()) => debug!("{} 章节 {} 已标记为数学章节", ctx, section_id),
                Err(e) => warn!("{} ⚠️ 章节 {} 标记失败（已忽略）: {}", ctx, section_id, e),
            }
        }
    }
}

/// 写入前的校验，返回按编号升序排列的模块
fn validate<'m>(modules: &'m [Module], title: &str) -> Result<Vec<&'m Module>, UploadError> {
    if title.trim().is_empty() {
        return Err(UploadError::EmptyTitle);
    }
    if modules.is_empty() {
        return Err(UploadError::NoModules);
    }

    let mut ordered: Vec<&Module> = modules.iter().collect();
    ordered.sort_by_key(|module| module.number);

    for (idx, module) in ordered.iter().enumerate() {
        if module.number == 0 || module.number as usize > FULL_TEST_MODULES {
            return Err(UploadError::InvalidModuleNumber {
                number: module.number,
            });
        }
        if idx > 0 && ordered[idx - 1].number == module.number {
            return Err(UploadError::DuplicateModuleNumber {
                number: module.number,
            });
        }
    }

    Ok(ordered)
}
