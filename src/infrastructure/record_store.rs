//! 记录存储 - 基础设施层
//!
//! 只暴露 insert / update 两种能力，不认识题目、试卷

use crate::error::StoreError;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value as JsonValue;

/// 上传用到的集合
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Questions,
    Tests,
    TestSections,
    TestQuestions,
}

impl Collection {
    pub fn as_str(self) -> &'static str {
        match self {
            Collection::Questions => "questions",
            Collection::Tests => "tests",
            Collection::TestSections => "test_sections",
            Collection::TestQuestions => "test_questions",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 等值过滤条件：`column = value`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: String,
    pub value: String,
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

/// 通用记录存储
///
/// 每次调用只写一条记录，返回存储分配的 id
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// 插入一条记录，返回存储分配的 id
    async fn insert(&self, collection: Collection, record: JsonValue) -> Result<String, StoreError>;

    /// 按过滤条件更新记录
    async fn update(
        &self,
        collection: Collection,
        filter: &Filter,
        patch: JsonValue,
    ) -> Result<(), StoreError>;
}

/// 序列化后插入
pub async fn insert_record<S, T>(store: &S, collection: Collection, record: &T) -> Result<String, StoreError>
where
    S: RecordStore + ?Sized,
    T: Serialize,
{
    let value = serde_json::to_value(record).map_err(|source| StoreError::Serialize {
        collection: collection.to_string(),
        source,
    })?;
    store.insert(collection, value).await
}

/// 序列化后更新
pub async fn update_records<S, T>(
    store: &S,
    collection: Collection,
    filter: &Filter,
    patch: &T,
) -> Result<(), StoreError>
where
    S: RecordStore + ?Sized,
    T: Serialize,
{
    let value = serde_json::to_value(patch).map_err(|source| StoreError::Serialize {
        collection: collection.to_string(),
        source,
    })?;
    store.update(collection, filter, value).await
}
