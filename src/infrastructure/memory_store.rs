//! 内存存储 - 基础设施层
//!
//! 用于演练模式和测试，可以指定第 N 次写入失败

use crate::error::StoreError;
use crate::infrastructure::record_store::{Collection, Filter, RecordStore};
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

/// 存储调用种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    Insert,
    Update,
}

/// 一次存储调用的记录（按发生顺序）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreCall {
    pub op: StoreOp,
    pub collection: Collection,
}

#[derive(Default)]
struct MemoryState {
    tables: HashMap<Collection, Vec<JsonValue>>,
    insert_attempts: HashMap<Collection, usize>,
    failing_inserts: HashSet<(Collection, usize)>,
    failing_updates: HashSet<Collection>,
    calls: Vec<StoreCall>,
}

/// 内存存储
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预置 `TESTSECTION1`..`TESTSECTION4` 四个章节
    pub fn with_test_sections() -> Self {
        let store = Self::new();
        for number in 1..=4u8 {
            store.seed(
                Collection::TestSections,
                serde_json::json!({
                    "id": crate::models::section_id(number),
                    "is_desmos_allowed": false,
                    "is_math_section": false,
                }),
            );
        }
        store
    }

    /// 直接放入一条已有记录（不计入调用记录）
    pub fn seed(&self, collection: Collection, record: JsonValue) {
        self.lock().tables.entry(collection).or_default().push(record);
    }

    /// 让该集合的第 `nth` 次插入（从 1 开始）失败
    pub fn fail_insert(&self, collection: Collection, nth: usize) {
        self.lock().failing_inserts.insert((collection, nth));
    }

    /// 让该集合的所有更新失败
    pub fn fail_updates(&self, collection: Collection) {
        self.lock().failing_updates.insert(collection);
    }

    /// 集合中的全部记录
    pub fn records(&self, collection: Collection) -> Vec<JsonValue> {
        self.lock()
            .tables
            .get(&collection)
            .cloned()
            .unwrap_or_default()
    }

    /// 按 id 查找记录
    pub fn find(&self, collection: Collection, id: &str) -> Option<JsonValue> {
        self.lock().tables.get(&collection).and_then(|rows| {
            rows.iter()
                .find(|row| row.get("id").and_then(|v| v.as_str()) == Some(id))
                .cloned()
        })
    }

    /// 全部调用记录（按顺序）
    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // 持锁期间不会 panic，中毒后的数据仍然可用
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert(&self, collection: Collection, record: JsonValue) -> Result<String, StoreError> {
        let mut state = self.lock();
        state.calls.push(StoreCall {
            op: StoreOp::Insert,
            collection,
        });

        let attempt = {
            let counter = state.insert_attempts.entry(collection).or_insert(0);
            *counter += 1;
            *counter
        };

        if state.failing_inserts.contains(&(collection, attempt)) {
            return Err(StoreError::rejected(
                collection.as_str(),
                format!("第 {} 次插入被拒绝", attempt),
            ));
        }

        let JsonValue::Object(mut fields) = record else {
            return Err(StoreError::rejected(collection.as_str(), "记录必须是 JSON 对象"));
        };

        let id = format!("{}-{}", collection.as_str(), attempt);
        fields.insert("id".to_string(), JsonValue::String(id.clone()));
        state
            .tables
            .entry(collection)
            .or_default()
            .push(JsonValue::Object(fields));

        Ok(id)
    }

    async fn update(
        &self,
        collection: Collection,
        filter: &Filter,
        patch: JsonValue,
    ) -> Result<(), StoreError> {
        let mut state = self.lock();
        state.calls.push(StoreCall {
            op: StoreOp::Update,
            collection,
        });

        if state.failing_updates.contains(&collection) {
            return Err(StoreError::rejected(collection.as_str(), "更新被拒绝"));
        }

        let JsonValue::Object(patch) = patch else {
            return Err(StoreError::rejected(collection.as_str(), "补丁必须是 JSON 对象"));
        };

        // 没有匹配的记录时与 PostgREST 一致，不算错误
        if let Some(rows) = state.tables.get_mut(&collection) {
            for row in rows.iter_mut() {
                let matches = row
                    .get(&filter.column)
                    .map(|v| match v {
                        JsonValue::String(s) => s == &filter.value,
                        other => other.to_string() == filter.value,
                    })
                    .unwrap_or(false);
                if !matches {
                    continue;
                }
                if let JsonValue::Object(fields) = row {
                    for (key, value) in patch.iter() {
                        fields.insert(key.clone(), value.clone());
                    }
                }
            }
        }

        Ok(())
    }
}
