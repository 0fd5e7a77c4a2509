//! REST 存储 - 基础设施层
//!
//! 通过 PostgREST 风格的接口（Supabase 的 `/rest/v1`）写入记录

use crate::config::Config;
use crate::error::StoreError;
use crate::infrastructure::record_store::{Collection, Filter, RecordStore};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value as JsonValue;
use std::time::Duration;
use tracing::debug;

/// REST 存储
///
/// 职责：
/// - 持有唯一的 HTTP Client
/// - 暴露 insert / update 能力
/// - 不处理业务流程
pub struct RestStore {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RestStore {
    /// 根据配置创建 REST 存储
    pub fn new(config: &Config) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|source| StoreError::RequestFailed {
                collection: String::new(),
                source,
            })?;

        Ok(Self {
            client,
            base_url: config.store_base_url.trim_end_matches('/').to_string(),
            api_key: config.store_api_key.clone(),
        })
    }

    fn endpoint(&self, collection: Collection) -> String {
        format!("{}/rest/v1/{}", self.base_url, collection.as_str())
    }

    async fn check_status(
        collection: Collection,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::BadResponse {
            collection: collection.to_string(),
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl RecordStore for RestStore {
    async fn insert(&self, collection: Collection, record: JsonValue) -> Result<String, StoreError> {
        debug!("插入记录 ({}): {}", collection, record);

        let response = self
            .client
            .post(self.endpoint(collection))
            .header("apikey", self.api_key.as_str())
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=representation")
            .json(&record)
            .send()
            .await
            .map_err(|source| StoreError::RequestFailed {
                collection: collection.to_string(),
                source,
            })?;

        let response = Self::check_status(collection, response).await?;

        let body: JsonValue = response
            .json()
            .await
            .map_err(|source| StoreError::RequestFailed {
                collection: collection.to_string(),
                source,
            })?;

        extract_id(&body).ok_or_else(|| StoreError::MissingId {
            collection: collection.to_string(),
        })
    }

    async fn update(
        &self,
        collection: Collection,
        filter: &Filter,
        patch: JsonValue,
    ) -> Result<(), StoreError> {
        debug!(
            "更新记录 ({}) {}={}: {}",
            collection, filter.column, filter.value, patch
        );

        let response = self
            .client
            .patch(self.endpoint(collection))
            .query(&[(filter.column.as_str(), format!("eq.{}", filter.value))])
            .header("apikey", self.api_key.as_str())
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=minimal")
            .json(&patch)
            .send()
            .await
            .map_err(|source| StoreError::RequestFailed {
                collection: collection.to_string(),
                source,
            })?;

        Self::check_status(collection, response).await?;
        Ok(())
    }
}

/// 从插入响应中取出 id
///
/// `return=representation` 时响应是记录数组，也兼容单个对象
fn extract_id(body: &JsonValue) -> Option<String> {
    let record = match body {
        JsonValue::Array(items) => items.first()?,
        other => other,
    };
    match record.get("id")? {
        JsonValue::String(id) => Some(id.clone()),
        JsonValue::Number(id) => Some(id.to_string()),
        _ => None,
    }
}
