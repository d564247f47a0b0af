//! 存储模块
//!
//! 文档存储是长期记忆的唯一事实来源：纯粹的持久化映射，
//! 不包含任何检索逻辑。

pub mod json_store;
pub mod memory;

pub use json_store::JsonFileStore;
pub use memory::MemoryDocumentStore;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::config::StorageConfig;
use crate::error::{AppError, Result};
use crate::models::interaction::{Interaction, StoreOutcome};

/// 文档存储 trait
///
/// `all()` 的返回顺序在单个会话内必须稳定：向量索引按位置与文档对齐，
/// 顺序漂移会破坏索引一致性。
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// 持久化一次交互；琐碎语句返回 `Skipped`
    async fn store(&self, query: &str, response: &str) -> Result<StoreOutcome>;

    /// 按稳定存储顺序返回全部交互
    async fn all(&self) -> Result<Vec<Interaction>>;

    /// 删除全部交互（幂等）
    async fn delete_all(&self) -> Result<()>;

    /// 统计交互数量
    async fn count(&self) -> Result<usize>;
}

/// 创建文档存储
pub async fn create_document_store(config: &StorageConfig) -> Result<Arc<dyn DocumentStore>> {
    match config.backend.as_str() {
        "json" => {
            let store = JsonFileStore::open(&config.document_path).await?;
            Ok(Arc::new(store))
        }
        "memory" => Ok(Arc::new(MemoryDocumentStore::new())),
        other => Err(AppError::Config(format!(
            "未知的存储后端: {other}（支持 json / memory）"
        ))),
    }
}
