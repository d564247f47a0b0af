//! JSON 文件文档存储
//!
//! 以插入顺序保存交互集合，启动时整体加载，每次变更整体重写。
//! 不承诺跨进程的格式兼容，只保证单进程生命周期内的一致性。

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::models::interaction::{Interaction, StoreOutcome, is_trivial};
use crate::storage::DocumentStore;

/// JSON 文件存储
pub struct JsonFileStore {
    path: PathBuf,
    documents: RwLock<Vec<Interaction>>,
}

impl JsonFileStore {
    /// 打开存储；文件不存在时从空集合开始
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let documents = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice::<Vec<Interaction>>(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(AppError::Storage(format!("读取 {} 失败: {e}", path.display()))),
        };

        debug!(count = documents.len(), path = %path.display(), "document store loaded");

        Ok(Self {
            path,
            documents: RwLock::new(documents),
        })
    }

    async fn persist(&self, documents: &[Interaction]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let bytes = serde_json::to_vec_pretty(documents)?;
        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(|e| AppError::Storage(format!("写入 {} 失败: {e}", self.path.display())))
    }
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    async fn store(&self, query: &str, response: &str) -> Result<StoreOutcome> {
        if is_trivial(query) {
            return Ok(StoreOutcome::Skipped);
        }

        let interaction = Interaction::new(query, response);
        let id = interaction.id.clone();

        let mut documents = self.documents.write().await;
        documents.push(interaction);
        self.persist(&documents).await?;

        Ok(StoreOutcome::Stored(id))
    }

    async fn all(&self) -> Result<Vec<Interaction>> {
        Ok(self.documents.read().await.clone())
    }

    async fn delete_all(&self) -> Result<()> {
        let mut documents = self.documents.write().await;
        documents.clear();
        self.persist(&documents).await
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.documents.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_path(dir: &tempfile::TempDir) -> PathBuf {
        dir.path().join("documents.json")
    }

    #[tokio::test]
    async fn test_store_and_list_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(store_path(&dir)).await.unwrap();

        store.store("first question", "first answer").await.unwrap();
        store.store("second question", "second answer").await.unwrap();

        let documents = store.all().await.unwrap();
        assert_eq!(documents.len(), 2);
        assert_eq!(documents[0].query, "first question");
        assert_eq!(documents[1].query, "second question");
    }

    #[tokio::test]
    async fn test_trivial_query_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(store_path(&dir)).await.unwrap();

        let outcome = store.store("hi", "Hello!").await.unwrap();
        assert_eq!(outcome, StoreOutcome::Skipped);
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_reload_preserves_documents() {
        let dir = tempfile::tempdir().unwrap();
        let path = store_path(&dir);

        {
            let store = JsonFileStore::open(&path).await.unwrap();
            store.store("What is AI?", "A branch of computer science.").await.unwrap();
        }

        let reopened = JsonFileStore::open(&path).await.unwrap();
        let documents = reopened.all().await.unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].query, "What is AI?");
    }

    #[tokio::test]
    async fn test_delete_all_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(store_path(&dir)).await.unwrap();

        store.store("What is AI?", "An answer.").await.unwrap();
        store.delete_all().await.unwrap();
        store.delete_all().await.unwrap();

        assert_eq!(store.count().await.unwrap(), 0);
    }
}
