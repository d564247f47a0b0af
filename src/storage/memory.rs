//! 内存文档存储
//!
//! 用于测试和不需要持久化的临时会话。

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::Result;
use crate::models::interaction::{Interaction, StoreOutcome, is_trivial};
use crate::storage::DocumentStore;

/// 内存存储
#[derive(Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<Vec<Interaction>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn store(&self, query: &str, response: &str) -> Result<StoreOutcome> {
        if is_trivial(query) {
            return Ok(StoreOutcome::Skipped);
        }

        let interaction = Interaction::new(query, response);
        let id = interaction.id.clone();
        self.documents.write().push(interaction);

        Ok(StoreOutcome::Stored(id))
    }

    async fn all(&self) -> Result<Vec<Interaction>> {
        Ok(self.documents.read().clone())
    }

    async fn delete_all(&self) -> Result<()> {
        self.documents.write().clear();
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.documents.read().len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryDocumentStore::new();

        let outcome = store.store("What is AI?", "An answer.").await.unwrap();
        assert!(matches!(outcome, StoreOutcome::Stored(_)));

        let documents = store.all().await.unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].response, "An answer.");

        store.delete_all().await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_memory_store_skips_trivial() {
        let store = MemoryDocumentStore::new();

        assert_eq!(store.store("bye", "Bye!").await.unwrap(), StoreOutcome::Skipped);
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
