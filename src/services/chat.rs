//! 对话编排服务
//!
//! 回退次序是策略不变量：先记忆，记忆未命中才搜索网络，且每次查询
//! 至多搜索一次；搜索结果只进 prompt，从不写回记忆。

use std::sync::Arc;
use tracing::{info, warn};

use crate::error::Result;
use crate::models::recall::RecallOutcome;
use crate::services::generation::Generator;
use crate::services::intent::{Intent, classify};
use crate::services::memory_manager::MemoryManager;
use crate::services::retrieval::RagRetriever;
use crate::services::web_search::SearchProvider;

/// 生成结果为空或无力时的兜底回答
pub const FALLBACK_ANSWER: &str =
    "AI stands for Artificial Intelligence. It refers to machines that mimic cognitive functions.";

/// 已知的无力开场白；以此开头的输出按生成失败处理
const WEAK_PREFIXES: &[&str] = &["I'm not sure"];

/// 对话服务
pub struct ChatService {
    memory: Arc<MemoryManager>,
    retriever: RagRetriever,
    generator: Box<dyn Generator>,
    search: Box<dyn SearchProvider>,
    max_search_results: usize,
}

impl ChatService {
    pub fn new(
        memory: Arc<MemoryManager>,
        retriever: RagRetriever,
        generator: Box<dyn Generator>,
        search: Box<dyn SearchProvider>,
        max_search_results: usize,
    ) -> Self {
        Self {
            memory,
            retriever,
            generator,
            search,
            max_search_results,
        }
    }

    /// 处理一次用户查询
    pub async fn respond(&self, query: &str) -> Result<String> {
        match classify(query) {
            Intent::SetName { name } => {
                self.memory.remember_name(&name);
                return Ok(format!("Got it! I'll remember your name, {name}."));
            }
            Intent::GetName => {
                return Ok(match self.memory.name() {
                    Some(name) => format!("Your name is {name}."),
                    None => "I don't know your name yet. Please tell me.".to_string(),
                });
            }
            Intent::GeneralQuery => {}
        }

        // 检索失败降级为未命中：对话必须能靠网络搜索或兜底回答走完
        let recalled = match self.retriever.retrieve(query, &self.memory.profile()).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "memory retrieval failed, degrading to no match");
                RecallOutcome::NotFound
            }
        };

        let memory_context = recalled.found().map(|m| m.response);

        let web_context = if memory_context.is_none() {
            info!("no memory match, falling back to web search");
            self.search
                .search(query, self.max_search_results)
                .await
                .map(|snippets| {
                    snippets
                        .iter()
                        .map(|s| format!("- {s}"))
                        .collect::<Vec<_>>()
                        .join("\n")
                })
        } else {
            None
        };

        let prompt = build_prompt(query, memory_context.as_deref(), web_context.as_deref());
        let generated = self.generator.generate(&prompt).await?;
        let answer = finalize_answer(&generated);

        self.memory.store_interaction(query, &answer).await?;

        Ok(answer)
    }

    /// 清空全部记忆；只有全部复位才返回确认语
    pub async fn clear_memory(&self) -> Result<String> {
        self.memory.clear_memory().await?;
        Ok("Memory cleared: all past interactions erased.".to_string())
    }

    pub fn memory(&self) -> &Arc<MemoryManager> {
        &self.memory
    }
}

fn build_prompt(query: &str, memory_context: Option<&str>, web_context: Option<&str>) -> String {
    let mut prompt = String::from("You are an AI assistant with lifetime memory.\n");
    prompt.push_str(&format!("User: {query}\n"));

    if let Some(memory) = memory_context {
        prompt.push_str(&format!("Memory context: {memory}\n"));
    }

    if let Some(web) = web_context {
        prompt.push_str(&format!("Web search context:\n{web}\n"));
    }

    prompt.push_str(
        "Based on the memory and search context, provide a clear, structured response.\n\nAnswer:",
    );

    prompt
}

fn finalize_answer(generated: &str) -> String {
    let trimmed = generated.trim();

    if trimmed.is_empty() || WEAK_PREFIXES.iter().any(|p| trimmed.starts_with(p)) {
        return FALLBACK_ANSWER.to_string();
    }

    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::config::VectorConfig;
    use crate::error::AppError;
    use crate::index::embedding::{EmbeddingModel, HashEmbeddingModel};
    use crate::services::generation::MockGenerator;
    use crate::services::memory_manager::DEFAULT_STM_CAPACITY;
    use crate::services::web_search::MockSearchProvider;
    use crate::storage::{DocumentStore, MemoryDocumentStore};
    use async_trait::async_trait;
    use mockall::Sequence;

    const DIMENSION: usize = 64;

    async fn retriever(
        dir: &tempfile::TempDir,
        store: Arc<dyn DocumentStore>,
    ) -> RagRetriever {
        RagRetriever::open(
            store,
            Box::new(HashEmbeddingModel::new(DIMENSION)),
            &VectorConfig {
                index_path: dir.path().join("index.json"),
                dimension: DIMENSION,
                top_k: 3,
            },
        )
        .await
        .unwrap()
    }

    fn chat_service(
        memory: Arc<MemoryManager>,
        retriever: RagRetriever,
        generator: MockGenerator,
        search: MockSearchProvider,
    ) -> ChatService {
        ChatService::new(memory, retriever, Box::new(generator), Box::new(search), 3)
    }

    #[tokio::test]
    async fn test_fallback_ordering_on_memory_miss() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new());
        let memory = Arc::new(MemoryManager::new(store.clone(), DEFAULT_STM_CAPACITY));
        let retriever = retriever(&dir, store).await;

        let mut seq = Sequence::new();
        let mut search = MockSearchProvider::new();
        search
            .expect_search()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Some(vec!["A web snippet.".to_string()]));

        let mut generator = MockGenerator::new();
        generator
            .expect_generate()
            .times(1)
            .in_sequence(&mut seq)
            .withf(|prompt: &str| prompt.contains("Web search context"))
            .returning(|_| Ok("A generated answer.".to_string()));

        let chat = chat_service(memory, retriever, generator, search);
        let answer = chat.respond("tell me something new").await.unwrap();

        assert_eq!(answer, "A generated answer.");
    }

    #[tokio::test]
    async fn test_web_search_skipped_on_memory_hit() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new());
        store
            .store("how is the weather today", "It is sunny.")
            .await
            .unwrap();

        let memory = Arc::new(MemoryManager::new(store.clone(), DEFAULT_STM_CAPACITY));
        let retriever = retriever(&dir, store).await;

        let mut search = MockSearchProvider::new();
        search.expect_search().never();

        let mut generator = MockGenerator::new();
        generator
            .expect_generate()
            .times(1)
            .withf(|prompt: &str| {
                prompt.contains("Memory context: It is sunny.")
                    && !prompt.contains("Web search context")
            })
            .returning(|_| Ok("Sunny, as you told me.".to_string()));

        let chat = chat_service(memory, retriever, generator, search);
        let answer = chat.respond("what about the weather today?").await.unwrap();

        assert_eq!(answer, "Sunny, as you told me.");
    }

    #[tokio::test]
    async fn test_weak_answer_is_replaced_with_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new());
        let memory = Arc::new(MemoryManager::new(store.clone(), DEFAULT_STM_CAPACITY));
        let retriever = retriever(&dir, store).await;

        let mut search = MockSearchProvider::new();
        search.expect_search().times(1).returning(|_, _| None);

        let mut generator = MockGenerator::new();
        generator
            .expect_generate()
            .times(1)
            .returning(|_| Ok("I'm not sure about that.".to_string()));

        let chat = chat_service(memory, retriever, generator, search);
        let answer = chat.respond("explain quantum computing").await.unwrap();

        assert_eq!(answer, FALLBACK_ANSWER);
    }

    #[tokio::test]
    async fn test_empty_answer_is_replaced_with_fallback() {
        assert_eq!(finalize_answer(""), FALLBACK_ANSWER);
        assert_eq!(finalize_answer("   "), FALLBACK_ANSWER);
        assert_eq!(finalize_answer("A real answer."), "A real answer.");
    }

    #[tokio::test]
    async fn test_name_intents_touch_neither_search_nor_generator() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new());
        let memory = Arc::new(MemoryManager::new(store.clone(), DEFAULT_STM_CAPACITY));
        let retriever = retriever(&dir, store.clone()).await;

        let mut search = MockSearchProvider::new();
        search.expect_search().never();
        let mut generator = MockGenerator::new();
        generator.expect_generate().never();

        let chat = chat_service(memory, retriever, generator, search);

        let confirmation = chat.respond("My name is Alice.").await.unwrap();
        assert!(confirmation.contains("Alice"));

        let answer = chat.respond("What is my name?").await.unwrap();
        assert_eq!(answer, "Your name is Alice.");

        // 姓名交互不产生任何文档
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_name_answer() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new());
        let memory = Arc::new(MemoryManager::new(store.clone(), DEFAULT_STM_CAPACITY));
        let retriever = retriever(&dir, store).await;

        let chat = chat_service(
            memory,
            retriever,
            MockGenerator::new(),
            MockSearchProvider::new(),
        );

        let answer = chat.respond("What is my name?").await.unwrap();
        assert_eq!(answer, "I don't know your name yet. Please tell me.");
    }

    /// 永远失败的嵌入模型，用来制造检索故障
    struct FailingEmbedding;

    #[async_trait]
    impl EmbeddingModel for FailingEmbedding {
        async fn encode(&self, _text: &str) -> crate::error::Result<Vec<f32>> {
            Err(AppError::Embedding("backend offline".into()))
        }

        async fn encode_batch(&self, _texts: &[&str]) -> crate::error::Result<Vec<Vec<f32>>> {
            Err(AppError::Embedding("backend offline".into()))
        }

        fn dimension(&self) -> usize {
            DIMENSION
        }
    }

    #[tokio::test]
    async fn test_retrieval_failure_degrades_to_web_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new());
        store
            .store("how is the weather today", "It is sunny.")
            .await
            .unwrap();

        let memory = Arc::new(MemoryManager::new(store.clone(), DEFAULT_STM_CAPACITY));
        let retriever = RagRetriever::open(
            store,
            Box::new(FailingEmbedding),
            &VectorConfig {
                index_path: dir.path().join("index.json"),
                dimension: DIMENSION,
                top_k: 3,
            },
        )
        .await
        .unwrap();

        let mut search = MockSearchProvider::new();
        search
            .expect_search()
            .times(1)
            .returning(|_, _| Some(vec!["Rescued by the web.".to_string()]));

        let mut generator = MockGenerator::new();
        generator
            .expect_generate()
            .times(1)
            .returning(|_| Ok("Answer built from web context.".to_string()));

        let chat = chat_service(memory, retriever, generator, search);
        let answer = chat.respond("what about the weather today?").await.unwrap();

        assert_eq!(answer, "Answer built from web context.");
    }

    #[tokio::test]
    async fn test_responses_are_stored_as_new_memories() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new());
        let memory = Arc::new(MemoryManager::new(store.clone(), DEFAULT_STM_CAPACITY));
        let retriever = retriever(&dir, store.clone()).await;

        let mut search = MockSearchProvider::new();
        search.expect_search().returning(|_, _| None);
        let mut generator = MockGenerator::new();
        generator
            .expect_generate()
            .returning(|_| Ok("Stored answer.".to_string()));

        let chat = chat_service(memory, retriever, generator, search);
        chat.respond("remember this question").await.unwrap();

        let documents = store.all().await.unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].query, "remember this question");
        assert_eq!(documents[0].response, "Stored answer.");
    }

    #[tokio::test]
    async fn test_clear_memory_confirmation() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new());
        let memory = Arc::new(MemoryManager::new(store.clone(), DEFAULT_STM_CAPACITY));
        let retriever = retriever(&dir, store.clone()).await;

        let chat = chat_service(
            memory,
            retriever,
            MockGenerator::new(),
            MockSearchProvider::new(),
        );

        store.store("What is AI?", "An answer.").await.unwrap();
        let confirmation = chat.clear_memory().await.unwrap();

        assert!(confirmation.contains("Memory cleared"));
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
