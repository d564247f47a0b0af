//! 检索策略服务
//!
//! 每次查询的状态机：画像快路径 → 空库检查 → 索引对账 → 查询嵌入 →
//! k-NN 候选 → 词面相关性门控。向量相似度只负责生成候选，词面重叠
//! 才是接受条件：短文本上的通用编码器噪声太大，宁可漏召回也不能把
//! 自信的错误召回喂给生成器。

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::config::config::VectorConfig;
use crate::error::{AppError, Result};
use crate::index::embedding::EmbeddingModel;
use crate::index::vector::FlatVectorIndex;
use crate::models::interaction::Interaction;
use crate::models::profile::UserProfile;
use crate::models::recall::{RecallOutcome, RecallSource, RecalledMemory};
use crate::services::intent::{Intent, classify};
use crate::storage::DocumentStore;

/// 相关性门控的最小 token 长度；更短的 token（is、a、to）几乎
/// 出现在任何句子里，不构成相关性证据
const MIN_TOKEN_LEN: usize = 3;

/// RAG 检索器
///
/// 拥有向量索引；文档存储是只读的上游事实来源，检索前必须对齐。
pub struct RagRetriever {
    store: Arc<dyn DocumentStore>,
    embedding: Box<dyn EmbeddingModel>,
    index: RwLock<FlatVectorIndex>,
    index_path: PathBuf,
    top_k: usize,
}

impl RagRetriever {
    /// 打开检索器
    ///
    /// 嵌入模型维度、配置维度、快照维度三者不一致都是启动期的
    /// 致命配置错误，不会推迟到首次查询。
    pub async fn open(
        store: Arc<dyn DocumentStore>,
        embedding: Box<dyn EmbeddingModel>,
        config: &VectorConfig,
    ) -> Result<Self> {
        if embedding.dimension() != config.dimension {
            return Err(AppError::Config(format!(
                "嵌入模型维度 {} 与索引配置维度 {} 不一致",
                embedding.dimension(),
                config.dimension
            )));
        }

        let index = FlatVectorIndex::load_or_create(&config.index_path, config.dimension).await?;
        info!(entries = index.len(), "vector index ready");

        Ok(Self {
            store,
            embedding,
            index: RwLock::new(index),
            index_path: config.index_path.clone(),
            top_k: config.top_k,
        })
    }

    /// 检索与查询相关的记忆
    pub async fn retrieve(&self, query: &str, profile: &UserProfile) -> Result<RecallOutcome> {
        if classify(query) == Intent::GetName {
            return Ok(match profile.known_name() {
                Some(name) => RecallOutcome::Found(RecalledMemory {
                    document_id: None,
                    response: name.to_string(),
                    distance: None,
                    source: RecallSource::Profile,
                }),
                None => RecallOutcome::NotFound,
            });
        }

        let documents = self.store.all().await?;
        if documents.is_empty() {
            return Ok(RecallOutcome::NotFound);
        }

        self.reconcile(&documents).await?;

        let query_vector = self.embedding.encode(query).await?;
        let hits = {
            let index = self.index.read().await;
            index.search(&query_vector, self.top_k)?
        };

        let by_id: HashMap<&str, &Interaction> =
            documents.iter().map(|d| (d.id.as_str(), d)).collect();
        let query_tokens = significant_tokens(query);

        for hit in hits {
            // 索引里残留、存储里已不存在的条目直接丢弃
            let Some(document) = by_id.get(hit.document_id.as_str()) else {
                continue;
            };

            if has_token_overlap(&query_tokens, &document.query) {
                debug!(
                    document_id = %document.id,
                    distance = hit.distance,
                    "semantic recall accepted"
                );
                return Ok(RecallOutcome::Found(RecalledMemory {
                    document_id: Some(document.id.clone()),
                    response: document.response.clone(),
                    distance: Some(hit.distance),
                    source: RecallSource::Semantic,
                }));
            }
        }

        Ok(RecallOutcome::NotFound)
    }

    /// 当前索引条目数
    pub async fn index_len(&self) -> usize {
        self.index.read().await.len()
    }

    /// 索引对账：保证检索前索引覆盖存储中的每一篇文档
    ///
    /// 增量式：已索引的 ID 序列是存储顺序的前缀时只嵌入并追加尾部；
    /// 出现任何偏差（清空后的陈旧快照、顺序漂移）则整体重建。
    /// 变更后立即落快照，要么完整对齐并持久化，要么让本次查询失败。
    async fn reconcile(&self, documents: &[Interaction]) -> Result<()> {
        let mut index = self.index.write().await;

        let indexed: Vec<String> = index.document_ids().map(String::from).collect();
        let aligned = indexed.len() <= documents.len()
            && indexed
                .iter()
                .zip(documents.iter())
                .all(|(id, doc)| *id == doc.id);

        if aligned && indexed.len() == documents.len() {
            return Ok(());
        }

        if aligned {
            let tail = &documents[indexed.len()..];
            let texts: Vec<&str> = tail.iter().map(|d| d.query.as_str()).collect();
            let vectors = self.embedding.encode_batch(&texts).await?;

            for (document, vector) in tail.iter().zip(vectors) {
                index.push(document.id.clone(), vector)?;
            }
            info!(appended = tail.len(), total = index.len(), "index catch-up");
        } else {
            index.clear();
            let texts: Vec<&str> = documents.iter().map(|d| d.query.as_str()).collect();
            let vectors = self.embedding.encode_batch(&texts).await?;

            for (document, vector) in documents.iter().zip(vectors) {
                index.push(document.id.clone(), vector)?;
            }
            info!(total = index.len(), "index rebuilt");
        }

        index.persist(&self.index_path).await
    }
}

fn significant_tokens(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()).to_string())
        .filter(|t| t.chars().count() >= MIN_TOKEN_LEN)
        .collect()
}

fn has_token_overlap(query_tokens: &[String], document_text: &str) -> bool {
    let document = document_text.to_lowercase();
    query_tokens.iter().any(|token| document.contains(token.as_str()))
}
