//! 向量索引服务
//!
//! 平面索引：按位置保存 (文档 ID, 向量)，暴力欧氏距离 k-NN。
//! 快照整体读写；快照维度与配置不符在启动即失败。

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::error::{AppError, Result};

/// 索引条目：向量与其对应文档的位置链接
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    pub document_id: String,
    pub vector: Vec<f32>,
}

/// k-NN 命中
#[derive(Debug, Clone)]
pub struct VectorHit {
    pub document_id: String,
    pub distance: f32,
}

#[derive(Serialize, Deserialize)]
struct IndexSnapshot {
    dimension: usize,
    entries: Vec<IndexEntry>,
}

/// 平面向量索引
pub struct FlatVectorIndex {
    dimension: usize,
    entries: Vec<IndexEntry>,
}

impl FlatVectorIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            entries: Vec::new(),
        }
    }

    /// 读取快照；文件不存在时返回空索引
    pub async fn load_or_create(path: impl AsRef<Path>, dimension: usize) -> Result<Self> {
        let path = path.as_ref();

        let snapshot = match tokio::fs::read(path).await {
            Ok(bytes) => serde_json::from_slice::<IndexSnapshot>(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::new(dimension));
            }
            Err(e) => {
                return Err(AppError::VectorIndex(format!(
                    "读取索引快照 {} 失败: {e}",
                    path.display()
                )));
            }
        };

        if snapshot.dimension != dimension {
            return Err(AppError::Config(format!(
                "索引快照维度 {} 与配置维度 {} 不一致",
                snapshot.dimension, dimension
            )));
        }

        debug!(entries = snapshot.entries.len(), path = %path.display(), "vector index loaded");

        Ok(Self {
            dimension,
            entries: snapshot.entries,
        })
    }

    /// 整体重写快照
    pub async fn persist(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let snapshot = IndexSnapshot {
            dimension: self.dimension,
            entries: self.entries.clone(),
        };
        let bytes = serde_json::to_vec(&snapshot)?;

        tokio::fs::write(path, bytes).await.map_err(|e| {
            AppError::VectorIndex(format!("写入索引快照 {} 失败: {e}", path.display()))
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 按位置顺序返回已索引的文档 ID
    pub fn document_ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.document_id.as_str())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn push(&mut self, document_id: String, vector: Vec<f32>) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(AppError::VectorIndex(format!(
                "向量维度 {} 与索引维度 {} 不一致",
                vector.len(),
                self.dimension
            )));
        }

        self.entries.push(IndexEntry {
            document_id,
            vector,
        });

        Ok(())
    }

    fn euclidean(a: &[f32], b: &[f32]) -> f32 {
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| (x - y) * (x - y))
            .sum::<f32>()
            .sqrt()
    }

    /// k-NN 检索，按距离升序返回至多 k 个命中
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<VectorHit>> {
        if query.len() != self.dimension {
            return Err(AppError::VectorIndex(format!(
                "查询向量维度 {} 与索引维度 {} 不一致",
                query.len(),
                self.dimension
            )));
        }

        let mut hits: Vec<VectorHit> = self
            .entries
            .iter()
            .map(|entry| VectorHit {
                document_id: entry.document_id.clone(),
                distance: Self::euclidean(query, &entry.vector),
            })
            .collect();

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(k);

        Ok(hits)
    }
}
