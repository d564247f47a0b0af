//! 记忆管理服务
//!
//! 把用户画像、短期记忆环和文档存储收在一个门面后面。
//! 短期记忆只存在于进程内；长期记忆委托给文档存储。

use parking_lot::RwLock;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::Result;
use crate::models::interaction::{Interaction, StoreOutcome};
use crate::models::profile::UserProfile;
use crate::models::recall::{RecallOutcome, RecallSource, RecalledMemory};
use crate::services::intent::{Intent, classify};
use crate::storage::DocumentStore;

/// 短期记忆默认容量
pub const DEFAULT_STM_CAPACITY: usize = 10;

/// `store_interaction` 的结果
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionOutcome {
    /// 查询是一条姓名陈述：画像已更新，未写入任何记忆
    NameCaptured { name: String },

    /// 已写入短期记忆并持久化到文档存储
    Recorded { id: String },

    /// 已写入短期记忆；琐碎语句未进入文档存储
    SkippedTrivial,
}

/// 记忆管理器
pub struct MemoryManager {
    stm: RwLock<VecDeque<Interaction>>,
    profile: RwLock<UserProfile>,
    store: Arc<dyn DocumentStore>,
    stm_capacity: usize,
}

impl MemoryManager {
    pub fn new(store: Arc<dyn DocumentStore>, stm_capacity: usize) -> Self {
        Self {
            stm: RwLock::new(VecDeque::with_capacity(stm_capacity)),
            profile: RwLock::new(UserProfile::default()),
            store,
            stm_capacity,
        }
    }

    /// 存储一次交互
    ///
    /// 姓名陈述只更新画像；其余交互先进短期记忆（FIFO 淘汰最旧），
    /// 再尝试持久化。
    pub async fn store_interaction(&self, query: &str, response: &str) -> Result<InteractionOutcome> {
        if let Intent::SetName { name } = classify(query) {
            self.profile.write().set_name(name.clone());
            info!(name = %name, "user name captured");
            return Ok(InteractionOutcome::NameCaptured { name });
        }

        {
            let mut stm = self.stm.write();
            if stm.len() >= self.stm_capacity {
                stm.pop_front();
            }
            stm.push_back(Interaction::new(query, response));
        }

        match self.store.store(query, response).await? {
            StoreOutcome::Stored(id) => {
                debug!(id = %id, "interaction persisted");
                Ok(InteractionOutcome::Recorded { id })
            }
            StoreOutcome::Skipped => Ok(InteractionOutcome::SkippedTrivial),
        }
    }

    /// 词面召回（弱基线）
    ///
    /// 姓名查询走画像快路径；其余按存储顺序扫描，取第一条与查询
    /// 互为子串（大小写不敏感）的文档。刻意不做语义匹配，作为向量
    /// 检索不可用时的兜底和独立正确性参照。
    pub async fn retrieve_memory(&self, query: &str) -> Result<RecallOutcome> {
        if classify(query) == Intent::GetName {
            return Ok(match self.name() {
                Some(name) => RecallOutcome::Found(RecalledMemory {
                    document_id: None,
                    response: name,
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

        let needle = query.to_lowercase();
        for document in &documents {
            let stored = document.query.to_lowercase();
            if stored.contains(&needle) || needle.contains(&stored) {
                return Ok(RecallOutcome::Found(RecalledMemory {
                    document_id: Some(document.id.clone()),
                    response: document.response.clone(),
                    distance: None,
                    source: RecallSource::Lexical,
                }));
            }
        }

        Ok(RecallOutcome::NotFound)
    }

    /// 清空全部记忆
    ///
    /// 先删文档存储（唯一可失败的一步），成功后才清短期记忆和画像，
    /// 调用方看到 `Ok` 即三者全部复位。
    pub async fn clear_memory(&self) -> Result<()> {
        self.store.delete_all().await?;
        self.stm.write().clear();
        self.profile.write().reset();
        info!("all memory cleared");
        Ok(())
    }

    /// 记录用户姓名
    pub fn remember_name(&self, name: &str) {
        self.profile.write().set_name(name);
    }

    /// 已知姓名；未设置或空串返回 None
    pub fn name(&self) -> Option<String> {
        self.profile.read().known_name().map(String::from)
    }

    /// 画像快照
    pub fn profile(&self) -> UserProfile {
        self.profile.read().clone()
    }

    /// 最近 n 条短期记忆（从旧到新）
    pub fn recent(&self, n: usize) -> Vec<Interaction> {
        let stm = self.stm.read();
        stm.iter().rev().take(n).rev().cloned().collect()
    }

    /// 短期记忆长度
    pub fn stm_len(&self) -> usize {
        self.stm.read().len()
    }
}
