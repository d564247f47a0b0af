//! 记忆召回结果模型
//!
//! 用显式的结果类型取代哨兵字符串，调用方不可能把一条存储的回答
//! 误认为"未命中"。错误走 `Result`，不在这里建模。

use serde::{Deserialize, Serialize};

/// 召回来源
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RecallSource {
    /// 用户画像快路径（姓名查询）
    #[serde(rename = "profile")]
    Profile,

    /// 词面包含匹配（弱基线）
    #[serde(rename = "lexical")]
    Lexical,

    /// 向量检索 + 词面相关性门控
    #[serde(rename = "semantic")]
    Semantic,
}

impl std::fmt::Display for RecallSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecallSource::Profile => write!(f, "profile"),
            RecallSource::Lexical => write!(f, "lexical"),
            RecallSource::Semantic => write!(f, "semantic"),
        }
    }
}

/// 一条命中的记忆
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecalledMemory {
    /// 命中的文档 ID（画像快路径没有对应文档）
    pub document_id: Option<String>,

    /// 召回的文本：存储的回答，或画像中的姓名
    pub response: String,

    /// 向量检索的欧氏距离（仅语义来源有值）
    pub distance: Option<f32>,

    /// 召回来源
    pub source: RecallSource,
}

/// 召回结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RecallOutcome {
    /// 找到相关记忆
    Found(RecalledMemory),

    /// 没有相关记忆
    NotFound,
}

impl RecallOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, RecallOutcome::Found(_))
    }

    pub fn found(self) -> Option<RecalledMemory> {
        match self {
            RecallOutcome::Found(memory) => Some(memory),
            RecallOutcome::NotFound => None,
        }
    }
}
