//! 交互数据模型
//!
//! 一次用户交互（查询 + 回答）是长期记忆的基本单元：
//! 一旦写入即不可变，只有整体清空记忆时才会销毁。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 琐碎语句黑名单
///
/// 命中的查询不会进入长期记忆（短期记忆仍会记录）。
const TRIVIAL_PHRASES: &[&str] = &["hi", "hello", "thanks", "bye", "exit", "clear memory"];

/// 判断查询是否属于琐碎语句（大小写不敏感的整句匹配）
pub fn is_trivial(query: &str) -> bool {
    let normalized = query.trim().to_lowercase();
    TRIVIAL_PHRASES.contains(&normalized.as_str())
}

/// 一次已存储的用户交互
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    /// 交互唯一标识
    pub id: String,

    /// 用户查询原文
    pub query: String,

    /// 生成的回答
    pub response: String,

    /// 创建时间
    pub created_at: DateTime<Utc>,
}

impl Interaction {
    /// 创建新交互记录
    pub fn new(query: &str, response: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            query: query.to_string(),
            response: response.to_string(),
            created_at: Utc::now(),
        }
    }
}

/// 文档存储写入结果
#[derive(Debug, Clone, PartialEq)]
pub enum StoreOutcome {
    /// 已持久化，携带生成的文档 ID
    Stored(String),

    /// 命中琐碎语句黑名单，未写入
    Skipped,
}

impl StoreOutcome {
    /// 返回写入生成的文档 ID
    pub fn id(&self) -> Option<&str> {
        match self {
            StoreOutcome::Stored(id) => Some(id),
            StoreOutcome::Skipped => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_interaction_creation() {
        let interaction = Interaction::new("What is AI?", "AI is a branch of computer science.");

        assert!(!interaction.id.is_empty());
        assert_eq!(interaction.query, "What is AI?");
        assert_eq!(interaction.response, "AI is a branch of computer science.");
    }

    #[test]
    fn test_interaction_ids_are_unique() {
        let a = Interaction::new("q", "r");
        let b = Interaction::new("q", "r");

        assert_ne!(a.id, b.id);
    }

    #[rstest]
    #[case("hi")]
    #[case("hello")]
    #[case("thanks")]
    #[case("bye")]
    #[case("exit")]
    #[case("clear memory")]
    #[case("  Hi  ")]
    #[case("CLEAR MEMORY")]
    fn test_trivial_phrases(#[case] query: &str) {
        assert!(is_trivial(query));
    }

    #[rstest]
    #[case("What is AI?")]
    #[case("hi there")]
    #[case("say hello to Bob")]
    fn test_non_trivial_phrases(#[case] query: &str) {
        assert!(!is_trivial(query));
    }

    #[test]
    fn test_store_outcome_id() {
        assert_eq!(StoreOutcome::Stored("doc_1".into()).id(), Some("doc_1"));
        assert_eq!(StoreOutcome::Skipped.id(), None);
    }
}
