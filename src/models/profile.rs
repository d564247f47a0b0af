//! 用户画像数据模型
//!
//! 每个会话只有一个画像实例，随会话存续，显式清空时重置。

use serde::{Deserialize, Serialize};

/// 用户画像
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// 用户姓名（空串视为未设置）
    pub name: Option<String>,
}

impl UserProfile {
    /// 记录用户姓名
    ///
    /// 空姓名也会被记录，读取时按未设置处理。
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// 返回已知姓名；未设置或空串返回 None
    pub fn known_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.trim().is_empty())
    }

    /// 重置画像
    pub fn reset(&mut self) {
        self.name = None;
    }
}
