//! Mnemos - 记忆增强型对话代理
//!
//! 为语言模型补充持久化的对话记忆：存储历史交互，按语义相关性召回，
//! 无可用记忆时回退到实时网络搜索。

pub mod config;
pub mod error;
pub mod index;
pub mod models;
pub mod observability;
pub mod services;
pub mod storage;
