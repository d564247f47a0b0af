//! 意图识别服务
//!
//! 把动态字符串匹配收敛为一个封闭的意图集合，在任何检索/生成逻辑
//! 之前完成识别。

use once_cell::sync::Lazy;
use regex::Regex;

static NAME_STATEMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)my name is(.*)").expect("invalid name statement pattern"));

static NAME_QUESTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)what is my name").expect("invalid name question pattern"));

/// 识别出的查询意图
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// "my name is <X>"：X 为首个句号前的剩余部分，已修剪并首字母大写。
    /// 剩余为空时 name 为空串，读取侧按未设置处理。
    SetName { name: String },

    /// "what is my name"
    GetName,

    /// 其余一切查询
    GeneralQuery,
}

/// 对查询做意图分类
pub fn classify(query: &str) -> Intent {
    if let Some(caps) = NAME_STATEMENT.captures(query) {
        let remainder = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        let name = remainder.split('.').next().unwrap_or("").trim();
        return Intent::SetName {
            name: capitalize(name),
        };
    }

    if NAME_QUESTION.is_match(query) {
        return Intent::GetName;
    }

    Intent::GeneralQuery
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}
