//! 网络搜索服务
//!
//! 搜索严格作为记忆未命中时的回退，结果从不写回记忆。
//! 任何传输失败就地吞掉，对调用方只表现为"没有结果"。

use async_trait::async_trait;
use tracing::warn;

use crate::config::config::SearchConfig;
use crate::error::{AppError, Result};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// 返回排好序的摘要片段；失败或为空时返回 None
    async fn search(&self, query: &str, max_results: usize) -> Option<Vec<String>>;
}

/// DuckDuckGo HTML 搜索客户端（无需 API key）
pub struct DuckDuckGoSearch {
    client: reqwest::Client,
    base_url: String,
}

impl DuckDuckGoSearch {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    async fn fetch(&self, query: &str, max_results: usize) -> Result<Vec<String>> {
        let url = format!("{}/html/?q={}", self.base_url, urlencoding::encode(query));

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(AppError::Connection(format!(
                "search returned status {}",
                response.status()
            )));
        }

        let html = response.text().await?;
        Ok(parse_snippets(&html, max_results))
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoSearch {
    async fn search(&self, query: &str, max_results: usize) -> Option<Vec<String>> {
        match self.fetch(query, max_results).await {
            Ok(snippets) if !snippets.is_empty() => Some(snippets),
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "web search failed, treating as no result");
                None
            }
        }
    }
}

/// 从 DuckDuckGo HTML 结果页提取摘要片段
fn parse_snippets(html: &str, max_results: usize) -> Vec<String> {
    let mut snippets = Vec::new();

    for segment in html.split("class=\"result__snippet\"").skip(1) {
        if snippets.len() >= max_results {
            break;
        }

        let Some(snippet) = extract_between(segment, ">", "</a>") else {
            continue;
        };

        let snippet = snippet.replace("<b>", "").replace("</b>", "");
        let snippet = snippet.trim();
        if !snippet.is_empty() {
            snippets.push(snippet.to_string());
        }
    }

    snippets
}

fn extract_between<'a>(s: &'a str, start: &str, end: &str) -> Option<&'a str> {
    let from = s.find(start)? + start.len();
    let to = s[from..].find(end)? + from;
    Some(&s[from..to])
}

/// 创建搜索提供方
pub fn create_search_provider(config: &SearchConfig) -> Result<Box<dyn SearchProvider>> {
    let provider = DuckDuckGoSearch::new(config)?;
    Ok(Box::new(provider))
}
