//! 文本生成服务
//!
//! 生成调用是一个不透明边界：prompt 进，文本出。解码必须确定
//! （不采样），输出长度由外部上限约束。

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::config::GenerationConfig;
use crate::error::{AppError, Result};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Ollama 生成模型客户端
pub struct OllamaGenerator {
    client: reqwest::Client,
    model_name: String,
    base_url: String,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

impl OllamaGenerator {
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.ollama_timeout))
            .build()?;

        Ok(Self {
            client,
            model_name: config.model_name.clone(),
            base_url: config.ollama_url.clone(),
            max_output_tokens: config.max_output_tokens,
        })
    }
}

#[async_trait]
impl Generator for OllamaGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&serde_json::json!({
                "model": self.model_name,
                "prompt": prompt,
                "stream": false,
                "options": {
                    // 确定性解码
                    "temperature": 0.0,
                    "num_predict": self.max_output_tokens
                }
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Generation(format!(
                "Ollama generation failed: {}",
                error_text
            )));
        }

        let generate_response: OllamaGenerateResponse = response.json().await?;
        Ok(generate_response.response)
    }
}

/// 创建生成器
pub fn create_generator(config: &GenerationConfig) -> Result<Box<dyn Generator>> {
    let generator = OllamaGenerator::new(config)?;
    Ok(Box::new(generator))
}
