use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 文档存储配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// 存储后端类型: "json" 或 "memory"
    pub backend: String,
    /// JSON 文档集合路径
    pub document_path: PathBuf,
}

/// 向量索引配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct VectorConfig {
    /// 索引快照路径
    pub index_path: PathBuf,
    /// 向量维度
    pub dimension: usize,
    /// k-NN 候选数量
    pub top_k: usize,
}

/// 嵌入模型配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Embedding 后端类型: "ollama" 或 "hash"
    pub backend: String,
    /// 模型名称
    pub model_name: String,
    /// Ollama 服务器地址
    pub ollama_url: String,
    /// Ollama 请求超时（秒）
    pub ollama_timeout: u64,
}

/// 生成模型配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GenerationConfig {
    /// 模型名称
    pub model_name: String,
    /// Ollama 服务器地址
    pub ollama_url: String,
    /// Ollama 请求超时（秒）
    pub ollama_timeout: u64,
    /// 最大输出 token 数
    pub max_output_tokens: u32,
}

/// 网络搜索配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SearchConfig {
    /// 搜索服务地址
    pub base_url: String,
    /// 最多取用的结果条数
    pub max_results: usize,
    /// 请求超时（秒）
    pub timeout: u64,
    /// User-Agent
    pub user_agent: String,
}

/// 记忆配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MemoryConfig {
    /// 短期记忆容量
    pub stm_capacity: usize,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: String,
    /// 日志文件目录（未设置时只输出到终端）
    pub log_dir: Option<PathBuf>,
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// 文档存储配置
    pub storage: StorageConfig,
    /// 向量索引配置
    pub vector: VectorConfig,
    /// 嵌入模型配置
    pub embedding: EmbeddingConfig,
    /// 生成模型配置
    pub generation: GenerationConfig,
    /// 网络搜索配置
    pub search: SearchConfig,
    /// 记忆配置
    pub memory: MemoryConfig,
    /// 日志配置
    pub logging: LoggingConfig,
    /// 应用名称
    pub app_name: String,
    /// 环境
    pub environment: String,
}

impl AppConfig {
    /// 创建开发环境配置
    pub fn development() -> Self {
        Self {
            storage: StorageConfig {
                backend: "json".into(),
                document_path: PathBuf::from("./data/memory/documents.json"),
            },
            vector: VectorConfig {
                index_path: PathBuf::from("./data/memory/index.json"),
                dimension: 384,
                top_k: 3,
            },
            embedding: EmbeddingConfig {
                backend: "hash".into(),
                model_name: "all-minilm".into(),
                ollama_url: "http://localhost:11434".into(),
                ollama_timeout: 60,
            },
            generation: GenerationConfig {
                model_name: "llama3.2".into(),
                ollama_url: "http://localhost:11434".into(),
                ollama_timeout: 120,
                max_output_tokens: 200,
            },
            search: SearchConfig {
                base_url: "https://html.duckduckgo.com".into(),
                max_results: 3,
                timeout: 10,
                user_agent: "mnemos/0.1".into(),
            },
            memory: MemoryConfig { stm_capacity: 10 },
            logging: LoggingConfig {
                level: "debug".into(),
                log_dir: None,
            },
            app_name: "mnemos".into(),
            environment: "development".into(),
        }
    }

    /// 创建生产环境配置
    pub fn production() -> Self {
        let mut config = Self::development();
        config.environment = "production".into();
        config.logging.level = "info".into();
        config.logging.log_dir = Some(PathBuf::from("./logs"));
        config.embedding.backend = "ollama".into();
        config
    }
}
