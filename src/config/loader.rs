use crate::config::config::AppConfig;
use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use std::path::PathBuf;

/// 配置加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 从默认路径加载配置
    ///
    /// 搜索路径：
    /// 1. ./config.toml
    /// 2. 环境变量（MNEMOS_ 前缀）
    pub fn load() -> Result<AppConfig, figment::Error> {
        let figment = Figment::new()
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("MNEMOS_").split("_").global());

        figment.extract()
    }

    /// 从指定路径加载配置
    pub fn load_from(path: PathBuf) -> Result<AppConfig, figment::Error> {
        let figment = Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("MNEMOS_").split("_").global());

        figment.extract()
    }

    /// 验证配置
    pub fn validate(config: &AppConfig) -> Result<(), ConfigValidationError> {
        if config.vector.dimension == 0 {
            return Err(ConfigValidationError::InvalidDimension);
        }

        if config.vector.top_k == 0 {
            return Err(ConfigValidationError::InvalidTopK);
        }

        if config.memory.stm_capacity == 0 {
            return Err(ConfigValidationError::InvalidStmCapacity);
        }

        if !matches!(config.storage.backend.as_str(), "json" | "memory") {
            return Err(ConfigValidationError::UnknownStorageBackend(
                config.storage.backend.clone(),
            ));
        }

        if !matches!(config.embedding.backend.as_str(), "hash" | "ollama") {
            return Err(ConfigValidationError::UnknownEmbeddingBackend(
                config.embedding.backend.clone(),
            ));
        }

        Ok(())
    }
}

/// 配置验证错误
#[derive(thiserror::Error, Debug)]
pub enum ConfigValidationError {
    #[error("向量维度无效，必须大于 0")]
    InvalidDimension,

    #[error("k-NN 候选数量无效，必须大于 0")]
    InvalidTopK,

    #[error("短期记忆容量无效，必须大于 0")]
    InvalidStmCapacity,

    #[error("未知的存储后端: {0}")]
    UnknownStorageBackend(String),

    #[error("未知的嵌入后端: {0}")]
    UnknownEmbeddingBackend(String),
}

/// 获取默认配置文件路径
pub fn default_config_path() -> PathBuf {
    PathBuf::from("config.toml")
}

/// 检查配置文件是否存在
pub fn config_exists() -> bool {
    default_config_path().exists()
}
