//! 服务模块

pub mod chat;
pub mod generation;
pub mod intent;
pub mod memory_manager;
pub mod retrieval;
pub mod web_search;

pub use chat::ChatService;
pub use generation::{Generator, OllamaGenerator, create_generator};
pub use intent::{Intent, classify};
pub use memory_manager::{InteractionOutcome, MemoryManager};
pub use retrieval::RagRetriever;
pub use web_search::{DuckDuckGoSearch, SearchProvider, create_search_provider};
