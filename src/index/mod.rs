//! 索引模块

pub mod embedding;
pub mod vector;

pub use embedding::{EmbeddingModel, HashEmbeddingModel, OllamaEmbeddingModel, create_embedding_model};
pub use vector::{FlatVectorIndex, IndexEntry, VectorHit};
