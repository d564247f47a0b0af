use mnemos::config::config::AppConfig;
use mnemos::config::loader::{ConfigLoader, config_exists};
use mnemos::index::create_embedding_model;
use mnemos::observability;
use mnemos::services::chat::ChatService;
use mnemos::services::generation::create_generator;
use mnemos::services::memory_manager::MemoryManager;
use mnemos::services::retrieval::RagRetriever;
use mnemos::services::web_search::create_search_provider;
use mnemos::storage::create_document_store;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Fall back to the development profile when no config file is present
    let config = if config_exists() {
        ConfigLoader::load()?
    } else {
        AppConfig::development()
    };

    let _guard = observability::init_tracing(&config.logging);
    ConfigLoader::validate(&config)?;

    info!("Starting {}...", config.app_name);

    let store = create_document_store(&config.storage).await?;
    info!("Document store initialized (backend: {})", config.storage.backend);

    let embedding_model = create_embedding_model(&config.embedding, config.vector.dimension).await?;
    info!(
        "Embedding model initialized: {} (backend: {})",
        config.embedding.model_name, config.embedding.backend
    );

    let retriever = RagRetriever::open(store.clone(), embedding_model, &config.vector).await?;
    info!("Retrieval service initialized");

    let memory = Arc::new(MemoryManager::new(store, config.memory.stm_capacity));
    info!("Memory manager initialized");

    let generator = create_generator(&config.generation)?;
    info!("Generator initialized: {}", config.generation.model_name);

    let search = create_search_provider(&config.search)?;
    info!("Web search provider initialized");

    let chat = ChatService::new(memory, retriever, generator, search, config.search.max_results);

    println!("\nLifetime memory chatbot (type 'exit' to quit, 'clear memory' to reset)\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("You: ");
        std::io::stdout().flush()?;

        let line = match lines.next_line().await? {
            Some(line) => line,
            None => break,
        };

        let query = line.trim();
        if query.is_empty() {
            continue;
        }

        if query.eq_ignore_ascii_case("exit") {
            println!("Chatbot shutting down. Goodbye!");
            break;
        }

        if query.eq_ignore_ascii_case("clear memory") {
            match chat.clear_memory().await {
                Ok(confirmation) => println!("AI: {confirmation}\n"),
                Err(e) => {
                    error!(error = %e, "memory clear failed");
                    println!("AI: Memory clear failed: {e}\n");
                }
            }
            continue;
        }

        match chat.respond(query).await {
            Ok(answer) => println!("AI: {answer}\n"),
            Err(e) => {
                error!(error = %e, "failed to answer query");
                println!("AI: Something went wrong: {e}\n");
            }
        }
    }

    Ok(())
}
