use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::watch;

use helpline::application::ports::{
    AttachmentStore, Clock, CollectionConfig, ConversationRepository, DocumentRepository,
    Embedder, LlmClient, VectorStore,
};
use helpline::application::services::{
    ConversationService, InactivitySweeper, IngestionService, ReplyGenerator, RetrievalService,
};
use helpline::infrastructure::clock::SystemClock;
use helpline::infrastructure::llm::{CannedLlmClient, HashingEmbedder, OpenAiClient, OpenAiEmbedder};
use helpline::infrastructure::observability::{TracingConfig, init_tracing};
use helpline::infrastructure::persistence::{
    InMemoryConversationRepository, InMemoryDocumentRepository, InMemoryVectorStore,
    PgConversationRepository, PgDocumentRepository, QdrantAdapter, create_pool, run_migrations,
};
use helpline::infrastructure::storage::ObjectAttachmentStore;
use helpline::infrastructure::text_processing::{CompositeFileLoader, SentenceWindowSplitter};
use helpline::presentation::{AppState, Environment, RequestLimits, Settings, create_router};

struct Adapters {
    conversations: Arc<dyn ConversationRepository>,
    documents: Arc<dyn DocumentRepository>,
    vector_store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    llm_client: Arc<dyn LlmClient>,
    attachments: Arc<dyn AttachmentStore>,
}

fn scaffold_adapters(settings: &Settings) -> Adapters {
    tracing::warn!("Scaffold mode: in-memory storage, canned replies");
    Adapters {
        conversations: Arc::new(InMemoryConversationRepository::new()),
        documents: Arc::new(InMemoryDocumentRepository::new()),
        vector_store: Arc::new(InMemoryVectorStore::new()),
        embedder: Arc::new(HashingEmbedder::new(settings.scaffold.embedding_dimension)),
        llm_client: Arc::new(CannedLlmClient),
        attachments: Arc::new(ObjectAttachmentStore::in_memory(
            &settings.storage.public_base_url,
        )),
    }
}

async fn production_adapters(settings: &Settings) -> anyhow::Result<Adapters> {
    let pool = create_pool(&settings.database.url, settings.database.max_connections)
        .await
        .context("Failed to connect to PostgreSQL")?;
    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    let vector_store = QdrantAdapter::new(
        &settings.qdrant.url,
        settings.qdrant.api_key.as_deref(),
        settings.qdrant.collection_name.clone(),
    )
    .context("Failed to create Qdrant client")?;
    vector_store
        .create_collection(&CollectionConfig::new(settings.embeddings.dimension))
        .await
        .context("Failed to prepare Qdrant collection")?;

    let embedder = OpenAiEmbedder::new(
        settings.embeddings.base_url.clone(),
        settings.embeddings.api_key.clone(),
        settings.embeddings.model.clone(),
        settings.embeddings.send_input_type,
        Duration::from_secs(settings.embeddings.timeout_secs),
    )
    .context("Failed to build embedding client")?;

    let llm_client = OpenAiClient::new(
        settings.llm.provider.clone(),
        settings.llm.base_url.clone(),
        settings.llm.api_key.clone(),
        settings.llm.chat_model.clone(),
        Duration::from_secs(settings.llm.timeout_secs),
    )
    .context("Failed to build completion client")?;

    let attachments = ObjectAttachmentStore::local(
        PathBuf::from(&settings.storage.attachments_dir),
        &settings.storage.public_base_url,
    )
    .context("Failed to prepare attachment storage")?;

    Ok(Adapters {
        conversations: Arc::new(PgConversationRepository::new(pool.clone())),
        documents: Arc::new(PgDocumentRepository::new(pool)),
        vector_store: Arc::new(vector_store),
        embedder: Arc::new(embedder),
        llm_client: Arc::new(llm_client),
        attachments: Arc::new(attachments),
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;
    let tracing_config = TracingConfig::new(
        environment.as_str(),
        std::env::var("LOG_FORMAT").ok().as_deref(),
    );
    init_tracing(&tracing_config).context("Failed to initialize tracing")?;

    let settings = Settings::load(environment).context("Failed to load settings")?;
    tracing::info!(%environment, scaffold = settings.scaffold.enabled, "Starting helpline");

    let adapters = if settings.scaffold.enabled {
        scaffold_adapters(&settings)
    } else {
        production_adapters(&settings).await?
    };

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let prompts = Arc::new(
        settings
            .persona
            .load()
            .context("Failed to read persona files")?,
    );
    let windows = settings.chat.windows();

    let retrieval = Arc::new(RetrievalService::new(
        Arc::clone(&adapters.embedder),
        Arc::clone(&adapters.vector_store),
        settings.rag.top_k,
        settings.rag.max_context_chars,
    ));
    let replies = Arc::new(ReplyGenerator::new(
        Arc::clone(&adapters.llm_client),
        Arc::clone(&prompts),
        settings.chat.history_window,
    ));

    let chat = Arc::new(ConversationService::new(
        Arc::clone(&adapters.conversations),
        retrieval,
        replies,
        Arc::clone(&adapters.attachments),
        prompts,
        Arc::clone(&clock),
        windows,
    ));

    let ingestion = Arc::new(IngestionService::new(
        Arc::new(CompositeFileLoader::standard()),
        Arc::new(SentenceWindowSplitter::new(
            settings.chunking.target_chars,
            settings.chunking.overlap_words,
        )),
        Arc::clone(&adapters.embedder),
        Arc::clone(&adapters.vector_store),
        Arc::clone(&adapters.documents),
        Arc::clone(&clock),
    ));

    let sweeper = InactivitySweeper::new(
        Arc::clone(&adapters.conversations),
        Arc::clone(&chat),
        clock,
        windows,
        settings.chat.sweep_interval(),
    );
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper_handle = tokio::spawn(sweeper.run(shutdown_rx));

    let state = AppState {
        chat,
        ingestion,
        attachments: adapters.attachments,
        limits: RequestLimits {
            max_message_length: settings.chat.max_message_length,
            max_attachment_bytes: settings.storage.max_attachment_bytes,
            max_document_bytes: settings.storage.max_document_bytes,
        },
    };

    let router = create_router(state);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let _ = shutdown_tx.send(true);
    if let Err(e) = sweeper_handle.await {
        tracing::error!(error = %e, "Inactivity sweeper task failed");
    }

    Ok(())
}
