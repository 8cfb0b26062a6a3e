mod config;
mod corpus;
mod embedding;
mod errors;
mod extraction;
mod index;
mod matching;
mod models;
mod pipeline;
mod routes;
mod scoring;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, EmbeddingBackend};
use crate::corpus::RoleCorpus;
use crate::embedding::{EmbeddingProvider, HashEmbedder, OpenAiEmbedder};
use crate::extraction::ProfileExtractor;
use crate::matching::MatchContext;
use crate::pipeline::AnalysisPipeline;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting RoleFit API v{}", env!("CARGO_PKG_VERSION"));

    // Role catalog and market data
    let corpus = RoleCorpus::load(&config.datasets_dir)
        .with_context(|| format!("loading datasets from {}", config.datasets_dir.display()))?;
    info!(
        "Corpus ready: {} roles, {} market skills",
        corpus.len(),
        corpus.market().len()
    );
    if corpus.market().is_empty() {
        warn!("No market data loaded; industry alignment will score every skill as unknown");
    }

    let extractor = ProfileExtractor::new(&corpus.skill_vocabulary())
        .context("compiling skill matchers")?;
    info!("Skill vocabulary: {} entries", extractor.skill_count());

    let embedder = build_embedder(&config)?;
    info!(
        "Embedding backend: {} (dim={})",
        embedder.name(),
        embedder.dimension()
    );

    // Index is built once; requests only read it
    let context = MatchContext::new(corpus, embedder);
    context
        .build_index()
        .await
        .context("building role vector index")?;

    let pipeline =
        AnalysisPipeline::new(Arc::new(context), Arc::new(extractor), config.top_k_roles);

    let state = AppState {
        config: config.clone(),
        pipeline: Arc::new(pipeline),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the dashboard host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_embedder(config: &Config) -> Result<Arc<dyn EmbeddingProvider>> {
    match config.embedding_backend {
        EmbeddingBackend::Hash => Ok(Arc::new(HashEmbedder::new(config.embedding_dim))),
        EmbeddingBackend::OpenAi => {
            let api_key = config
                .embedding_api_key
                .clone()
                .context("EMBEDDING_API_KEY is required for the openai backend")?;
            let embedder = OpenAiEmbedder::new(
                api_key,
                &config.embedding_base_url,
                config.embedding_model.clone(),
                config.embedding_dim,
            )?;
            Ok(Arc::new(embedder))
        }
    }
}
