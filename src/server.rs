//! MCP server entry points for stdio and Streamable HTTP.
//!
//! The embedding model is loaded once and shared. Every MCP session gets its
//! own empty memory graph.

use crate::config::MemweaveConfig;
use crate::embedding::{self, EmbeddingProvider};
use crate::tools::MemoryTools;
use anyhow::Result;
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::streamable_http_server::StreamableHttpService;
use rmcp::ServiceExt;
use std::sync::Arc;

fn load_embedding(config: &MemweaveConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    let provider = embedding::create_provider(&config.embedding)?;
    tracing::info!(provider = %config.embedding.provider, "embedding provider ready");
    Ok(Arc::from(provider))
}

pub async fn serve(config: MemweaveConfig) -> Result<()> {
    match config.server.transport.as_str() {
        "stdio" => serve_stdio(config).await,
        "http" => serve_http(config).await,
        other => anyhow::bail!("unknown transport: {other}. Supported: stdio, http"),
    }
}

/// Serve a single session over stdin/stdout.
pub async fn serve_stdio(config: MemweaveConfig) -> Result<()> {
    tracing::info!("starting memweave on stdio");

    let embedding = load_embedding(&config)?;
    let tools = MemoryTools::new(embedding, Arc::new(config));

    let server = tools.serve(rmcp::transport::stdio()).await?;
    tracing::info!("MCP server running, waiting for client");

    server.waiting().await?;
    tracing::info!("MCP server shut down");
    Ok(())
}

/// Serve Streamable HTTP at `/mcp`, one fresh graph per session.
pub async fn serve_http(config: MemweaveConfig) -> Result<()> {
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let embedding = load_embedding(&config)?;
    let config = Arc::new(config);

    let service = StreamableHttpService::new(
        move || {
            tracing::debug!("new session");
            Ok(MemoryTools::new(Arc::clone(&embedding), Arc::clone(&config)))
        },
        LocalSessionManager::default().into(),
        Default::default(),
    );
    let router = axum::Router::new().nest_service("/mcp", service);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("listening at http://{bind_addr}/mcp");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("shutting down HTTP server");
        })
        .await?;
    Ok(())
}
