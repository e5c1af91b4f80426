//! rustbb/cmd/rustbb/src/main.rs
//!
//! The entry point: loads configuration, wires the sqlite and in-process
//! adapters into the engines, and serves the axum router.

use std::sync::Arc;

use anyhow::Context;
use api_adapters::web::{router, AppState};
use configs::AppConfig;
use secrecy::ExposeSecret;
use services::{
    BatchDeletion, CommentDeletion, ListingDefaults, Ports, PostDeletion, PostListing, RecencyFeed,
};
use storage_adapters::{
    MemoryGrants, MemoryListCache, SqliteAttachmentStore, SqliteMemberDirectory, SqlitePointLedger,
    SqliteStore,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cfg = AppConfig::load().context("loading configuration")?;

    let store = Arc::new(
        SqliteStore::connect(
            cfg.database.url.expose_secret(),
            cfg.database.max_connections,
        )
        .await
        .context("connecting to the database")?,
    );
    let pool = store.pool();

    let ports = Ports {
        store: store.clone(),
        recency: store.clone(),
        ledger: Arc::new(SqlitePointLedger::new(pool.clone())),
        files: Arc::new(SqliteAttachmentStore::new(pool.clone())),
        cache: Arc::new(MemoryListCache::new()),
        grants: Arc::new(MemoryGrants::new()),
        members: Arc::new(SqliteMemberDirectory::new(pool)),
    };

    let defaults = ListingDefaults {
        search_window: cfg.board.search_window,
        page_rows: cfg.board.page_rows,
        name_cut: cfg.board.name_cut,
    };
    let state = AppState {
        listing: Arc::new(PostListing::new(ports.clone(), defaults)),
        post_deletion: Arc::new(PostDeletion::new(ports.clone())),
        comment_deletion: Arc::new(CommentDeletion::new(ports.clone())),
        batch_deletion: Arc::new(BatchDeletion::new(ports.clone())),
        recency: Arc::new(RecencyFeed::new(
            ports,
            cfg.board.recency_rows,
            cfg.board.name_cut,
        )),
    };

    let addr = cfg.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "rustbb listening");

    axum::serve(listener, router(state))
        .await
        .context("serving")?;
    Ok(())
}
