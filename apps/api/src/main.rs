mod access;
mod applications;
mod auth;
mod chat;
mod companies;
mod config;
mod errors;
mod extract;
mod identities;
mod interviews;
mod jobs;
mod llm_client;
mod matching;
mod models;
mod pagination;
mod profiles;
mod routes;
mod saved_jobs;
mod state;
mod store;
mod validation;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::JwtVerifier;
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::matching::{KeywordSkillMatcher, LlmSkillMatcher, SkillMatcher};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::PgStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting JobHub API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL and apply migrations
    let store = PgStore::connect(&config.database_url, config.database_max_connections).await?;

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone());
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let skill_matcher: Arc<dyn SkillMatcher> = if config.enable_llm_skill_match {
        info!("Skill matching backend: llm");
        Arc::new(LlmSkillMatcher(llm.clone()))
    } else {
        info!("Skill matching backend: keyword");
        Arc::new(KeywordSkillMatcher)
    };

    let state = AppState {
        store: Arc::new(store),
        verifier: Arc::new(JwtVerifier::new(&config.jwt_secret)),
        llm,
        skill_matcher,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
