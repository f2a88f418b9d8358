use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use eyre::{Result, WrapErr, eyre};
use log::info;
use tokio::net::TcpListener;

mod cli;

use cli::Cli;
use ytsum::config::{self, Config, FallbackKind};
use ytsum::pipeline::{Fallback, Pipeline};
use ytsum::search::{DataApiSearch, ScrapeSearch};
use ytsum::server::{self, AppState};
use ytsum::session::SessionStore;
use ytsum::summarize::{self, GeminiClient, SummaryModel};
use ytsum::transcript::InnerTubeFetcher;

/// Transient transcript-fetch failures get this many attempts in total.
const FETCH_ATTEMPTS: u32 = 3;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Config file is optional; CLI flags take priority over it.
    let file = Config::load().unwrap_or_default();

    let bind = cli
        .bind
        .or(file.bind)
        .unwrap_or_else(|| config::DEFAULT_BIND.to_string());
    let lang = cli
        .lang
        .or(file.default_lang)
        .unwrap_or_else(|| config::DEFAULT_LANG.to_string());
    let fallback_kind = cli.fallback.or(file.fallback).unwrap_or_default();
    let model_name = cli
        .model
        .or(file.model)
        .unwrap_or_else(|| summarize::DEFAULT_MODEL.to_string());
    let timeout = cli
        .timeout
        .or(file.request_timeout_secs)
        .unwrap_or(config::DEFAULT_TIMEOUT_SECS);

    // Missing credentials are a startup error, never a runtime one.
    let gemini_key = std::env::var("GEMINI_API_KEY")
        .map_err(|_| eyre!("GEMINI_API_KEY is missing in environment variables"))?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout))
        .build()
        .wrap_err("failed to build HTTP client")?;

    let fallback = match fallback_kind {
        FallbackKind::TitleEcho => Fallback::TitleEcho,
        FallbackKind::SearchApi => {
            let key = std::env::var("YOUTUBE_API_KEY").map_err(|_| {
                eyre!("YOUTUBE_API_KEY is missing in environment variables (required for the search-api fallback)")
            })?;
            Fallback::Search(Arc::new(DataApiSearch::new(client.clone(), key)))
        }
        FallbackKind::Scrape => Fallback::Search(Arc::new(ScrapeSearch::new(client.clone()))),
    };

    let model: Arc<dyn SummaryModel> =
        Arc::new(GeminiClient::new(client.clone(), gemini_key, model_name.clone()));

    let pipeline = Arc::new(Pipeline::new(
        Arc::new(InnerTubeFetcher::new(client)),
        fallback,
        model.clone(),
        lang,
        FETCH_ATTEMPTS,
    ));

    let state = AppState {
        pipeline,
        model,
        sessions: Arc::new(SessionStore::new()),
    };

    let addr: SocketAddr = bind
        .parse()
        .wrap_err_with(|| format!("invalid bind address: {bind}"))?;
    let listener = TcpListener::bind(addr).await.wrap_err("failed to bind")?;
    info!("Listening on {addr} (fallback={fallback_kind:?}, model={model_name})");

    axum::serve(listener, server::router(state))
        .await
        .wrap_err("server error")?;

    Ok(())
}
