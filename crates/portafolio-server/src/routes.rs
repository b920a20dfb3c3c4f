use crate::config::ServerConfig;
use crate::error::ProxyError;
use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::header::{CACHE_CONTROL, CONNECTION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use futures_util::StreamExt;
use portafolio_core::ai::build_messages;
use portafolio_core::prompt::system_prompt;
use portafolio_core::{Catalog, ChatRequest, GroqClient, Locale, Translations};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Shared, read-only state for every request
pub struct AppState {
    pub config: ServerConfig,
    pub http: reqwest::Client,
    pub catalog: Arc<Catalog>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> anyhow::Result<Self> {
        Ok(Self {
            config,
            http: reqwest::Client::new(),
            catalog: Arc::new(Catalog::embedded()?),
        })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/chat", post(chat))
        .route("/chat", post(chat))
        .route("/api/locales/{locale}", get(locale_dictionary))
        .route("/health", get(health))
        .with_state(state)
}

/// Relay a transcript to the completion API and stream the reply text back.
async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Response, ProxyError> {
    let Json(request) = payload.map_err(|rejection| ProxyError::BadRequest(rejection.body_text()))?;

    let Some(api_key) = state.config.api_key() else {
        error!(variable = %state.config.api_key_env, "completion API key missing");
        return Err(ProxyError::MissingCredential(state.config.api_key_env.clone()));
    };

    let locale = request
        .locale
        .as_deref()
        .and_then(Locale::from_code)
        .unwrap_or_default();
    let messages = build_messages(system_prompt(locale), &request.messages);
    info!(%locale, messages = request.messages.len(), "relaying chat request");

    let client = GroqClient::with_client(state.http.clone(), &state.config.upstream_url, &api_key)
        .with_settings(state.config.completion_settings());
    let deltas = client.stream_chat(&messages).await.map_err(|e| {
        warn!(error = %e, "completion request rejected");
        ProxyError::from(e)
    })?;

    // Errors end the body abruptly so the client never mistakes a cut-off reply for a full one
    let body = Body::from_stream(deltas.map(|item| {
        item.map(Bytes::from).map_err(|e| {
            error!(error = %e, "completion stream failed");
            e
        })
    }));

    Ok((
        [
            (CONTENT_TYPE, "text/event-stream"),
            (CACHE_CONTROL, "no-cache"),
            (CONNECTION, "keep-alive"),
        ],
        body,
    )
        .into_response())
}

/// Dictionary for a locale code; unsupported codes get the default locale's.
async fn locale_dictionary(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Json<Translations> {
    Json(state.catalog.load_translations_for_code(&code).clone())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
