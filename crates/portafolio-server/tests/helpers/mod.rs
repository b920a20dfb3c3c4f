//! Test doubles: a stand-in for the completion API and a running proxy.

#![allow(dead_code)]

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use bytes::Bytes;
use futures_util::stream::{self, StreamExt};
use portafolio_server::{AppState, ServerConfig};
use serde_json::{json, Value};
use std::convert::Infallible;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

/// How the fake completion API answers
#[derive(Clone)]
pub enum UpstreamReply {
    /// Send these body chunks, then close
    Stream(Vec<String>),
    /// Like `Stream`, for chunks that are not valid UTF-8 on their own
    StreamBytes(Vec<Vec<u8>>),
    /// Send these body chunks, then never finish
    Hang(Vec<String>),
    Reject(u16, String),
}

/// A request the fake completion API received
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct StubState {
    reply: UpstreamReply,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

pub struct UpstreamStub {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl UpstreamStub {
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

pub async fn spawn_upstream(reply: UpstreamReply) -> UpstreamStub {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let state = StubState {
        reply,
        requests: Arc::clone(&requests),
    };
    let app = Router::new()
        .route("/chat/completions", post(completions))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    UpstreamStub {
        base_url: format!("http://{}", addr),
        requests,
    }
}

async fn completions(
    State(state): State<StubState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state
        .requests
        .lock()
        .unwrap()
        .push(RecordedRequest { authorization, body });

    match state.reply {
        UpstreamReply::Reject(status, message) => {
            (StatusCode::from_u16(status).unwrap(), message).into_response()
        }
        UpstreamReply::Stream(chunks) => Body::from_stream(stream::iter(
            chunks.into_iter().map(|c| Ok::<_, Infallible>(Bytes::from(c))),
        ))
        .into_response(),
        UpstreamReply::StreamBytes(chunks) => Body::from_stream(stream::iter(
            chunks.into_iter().map(|c| Ok::<_, Infallible>(Bytes::from(c))),
        ))
        .into_response(),
        UpstreamReply::Hang(chunks) => Body::from_stream(
            stream::iter(chunks.into_iter().map(|c| Ok::<_, Infallible>(Bytes::from(c))))
                .chain(stream::pending()),
        )
        .into_response(),
    }
}

/// One SSE frame carrying a text delta
pub fn frame(text: &str) -> String {
    format!(
        "data: {}\n\n",
        json!({"choices": [{"index": 0, "delta": {"content": text}}]})
    )
}

pub fn done() -> String {
    "data: [DONE]\n\n".to_string()
}

/// Config pointing at `upstream`, with the credential read from `api_key_env`
pub fn proxy_config(upstream: &UpstreamStub, api_key_env: &str) -> ServerConfig {
    ServerConfig {
        upstream_url: upstream.base_url.clone(),
        api_key_env: api_key_env.to_string(),
        ..ServerConfig::default()
    }
}

/// Start the proxy on an ephemeral port and return its base URL.
pub async fn spawn_proxy(config: ServerConfig) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = Arc::new(AppState::new(config).unwrap());
    tokio::spawn(portafolio_server::serve_on(
        listener,
        state,
        std::future::pending(),
    ));
    format!("http://{}", addr)
}
