// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Stub oracle + backend harness for pipeline tests.
//!
//! The stub "encryption" is a passthrough: the sign oracle wraps the
//! plaintext payload under `xdata` with a fixed `xtime`, the backend
//! answers with its configured body wrapped under `xenc`, and the decrypt
//! oracle unwraps it. Signatures are deterministic functions of their
//! inputs so tests can assert on exactly what was signed.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::body::to_bytes;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::config::AppConfig;

use super::client::XlClient;

/// Epoch milliseconds stamped into every stub envelope.
pub const FIXED_XTIME: i64 = 1_697_788_496_789;

#[derive(Debug, Clone)]
enum StubResponse {
    Json(Value),
    Raw(String),
}

/// One request the stub backend (or a signature oracle) observed.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub path: String,
    pub headers: HashMap<String, String>,
    /// Plaintext payload: the `xdata` field of the sealed body for backend
    /// calls, the request body itself for oracle calls.
    pub payload: Value,
}

#[derive(Clone, Default)]
struct StubState {
    responses: Arc<HashMap<String, StubResponse>>,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

pub struct StubNetworkBuilder {
    responses: HashMap<String, StubResponse>,
}

impl StubNetworkBuilder {
    pub fn respond(mut self, path: &str, body: Value) -> Self {
        self.responses
            .insert(normalize(path), StubResponse::Json(body));
        self
    }

    /// Answer with a body that is not a decryptable envelope.
    pub fn respond_raw(mut self, path: &str, body: &str) -> Self {
        self.responses
            .insert(normalize(path), StubResponse::Raw(body.to_string()));
        self
    }

    pub async fn spawn(self) -> StubNetwork {
        let state = StubState {
            responses: Arc::new(self.responses),
            seen: Arc::new(Mutex::new(Vec::new())),
        };

        let router = Router::new()
            .route("/oracle/sign", post(oracle_sign))
            .route("/oracle/decrypt", post(oracle_decrypt))
            .route("/oracle/sign-payment", post(oracle_sign_payment))
            .route("/oracle/sign-bounty", post(oracle_sign_bounty))
            .route("/oracle/sign-ax", post(oracle_sign_ax))
            .fallback(backend)
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        StubNetwork {
            base: format!("http://{addr}"),
            state,
        }
    }
}

pub struct StubNetwork {
    base: String,
    state: StubState,
}

impl StubNetwork {
    pub fn builder() -> StubNetworkBuilder {
        StubNetworkBuilder {
            responses: HashMap::new(),
        }
    }

    pub fn config(&self) -> Arc<AppConfig> {
        Arc::new(AppConfig::for_tests(&self.base))
    }

    pub fn client(&self) -> XlClient {
        XlClient::new(self.config()).unwrap()
    }

    /// All requests observed at `path`, in arrival order.
    pub fn requests(&self, path: &str) -> Vec<SeenRequest> {
        let wanted = normalize(path);
        self.state
            .seen
            .lock()
            .unwrap()
            .iter()
            .filter(|seen| seen.path == wanted)
            .cloned()
            .collect()
    }
}

fn normalize(path: &str) -> String {
    path.trim_start_matches('/').to_string()
}

fn record(state: &StubState, path: &str, headers: HashMap<String, String>, payload: Value) {
    state.seen.lock().unwrap().push(SeenRequest {
        path: normalize(path),
        headers,
        payload,
    });
}

async fn oracle_sign(State(state): State<StubState>, Json(body): Json<Value>) -> Json<Value> {
    record(&state, "oracle/sign", HashMap::new(), body.clone());
    let path = body["path"].as_str().unwrap_or_default();
    Json(json!({
        "encrypted_body": { "xtime": FIXED_XTIME, "xdata": body["payload"] },
        "x_signature": format!("env-sig-{path}"),
    }))
}

async fn oracle_decrypt(State(state): State<StubState>, Json(body): Json<Value>) -> Response {
    record(&state, "oracle/decrypt", HashMap::new(), body.clone());
    match body.pointer("/body/xenc") {
        Some(plain) => Json(plain.clone()).into_response(),
        None => (StatusCode::BAD_REQUEST, "not an envelope").into_response(),
    }
}

async fn oracle_sign_payment(
    State(state): State<StubState>,
    Json(body): Json<Value>,
) -> Json<Value> {
    record(&state, "oracle/sign-payment", HashMap::new(), body.clone());
    Json(json!({
        "x_signature": format!(
            "pay-sig-{}-{}-{}",
            body["sig_time_sec"], body["token_payment"].as_str().unwrap_or_default(),
            body["payment_method"].as_str().unwrap_or_default(),
        ),
    }))
}

async fn oracle_sign_bounty(
    State(state): State<StubState>,
    Json(body): Json<Value>,
) -> Json<Value> {
    record(&state, "oracle/sign-bounty", HashMap::new(), body.clone());
    Json(json!({
        "x_signature": format!(
            "bounty-sig-{}-{}",
            body["sig_time_sec"], body["token_payment"].as_str().unwrap_or_default(),
        ),
    }))
}

async fn oracle_sign_ax(State(state): State<StubState>, Json(body): Json<Value>) -> Json<Value> {
    record(&state, "oracle/sign-ax", HashMap::new(), body.clone());
    Json(json!({
        "ax_signature": format!(
            "ax-sig-{}-{}-{}-{}",
            body["ts"].as_str().unwrap_or_default(),
            body["contact"].as_str().unwrap_or_default(),
            body["code"].as_str().unwrap_or_default(),
            body["channel"].as_str().unwrap_or_default(),
        ),
    }))
}

async fn backend(State(state): State<StubState>, request: Request) -> Response {
    let path = normalize(request.uri().path());
    let headers: HashMap<String, String> = request
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                value.to_str().unwrap_or_default().to_string(),
            )
        })
        .collect();

    let bytes = to_bytes(request.into_body(), usize::MAX).await.unwrap();
    let sealed: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    let payload = sealed.get("xdata").cloned().unwrap_or(Value::Null);
    record(&state, &path, headers, payload);

    match state.responses.get(&path) {
        Some(StubResponse::Json(body)) => Json(json!({ "xenc": body })).into_response(),
        Some(StubResponse::Raw(text)) => text.clone().into_response(),
        None => (StatusCode::NOT_FOUND, "no stub response configured").into_response(),
    }
}
