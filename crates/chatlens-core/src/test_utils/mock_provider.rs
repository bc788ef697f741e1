// src/test_utils/mock_provider.rs
use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::post, Json, Router};
use serde_json::Value;
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

/// One scripted reply from the fake provider.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: StatusCode,
    pub body: Value,
    pub delay: Option<Duration>,
}

impl MockResponse {
    pub fn ok(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body,
            delay: None,
        }
    }

    pub fn with_status(status: u16, body: Value) -> Self {
        Self {
            status: StatusCode::from_u16(status).expect("valid status code"),
            body,
            delay: None,
        }
    }

    /// Hold the reply back for a while, to exercise timeout handling.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[derive(Clone)]
struct MockProviderState {
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    requests: Arc<Mutex<Vec<Value>>>,
}

impl MockProviderState {
    fn new(responses: Vec<MockResponse>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::from(responses))),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

async fn chat_completions_handler(
    State(state): State<MockProviderState>,
    Json(payload): Json<Value>,
) -> (StatusCode, Json<Value>) {
    log::debug!("mock provider received request: {:?}", payload);
    state.requests.lock().unwrap().push(payload);

    let next = state.responses.lock().unwrap().pop_front();
    match next {
        Some(response) => {
            if let Some(delay) = response.delay {
                tokio::time::sleep(delay).await;
            }
            (response.status, Json(response.body))
        }
        None => {
            log::error!("mock provider ran out of scripted responses");
            (StatusCode::SERVICE_UNAVAILABLE, Json(Value::Null))
        }
    }
}

pub struct MockProviderServer {
    addr: SocketAddr,
    shutdown_tx: tokio::sync::oneshot::Sender<()>,
    recorded_requests: Arc<Mutex<Vec<Value>>>,
}

impl MockProviderServer {
    pub async fn start(responses: Vec<MockResponse>) -> Self {
        let state = MockProviderState::new(responses);
        let recorded_requests = state.requests.clone();

        let app = Router::new()
            .route("/chat/completions", post(chat_completions_handler))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap_or_else(|e| {
            panic!("Failed to bind mock provider to 127.0.0.1:0. Error: {}", e);
        });
        let addr = listener.local_addr().unwrap();
        log::info!("mock provider listening on {}", addr);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap_or_else(|e| {
                    log::error!("mock provider error: {}", e);
                });
        });

        MockProviderServer {
            addr,
            shutdown_tx,
            recorded_requests,
        }
    }

    /// Base URL suitable for `ModelConfig::provider_url`.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn shutdown(self) {
        if self.shutdown_tx.send(()).is_err() {
            log::warn!("mock provider shutdown signal already sent or receiver dropped");
        }
    }

    /// Every request body the provider has seen, in arrival order.
    pub fn requests(&self) -> Vec<Value> {
        self.recorded_requests.lock().unwrap().clone()
    }
}
