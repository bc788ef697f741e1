//! HTTP surface for the chatlens debugging proxy.
//!
//! This crate wires the completion forwarder and the document stores into an
//! axum router for the external inspection UI. The surface itself has no
//! logic: handlers delegate, translate errors into statuses, and persist
//! what the forwarder returns. All collaborators are constructed once at
//! startup and injected through `AppState`; nothing is a process-wide
//! singleton, which keeps the routes testable against scripted fakes.

pub mod error;
pub mod handlers;

pub use error::ApiError;

use axum::response::Json;
use axum::routing::{get, post};
use axum::{middleware, Router};
use chatlens_core::config::ConfigManager;
use chatlens_core::errors::ChatLensError;
use chatlens_core::forwarder::CompletionClient;
use chatlens_core::storage::{ContextStore, CurrentStore, PromptStore, StatsStore};
use serde::Serialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Configuration for the HTTP surface.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Enable CORS
    pub enable_cors: bool,
    /// CORS allowed origins (if None, allows any origin)
    pub cors_origins: Option<Vec<String>>,
    /// Enable request logging
    pub enable_logging: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".parse().unwrap(),
            enable_cors: true,
            cors_origins: None, // Allow any origin
            enable_logging: true,
        }
    }
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bind address.
    pub fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Parse and set the bind address from a string.
    pub fn with_bind_addr_str(mut self, addr: &str) -> Result<Self, ChatLensError> {
        self.bind_addr = addr
            .parse()
            .map_err(|e| ChatLensError::Config(format!("Invalid bind address: {}", e)))?;
        Ok(self)
    }

    /// Enable or disable CORS.
    pub fn with_cors(mut self, enable: bool) -> Self {
        self.enable_cors = enable;
        self
    }

    /// Set allowed CORS origins.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    /// Enable or disable request logging.
    pub fn with_logging(mut self, enable: bool) -> Self {
        self.enable_logging = enable;
        self
    }
}

/// Shared application state: the forwarder, the stores, and the settings.
#[derive(Clone)]
pub struct AppState<T: CompletionClient + Clone> {
    pub forwarder: T,
    pub prompts: Arc<PromptStore>,
    pub contexts: Arc<ContextStore>,
    pub current: Arc<CurrentStore>,
    pub stats: Arc<StatsStore>,
    pub settings: Arc<RwLock<ConfigManager>>,
    pub config: ServerConfig,
}

impl<T: CompletionClient + Clone> AppState<T> {
    /// Construct the stores from the loaded configuration and take ownership
    /// of the settings. Every store directory is created here, once.
    pub fn new(
        forwarder: T,
        settings: ConfigManager,
        config: ServerConfig,
    ) -> Result<Self, ChatLensError> {
        let app = settings.app_config();
        let prompts = Arc::new(PromptStore::new(&app.prompts_dir)?);
        let contexts = Arc::new(ContextStore::new(&app.contexts_dir)?);
        let current = Arc::new(CurrentStore::new(&app.contexts_dir)?);
        let stats = Arc::new(StatsStore::new(&app.stats_dir)?);

        Ok(Self {
            forwarder,
            prompts,
            contexts,
            current,
            stats,
            settings: Arc::new(RwLock::new(settings)),
            config,
        })
    }
}

async fn root_handler() -> Json<serde_json::Value> {
    Json(json!({
        "message": "chatlens API",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// The HTTP server wrapping a router over the injected state.
pub struct ChatLensServer<T: CompletionClient + Clone> {
    state: AppState<T>,
}

impl<T: CompletionClient + Clone + Send + Sync + 'static> ChatLensServer<T> {
    pub fn new(state: AppState<T>) -> Self {
        Self { state }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.state.config
    }

    /// Build the axum router with all routes and middleware.
    pub fn build_router(&self) -> Router {
        let config = self.state.config.clone();

        let mut router = Router::new()
            .route("/", get(root_handler))
            .route("/health", get(health_handler))
            // OpenAI-compatible pass-through
            .route(
                "/v1/chat/completions",
                post(handlers::completions::chat_completions::<T>),
            )
            // Prompt management
            .route("/api/prompts", get(handlers::prompts::list_prompts::<T>))
            .route(
                "/api/prompts/{name}",
                get(handlers::prompts::get_prompt::<T>)
                    .post(handlers::prompts::save_prompt::<T>)
                    .delete(handlers::prompts::delete_prompt::<T>),
            )
            // Saved contexts
            .route("/api/contexts", get(handlers::contexts::list_contexts::<T>))
            .route(
                "/api/contexts/{name}",
                get(handlers::contexts::get_context::<T>)
                    .post(handlers::contexts::save_context::<T>)
                    .delete(handlers::contexts::delete_context::<T>),
            )
            .route(
                "/api/contexts/{name}/rename",
                post(handlers::contexts::rename_context::<T>),
            )
            // Current snapshot slots
            .route(
                "/api/current/prompt",
                get(handlers::current::get_current_prompt::<T>)
                    .post(handlers::current::set_current_prompt::<T>),
            )
            .route(
                "/api/current/system-prompt",
                get(handlers::current::get_current_system_prompt::<T>)
                    .post(handlers::current::set_current_system_prompt::<T>),
            )
            .route(
                "/api/current/tools",
                get(handlers::current::get_current_tools::<T>)
                    .post(handlers::current::set_current_tools::<T>),
            )
            .route(
                "/api/current/context",
                get(handlers::current::get_current_context::<T>)
                    .post(handlers::current::set_current_context::<T>)
                    .delete(handlers::current::clear_current_context::<T>),
            )
            .route(
                "/api/current/content",
                get(handlers::current::get_current_content::<T>)
                    .post(handlers::current::set_current_content::<T>),
            )
            .route(
                "/api/current/tool-call",
                get(handlers::current::get_current_tool_call::<T>)
                    .post(handlers::current::set_current_tool_call::<T>),
            )
            .route(
                "/api/current/stats",
                get(handlers::current::get_current_stats::<T>),
            )
            // Configuration
            .route(
                "/api/config",
                get(handlers::config::get_config::<T>).post(handlers::config::save_config::<T>),
            )
            .route(
                "/api/config/raw",
                get(handlers::config::get_config_raw::<T>)
                    .post(handlers::config::save_config_raw::<T>),
            )
            .route(
                "/api/config/system-prompt-path",
                post(handlers::config::update_system_prompt_path::<T>),
            )
            .with_state(self.state.clone());

        if config.enable_logging {
            router = router.layer(middleware::from_fn(
                |request: axum::http::Request<axum::body::Body>,
                 next: axum::middleware::Next| async {
                    let request_id = uuid::Uuid::new_v4().to_string();
                    let method = request.method().clone();
                    let uri = request.uri().clone();
                    log::info!("Request {} {} {}", request_id, method, uri);

                    let start = std::time::Instant::now();
                    let response = next.run(request).await;
                    let duration = start.elapsed();
                    log::info!("Response {} completed in {:?}", request_id, duration);

                    response
                },
            ));
        }

        router = router.layer(TraceLayer::new_for_http());

        if config.enable_cors {
            let cors_layer = if let Some(ref origins) = config.cors_origins {
                let origins: Result<Vec<_>, _> = origins.iter().map(|s| s.parse()).collect();
                match origins {
                    Ok(origins) => CorsLayer::new()
                        .allow_origin(origins)
                        .allow_methods(Any)
                        .allow_headers(Any),
                    Err(_) => CorsLayer::permissive(),
                }
            } else {
                CorsLayer::permissive()
            };
            router = router.layer(cors_layer);
        }

        router
    }

    /// Start the server and listen for connections.
    ///
    /// This method will block until the server is shut down.
    pub async fn serve(self) -> Result<(), ChatLensError> {
        let bind_addr = self.state.config.bind_addr;
        let router = self.build_router();
        let listener = TcpListener::bind(bind_addr).await.map_err(|e| {
            ChatLensError::Config(format!("Failed to bind to {}: {}", bind_addr, e))
        })?;

        log::info!("chatlens server listening on {}", bind_addr);
        log::info!("Health check: http://{}/health", bind_addr);
        log::info!("Completions: http://{}/v1/chat/completions", bind_addr);

        axum::serve(listener, router)
            .await
            .map_err(|e| ChatLensError::Internal(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Start the server with graceful shutdown support.
    ///
    /// The server will shut down when the provided shutdown signal is received.
    pub async fn serve_with_shutdown<F>(self, shutdown_signal: F) -> Result<(), ChatLensError>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.state.config.bind_addr;
        let router = self.build_router();
        let listener = TcpListener::bind(bind_addr).await.map_err(|e| {
            ChatLensError::Config(format!("Failed to bind to {}: {}", bind_addr, e))
        })?;

        log::info!("chatlens server listening on {}", bind_addr);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| ChatLensError::Internal(format!("Server error: {}", e)))?;

        log::info!("chatlens server shut down gracefully");
        Ok(())
    }
}

/// Utility function to create a shutdown signal from Ctrl+C.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            log::info!("Received Ctrl+C, shutting down...");
        },
        _ = terminate => {
            log::info!("Received SIGTERM, shutting down...");
        },
    }
}
