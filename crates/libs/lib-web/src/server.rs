//! # Server Setup
//!
//! Server initialization, route registration, and HTTP server startup.
//!
//! [`start_server`] loads configuration, builds the Gemini model and session
//! registry, starts the background tasks (session sweeper, keep-alive pinger)
//! and serves the router until Ctrl+C / SIGTERM.

// region: --- Imports
use crate::handlers;
use crate::keepalive::{BackoffPolicy, KeepAlive, KeepAliveStats};
use crate::middleware::{log_requests, stamp_req, RequestStamp};
use crate::sessions::{SessionPolicy, SessionRegistry};
use axum::http::{HeaderValue, Method};
use axum::{routing::get, Router};
use lib_core::{AppError, Config};
use lib_gemini::{GeminiModel, GenerativeModel};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::info;
// endregion: --- Imports

// region: --- AppState
/// Application state shared across all routes
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionRegistry>,
    pub keepalive: Arc<KeepAliveStats>,
}

impl AppState {
    /// Build state around an arbitrary model. Used by `start_server` and tests.
    pub fn new(config: &Config, model: Arc<dyn GenerativeModel>) -> Self {
        let sessions = Arc::new(SessionRegistry::new(model, SessionPolicy::from_config(config)));
        Self {
            sessions,
            keepalive: Arc::new(KeepAliveStats::new()),
        }
    }
}

impl axum::extract::FromRef<AppState> for Arc<SessionRegistry> {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}

impl axum::extract::FromRef<AppState> for Arc<KeepAliveStats> {
    fn from_ref(state: &AppState) -> Self {
        state.keepalive.clone()
    }
}
// endregion: --- AppState

// region: --- Server Configuration
/// Server configuration not covered by the environment-driven [`Config`].
#[derive(Clone, Debug, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins; empty allows any origin
    pub allowed_origins: Vec<String>,
}
// endregion: --- Server Configuration

// region: --- Server Setup
/// Install the global tracing subscriber.
///
/// The level comes from `LOG_LEVEL` (trace, debug, info, warn, error); unknown
/// values fall back to `info`. `RUST_LOG` style directives are also accepted.
pub fn init_tracing() -> anyhow::Result<()> {
    let log_level = std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(&log_level))
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to set global tracing subscriber: {}", e))?;

    info!(" Log level: {}", log_level);
    Ok(())
}

fn log_filter(log_level: &str) -> tracing_subscriber::EnvFilter {
    match log_level {
        "trace" | "debug" | "info" | "warn" | "error" => tracing_subscriber::EnvFilter::new(log_level),
        other => tracing_subscriber::EnvFilter::try_new(other)
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
    }
}

/// Initialize and start the HTTP server
///
/// # Errors
///
/// This function will return an error if:
/// - Configuration loading or validation fails
/// - The HTTP client for the model cannot be built
/// - Server binding fails
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    // `.env` first so a LOG_LEVEL set there reaches the subscriber.
    dotenvy::dotenv().ok();
    init_tracing()?;
    info!(" GEMINI RELAY STARTING");

    info!("Loading configuration...");
    let app_config = Config::from_env().map_err(AppError::Config)?;
    app_config.validate().map_err(AppError::Config)?;

    let model = GeminiModel::from_config(&app_config)
        .map_err(|e| anyhow::anyhow!("Failed to initialize Gemini client: {}", e))?;
    info!(model = %app_config.gemini_model, api_base = %app_config.gemini_api_base, " Gemini model configured");

    let state = AppState::new(&app_config, Arc::new(model));

    let policy = SessionPolicy::from_config(&app_config);
    Arc::clone(&state.sessions).spawn_sweeper(policy.sweep_every());
    info!(
        ttl_secs = policy.ttl.as_secs(),
        max_sessions = policy.max_sessions,
        " Session sweeper started"
    );

    if app_config.keepalive_enabled {
        let pinger = KeepAlive::new(
            app_config.keepalive_url.clone(),
            BackoffPolicy::new(app_config.keepalive_interval),
            Arc::clone(&state.keepalive),
        )?;
        pinger.spawn();
    } else {
        info!("Keep-alive pinger disabled");
    }

    let app = create_router(state, &config.allowed_origins);

    let listener = tokio::net::TcpListener::bind(&app_config.bind_address).await?;
    info!(" SERVER READY: http://{}", app_config.bind_address);
    log_server_info();

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

/// Create the application router with all routes and layers.
pub fn create_router(state: AppState, allowed_origins: &[String]) -> Router {
    let allow_origin = if allowed_origins.is_empty() {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        AllowOrigin::list(origins)
    };

    let cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::OPTIONS]);

    Router::new()
        .route("/ask", get(handlers::ask::ask))
        .route("/ping", get(handlers::ping::ping))
        .route("/health", get(handlers::ping::health))
        .fallback(|| async {
            info!("[404 HANDLER] Unmatched route - returning 404");
            AppError::NotFound("Route not found".to_string())
        })
        .with_state(state)
        // Outermost layer runs first: stamp, then log, then trace.
        .layer(
            tower_http::trace::TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    let request_id = request
                        .extensions()
                        .get::<RequestStamp>()
                        .map(|s| s.id.clone())
                        .unwrap_or_else(|| "unknown".to_string());
                    tracing::info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                })
                .on_request(())
                .on_response(()),
        )
        .layer(axum::middleware::from_fn(log_requests))
        .layer(axum::middleware::from_fn(stamp_req))
        .layer(cors)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}

/// Log server information
fn log_server_info() {
    info!(" RELAY:");
    info!("   • GET  /ask?q={{query}}&id={{user_id}}");
    info!(" HEALTH:");
    info!("   • GET  /ping");
    info!("   • GET  /health");
}
// endregion: --- Server Setup
