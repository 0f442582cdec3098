//! Axum HTTP server implementation

use crate::core::service::AddonManagerService;
use crate::http::auth::{require_admin, session_middleware};
use crate::http::handlers::{addons, auth, directory, status, stremio, users, AppState};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Build the application router.
///
/// `/api/users*`, `/api/addons*`, `/api/import` and `/api/export` sit behind
/// the admin session gate; everything else is public.
pub fn build_router(state: AppState, body_limit_bytes: usize) -> Router {
    let admin_routes = Router::new()
        .route("/api/users", get(users::list_users).post(users::add_user))
        .route("/api/users/sync", post(users::sync_all_users))
        .route("/api/users/:email", delete(users::delete_user))
        .route("/api/users/:email/sync", post(users::sync_user))
        .route("/api/addons", get(addons::list_addons).post(addons::add_addon))
        .route("/api/addons/:id", delete(addons::delete_addon))
        .route("/api/export", get(addons::export_addons))
        .route("/api/import", post(addons::import_addons))
        .route_layer(middleware::from_fn(require_admin));

    let public_routes = Router::new()
        .route("/health", get(status::health))
        .route("/api/auth/status", get(status::auth_status))
        .route("/api/login", post(auth::login))
        .route("/api/logout", post(auth::logout))
        .route("/api/stremio/register", post(stremio::register))
        .route("/api/stremio/login", post(stremio::login))
        .route("/manifest.json", get(directory::manifest))
        .route("/catalog.json", get(directory::catalog_json))
        .route("/catalog/:type/:file", get(directory::catalog));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::DELETE,
            Method::PUT,
            Method::PATCH,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(Duration::from_secs(86400));

    public_routes
        .merge(admin_routes)
        .layer(middleware::from_fn_with_state(
            state.sessions.clone(),
            session_middleware,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(DefaultBodyLimit::max(body_limit_bytes)),
        )
        .with_state(state)
}

/// Addon manager HTTP server
pub struct AddonManagerServer {
    service: Arc<AddonManagerService>,
    addr: SocketAddr,
}

impl AddonManagerServer {
    /// Create a new server instance
    pub fn new(service: Arc<AddonManagerService>, host: &str, port: u16) -> Result<Self, String> {
        let addr = Self::parse_address(host, port)?;
        Ok(Self { service, addr })
    }

    /// Parse and normalize host:port into a SocketAddr
    fn parse_address(host: &str, port: u16) -> Result<SocketAddr, String> {
        let normalized_host = Self::normalize_host(host);

        // IPv6 addresses need brackets
        let addr_str = if normalized_host.contains(':') {
            format!("[{}]:{}", normalized_host, port)
        } else {
            format!("{}:{}", normalized_host, port)
        };

        addr_str.parse().map_err(|_| {
            format!(
                "Unable to parse address '{}'. Use IP addresses like '127.0.0.1', '0.0.0.0', '::1'",
                addr_str
            )
        })
    }

    /// Normalize hostnames for SocketAddr compatibility
    fn normalize_host(host: &str) -> String {
        match host {
            "localhost" => "127.0.0.1".to_string(),
            "::1" | "[::1]" => "::1".to_string(),
            "::" | "[::]" => "::".to_string(),
            _ => host.to_string(),
        }
    }

    /// Start the server and run until ctrl-c or SIGTERM
    pub async fn serve(self) -> Result<(), Box<dyn std::error::Error>> {
        let body_limit = self.service.config().server.body_limit_bytes;
        let app = build_router(AppState::new(self.service.clone()), body_limit);

        info!("Starting addon manager HTTP server on {}", self.addr);

        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        let actual_addr = listener.local_addr()?;
        info!("Server started successfully on http://{}", actual_addr);
        info!("Press Ctrl+C to stop the server");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server closed");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Ctrl-C received. Shutting down gracefully..."),
        _ = terminate => info!("SIGTERM received. Shutting down gracefully..."),
    }
}
