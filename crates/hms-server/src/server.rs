use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    extract::FromRef,
    routing::{get, post},
};
use hms_auth::{
    AuditLogger, HttpIdentityProvider, LogMasker, RequestAuthenticator, middleware::AuthState,
};
use hms_auth_postgres::PostgresAuthStorage;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{config::AppConfig, handlers};

/// Shared state handed to every route.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthState,
    pub audit: AuditLogger,
    /// Name of the identity provider's session cookie.
    pub session_cookie: Arc<str>,
}

impl AppState {
    pub fn new(auth: AuthState, audit: AuditLogger, session_cookie: &str) -> Self {
        Self {
            auth,
            audit,
            session_cookie: Arc::from(session_cookie),
        }
    }
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

pub struct HmsServer {
    addr: SocketAddr,
    app: Router,
}

pub fn build_app(state: AppState, cfg: &AppConfig) -> Router {
    let body_limit = cfg.server.body_limit_bytes;
    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/api/auth/me", get(handlers::me))
        .route("/api/auth/session", get(handlers::session))
        .route("/api/auth/logout", post(handlers::logout))
        .route("/api/admin/whoami", get(handlers::admin_whoami))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http.request",
                        http.method = %req.method(),
                        http.target = %req.uri().path(),
                        http.status_code = tracing::field::Empty,
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        span.record(
                            "http.status_code",
                            tracing::field::display(res.status().as_u16()),
                        );
                        tracing::info!(
                            http.status = %res.status().as_u16(),
                            elapsed_ms = %latency.as_millis(),
                            "request handled"
                        );
                    },
                ),
        )
        .layer(axum::extract::DefaultBodyLimit::max(body_limit))
}

pub struct ServerBuilder {
    addr: SocketAddr,
    config: AppConfig,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder {
    pub fn new() -> Self {
        let cfg = AppConfig::default();
        Self {
            addr: cfg.addr(),
            config: cfg,
        }
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.addr = cfg.addr();
        self.config = cfg;
        self
    }

    /// Connects to PostgreSQL and the identity provider and assembles the
    /// router.
    pub async fn build(self) -> anyhow::Result<HmsServer> {
        let storage = PostgresAuthStorage::connect(
            &self.config.database.url,
            self.config.database.max_connections,
        )
        .await?;
        tracing::info!(
            max_connections = self.config.database.max_connections,
            "PostgreSQL pool ready"
        );

        let provider = HttpIdentityProvider::from_config(&self.config.auth.identity_provider)?;
        tracing::info!(base_url = %provider.base_url(), "Identity provider configured");

        let authenticator = RequestAuthenticator::from_config(
            &self.config.auth,
            Arc::new(provider),
            storage.profile_adapter(),
            storage.seat_adapter(),
        )?;

        let audit = AuditLogger::new(
            storage.audit_log_adapter(),
            self.config.auth.audit.clone(),
            LogMasker::new(self.config.auth.masking.mode),
        );
        tracing::info!(
            enabled = audit.is_enabled(),
            fail_on_error = self.config.auth.audit.fail_on_error,
            "Audit logging configured"
        );

        let state = AppState::new(
            AuthState::new(authenticator),
            audit,
            &self.config.auth.session.cookie_name,
        );

        Ok(HmsServer {
            addr: self.addr,
            app: build_app(state, &self.config),
        })
    }
}

impl HmsServer {
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        // Peer addresses feed the gateway trusted-proxy check.
        axum::serve(
            listener,
            self.app
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
