pub mod admission;
pub mod api;
pub mod audit;
pub mod bypass;
pub mod cli;
pub mod config;
pub mod gate;
pub mod mutation;
pub mod patch;
pub mod product;
pub mod tracing;
pub mod validation;

use ::tracing::info;
use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use std::{net::SocketAddr, sync::Arc};
use tower_http::trace::{self, TraceLayer};

use crate::api::{
    handlers::{readiness_handler, review_handler},
    service::{Dispatcher, MUTATE_PATH, VALIDATE_PATH},
    state::ApiServerState,
};
use crate::audit::{AuditSink, TracingAuditSink};
use crate::config::Config;

pub struct ProductWebhook {
    router: Router,
    addr: SocketAddr,
    tls_config: Option<RustlsConfig>,
}

impl ProductWebhook {
    /// Build the server, auditing through `tracing`.
    pub async fn new_from_config(config: Config) -> Result<Self> {
        Self::new_with_audit_sink(config, Arc::new(TracingAuditSink)).await
    }

    pub async fn new_with_audit_sink(config: Config, audit: Arc<dyn AuditSink>) -> Result<Self> {
        let state = Arc::new(ApiServerState {
            dispatcher: Dispatcher::new(config.bypass_rules, config.allowlist_namespaces, audit),
        });

        let tls_config = match config.tls_config {
            Some(tls_config) => Some(
                RustlsConfig::from_pem_file(tls_config.cert_file, tls_config.key_file).await?,
            ),
            None => None,
        };

        let router = Router::new()
            .route(MUTATE_PATH, post(review_handler))
            .route(VALIDATE_PATH, post(review_handler))
            .fallback(review_handler)
            .with_state(state)
            .layer(
                TraceLayer::new_for_http()
                    .on_request(trace::DefaultOnRequest::new().level(::tracing::Level::DEBUG))
                    .on_response(trace::DefaultOnResponse::new().level(::tracing::Level::DEBUG)),
            )
            .route("/readiness", get(readiness_handler));

        Ok(Self {
            router,
            addr: config.addr,
            tls_config,
        })
    }

    pub async fn run(self) -> Result<()> {
        if let Some(tls_config) = self.tls_config {
            info!(address = %self.addr, "started HTTPS server");
            axum_server::bind_rustls(self.addr, tls_config)
                .serve(self.router.into_make_service())
                .await?;
        } else {
            info!(address = %self.addr, "started HTTP server");
            axum_server::bind(self.addr)
                .serve(self.router.into_make_service())
                .await?;
        }

        Ok(())
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }
}
