//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the resolution handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Resolve portal and custom url for every request
//! - Swap the resolver when site definitions change
//!
//! The handler only reports what was resolved; rendering content is left to
//! whatever sits behind this service.

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::any,
    Extension, Json, Router,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ListenerConfig;
use crate::custom_url::{CustomUrlProcessor, CustomUrlStore};
use crate::http::request::{RequestAttributes, RequestInfo};
use crate::routing::Manager;

/// Everything needed to resolve a request against one collection.
pub struct Resolver {
    manager: Manager,
    processor: CustomUrlProcessor,
    environment: String,
}

impl Resolver {
    pub fn new(manager: Manager, store: Arc<dyn CustomUrlStore>, environment: impl Into<String>) -> Self {
        let environment = environment.into();
        let processor = CustomUrlProcessor::new(store, manager.clone(), environment.clone());
        Self {
            manager,
            processor,
            environment,
        }
    }

    /// Match the request to a url entry, then run custom url processing.
    pub fn resolve(&self, request: &RequestInfo) -> RequestAttributes {
        let mut attributes = self
            .manager
            .find_url_entry(&request.url(), &self.environment)
            .map(RequestAttributes::from_entry)
            .unwrap_or_default();

        if attributes.site_key.is_some() {
            self.processor.process(request, &mut attributes);
        }
        attributes
    }
}

/// Application state injected into middleware.
#[derive(Clone)]
pub struct AppState {
    resolver: Arc<ArcSwap<Resolver>>,
}

impl AppState {
    pub fn new(resolver: Resolver) -> Self {
        Self {
            resolver: Arc::new(ArcSwap::from_pointee(resolver)),
        }
    }

    /// Current resolver, valid for the duration of one request.
    pub fn resolver(&self) -> Arc<Resolver> {
        self.resolver.load_full()
    }

    /// Replace the resolver. In-flight requests keep the previous one.
    pub fn swap(&self, resolver: Resolver) {
        self.resolver.store(Arc::new(resolver));
    }
}

/// HTTP server exposing request resolution.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server around the given resolver.
    pub fn new(resolver: Resolver, config: &ListenerConfig) -> Self {
        let state = AppState::new(resolver);
        let router = Self::build_router(config, state.clone());
        Self { router, state }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ListenerConfig, state: AppState) -> Router {
        Router::new()
            .route("/", any(resolution_handler))
            .route("/{*path}", any(resolution_handler))
            .layer(middleware::from_fn_with_state(state, resolve_middleware))
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until `shutdown` completes.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Resolve the request and store the attributes in its extensions.
async fn resolve_middleware(State(state): State<AppState>, mut req: Request<Body>, next: Next) -> Response {
    let info = RequestInfo::from_http(&req);
    let attributes = state.resolver().resolve(&info);

    tracing::debug!(
        url = %info.url(),
        site = ?attributes.site_key,
        custom_url = attributes.custom_url().is_some(),
        "Request resolved"
    );

    req.extensions_mut().insert(attributes);
    next.run(req).await
}

async fn resolution_handler(Extension(attributes): Extension<RequestAttributes>) -> Response {
    if attributes.portal.is_none() {
        return (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "no portal serves this url" })),
        )
            .into_response();
    }

    Json(attributes).into_response()
}
