use axum::{Router, http::HeaderName, middleware, routing::get};

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod config;
pub mod guard;
pub mod handlers;
pub mod identity;
pub mod models;
pub mod routes;
pub mod status;

use guard::navigation_guard;
use routes::RouteName;

// --- Public Re-exports ---

// Makes core state types easily accessible to the main application entry point (main.rs).
pub use config::AppConfig;
pub use identity::{IdentityState, InMemoryIdentityStore};
pub use status::{HttpCompletionClient, MockCompletionCheck, StatusState};

/// AppState
///
/// Implements the **Unified State Pattern**. This is the single, thread-safe, and immutable
/// container holding all essential application services and configuration.
/// The application state is shared across all incoming requests.
#[derive(Clone)]
pub struct AppState {
    /// Identity Layer: read-only view of the visitor's cached token and record.
    pub identity: IdentityState,
    /// Status Layer: the remote completion check.
    pub status: StatusState,
    /// Configuration: The loaded, immutable environment configuration.
    pub config: AppConfig,
}

/// create_router
///
/// Assembles the application's entire routing structure, applies global and scoped middleware,
/// and registers the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Page Router Assembly
    let pages = Router::new()
        // The five named pages, paths owned by the route table.
        .route(RouteName::Home.path(), get(handlers::home_page))
        .route(RouteName::Register.path(), get(handlers::register_page))
        .route(RouteName::Quiz.path(), get(handlers::quiz_page))
        .route(RouteName::Result.path(), get(handlers::result_page))
        .route(
            RouteName::Leaderboard.path(),
            get(handlers::leaderboard_page),
        )
        // Every named page is evaluated by the navigation guard before its
        // handler runs. `route_layer` deliberately leaves the fallback out:
        // a redirect route is not itself guarded, the follow-up navigation
        // to Home is.
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            navigation_guard,
        ))
        // Catch-all: anything outside the route table goes back to Home.
        .fallback(handlers::fallback_to_home);

    // 3. Base Router Assembly
    let base_router = Router::new()
        // GET /health
        // A simple, unguarded endpoint used for monitoring and load balancer checks.
        // Returns "ok" immediately to verify the service is running and responsive.
        .route("/health", get(|| async { "ok" }))
        // Guarded page surface.
        .merge(pages)
        // Apply the Unified State to all routes.
        .with_state(state);

    // 4. Observability and Correlation Layers (Applied outermost/first)
    base_router
        .layer(
            ServiceBuilder::new()
                // 4a. Request ID Generation: Generates a unique UUID for every incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 4b. Request Tracing: Wraps the entire request/response lifecycle in a tracing span.
                // Uses the `trace_span_logger` to include the generated request ID.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 4c. Request ID Propagation: Ensures the generated x-request-id header is
                // returned to the client and injected into subsequent service calls.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 5. CORS Layer (Applied last, allowing all traffic in/out after processing)
        .layer(cors)
}

/// trace_span_logger
///
/// Helper function used by `TraceLayer` to customize the tracing span creation.
/// It extracts the `x-request-id` header (if present) and includes it in the
/// structured logging metadata alongside the HTTP method and URI.
///
/// *Goal*: Ensure every log line for a single request is correlated by a unique ID.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    // The structured log format used by the tracing macros.
    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
