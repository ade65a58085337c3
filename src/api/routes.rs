use crate::auth::middleware::auth_middleware;
use crate::crypto::{decrypt_request, encrypt_response};
use crate::AppState;
use axum::{
    http::{header, HeaderValue, Method, StatusCode, Uri},
    middleware,
    routing::get,
    routing::post,
    Json, Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

/// Request bodies above this size are rejected before any handler runs.
const BODY_LIMIT_BYTES: usize = 10 * 1024;

pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        // Public routes (no auth required)
        .route(
            "/api/auth/register",
            post(crate::api::handlers::auth::register),
        )
        .route("/api/auth/login", post(crate::api::handlers::auth::login));

    let protected_auth_routes = Router::new()
        .route("/api/auth/logout", post(crate::api::handlers::auth::logout))
        .route("/api/auth/me", get(crate::api::handlers::auth::me))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Task routes run inside the envelope pipeline: requests are decrypted
    // before the session check and validation, responses are encrypted as
    // the final body mutation. Layer order is innermost-first.
    let task_routes = Router::new()
        .route(
            "/api/tasks",
            get(crate::api::handlers::tasks::list_tasks)
                .post(crate::api::handlers::tasks::create_task),
        )
        .route(
            "/api/tasks/{id}",
            get(crate::api::handlers::tasks::get_task)
                .put(crate::api::handlers::tasks::update_task)
                .delete(crate::api::handlers::tasks::delete_task),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(middleware::from_fn_with_state(state.clone(), decrypt_request))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            encrypt_response,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_auth_routes)
        .merge(task_routes)
        .route("/api/health", get(crate::api::handlers::health::health))
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
                .layer(cors_layer(&state)),
        )
        .with_state(state)
}

/// Allow-listed origins with credentials: the local dev frontends plus an
/// optional deployed frontend from configuration.
fn cors_layer(state: &AppState) -> CorsLayer {
    let mut origins = vec![
        HeaderValue::from_static("http://localhost:5173"),
        HeaderValue::from_static("http://localhost:3000"),
    ];

    if let Some(client_url) = &state.config.server.client_url {
        match client_url.parse::<HeaderValue>() {
            Ok(origin) => origins.push(origin),
            Err(_) => tracing::warn!("CLIENT_URL is not a valid origin, ignoring"),
        }
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

/// Uniform 404 body naming the attempted path.
async fn not_found(uri: Uri) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "success": false,
            "message": format!("Route {} not found", uri.path()),
        })),
    )
}
