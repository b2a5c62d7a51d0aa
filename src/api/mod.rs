//! API layer - HTTP handlers and routing
//!
//! All HTTP endpoints for the Gazette blog service:
//! - Post endpoints (listing, detail, drafts, CRUD)
//! - Category endpoints including the cached navigation list
//! - Tag endpoints
//! - Auth endpoints (register, login, logout, me)
//! - Contact endpoints (public submission, staff inbox)

pub mod auth;
pub mod categories;
pub mod common;
pub mod contact;
pub mod middleware;
pub mod posts;
pub mod responses;
pub mod tags;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use middleware::{ApiError, AppState, AuthenticatedUser};

/// Build the main API router
pub fn build_api_router(state: AppState) -> Router<AppState> {
    // Staff-only routes
    let staff_routes = Router::new()
        .route("/categories", post(categories::create_category))
        .route("/categories/{slug}", put(categories::update_category))
        .route("/categories/{slug}", delete(categories::delete_category))
        .route("/contact/messages", get(contact::list_messages))
        .route("/contact/messages/{id}/read", put(contact::set_read))
        .route_layer(axum_middleware::from_fn(middleware::require_staff))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Routes needing authentication but not staff
    let protected_routes = Router::new()
        .route("/posts", post(posts::create_post))
        .route("/posts/drafts", get(posts::list_drafts))
        // Same pattern string as the GET route; the router rejects mixed
        // parameter names for one position
        .route("/posts/{slug}", put(posts::update_post))
        .route("/posts/{slug}", delete(posts::delete_post))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Public routes; post reads attach the viewer when a session is present
    // so authors and staff can see their hidden posts
    let post_reads = Router::new()
        .route("/posts", get(posts::list_posts))
        .route("/posts/{slug}", get(posts::get_post))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::optional_auth,
        ));

    Router::new()
        .merge(post_reads)
        .route("/posts/popular", get(posts::popular_posts))
        .route("/categories", get(categories::list_categories))
        .route("/categories/nav", get(categories::nav_categories))
        .route("/categories/{slug}", get(categories::get_category))
        .route("/tags", get(tags::list_tags))
        .route("/tags/{slug}", get(tags::get_tag))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/contact", post(contact::submit))
        .merge(staff_routes)
        .merge(protected_routes)
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(
            cors_origin
                .parse::<HeaderValue>()
                .unwrap_or_else(|_| HeaderValue::from_static("*")),
        )
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
        .allow_credentials(true);

    Router::new()
        .nest("/api/v1", build_api_router(state.clone()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
