//! API router.
//!
//! Returns a composable `Router` with every route nested under `/api/`.
//! Authentication is not part of this surface; bind it to loopback or put
//! it behind a proxy that authenticates.

use axum::routing::{delete, get};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::types::ApiContext;

/// Build the API router from a pre-constructed `ApiContext`.
///
/// NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
pub fn api_router(ctx: ApiContext) -> Router {
    let routes = Router::new()
        .route("/health", get(endpoints::health::check))
        .route(
            "/conversations",
            get(endpoints::conversations::list).post(endpoints::conversations::start),
        )
        .route("/conversations/:id", delete(endpoints::conversations::delete))
        .route(
            "/conversations/:id/messages",
            get(endpoints::conversations::messages).post(endpoints::conversations::send),
        )
        .route(
            "/conversations/:id/summary",
            get(endpoints::conversations::summary),
        )
        .with_state(ctx);

    Router::new()
        .nest("/api", routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
