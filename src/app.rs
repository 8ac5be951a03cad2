use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware::{from_fn_with_state, map_response},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::{AuthError, JwtVerifier, TokenVerifier};
use crate::config::AppConfig;
use crate::database::models::{Book, Product, Review, User};
use crate::database::DatabaseManager;
use crate::handlers::{self, resource, reviews};
use crate::middleware::{handle_panic, json_method_not_allowed, rate_limit, require_token, RateLimiter};

/// Shared per-process dependencies handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseManager,
    pub config: Arc<AppConfig>,
    pub limiter: RateLimiter,
    /// Present only when the resource routes require a bearer token.
    pub verifier: Option<Arc<dyn TokenVerifier>>,
}

impl AppState {
    pub fn new(db: DatabaseManager, config: AppConfig) -> Result<Self, AuthError> {
        let verifier: Option<Arc<dyn TokenVerifier>> = if config.security.require_auth {
            let secret = config.security.jwt_secret.as_deref().unwrap_or_default();
            Some(Arc::new(JwtVerifier::new(secret)?))
        } else {
            None
        };

        Ok(Self {
            db,
            limiter: RateLimiter::new(&config.limiter),
            config: Arc::new(config),
            verifier,
        })
    }

    pub fn with_verifier(mut self, verifier: Arc<dyn TokenVerifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }
}

/// Build the full router with its middleware stack.
pub fn app(state: AppState) -> Router {
    let config = state.config.clone();

    let mut resources = Router::new()
        .merge(book_routes())
        .merge(product_routes())
        .merge(user_routes())
        .route("/v1/reviews", get(resource::list::<Review>));

    if let Some(verifier) = state.verifier.clone() {
        resources = resources.route_layer(from_fn_with_state(verifier, require_token));
    }

    let mut router = Router::new()
        .route("/v1/healthcheck", get(handlers::healthcheck))
        .merge(resources)
        .fallback(handlers::not_found)
        .layer(map_response(json_method_not_allowed))
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .layer(from_fn_with_state(state.limiter.clone(), rate_limit))
        .with_state(state);

    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security.cors_origins));
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.layer(CatchPanicLayer::custom(handle_panic))
}

fn book_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/books",
            get(resource::list::<Book>).post(resource::create::<Book>),
        )
        .route(
            "/v1/books/:id",
            get(resource::show::<Book>)
                .patch(resource::update::<Book>)
                .delete(resource::delete::<Book>),
        )
        .route(
            "/v1/books/:id/reviews",
            get(reviews::list::<Book>).post(reviews::create::<Book>),
        )
        .route(
            "/v1/books/:id/reviews/:review_id",
            get(reviews::show::<Book>)
                .patch(reviews::update::<Book>)
                .delete(reviews::delete::<Book>),
        )
}

fn product_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/products",
            get(resource::list::<Product>).post(resource::create::<Product>),
        )
        .route(
            "/v1/products/:id",
            get(resource::show::<Product>)
                .patch(resource::update::<Product>)
                .delete(resource::delete::<Product>),
        )
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/users",
            get(resource::list::<User>).post(resource::create::<User>),
        )
        .route(
            "/v1/users/:id",
            get(resource::show::<User>)
                .patch(resource::update::<User>)
                .delete(resource::delete::<User>),
        )
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
