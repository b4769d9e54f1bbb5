pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;

use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::PgPool;
use tower_http::trace::TraceLayer;

use crate::auth::{JwtKeys, Role};
use crate::handlers::{protected, public};
use crate::middleware::{role_gate_middleware, RoleGate};
use crate::services::{ActorService, MovieService};

const ADMIN: &[Role] = &[Role::Admin];
const READERS: &[Role] = &[Role::Admin, Role::User];

/// Shared request state; cloned per request
#[derive(Debug, Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub keys: JwtKeys,
    pub actors: ActorService,
    pub movies: MovieService,
}

impl AppState {
    pub fn new(pool: PgPool, keys: JwtKeys) -> Self {
        Self {
            actors: ActorService::new(pool.clone()),
            movies: MovieService::new(pool.clone()),
            pool,
            keys,
        }
    }
}

/// Full route table with tracing. Body limits and CORS are added by the binary.
pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .route("/v1/auth", post(public::login_post))
        .route("/v1/login", post(public::login_post))
        // Gated
        .merge(admin_routes(&state))
        .merge(reader_routes(&state))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn admin_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/v1/actor-add", post(protected::actor_add))
        .route("/v1/actor-edit/:id", put(protected::actor_edit))
        .route("/v1/actor-delete/:id", delete(protected::actor_delete))
        .route("/v1/movie-add", post(protected::movie_add))
        .route("/v1/movie-edit/:id", put(protected::movie_edit))
        .route("/v1/movie-delete/:id", delete(protected::movie_delete))
        .route_layer(from_fn_with_state(
            RoleGate::new(state.keys.clone(), ADMIN),
            role_gate_middleware,
        ))
}

fn reader_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/v1/actor-list", get(protected::actor_list))
        .route("/v1/movie-list", get(protected::movie_list))
        .route("/v1/movie-find", get(protected::movie_find))
        .route_layer(from_fn_with_state(
            RoleGate::new(state.keys.clone(), READERS),
            role_gate_middleware,
        ))
}
