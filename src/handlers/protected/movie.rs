use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::database::models::{Movie, MovieSort, NewMovie};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::MovieFilter;
use crate::AppState;

use super::{failed, json_body, parse_id, update_map, Deleted};

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub sort: Option<String>,
}

/// POST /v1/movie-add
pub async fn movie_add(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<NewMovie>, JsonRejection>,
) -> Result<Json<Movie>, ApiError> {
    let new_movie = json_body(payload, "movie_add")?;
    let movie = state.movies.add(new_movie).await.map_err(failed("movie_add", None))?;

    tracing::info!(movie_id = movie.id, user_id = user.user_id, "Movie created");
    Ok(Json(movie))
}

/// PUT /v1/movie-edit/:id
pub async fn movie_edit(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(raw_id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Movie>, ApiError> {
    let id = parse_id(&raw_id, "movie_edit")?;
    let updates = update_map(payload, "movie_edit")?;

    let movie = state
        .movies
        .edit(id, &updates)
        .await
        .map_err(failed("movie_edit", Some(id)))?;

    tracing::info!(movie_id = id, user_id = user.user_id, "Movie edited");
    Ok(Json(movie))
}

/// GET /v1/movie-list?sort=
pub async fn movie_list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Movie>>, ApiError> {
    let sort = MovieSort::parse(query.sort.as_deref());
    let movies = state.movies.list(sort).await.map_err(failed("movie_list", None))?;
    Ok(Json(movies))
}

/// GET /v1/movie-find?title=&actor=
pub async fn movie_find(
    State(state): State<AppState>,
    Query(filter): Query<MovieFilter>,
) -> Result<Json<Vec<Movie>>, ApiError> {
    let movies = state.movies.find(&filter).await.map_err(failed("movie_find", None))?;
    Ok(Json(movies))
}

/// DELETE /v1/movie-delete/:id
pub async fn movie_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(raw_id): Path<String>,
) -> Result<Json<Deleted>, ApiError> {
    let id = parse_id(&raw_id, "movie_delete")?;
    state.movies.delete(id).await.map_err(failed("movie_delete", Some(id)))?;

    tracing::info!(movie_id = id, user_id = user.user_id, "Movie deleted");
    Ok(Deleted::new(id))
}
