use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde_json::Value;

use crate::database::models::{Actor, NewActor};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::AppState;

use super::{failed, json_body, parse_id, update_map, Deleted};

/// POST /v1/actor-add
pub async fn actor_add(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<NewActor>, JsonRejection>,
) -> Result<Json<Actor>, ApiError> {
    let new_actor = json_body(payload, "actor_add")?;
    let actor = state.actors.add(new_actor).await.map_err(failed("actor_add", None))?;

    tracing::info!(actor_id = actor.id, user_id = user.user_id, "Actor created");
    Ok(Json(actor))
}

/// PUT /v1/actor-edit/:id
pub async fn actor_edit(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(raw_id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Actor>, ApiError> {
    let id = parse_id(&raw_id, "actor_edit")?;
    let updates = update_map(payload, "actor_edit")?;

    let actor = state
        .actors
        .edit(id, &updates)
        .await
        .map_err(failed("actor_edit", Some(id)))?;

    tracing::info!(actor_id = id, user_id = user.user_id, "Actor edited");
    Ok(Json(actor))
}

/// GET /v1/actor-list
pub async fn actor_list(State(state): State<AppState>) -> Result<Json<Vec<Actor>>, ApiError> {
    let actors = state.actors.list().await.map_err(failed("actor_list", None))?;
    Ok(Json(actors))
}

/// DELETE /v1/actor-delete/:id
pub async fn actor_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(raw_id): Path<String>,
) -> Result<Json<Deleted>, ApiError> {
    let id = parse_id(&raw_id, "actor_delete")?;
    state.actors.delete(id).await.map_err(failed("actor_delete", Some(id)))?;

    tracing::info!(actor_id = id, user_id = user.user_id, "Actor deleted");
    Ok(Deleted::new(id))
}
