use std::collections::HashMap;

use sqlx::PgExecutor;

use super::manager::DatabaseError;

/// Which endpoint of the actor_movies join table a query is anchored on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkSide {
    Actor,
    Movie,
}

impl LinkSide {
    fn own_column(&self) -> &'static str {
        match self {
            LinkSide::Actor => "actor_id",
            LinkSide::Movie => "movie_id",
        }
    }

    fn other_column(&self) -> &'static str {
        match self {
            LinkSide::Actor => "movie_id",
            LinkSide::Movie => "actor_id",
        }
    }

    fn other_entity(&self) -> &'static str {
        match self {
            LinkSide::Actor => "movie",
            LinkSide::Movie => "actor",
        }
    }
}

/// IDs linked to `id`, ascending
pub async fn linked_ids<'e, E: PgExecutor<'e>>(
    executor: E,
    side: LinkSide,
    id: i32,
) -> Result<Vec<i32>, DatabaseError> {
    let sql = format!(
        "SELECT {other} FROM actor_movies WHERE {own} = $1 ORDER BY {other}",
        own = side.own_column(),
        other = side.other_column(),
    );
    let ids = sqlx::query_scalar::<_, i32>(&sql)
        .bind(id)
        .fetch_all(executor)
        .await?;
    Ok(ids)
}

/// Linked IDs for many entities at once. Entities without links are absent from the map.
pub async fn linked_ids_for<'e, E: PgExecutor<'e>>(
    executor: E,
    side: LinkSide,
    ids: &[i32],
) -> Result<HashMap<i32, Vec<i32>>, DatabaseError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let sql = format!(
        "SELECT {own}, {other} FROM actor_movies WHERE {own} = ANY($1) ORDER BY {own}, {other}",
        own = side.own_column(),
        other = side.other_column(),
    );
    let pairs = sqlx::query_as::<_, (i32, i32)>(&sql)
        .bind(ids)
        .fetch_all(executor)
        .await?;

    let mut links: HashMap<i32, Vec<i32>> = HashMap::new();
    for (own, other) in pairs {
        links.entry(own).or_default().push(other);
    }
    Ok(links)
}

/// Insert links from `id` to each of `others`. Existing pairs are left alone;
/// an ID that does not exist on the far side is reported as `ForeignKey`.
pub async fn link<'e, E: PgExecutor<'e>>(
    executor: E,
    side: LinkSide,
    id: i32,
    others: &[i32],
) -> Result<u64, DatabaseError> {
    if others.is_empty() {
        return Ok(0);
    }

    let sql = format!(
        "INSERT INTO actor_movies ({own}, {other}) SELECT $1, UNNEST($2::int4[]) ON CONFLICT DO NOTHING",
        own = side.own_column(),
        other = side.other_column(),
    );
    let result = sqlx::query(&sql)
        .bind(id)
        .bind(others)
        .execute(executor)
        .await
        .map_err(|e| {
            DatabaseError::from_reference_error(
                e,
                format!("referenced {} does not exist: {:?}", side.other_entity(), others),
            )
        })?;
    Ok(result.rows_affected())
}

/// Remove the links from `id` to each of `others`
pub async fn unlink<'e, E: PgExecutor<'e>>(
    executor: E,
    side: LinkSide,
    id: i32,
    others: &[i32],
) -> Result<u64, DatabaseError> {
    if others.is_empty() {
        return Ok(0);
    }

    let sql = format!(
        "DELETE FROM actor_movies WHERE {own} = $1 AND {other} = ANY($2)",
        own = side.own_column(),
        other = side.other_column(),
    );
    let result = sqlx::query(&sql)
        .bind(id)
        .bind(others)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

/// Remove every link touching `id`
pub async fn unlink_all<'e, E: PgExecutor<'e>>(
    executor: E,
    side: LinkSide,
    id: i32,
) -> Result<u64, DatabaseError> {
    let sql = format!("DELETE FROM actor_movies WHERE {} = $1", side.own_column());
    let result = sqlx::query(&sql).bind(id).execute(executor).await?;
    Ok(result.rows_affected())
}
