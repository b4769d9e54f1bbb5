use serde_json::{Map, Value};
use sqlx::PgPool;
use tracing::{debug, info};

use crate::database::links::{self, LinkSide};
use crate::database::models::{Actor, ActorRow, Gender, NewActor};

use super::dates::format_date;
use super::reconcile::reconcile;
use super::{require_text, unique_ids, ServiceError};

const MAX_NAME_CHARS: usize = 255;

#[derive(Debug, Clone)]
pub struct ActorService {
    pool: PgPool,
}

impl ActorService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new actor and link the movies listed in the payload
    pub async fn add(&self, new_actor: NewActor) -> Result<Actor, ServiceError> {
        require_text("name", &new_actor.name, MAX_NAME_CHARS)?;
        let date_of_birth = format_date(&new_actor.date_of_birth);
        let movie_ids = unique_ids(&new_actor.movies);

        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO actors (name, gender, date_of_birth) VALUES ($1, $2, $3) RETURNING {}",
            ActorRow::COLUMNS
        );
        let row = sqlx::query_as::<_, ActorRow>(&sql)
            .bind(&new_actor.name)
            .bind(new_actor.gender.code())
            .bind(&date_of_birth)
            .fetch_one(&mut *tx)
            .await?;

        links::link(&mut *tx, LinkSide::Actor, row.id, &movie_ids).await?;
        tx.commit().await?;

        info!(actor_id = row.id, "Actor added successfully");
        Ok(row.into_actor(movie_ids)?)
    }

    /// Apply a partial update. Recognized keys are `name`, `gender`,
    /// `dateOfBirth` and `movies`; everything else is ignored.
    pub async fn edit(&self, id: i32, updates: &Map<String, Value>) -> Result<Actor, ServiceError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!("SELECT {} FROM actors WHERE id = $1 FOR UPDATE", ActorRow::COLUMNS);
        let row = sqlx::query_as::<_, ActorRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(ServiceError::NotFound { entity: "Actor", id })?;

        let current_movies = links::linked_ids(&mut *tx, LinkSide::Actor, id).await?;
        let mut actor = row.into_actor(current_movies)?;

        debug!(actor_id = id, ?updates, "Applying updates to actor");
        apply_updates(&mut actor, updates);
        require_text("name", &actor.name, MAX_NAME_CHARS)?;

        let sql = format!(
            "UPDATE actors SET name = $2, gender = $3, date_of_birth = $4 WHERE id = $1 RETURNING {}",
            ActorRow::COLUMNS
        );
        let row = sqlx::query_as::<_, ActorRow>(&sql)
            .bind(id)
            .bind(&actor.name)
            .bind(actor.gender.code())
            .bind(&actor.date_of_birth)
            .fetch_one(&mut *tx)
            .await?;

        if let Some(Value::Array(desired)) = updates.get("movies") {
            let plan = reconcile(&actor.movies, desired);
            if plan.is_empty() {
                debug!(actor_id = id, "Movies already match the requested set");
            }
            if !plan.to_remove.is_empty() {
                debug!(actor_id = id, movies = ?plan.to_remove, "Removing movies from actor");
                links::unlink(&mut *tx, LinkSide::Actor, id, &plan.to_remove).await?;
            }
            if !plan.to_add.is_empty() {
                debug!(actor_id = id, movies = ?plan.to_add, "Adding movies to actor");
                links::link(&mut *tx, LinkSide::Actor, id, &plan.to_add).await?;
            }
        }

        let movies = links::linked_ids(&mut *tx, LinkSide::Actor, id).await?;
        tx.commit().await?;

        info!(actor_id = id, "Actor updated successfully");
        Ok(row.into_actor(movies)?)
    }

    /// All actors with their linked movie IDs
    pub async fn list(&self) -> Result<Vec<Actor>, ServiceError> {
        let sql = format!("SELECT {} FROM actors ORDER BY id", ActorRow::COLUMNS);
        let rows = sqlx::query_as::<_, ActorRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        let ids: Vec<i32> = rows.iter().map(|row| row.id).collect();
        let mut movies = links::linked_ids_for(&self.pool, LinkSide::Actor, &ids).await?;

        let actors = rows
            .into_iter()
            .map(|row| {
                let linked = movies.remove(&row.id).unwrap_or_default();
                row.into_actor(linked)
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!(count = actors.len(), "Successfully retrieved actors");
        Ok(actors)
    }

    /// Delete the actor's links, then the actor
    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        let mut tx = self.pool.begin().await?;

        let unlinked = links::unlink_all(&mut *tx, LinkSide::Actor, id).await?;
        let result = sqlx::query("DELETE FROM actors WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound { entity: "Actor", id });
        }

        tx.commit().await?;

        info!(actor_id = id, unlinked, "Actor successfully deleted");
        Ok(())
    }
}

/// Overwrite fields named in `updates`. Values of the wrong type, and gender
/// codes other than "M"/"F", are ignored.
fn apply_updates(actor: &mut Actor, updates: &Map<String, Value>) {
    for (field, value) in updates {
        match field.as_str() {
            "name" => {
                if let Some(name) = value.as_str() {
                    actor.name = name.to_string();
                }
            }
            "gender" => {
                if let Some(gender) = value.as_str().and_then(Gender::from_code) {
                    actor.gender = gender;
                }
            }
            "dateOfBirth" => {
                if let Some(date) = value.as_str() {
                    actor.date_of_birth = format_date(date);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::dates::INVALID_DATE;
    use serde_json::json;

    fn actor() -> Actor {
        Actor {
            id: 1,
            name: "Keanu Reeves".to_string(),
            gender: Gender::Male,
            date_of_birth: "1964-09-02".to_string(),
            movies: vec![1, 2],
        }
    }

    fn updates(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn recognized_fields_are_overwritten() {
        let mut a = actor();
        apply_updates(
            &mut a,
            &updates(json!({"name": "Carrie-Anne Moss", "gender": "F", "dateOfBirth": "1967-08-21"})),
        );

        assert_eq!(a.name, "Carrie-Anne Moss");
        assert_eq!(a.gender, Gender::Female);
        assert_eq!(a.date_of_birth, "1967-08-21");
    }

    #[test]
    fn unknown_keys_and_wrong_types_are_ignored() {
        let mut a = actor();
        apply_updates(
            &mut a,
            &updates(json!({"name": 42, "gender": "X", "nickname": "Neo", "id": 99})),
        );

        assert_eq!(a, actor());
    }

    #[test]
    fn snake_case_date_key_is_not_recognized() {
        let mut a = actor();
        apply_updates(&mut a, &updates(json!({"date_of_birth": "1967-08-21"})));
        assert_eq!(a.date_of_birth, "1964-09-02");
    }

    #[test]
    fn lowercase_gender_is_ignored() {
        let mut a = actor();
        apply_updates(&mut a, &updates(json!({"gender": "f"})));
        assert_eq!(a.gender, Gender::Male);
    }

    #[test]
    fn bad_date_degrades_to_sentinel() {
        let mut a = actor();
        apply_updates(&mut a, &updates(json!({"dateOfBirth": "yesterday"})));
        assert_eq!(a.date_of_birth, INVALID_DATE);
    }

    #[test]
    fn movies_key_is_left_to_the_reconciler() {
        let mut a = actor();
        apply_updates(&mut a, &updates(json!({"movies": [7]})));
        assert_eq!(a.movies, vec![1, 2]);
    }
}
