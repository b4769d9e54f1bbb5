use serde::Deserialize;
use serde_json::{Map, Value};
use sqlx::PgPool;
use tracing::{debug, info};

use crate::database::links::{self, LinkSide};
use crate::database::models::{Movie, MovieRow, MovieSort, NewMovie};

use super::dates::format_date;
use super::reconcile::reconcile;
use super::{check_length, require_text, unique_ids, ServiceError};

const MAX_TITLE_CHARS: usize = 150;
const MAX_DESCRIPTION_CHARS: usize = 1000;
const MAX_RATING: f64 = 9.9;

/// Query parameters of GET /v1/movie-find
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovieFilter {
    pub title: Option<String>,
    pub actor: Option<String>,
}

impl MovieFilter {
    /// ILIKE patterns for the non-blank filters. At least one is required.
    fn patterns(&self) -> Result<(Option<String>, Option<String>), ServiceError> {
        let title = non_blank(self.title.as_deref()).map(contains_pattern);
        let actor = non_blank(self.actor.as_deref()).map(contains_pattern);

        if title.is_none() && actor.is_none() {
            return Err(ServiceError::validation(
                "title",
                "at least one of title or actor is required",
            ));
        }
        Ok((title, actor))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Substring pattern with LIKE metacharacters escaped
fn contains_pattern(fragment: &str) -> String {
    let mut pattern = String::with_capacity(fragment.len() + 2);
    pattern.push('%');
    for c in fragment.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[derive(Debug, Clone)]
pub struct MovieService {
    pool: PgPool,
}

impl MovieService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn add(&self, new_movie: NewMovie) -> Result<Movie, ServiceError> {
        let mut movie = Movie {
            id: 0,
            title: new_movie.title,
            description: new_movie.description,
            release_date: format_date(&new_movie.release_date),
            rating: new_movie.rating,
            actors: unique_ids(&new_movie.actors),
        };
        validate(&mut movie)?;

        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO movies (title, description, release_date, rating) \
             VALUES ($1, $2, $3, $4::float8::numeric(2,1)) RETURNING {}",
            MovieRow::COLUMNS
        );
        let row = sqlx::query_as::<_, MovieRow>(&sql)
            .bind(&movie.title)
            .bind(&movie.description)
            .bind(&movie.release_date)
            .bind(movie.rating)
            .fetch_one(&mut *tx)
            .await?;

        links::link(&mut *tx, LinkSide::Movie, row.id, &movie.actors).await?;
        tx.commit().await?;

        info!(movie_id = row.id, "Movie added successfully");
        Ok(row.into_movie(movie.actors))
    }

    pub async fn edit(&self, id: i32, updates: &Map<String, Value>) -> Result<Movie, ServiceError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!("SELECT {} FROM movies WHERE id = $1 FOR UPDATE", MovieRow::COLUMNS);
        let row = sqlx::query_as::<_, MovieRow>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(ServiceError::NotFound { entity: "Movie", id })?;

        let current_actors = links::linked_ids(&mut *tx, LinkSide::Movie, id).await?;
        let mut movie = row.into_movie(current_actors);

        debug!(movie_id = id, ?updates, "Applying updates to movie");
        apply_updates(&mut movie, updates);
        validate(&mut movie)?;

        let sql = format!(
            "UPDATE movies SET title = $2, description = $3, release_date = $4, \
             rating = $5::float8::numeric(2,1) WHERE id = $1 RETURNING {}",
            MovieRow::COLUMNS
        );
        let row = sqlx::query_as::<_, MovieRow>(&sql)
            .bind(id)
            .bind(&movie.title)
            .bind(&movie.description)
            .bind(&movie.release_date)
            .bind(movie.rating)
            .fetch_one(&mut *tx)
            .await?;

        if let Some(Value::Array(desired)) = updates.get("actors") {
            let plan = reconcile(&movie.actors, desired);
            if plan.is_empty() {
                debug!(movie_id = id, "Actors already match the requested set");
            }
            if !plan.to_remove.is_empty() {
                debug!(movie_id = id, actors = ?plan.to_remove, "Removing actors from movie");
                links::unlink(&mut *tx, LinkSide::Movie, id, &plan.to_remove).await?;
            }
            if !plan.to_add.is_empty() {
                debug!(movie_id = id, actors = ?plan.to_add, "Adding actors to movie");
                links::link(&mut *tx, LinkSide::Movie, id, &plan.to_add).await?;
            }
        }

        let actors = links::linked_ids(&mut *tx, LinkSide::Movie, id).await?;
        tx.commit().await?;

        info!(movie_id = id, "Movie updated successfully");
        Ok(row.into_movie(actors))
    }

    pub async fn list(&self, sort: MovieSort) -> Result<Vec<Movie>, ServiceError> {
        let sql = format!(
            "SELECT {} FROM movies ORDER BY {}",
            MovieRow::COLUMNS,
            sort.order_by()
        );
        let rows = sqlx::query_as::<_, MovieRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        let movies = self.attach_actors(rows).await?;
        info!(count = movies.len(), ?sort, "Successfully retrieved movies");
        Ok(movies)
    }

    /// Movies whose title and/or cast match the filter, best rated first
    pub async fn find(&self, filter: &MovieFilter) -> Result<Vec<Movie>, ServiceError> {
        let (title, actor) = filter.patterns()?;

        let sql = format!(
            "SELECT {} FROM movies m \
             WHERE ($1::text IS NULL OR m.title ILIKE $1 ESCAPE '\\') \
               AND ($2::text IS NULL OR EXISTS ( \
                   SELECT 1 FROM actor_movies am JOIN actors a ON a.id = am.actor_id \
                   WHERE am.movie_id = m.id AND a.name ILIKE $2 ESCAPE '\\')) \
             ORDER BY {}",
            MovieRow::COLUMNS,
            MovieSort::default().order_by()
        );
        let rows = sqlx::query_as::<_, MovieRow>(&sql)
            .bind(title)
            .bind(actor)
            .fetch_all(&self.pool)
            .await?;

        let movies = self.attach_actors(rows).await?;
        info!(count = movies.len(), ?filter, "Movie search completed");
        Ok(movies)
    }

    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        let mut tx = self.pool.begin().await?;

        let unlinked = links::unlink_all(&mut *tx, LinkSide::Movie, id).await?;
        let result = sqlx::query("DELETE FROM movies WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound { entity: "Movie", id });
        }

        tx.commit().await?;

        info!(movie_id = id, unlinked, "Movie successfully deleted");
        Ok(())
    }

    async fn attach_actors(&self, rows: Vec<MovieRow>) -> Result<Vec<Movie>, ServiceError> {
        let ids: Vec<i32> = rows.iter().map(|row| row.id).collect();
        let mut actors = links::linked_ids_for(&self.pool, LinkSide::Movie, &ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let linked = actors.remove(&row.id).unwrap_or_default();
                row.into_movie(linked)
            })
            .collect())
    }
}

/// Check text limits and the rating range. The rating is rounded to the
/// single decimal the column stores.
fn validate(movie: &mut Movie) -> Result<(), ServiceError> {
    require_text("title", &movie.title, MAX_TITLE_CHARS)?;
    if let Some(description) = &movie.description {
        check_length("description", description, MAX_DESCRIPTION_CHARS)?;
    }

    if !movie.rating.is_finite() {
        return Err(ServiceError::validation("rating", "rating must be a number"));
    }
    let rating = (movie.rating * 10.0).round() / 10.0;
    if !(0.0..=MAX_RATING).contains(&rating) {
        return Err(ServiceError::validation(
            "rating",
            format!("rating must be between 0.0 and {}", MAX_RATING),
        ));
    }
    movie.rating = rating;
    Ok(())
}

fn apply_updates(movie: &mut Movie, updates: &Map<String, Value>) {
    for (field, value) in updates {
        match (field.as_str(), value) {
            ("title", Value::String(title)) => movie.title = title.clone(),
            ("description", Value::String(description)) => {
                movie.description = Some(description.clone())
            }
            ("description", Value::Null) => movie.description = None,
            ("releasedate" | "releaseDate", Value::String(date)) => {
                movie.release_date = format_date(date)
            }
            ("rating", Value::Number(rating)) => {
                if let Some(rating) = rating.as_f64() {
                    movie.rating = rating;
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

    fn movie() -> Movie {
        Movie {
            id: 1,
            title: "The Matrix".to_string(),
            description: Some("Neo".to_string()),
            release_date: "1999-03-31".to_string(),
            rating: 8.7,
            actors: vec![1],
        }
    }

    fn updates(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn both_release_date_spellings_are_recognized() {
        let mut m = movie();
        apply_updates(&mut m, &updates(json!({"releasedate": "2003-05-15"})));
        assert_eq!(m.release_date, "2003-05-15");

        apply_updates(&mut m, &updates(json!({"releaseDate": "2003-11-05"})));
        assert_eq!(m.release_date, "2003-11-05");

        apply_updates(&mut m, &updates(json!({"release_date": "2021-12-22"})));
        assert_eq!(m.release_date, "2003-11-05");

        apply_updates(&mut m, &updates(json!({"releaseDate": "soon"})));
        assert_eq!(m.release_date, INVALID_DATE);
    }

    #[test]
    fn mismatched_types_are_ignored() {
        let mut m = movie();
        apply_updates(
            &mut m,
            &updates(json!({"title": 5, "rating": "9.0", "description": 3, "director": "Wachowski"})),
        );
        assert_eq!(m, movie());
    }

    #[test]
    fn null_description_clears_it() {
        let mut m = movie();
        apply_updates(&mut m, &updates(json!({"description": null, "rating": 9})));
        assert_eq!(m.description, None);
        assert_eq!(m.rating, 9.0);
    }

    #[test]
    fn rating_is_rounded_and_bounded() {
        let mut m = movie();
        m.rating = 7.25;
        validate(&mut m).unwrap();
        assert_eq!(m.rating, 7.3);

        m.rating = 9.94;
        validate(&mut m).unwrap();
        assert_eq!(m.rating, 9.9);

        m.rating = 9.96;
        assert!(validate(&mut m).is_err());

        m.rating = -0.5;
        assert!(validate(&mut m).is_err());
    }

    #[test]
    fn title_limits_are_enforced() {
        let mut m = movie();
        m.title = " ".to_string();
        assert!(matches!(validate(&mut m), Err(ServiceError::Validation { field: "title", .. })));

        m.title = "x".repeat(151);
        assert!(validate(&mut m).is_err());

        m.title = "x".repeat(150);
        m.description = Some("d".repeat(1001));
        assert!(matches!(validate(&mut m), Err(ServiceError::Validation { field: "description", .. })));
    }

    #[test]
    fn filter_requires_a_non_blank_value() {
        assert!(MovieFilter::default().patterns().is_err());

        let blank = MovieFilter {
            title: Some("  ".to_string()),
            actor: Some(String::new()),
        };
        assert!(blank.patterns().is_err());
    }

    #[test]
    fn filter_escapes_like_metacharacters() {
        let filter = MovieFilter {
            title: Some("100%_\\".to_string()),
            actor: None,
        };
        let (title, actor) = filter.patterns().unwrap();
        assert_eq!(title.as_deref(), Some("%100\\%\\_\\\\%"));
        assert!(actor.is_none());
    }

    #[test]
    fn filter_trims_whitespace() {
        let filter = MovieFilter {
            title: None,
            actor: Some(" Keanu ".to_string()),
        };
        let (_, actor) = filter.patterns().unwrap();
        assert_eq!(actor.as_deref(), Some("%Keanu%"));
    }
}
