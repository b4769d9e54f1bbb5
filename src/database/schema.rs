use sqlx::PgPool;
use tracing::info;

use super::manager::{DatabaseError, DatabaseManager};

const CREATE_ACTORS: &str = r#"
    CREATE TABLE IF NOT EXISTS actors (
        id              SERIAL PRIMARY KEY,
        name            VARCHAR(255) NOT NULL CHECK (name <> ''),
        gender          CHAR(1) NOT NULL CHECK (gender IN ('M', 'F')),
        date_of_birth   TEXT NOT NULL
    )
"#;

const CREATE_MOVIES: &str = r#"
    CREATE TABLE IF NOT EXISTS movies (
        id              SERIAL PRIMARY KEY,
        title           VARCHAR(150) NOT NULL CHECK (title <> ''),
        description     VARCHAR(1000),
        release_date    TEXT NOT NULL,
        rating          NUMERIC(2, 1) NOT NULL DEFAULT 0 CHECK (rating >= 0)
    )
"#;

const CREATE_ACTOR_MOVIES: &str = r#"
    CREATE TABLE IF NOT EXISTS actor_movies (
        actor_id        INTEGER NOT NULL REFERENCES actors(id) ON DELETE CASCADE,
        movie_id        INTEGER NOT NULL REFERENCES movies(id) ON DELETE CASCADE,
        PRIMARY KEY (actor_id, movie_id)
    )
"#;

const CREATE_ACTOR_MOVIES_MOVIE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS actor_movies_movie_id_idx ON actor_movies (movie_id)";

/// Create the schema and tables if they are missing. Safe to run on every start.
pub async fn migrate(pool: &PgPool, schema: &str) -> Result<(), DatabaseError> {
    if !DatabaseManager::is_valid_schema_name(schema) {
        return Err(DatabaseError::InvalidSchemaName(schema.to_string()));
    }

    let create_schema = format!(
        "CREATE SCHEMA IF NOT EXISTS {}",
        DatabaseManager::quote_identifier(schema)
    );
    sqlx::query(&create_schema).execute(pool).await?;

    for statement in [
        CREATE_ACTORS,
        CREATE_MOVIES,
        CREATE_ACTOR_MOVIES,
        CREATE_ACTOR_MOVIES_MOVIE_INDEX,
    ] {
        sqlx::query(statement).execute(pool).await?;
    }

    info!("Database schema '{}' is up to date", schema);
    Ok(())
}
