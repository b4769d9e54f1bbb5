use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Movie as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub release_date: String,
    pub rating: f64,
    /// Linked actor IDs, ascending
    pub actors: Vec<i32>,
}

/// Body of POST /v1/movie-add
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMovie {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "releasedate")]
    pub release_date: String,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub actors: Vec<i32>,
}

/// Row of the movies table. `rating` must be selected as float8.
#[derive(Debug, Clone, FromRow)]
pub struct MovieRow {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub release_date: String,
    pub rating: f64,
}

impl MovieRow {
    pub const COLUMNS: &'static str = "id, title, description, release_date, rating::float8 AS rating";

    pub fn into_movie(self, actors: Vec<i32>) -> Movie {
        Movie {
            id: self.id,
            title: self.title,
            description: self.description,
            release_date: self.release_date,
            rating: self.rating,
            actors,
        }
    }
}

/// Ordering accepted by GET /v1/movie-list?sort=
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MovieSort {
    TitleAsc,
    TitleDesc,
    RatingAsc,
    #[default]
    RatingDesc,
    ReleaseDateAsc,
    ReleaseDateDesc,
}

impl MovieSort {
    /// Unknown or missing values fall back to `-rating`
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("title") => MovieSort::TitleAsc,
            Some("-title") => MovieSort::TitleDesc,
            Some("rating") => MovieSort::RatingAsc,
            Some("-rating") => MovieSort::RatingDesc,
            Some("releasedate") => MovieSort::ReleaseDateAsc,
            Some("-releasedate") => MovieSort::ReleaseDateDesc,
            _ => MovieSort::default(),
        }
    }

    pub fn order_by(&self) -> &'static str {
        match self {
            MovieSort::TitleAsc => "title ASC, id ASC",
            MovieSort::TitleDesc => "title DESC, id ASC",
            MovieSort::RatingAsc => "rating ASC, id ASC",
            MovieSort::RatingDesc => "rating DESC, id ASC",
            MovieSort::ReleaseDateAsc => "release_date ASC, id ASC",
            MovieSort::ReleaseDateDesc => "release_date DESC, id ASC",
        }
    }
}
