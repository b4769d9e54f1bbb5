use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

#[derive(Debug, Error)]
#[error("unknown gender code: {0:?}")]
pub struct UnknownGender(pub String);

impl Gender {
    pub fn code(&self) -> &'static str {
        match self {
            Gender::Male => "M",
            Gender::Female => "F",
        }
    }

    /// Exact, case-sensitive match on "M" or "F"
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "M" => Some(Gender::Male),
            "F" => Some(Gender::Female),
            _ => None,
        }
    }
}

impl TryFrom<String> for Gender {
    type Error = UnknownGender;

    fn try_from(code: String) -> Result<Self, Self::Error> {
        Gender::from_code(&code).ok_or(UnknownGender(code))
    }
}

/// Actor as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub id: i32,
    pub name: String,
    pub gender: Gender,
    pub date_of_birth: String,
    /// Linked movie IDs, ascending
    pub movies: Vec<i32>,
}

/// Body of POST /v1/actor-add
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewActor {
    pub name: String,
    pub gender: Gender,
    #[serde(default)]
    pub date_of_birth: String,
    #[serde(default)]
    pub movies: Vec<i32>,
}

/// Row of the actors table
#[derive(Debug, Clone, FromRow)]
pub struct ActorRow {
    pub id: i32,
    pub name: String,
    pub gender: String,
    pub date_of_birth: String,
}

impl ActorRow {
    pub const COLUMNS: &'static str = "id, name, gender, date_of_birth";

    pub fn into_actor(self, movies: Vec<i32>) -> Result<Actor, sqlx::Error> {
        let gender = Gender::try_from(self.gender).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        Ok(Actor {
            id: self.id,
            name: self.name,
            gender,
            date_of_birth: self.date_of_birth,
            movies,
        })
    }
}
