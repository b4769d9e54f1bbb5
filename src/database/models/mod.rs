pub mod actor;
pub mod movie;

pub use actor::{Actor, ActorRow, Gender, NewActor};
pub use movie::{Movie, MovieRow, MovieSort, NewMovie};
