pub mod links;
pub mod manager;
pub mod models;
pub mod schema;

pub use links::LinkSide;
pub use manager::{DatabaseError, DatabaseManager};
