// handlers/public - endpoints that need no token

pub mod login;
pub mod system;

pub use login::login_post;
pub use system::{health, root};
