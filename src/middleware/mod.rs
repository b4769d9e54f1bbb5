pub mod auth;

pub use auth::{authorize, role_gate_middleware, AuthUser, RoleGate};
