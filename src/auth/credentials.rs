use super::Role;

/// A known login and the identity it maps to.
#[derive(Debug, Clone, Copy)]
pub struct Credential {
    pub username: &'static str,
    pub password: &'static str,
    pub user_id: i32,
    pub role: Role,
}

// Placeholder account table; there is no user store behind it.
const FIXED_CREDENTIALS: &[Credential] = &[
    Credential { username: "admin", password: "password", user_id: 1, role: Role::Admin },
    Credential { username: "user", password: "password", user_id: 2, role: Role::User },
];

/// Look up a username/password pair in the fixed credential table.
pub fn authenticate(username: &str, password: &str) -> Option<&'static Credential> {
    FIXED_CREDENTIALS
        .iter()
        .find(|c| c.username == username && c.password == password)
}
