// handlers - two security tiers
//
// public:    no token (/, /health, /v1/auth)
// protected: bearer token with a role from the route group's allow-list (/v1/*)

pub mod protected;
pub mod public;
