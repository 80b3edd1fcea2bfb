// handlers/protected/mod.rs - Protected handlers (bearer token required)
//
// Every handler here runs behind `jwt_auth_middleware` and receives the
// resolved `AuthUser`. Resource handlers follow one order: parse route ids,
// resolve the ancestor chain, authorize, validate the body, check natural
// keys, persist.

pub mod auth;
pub mod collections;
pub mod key_values;
pub mod keys;
pub mod projects;
