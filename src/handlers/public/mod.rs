// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Account creation, token acquisition, password reset and the language
// catalog. Everything else sits behind the bearer middleware.

pub mod auth;
pub mod languages;
pub mod password_reset;
