// handlers/public/auth/mod.rs - Public authentication handlers
//
// Account creation and token acquisition. No bearer token required.

pub mod sign_in;
pub mod sign_up;

pub use sign_in::sign_in_post;
pub use sign_up::sign_up_post;
