pub mod extract;
pub mod payloads;
pub mod validation;

pub use extract::{JsonBody, ListParams, RouteIds};
