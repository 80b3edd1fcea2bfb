pub mod lookup;
pub mod uniqueness;
