pub mod clock;
pub mod trigger_repository;

pub use clock::*;
pub use trigger_repository::*;
