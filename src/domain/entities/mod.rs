pub mod conversation;
pub mod filter;
pub mod trigger;

pub use conversation::*;
pub use filter::*;
pub use trigger::*;
