#![allow(unused_imports)]
pub mod conversation_helpers;
pub mod trigger_helpers;

pub use conversation_helpers::*;
pub use trigger_helpers::*;
