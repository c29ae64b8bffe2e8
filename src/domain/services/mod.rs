pub mod condition_registry;
pub mod conditions;
pub mod filter_normalizer;
pub mod trigger_rule_set;
pub mod value_comparator;

pub use condition_registry::*;
pub use conditions::*;
pub use filter_normalizer::*;
pub use trigger_rule_set::*;
pub use value_comparator::*;
