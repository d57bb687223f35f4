pub mod equality;
pub mod invariants;
pub mod validation;

pub use equality::is_same_as;
pub use invariants::check_node;
pub use validation::{assert_consistency, is_consistent, ConsistencyResult};
