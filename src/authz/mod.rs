//! Who may do what, and which rows they may see.
//!
//! Both halves are pure: [`policy`] answers allow/deny for a role, [`scope`] turns a caller into
//! the predicate the store must apply. Neither touches the store.

pub mod policy;
pub mod scope;

pub use policy::{Action, ensure_allowed, is_allowed};
pub use scope::{OrderScope, RestaurantScope, SharedCartScope};
