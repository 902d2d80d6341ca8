//! Wire-level models ("elements") exchanged with clients.
//!
//! Elements are built per request and never persisted directly. The stored
//! form lives in [`crate::db::entity`]; [`crate::convert`] maps between the two.
//!
//! - [`Parent`]: owns zero or more minions, reports their names.
//! - [`Minion`]: belongs to exactly one parent, referenced by the parent's name.

mod minion;
mod parent;

pub use minion::*;
pub use parent::*;
