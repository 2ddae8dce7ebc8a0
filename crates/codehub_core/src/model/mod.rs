//! Account domain model.
//!
//! # Responsibility
//! - Define the identity + settings record for one signed-in account.
//! - Define items held by an account's pinned repositories collection.
//!
//! # Invariants
//! - Account identity is the numeric id alone.

pub mod account;
pub mod pinned;
