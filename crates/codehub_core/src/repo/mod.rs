//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the account registry contract consumed by the UI layer.
//! - Isolate SQLite query details from service orchestration.

pub mod account_repo;
