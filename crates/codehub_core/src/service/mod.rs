//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate registry and storage calls into UI-level flows.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod account_service;
