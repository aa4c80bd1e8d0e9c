//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls and membership lookups into the
//!   host-facing chore API.
//! - Keep host workflows decoupled from storage details.

pub mod chore_service;
