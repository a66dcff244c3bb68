//! `wastetrack-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no storage, no minting).

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{RecordId, RecordIdGenerator};
