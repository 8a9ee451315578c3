//! Core types and configuration for the round reconstruction pipeline.
//!
//! This crate provides shared types used across all other crates:
//! - Tick, round and match types
//! - Column schema and capability checks
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod error;
pub mod schema;
pub mod types;

pub use config::Config;
pub use error::{Error, FailureKind, Result};
pub use schema::{Capabilities, Column, ColumnSet, IdentityColumn, Schema};
pub use types::*;
