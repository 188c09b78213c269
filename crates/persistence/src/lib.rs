//! Persistence layer for the Customer Directory.
//!
//! This crate contains:
//! - Configuration and single-connection management
//! - Entity definitions (database row mappings)
//! - The repository over the `customer` and `phone_number` tables

pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod metrics;
pub mod repositories;
