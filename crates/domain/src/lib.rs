//! Domain layer for the Customer Directory.
//!
//! This crate contains:
//! - Domain models (Customer, PhoneNumber)
//! - Input validation helpers

pub mod models;
pub mod validation;
