//! Domain model definitions.

pub mod customer;

pub use customer::{Customer, PhoneNumber};
