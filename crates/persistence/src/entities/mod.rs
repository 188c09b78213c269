//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod customer;
pub mod phone_number;

pub use customer::CustomerEntity;
pub use phone_number::PhoneNumberEntity;
