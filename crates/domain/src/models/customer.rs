//! Customer domain models.

use serde::{Deserialize, Serialize};

/// A customer record. Owns zero or more phone numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    /// System-generated, immutable after creation.
    pub customer_id: i32,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
}

/// A phone number belonging to a customer.
///
/// The referenced customer must exist; phone rows are removed before or
/// together with their owning customer (application-level cascade).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneNumber {
    pub phone_number_id: i32,
    pub customer_id: i32,
    pub phone_number: String,
}
