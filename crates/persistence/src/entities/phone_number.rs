//! Phone number entity (database row mapping).

use sqlx::FromRow;

/// Database row mapping for the phone_number table.
#[derive(Debug, Clone, FromRow)]
pub struct PhoneNumberEntity {
    pub phone_number_id: i32,
    pub customer_id: i32,
    pub phone_number: String,
}

impl From<PhoneNumberEntity> for domain::models::PhoneNumber {
    fn from(entity: PhoneNumberEntity) -> Self {
        Self {
            phone_number_id: entity.phone_number_id,
            customer_id: entity.customer_id,
            phone_number: entity.phone_number,
        }
    }
}
