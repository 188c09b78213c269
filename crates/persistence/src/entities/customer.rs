//! Customer entity (database row mapping).

use sqlx::FromRow;

/// Database row mapping for the customer table.
#[derive(Debug, Clone, FromRow)]
pub struct CustomerEntity {
    pub customer_id: i32,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
}

impl From<CustomerEntity> for domain::models::Customer {
    fn from(entity: CustomerEntity) -> Self {
        Self {
            customer_id: entity.customer_id,
            first_name: entity.first_name,
            last_name: entity.last_name,
            email: entity.email,
        }
    }
}
