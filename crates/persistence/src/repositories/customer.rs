//! Customer repository: schema selection, table provisioning and CRUD over
//! the `customer` and `phone_number` tables.

use std::collections::BTreeSet;

use sqlx::{Connection, PgConnection};
use tracing::{debug, info};

use domain::models::{Customer, PhoneNumber};
use domain::validation::validate_phone_number;

use crate::config::DatabaseConfig;
use crate::db;
use crate::entities::{CustomerEntity, PhoneNumberEntity};
use crate::error::StoreError;
use crate::metrics::QueryTimer;

/// Repository over the `customer` and `phone_number` tables.
///
/// Owns a single database connection. All methods take `&mut self`, so a
/// repository cannot be used concurrently from multiple tasks; callers that
/// need parallelism open one repository per worker. Every statement commits
/// on its own (connection autocommit); multi-step operations such as
/// [`add_customer`](Self::add_customer) and
/// [`remove_customer`](Self::remove_customer) are not atomic, and a failure
/// partway leaves the earlier steps applied.
pub struct CustomerRepository {
    conn: PgConnection,
    default_schema: String,
}

impl CustomerRepository {
    /// Opens a connection and selects the configured default schema.
    ///
    /// Fails with [`StoreError::Connection`] when the connection cannot be
    /// established, or [`StoreError::SchemaNotFound`] when the configured
    /// default schema does not exist.
    pub async fn open(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let conn = db::connect(config).await?;
        let mut repo = Self {
            conn,
            default_schema: config.default_schema.clone(),
        };
        repo.set_schema(None).await?;
        Ok(repo)
    }

    /// Selects the schema subsequent statements resolve against.
    ///
    /// `None` means the configured default schema. The schema must already
    /// exist; it is verified against `information_schema.schemata` before
    /// the search path is changed.
    pub async fn set_schema(&mut self, schema: Option<&str>) -> Result<(), StoreError> {
        let schema = schema.unwrap_or(&self.default_schema).to_string();

        let timer = QueryTimer::new("set_schema");
        let exists: Option<String> = sqlx::query_scalar(
            r#"
            SELECT schema_name
            FROM information_schema.schemata
            WHERE schema_name = $1
            "#,
        )
        .bind(&schema)
        .fetch_optional(&mut self.conn)
        .await?;
        timer.record();

        if exists.is_none() {
            return Err(StoreError::SchemaNotFound(schema));
        }

        // SET accepts no bound parameters; the name is catalog-verified
        // above and quoted here.
        let stmt = format!("SET search_path TO {}", quote_ident(&schema));
        sqlx::query(&stmt).execute(&mut self.conn).await?;

        info!(schema = %schema, "search_path set");
        Ok(())
    }

    /// Drops and recreates both tables.
    ///
    /// The child table is dropped before the parent and created after it, so
    /// the foreign key is valid at every step. Each statement commits
    /// independently; a failure partway leaves a partial schema.
    pub async fn create_tables(&mut self) -> Result<(), StoreError> {
        let timer = QueryTimer::new("create_tables");

        sqlx::query("DROP TABLE IF EXISTS phone_number CASCADE")
            .execute(&mut self.conn)
            .await?;
        sqlx::query("DROP TABLE IF EXISTS customer CASCADE")
            .execute(&mut self.conn)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE customer(
                customer_id SERIAL PRIMARY KEY,
                first_name VARCHAR(50) NOT NULL,
                last_name VARCHAR(50) NULL,
                email VARCHAR(50) NOT NULL)
            "#,
        )
        .execute(&mut self.conn)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE phone_number(
                phone_number_id SERIAL PRIMARY KEY,
                customer_id INT NOT NULL REFERENCES customer(customer_id),
                phone_number VARCHAR(16) NOT NULL)
            "#,
        )
        .execute(&mut self.conn)
        .await?;

        timer.record();
        info!("customer and phone_number tables recreated");
        Ok(())
    }

    /// Inserts a customer and its phone numbers, returning the generated id.
    ///
    /// The customer insert and each phone insert commit independently; this
    /// is not a single transaction.
    pub async fn add_customer(
        &mut self,
        first_name: &str,
        last_name: Option<&str>,
        email: &str,
        phones: &[String],
    ) -> Result<i32, StoreError> {
        let timer = QueryTimer::new("add_customer");
        let customer_id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO customer (first_name, last_name, email)
            VALUES ($1, $2, $3)
            RETURNING customer_id
            "#,
        )
        .bind(first_name)
        .bind(last_name)
        .bind(email)
        .fetch_one(&mut self.conn)
        .await?;
        timer.record();
        debug!(customer_id, "customer inserted");

        self.add_phone_numbers(customer_id, phones).await?;
        Ok(customer_id)
    }

    /// Inserts one phone number for an existing customer.
    ///
    /// Fails with [`StoreError::InvalidPhone`] when the number is empty or
    /// longer than 16 characters, and [`StoreError::ForeignKey`] when the
    /// customer does not exist.
    pub async fn add_phone_number(
        &mut self,
        customer_id: i32,
        phone: &str,
    ) -> Result<i32, StoreError> {
        validate_phone_number(phone).map_err(|e| {
            StoreError::InvalidPhone(
                e.message
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string()),
            )
        })?;

        let timer = QueryTimer::new("add_phone_number");
        let phone_number_id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO phone_number (customer_id, phone_number)
            VALUES ($1, $2)
            RETURNING phone_number_id
            "#,
        )
        .bind(customer_id)
        .bind(phone)
        .fetch_one(&mut self.conn)
        .await?;
        timer.record();
        debug!(customer_id, phone_number_id, "phone number inserted");
        Ok(phone_number_id)
    }

    /// Inserts a batch of phone numbers, one insert per element.
    pub async fn add_phone_numbers(
        &mut self,
        customer_id: i32,
        phones: &[String],
    ) -> Result<(), StoreError> {
        for phone in phones {
            self.add_phone_number(customer_id, phone).await?;
        }
        Ok(())
    }

    /// Applies a partial update to a customer.
    ///
    /// Omitted fields keep their stored values; omission is never
    /// clear-to-null. A non-empty `phones` list fully replaces the stored
    /// phone set; an empty or omitted list leaves it untouched.
    pub async fn update_customer(
        &mut self,
        customer_id: i32,
        first_name: Option<&str>,
        last_name: Option<&str>,
        email: Option<&str>,
        phones: Option<&[String]>,
    ) -> Result<(), StoreError> {
        let timer = QueryTimer::new("update_customer");
        let current = sqlx::query_as::<_, CustomerEntity>(
            r#"
            SELECT customer_id, first_name, last_name, email
            FROM customer
            WHERE customer_id = $1
            "#,
        )
        .bind(customer_id)
        .fetch_optional(&mut self.conn)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("customer {customer_id}")))?;

        let first_name = first_name.unwrap_or(&current.first_name);
        let last_name = last_name.or(current.last_name.as_deref());
        let email = email.unwrap_or(&current.email);

        sqlx::query(
            r#"
            UPDATE customer
            SET first_name = $1,
                last_name = $2,
                email = $3
            WHERE customer_id = $4
            "#,
        )
        .bind(first_name)
        .bind(last_name)
        .bind(email)
        .bind(customer_id)
        .execute(&mut self.conn)
        .await?;
        timer.record();
        debug!(customer_id, "customer updated");

        if let Some(phones) = phones {
            if !phones.is_empty() {
                self.remove_all_phone_numbers(customer_id).await?;
                self.add_phone_numbers(customer_id, phones).await?;
            }
        }
        Ok(())
    }

    /// Deletes a customer and all of its phone numbers.
    ///
    /// Phones are deleted first, then the customer row, as two independent
    /// commits. A crash between the two leaves a phoneless customer row.
    pub async fn remove_customer(&mut self, customer_id: i32) -> Result<(), StoreError> {
        self.remove_all_phone_numbers(customer_id).await?;

        let timer = QueryTimer::new("remove_customer");
        sqlx::query(
            r#"
            DELETE FROM customer
            WHERE customer_id = $1
            "#,
        )
        .bind(customer_id)
        .execute(&mut self.conn)
        .await?;
        timer.record();
        debug!(customer_id, "customer removed");
        Ok(())
    }

    /// Deletes all phone numbers of a customer, returning how many rows
    /// went away. Deleting zero rows is not an error.
    pub async fn remove_all_phone_numbers(
        &mut self,
        customer_id: i32,
    ) -> Result<u64, StoreError> {
        let timer = QueryTimer::new("remove_all_phone_numbers");
        let result = sqlx::query(
            r#"
            DELETE FROM phone_number
            WHERE customer_id = $1
            "#,
        )
        .bind(customer_id)
        .execute(&mut self.conn)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Deletes one phone number by id. Returns whether a row was deleted;
    /// deleting a non-existent row is not an error.
    pub async fn remove_phone_number(
        &mut self,
        phone_number_id: i32,
    ) -> Result<bool, StoreError> {
        let timer = QueryTimer::new("remove_phone_number");
        let result = sqlx::query(
            r#"
            DELETE FROM phone_number
            WHERE phone_number_id = $1
            "#,
        )
        .bind(phone_number_id)
        .execute(&mut self.conn)
        .await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }

    /// Point lookup of a phone number id by customer and number.
    pub async fn get_phone_number_id(
        &mut self,
        customer_id: i32,
        phone: &str,
    ) -> Result<i32, StoreError> {
        let timer = QueryTimer::new("get_phone_number_id");
        let phone_number_id: Option<i32> = sqlx::query_scalar(
            r#"
            SELECT phone_number_id
            FROM phone_number
            WHERE customer_id = $1
              AND phone_number = $2
            "#,
        )
        .bind(customer_id)
        .bind(phone)
        .fetch_optional(&mut self.conn)
        .await?;
        timer.record();

        phone_number_id.ok_or_else(|| {
            StoreError::NotFound(format!("phone {phone} for customer {customer_id}"))
        })
    }

    /// Searches customer ids by phone numbers and/or name and email fields.
    ///
    /// The result is the union of the ids owning any of the given phone
    /// numbers and the ids matching the AND-conjunction of every non-empty
    /// field. With no phones and no fields the result is empty; there is no
    /// implicit match-all, and all matches are returned (no page limit).
    pub async fn search_customer_ids(
        &mut self,
        first_name: Option<&str>,
        last_name: Option<&str>,
        email: Option<&str>,
        phones: &[String],
    ) -> Result<BTreeSet<i32>, StoreError> {
        let timer = QueryTimer::new("search_customer_ids");
        let mut ids = BTreeSet::new();

        for phone in phones {
            let found: Vec<i32> = sqlx::query_scalar(
                r#"
                SELECT customer_id
                FROM phone_number
                WHERE phone_number = $1
                "#,
            )
            .bind(phone)
            .fetch_all(&mut self.conn)
            .await?;
            ids.extend(found);
        }

        if let Some((where_clause, values)) = filter_conditions(first_name, last_name, email) {
            let sql = format!("SELECT customer_id FROM customer WHERE {where_clause}");
            let mut query = sqlx::query_scalar::<_, i32>(&sql);
            for value in values {
                query = query.bind(value);
            }
            let found = query.fetch_all(&mut self.conn).await?;
            ids.extend(found);
        }

        timer.record();
        Ok(ids)
    }

    /// Fetches one customer by id.
    pub async fn find_customer(
        &mut self,
        customer_id: i32,
    ) -> Result<Option<Customer>, StoreError> {
        let timer = QueryTimer::new("find_customer");
        let entity = sqlx::query_as::<_, CustomerEntity>(
            r#"
            SELECT customer_id, first_name, last_name, email
            FROM customer
            WHERE customer_id = $1
            "#,
        )
        .bind(customer_id)
        .fetch_optional(&mut self.conn)
        .await?;
        timer.record();
        Ok(entity.map(Into::into))
    }

    /// Lists a customer's phone numbers in insertion order.
    pub async fn phone_numbers_for_customer(
        &mut self,
        customer_id: i32,
    ) -> Result<Vec<PhoneNumber>, StoreError> {
        let timer = QueryTimer::new("phone_numbers_for_customer");
        let entities = sqlx::query_as::<_, PhoneNumberEntity>(
            r#"
            SELECT phone_number_id, customer_id, phone_number
            FROM phone_number
            WHERE customer_id = $1
            ORDER BY phone_number_id
            "#,
        )
        .bind(customer_id)
        .fetch_all(&mut self.conn)
        .await?;
        timer.record();
        Ok(entities.into_iter().map(Into::into).collect())
    }

    /// Closes the connection. Consuming `self` makes double-close
    /// unrepresentable; an abandoned repository is released on drop.
    pub async fn close(self) -> Result<(), StoreError> {
        self.conn.close().await.map_err(StoreError::Connection)?;
        info!("connection closed");
        Ok(())
    }
}

/// Builds the AND-conjunction over the non-empty name/email filters with
/// numbered placeholders. Returns `None` when every filter is absent or
/// empty.
fn filter_conditions<'a>(
    first_name: Option<&'a str>,
    last_name: Option<&'a str>,
    email: Option<&'a str>,
) -> Option<(String, Vec<&'a str>)> {
    let mut conditions = Vec::new();
    let mut values = Vec::new();

    for (column, value) in [
        ("first_name", first_name),
        ("last_name", last_name),
        ("email", email),
    ] {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            conditions.push(format!("{} = ${}", column, values.len() + 1));
            values.push(value);
        }
    }

    if conditions.is_empty() {
        None
    } else {
        Some((conditions.join(" AND "), values))
    }
}

/// Double-quotes an identifier for interpolation into DDL-style statements.
fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_conditions_all_fields() {
        let (clause, values) =
            filter_conditions(Some("Adam"), Some("Adams"), Some("adam@mail.com")).unwrap();
        assert_eq!(
            clause,
            "first_name = $1 AND last_name = $2 AND email = $3"
        );
        assert_eq!(values, vec!["Adam", "Adams", "adam@mail.com"]);
    }

    #[test]
    fn test_filter_conditions_renumbers_placeholders() {
        let (clause, values) = filter_conditions(None, None, Some("adam@mail.com")).unwrap();
        assert_eq!(clause, "email = $1");
        assert_eq!(values, vec!["adam@mail.com"]);

        let (clause, values) =
            filter_conditions(Some("Adam"), None, Some("adam@mail.com")).unwrap();
        assert_eq!(clause, "first_name = $1 AND email = $2");
        assert_eq!(values, vec!["Adam", "adam@mail.com"]);
    }

    #[test]
    fn test_filter_conditions_empty_strings_are_skipped() {
        assert!(filter_conditions(Some(""), Some(""), Some("")).is_none());
        assert!(filter_conditions(None, None, None).is_none());
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("sales"), "\"sales\"");
        assert_eq!(quote_ident("odd\"name"), "\"odd\"\"name\"");
    }
}
