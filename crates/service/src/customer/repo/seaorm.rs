use sea_orm::DatabaseConnection;

use crate::customer::domain::{Customer, NewCustomer};
use crate::customer::errors::CustomerError;
use crate::customer::repository::CustomerRepository;

/// Postgres-backed repository; the `uniq_customer_phone` index arbitrates concurrent sign-ups.
pub struct SeaOrmCustomerRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmCustomerRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

fn to_domain(m: models::customer::Model) -> Customer {
    Customer {
        id: m.id,
        phone: m.phone,
        nickname: m.nickname,
        password_hash: m.password_hash,
        phone_verified: m.phone_verified,
    }
}

#[async_trait::async_trait]
impl CustomerRepository for SeaOrmCustomerRepository {
    async fn exists_by_phone(&self, phone: &str) -> Result<bool, CustomerError> {
        Ok(models::customer::exists_by_phone(&self.db, phone).await?)
    }

    async fn save(&self, new: NewCustomer) -> Result<Customer, CustomerError> {
        let created = models::customer::create(&self.db, &new.phone, &new.nickname, new.password_hash, new.phone_verified).await?;
        Ok(to_domain(created))
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<Customer>, CustomerError> {
        Ok(models::customer::find_by_phone(&self.db, phone).await?.map(to_domain))
    }
}
