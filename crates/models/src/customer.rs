use sea_orm::{entity::prelude::*, Set, DatabaseConnection, QueryFilter, PaginatorTrait};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "customer")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub phone: String,
    pub nickname: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub phone_verified: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Insert a new customer row. A duplicate phone surfaces as `ModelError::UniqueViolation`.
pub async fn create(
    db: &DatabaseConnection,
    phone: &str,
    nickname: &str,
    password_hash: String,
    phone_verified: bool,
) -> Result<Model, ModelError> {
    if phone.trim().is_empty() { return Err(ModelError::Validation("phone required".into())); }
    if nickname.trim().is_empty() { return Err(ModelError::Validation("nickname required".into())); }
    if password_hash.trim().is_empty() { return Err(ModelError::Validation("password hash required".into())); }
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        phone: Set(phone.to_string()),
        nickname: Set(nickname.to_string()),
        password_hash: Set(password_hash),
        phone_verified: Set(phone_verified),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(am.insert(db).await?)
}

pub async fn exists_by_phone(db: &DatabaseConnection, phone: &str) -> Result<bool, ModelError> {
    let n = Entity::find().filter(Column::Phone.eq(phone)).count(db).await?;
    Ok(n > 0)
}

pub async fn find_by_phone(db: &DatabaseConnection, phone: &str) -> Result<Option<Model>, ModelError> {
    Ok(Entity::find().filter(Column::Phone.eq(phone)).one(db).await?)
}

pub async fn hard_delete(db: &DatabaseConnection, id: Uuid) -> Result<(), ModelError> {
    Entity::delete_by_id(id).exec(db).await?;
    Ok(())
}
