use kernel::model::{
    id::{KeyId, ProductId, UserId},
    key::AllocatedKey,
};
use sqlx::types::chrono::{DateTime, Utc};

// 割り当て前に FOR UPDATE SKIP LOCKED で押さえたキー
#[derive(sqlx::FromRow)]
pub struct LockedKeyRow {
    pub key_id: KeyId,
    pub credential: String,
}

#[derive(sqlx::FromRow)]
pub struct AllocatedKeyRow {
    pub key_id: KeyId,
    pub product_id: ProductId,
    pub product_name: String,
    pub credential: String,
    pub owner_id: UserId,
    pub price: i64,
    pub allocated_at: DateTime<Utc>,
}

impl From<AllocatedKeyRow> for AllocatedKey {
    fn from(value: AllocatedKeyRow) -> Self {
        let AllocatedKeyRow {
            key_id,
            product_id,
            product_name,
            credential,
            owner_id,
            price,
            allocated_at,
        } = value;
        AllocatedKey {
            key_id,
            product_id,
            product_name,
            credential,
            owner_id,
            price,
            allocated_at,
        }
    }
}
