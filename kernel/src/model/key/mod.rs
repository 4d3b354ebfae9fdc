use crate::model::id::{KeyId, ProductId, UserId};
use chrono::{DateTime, Utc};

// 割り当て済みのキー。owner は一度設定されたら変わらない
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocatedKey {
    pub key_id: KeyId,
    pub product_id: ProductId,
    pub product_name: String,
    pub credential: String,
    pub owner_id: UserId,
    pub price: i64,
    pub allocated_at: DateTime<Utc>,
}
