use crate::model::{
    id::{ProductId, UserId},
    key::AllocatedKey,
};
use async_trait::async_trait;
use shared::error::AppResult;

#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait InventoryRepository: Send + Sync {
    // 未割り当てのキーを 1 つ選び、残高から価格を引いて購入者に割り当てる。
    // すべて 1 トランザクションで行う
    async fn allocate_key(&self, product_id: ProductId, user_id: UserId)
        -> AppResult<AllocatedKey>;
    async fn find_keys_by_owner(&self, user_id: UserId) -> AppResult<Vec<AllocatedKey>>;
    async fn count_available(&self, product_id: ProductId) -> AppResult<i64>;
}
