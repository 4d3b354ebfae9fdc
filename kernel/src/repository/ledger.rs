use crate::model::id::UserId;
use async_trait::async_trait;
use shared::error::AppResult;

#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    // ユーザーが存在しなければ 0
    async fn get_balance(&self, user_id: UserId) -> AppResult<i64>;
    // 冪等ではない。二重加算の防止は呼び出し側の責任
    async fn credit(&self, user_id: UserId, amount: i64) -> AppResult<()>;
    async fn debit(&self, user_id: UserId, amount: i64) -> AppResult<()>;
}
