use crate::model::{id::UserId, session::SessionState};
use async_trait::async_trait;
use shared::error::AppResult;

#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    // 保存されていなければ Idle
    async fn load(&self, user_id: UserId) -> AppResult<SessionState>;
    async fn store(&self, user_id: UserId, state: SessionState) -> AppResult<()>;
    // 保存されている状態が from のときだけ to に置き換える。置き換えたら true
    async fn transition(
        &self,
        user_id: UserId,
        from: SessionState,
        to: SessionState,
    ) -> AppResult<bool>;
}
