use crate::model::{
    id::UserId,
    user::{
        event::{RegisterUser, UpdateUserRole},
        Registration, User,
    },
};
use async_trait::async_trait;
use shared::error::AppResult;

#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn register(&self, event: RegisterUser) -> AppResult<Registration>;
    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<User>>;
    async fn find_by_external_id(&self, external_id: i64) -> AppResult<Option<User>>;
    async fn update_role(&self, event: UpdateUserRole) -> AppResult<()>;
}
