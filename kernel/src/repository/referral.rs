use crate::model::{id::UserId, referral::ReferralOutcome};
use async_trait::async_trait;
use shared::error::AppResult;

#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait ReferralRepository: Send + Sync {
    async fn evaluate(&self, user_id: UserId) -> AppResult<ReferralOutcome>;
}
