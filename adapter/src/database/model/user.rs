use kernel::model::{id::UserId, role::Role, user::User};
use shared::error::AppError;
use sqlx::types::chrono::{DateTime, Utc};
use std::str::FromStr;

#[derive(sqlx::FromRow)]
pub struct UserRow {
    pub user_id: UserId,
    pub external_id: i64,
    pub balance: i64,
    pub referrer_id: Option<UserId>,
    pub role: String,
    pub referral_bonus_given: bool,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(value: UserRow) -> Result<Self, Self::Error> {
        let UserRow {
            user_id,
            external_id,
            balance,
            referrer_id,
            role,
            referral_bonus_given,
            created_at,
        } = value;
        Ok(User {
            user_id,
            external_id,
            balance,
            referrer_id,
            role: Role::from_str(&role)
                .map_err(|e| AppError::ConversionEntityError(format!("role {role}: {e}")))?,
            referral_bonus_given,
            created_at,
        })
    }
}

// 紹介ボーナスの判定で行ロックを取るときに読む列
#[derive(sqlx::FromRow)]
pub struct ReferralStateRow {
    pub referrer_id: Option<UserId>,
    pub referral_bonus_given: bool,
}
