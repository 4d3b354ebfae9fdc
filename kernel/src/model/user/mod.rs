use crate::model::{id::UserId, role::Role};
use chrono::{DateTime, Utc};

pub mod event;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub user_id: UserId,
    pub external_id: i64,
    pub balance: i64,
    pub referrer_id: Option<UserId>,
    pub role: Role,
    pub referral_bonus_given: bool,
    pub created_at: DateTime<Utc>,
}

// 重複登録はエラーではなく、既存ユーザーをそのまま返す
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    Created(User),
    AlreadyRegistered(User),
}

impl Registration {
    pub fn user(&self) -> &User {
        match self {
            Registration::Created(user) | Registration::AlreadyRegistered(user) => user,
        }
    }

    pub fn into_user(self) -> User {
        match self {
            Registration::Created(user) | Registration::AlreadyRegistered(user) => user,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, Registration::Created(_))
    }
}
