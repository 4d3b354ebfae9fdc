use crate::model::{id::UserId, role::Role};
use derive_new::new;

// 紹介者は招待リンクに含まれる外部 ID で渡される
#[derive(Debug, new)]
pub struct RegisterUser {
    pub external_id: i64,
    pub referrer_external_id: Option<i64>,
}

#[derive(Debug, new)]
pub struct UpdateUserRole {
    pub user_id: UserId,
    pub role: Role,
    pub requested_by: UserId,
}
