pub mod catalog;
pub mod health;
pub mod inventory;
pub mod ledger;
pub mod payment;
pub mod referral;
pub mod seed;
pub mod session;
pub mod user;

use kernel::model::{id::UserId, role::Role};
use shared::error::{AppError, AppResult};
use std::str::FromStr;

// 管理者操作の前に、フロントエンドの確認とは別に DB 上の権限を確認する
pub(crate) async fn ensure_admin(conn: &mut sqlx::PgConnection, user_id: UserId) -> AppResult<()> {
    let role: Option<String> = sqlx::query_scalar("SELECT role FROM users WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(AppError::SpecificOperationError)?;
    let is_admin = match role {
        Some(role) => Role::from_str(&role)
            .map_err(|e| AppError::ConversionEntityError(format!("role {role}: {e}")))?
            .is_admin(),
        None => false,
    };
    if !is_admin {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}
