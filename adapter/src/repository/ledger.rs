use crate::database::ConnectionPool;
use async_trait::async_trait;
use derive_new::new;
use kernel::model::id::UserId;
use kernel::repository::ledger::LedgerRepository;
use shared::error::{AppError, AppResult};

#[derive(new)]
pub struct LedgerRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl LedgerRepository for LedgerRepositoryImpl {
    async fn get_balance(&self, user_id: UserId) -> AppResult<i64> {
        let balance: Option<i64> =
            sqlx::query_scalar("SELECT balance FROM users WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(self.db.inner_ref())
                .await
                .map_err(AppError::SpecificOperationError)?;
        Ok(balance.unwrap_or(0))
    }

    async fn credit(&self, user_id: UserId, amount: i64) -> AppResult<()> {
        ensure_positive(amount)?;

        let res = sqlx::query("UPDATE users SET balance = balance + $2 WHERE user_id = $1")
            .bind(user_id)
            .bind(amount)
            .execute(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;
        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound(format!("user {user_id} not found")));
        }

        tracing::info!(user_id = %user_id, amount, "balance credited");
        Ok(())
    }

    async fn debit(&self, user_id: UserId, amount: i64) -> AppResult<()> {
        ensure_positive(amount)?;

        // 残高の確認と減算を 1 文で行うので、並行して呼ばれても負にならない
        let res = sqlx::query(
            r#"
                UPDATE users
                SET balance = balance - $2
                WHERE user_id = $1 AND balance >= $2
            "#,
        )
        .bind(user_id)
        .bind(amount)
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE user_id = $1)")
                    .bind(user_id)
                    .fetch_one(self.db.inner_ref())
                    .await
                    .map_err(AppError::SpecificOperationError)?;
            return Err(if exists {
                AppError::InsufficientBalance(format!(
                    "balance of user {user_id} is below {amount}"
                ))
            } else {
                AppError::EntityNotFound(format!("user {user_id} not found"))
            });
        }

        tracing::info!(user_id = %user_id, amount, "balance debited");
        Ok(())
    }
}

fn ensure_positive(amount: i64) -> AppResult<()> {
    if amount <= 0 {
        return Err(AppError::InvalidAmount(format!(
            "amount must be positive, got {amount}"
        )));
    }
    Ok(())
}
