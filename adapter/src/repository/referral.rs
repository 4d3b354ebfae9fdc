use crate::database::{model::user::ReferralStateRow, ConnectionPool};
use async_trait::async_trait;
use derive_new::new;
use kernel::model::{
    id::UserId,
    referral::{ReferralOutcome, ReferralPolicy},
};
use kernel::repository::referral::ReferralRepository;
use shared::error::{AppError, AppResult};

#[derive(new)]
pub struct ReferralRepositoryImpl {
    db: ConnectionPool,
    policy: ReferralPolicy,
}

#[async_trait]
impl ReferralRepository for ReferralRepositoryImpl {
    async fn evaluate(&self, user_id: UserId) -> AppResult<ReferralOutcome> {
        let mut tx = self.db.begin().await?;

        // 紹介された側の行をロックする。同じユーザーに対する判定は直列化され、ボーナスは一度しか付かない
        let user = sqlx::query_as::<_, ReferralStateRow>(
            r#"
                SELECT referrer_id, referral_bonus_given
                FROM users
                WHERE user_id = $1
                FOR UPDATE
            "#,
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?
        .ok_or_else(|| AppError::EntityNotFound(format!("user {user_id} not found")))?;

        let Some(referrer_id) = user.referrer_id else {
            return Ok(ReferralOutcome::NoReferrer);
        };
        if user.referral_bonus_given {
            return Ok(ReferralOutcome::AlreadyGranted);
        }

        // これまでに割り当てられたすべてのキーの価格の合計
        let spent: i64 = sqlx::query_scalar(
            r#"
                SELECT COALESCE(SUM(p.price), 0)::BIGINT
                FROM keys AS k
                INNER JOIN products AS p ON k.product_id = p.product_id
                WHERE k.owner_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        if !self.policy.is_earned(spent) {
            return Ok(ReferralOutcome::BelowThreshold { spent });
        }

        let res = sqlx::query("UPDATE users SET balance = balance + $2 WHERE user_id = $1")
            .bind(referrer_id)
            .bind(self.policy.bonus)
            .execute(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;
        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(format!(
                "referrer {referrer_id} was not credited"
            )));
        }

        let res = sqlx::query(
            r#"
                UPDATE users
                SET referral_bonus_given = TRUE
                WHERE user_id = $1 AND referral_bonus_given = FALSE
            "#,
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;
        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(format!(
                "referral flag of user {user_id} was not set"
            )));
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        tracing::info!(
            user_id = %user_id,
            referrer_id = %referrer_id,
            spent,
            bonus = self.policy.bonus,
            "referral bonus granted"
        );
        Ok(ReferralOutcome::Granted {
            referrer_id,
            amount: self.policy.bonus,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{inventory::InventoryRepositoryImpl, ledger::LedgerRepositoryImpl};
    use kernel::model::id::ProductId;
    use kernel::repository::{inventory::InventoryRepository, ledger::LedgerRepository};
    use std::sync::Arc;

    const ADMIN: UserId = UserId::new(1);
    const REFERRER: UserId = UserId::new(2);
    const BUYER: UserId = UserId::new(3);

    async fn add_product(pool: &sqlx::PgPool, name: &str, price: i64, keys: usize) -> ProductId {
        let product_id: ProductId = sqlx::query_scalar(
            "INSERT INTO products (name, description, price) VALUES ($1, '', $2) RETURNING product_id",
        )
        .bind(name)
        .bind(price)
        .fetch_one(pool)
        .await
        .unwrap();
        for i in 0..keys {
            sqlx::query("INSERT INTO keys (product_id, credential) VALUES ($1, $2)")
                .bind(product_id)
                .bind(format!("{name}-{i}"))
                .execute(pool)
                .await
                .unwrap();
        }
        product_id
    }

    #[sqlx::test(fixtures("common"))]
    async fn test_users_without_referrer_are_skipped(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = ReferralRepositoryImpl::new(ConnectionPool::new(pool), ReferralPolicy::default());

        assert_eq!(repo.evaluate(ADMIN).await?, ReferralOutcome::NoReferrer);
        assert!(matches!(
            repo.evaluate(UserId::new(999)).await,
            Err(AppError::EntityNotFound(_))
        ));
        Ok(())
    }

    #[sqlx::test(fixtures("common"))]
    async fn test_bonus_granted_once_on_crossing_threshold(
        pool: sqlx::PgPool,
    ) -> anyhow::Result<()> {
        // 購入者はフィクスチャで Office Suite (1500) を 1 本持っている
        let cheap = add_product(&pool, "Sticker", 499, 1).await;
        let small = add_product(&pool, "Theme", 1, 1).await;
        let extra = add_product(&pool, "Wallpaper", 300, 2).await;

        let db = ConnectionPool::new(pool);
        let repo = ReferralRepositoryImpl::new(
            db.clone(),
            ReferralPolicy {
                threshold: 2000,
                bonus: 100,
            },
        );
        let inventory = InventoryRepositoryImpl::new(db.clone());
        let ledger = LedgerRepositoryImpl::new(db);

        // 1500 + 499 = 1999
        inventory.allocate_key(cheap, BUYER).await?;
        assert_eq!(
            repo.evaluate(BUYER).await?,
            ReferralOutcome::BelowThreshold { spent: 1999 }
        );
        assert_eq!(ledger.get_balance(REFERRER).await?, 0);

        // 2000 に到達
        inventory.allocate_key(small, BUYER).await?;
        assert_eq!(
            repo.evaluate(BUYER).await?,
            ReferralOutcome::Granted {
                referrer_id: REFERRER,
                amount: 100
            }
        );
        assert_eq!(ledger.get_balance(REFERRER).await?, 100);
        assert_eq!(repo.evaluate(BUYER).await?, ReferralOutcome::AlreadyGranted);

        // その後の購入ではもう付与されない
        inventory.allocate_key(extra, BUYER).await?;
        assert_eq!(repo.evaluate(BUYER).await?, ReferralOutcome::AlreadyGranted);
        assert_eq!(ledger.get_balance(REFERRER).await?, 100);
        Ok(())
    }

    #[sqlx::test(fixtures("common"))]
    async fn test_concurrent_evaluations_grant_once(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let product = add_product(&pool, "Suite Pro", 600, 1).await;
        let db = ConnectionPool::new(pool);
        InventoryRepositoryImpl::new(db.clone())
            .allocate_key(product, BUYER)
            .await?;

        let repo = Arc::new(ReferralRepositoryImpl::new(
            db.clone(),
            ReferralPolicy::default(),
        ));
        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..6 {
            let repo = repo.clone();
            tasks.spawn(async move { repo.evaluate(BUYER).await });
        }
        let mut granted = 0;
        while let Some(res) = tasks.join_next().await {
            match res?? {
                ReferralOutcome::Granted { .. } => granted += 1,
                ReferralOutcome::AlreadyGranted => {}
                other => panic!("unexpected outcome: {other:?}"),
            }
        }
        assert_eq!(granted, 1);
        assert_eq!(LedgerRepositoryImpl::new(db).get_balance(REFERRER).await?, 100);
        Ok(())
    }
}
