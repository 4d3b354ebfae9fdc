use crate::database::{model::user::UserRow, ConnectionPool};
use async_trait::async_trait;
use derive_new::new;
use kernel::model::{
    id::UserId,
    user::{
        event::{RegisterUser, UpdateUserRole},
        Registration, User,
    },
};
use crate::repository::ensure_admin;
use kernel::repository::user::UserRepository;
use shared::error::{AppError, AppResult};

#[derive(new)]
pub struct UserRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl UserRepository for UserRepositoryImpl {
    async fn register(&self, event: RegisterUser) -> AppResult<Registration> {
        let mut tx = self.db.begin().await?;

        // 紹介者は外部 ID から引く。未登録や自分自身の場合は紹介者なしとして扱う
        let referrer_id: Option<UserId> = match event.referrer_external_id {
            Some(referrer) if referrer != event.external_id => {
                sqlx::query_scalar("SELECT user_id FROM users WHERE external_id = $1")
                    .bind(referrer)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(AppError::SpecificOperationError)?
            }
            _ => None,
        };

        // 登録済みなら何もしない。紹介者も上書きしない
        let inserted = sqlx::query_as::<_, UserRow>(
            r#"
                INSERT INTO users (external_id, referrer_id)
                VALUES ($1, $2)
                ON CONFLICT (external_id) DO NOTHING
                RETURNING
                    user_id,
                    external_id,
                    balance,
                    referrer_id,
                    role,
                    referral_bonus_given,
                    created_at
            "#,
        )
        .bind(event.external_id)
        .bind(referrer_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        let registration = match inserted {
            Some(row) => Registration::Created(User::try_from(row)?),
            None => {
                let row = sqlx::query_as::<_, UserRow>(
                    r#"
                        SELECT
                            user_id,
                            external_id,
                            balance,
                            referrer_id,
                            role,
                            referral_bonus_given,
                            created_at
                        FROM users
                        WHERE external_id = $1
                    "#,
                )
                .bind(event.external_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(AppError::SpecificOperationError)?;
                Registration::AlreadyRegistered(User::try_from(row)?)
            }
        };

        tx.commit().await.map_err(AppError::TransactionError)?;

        if registration.is_new() {
            tracing::info!(
                user_id = %registration.user().user_id,
                external_id = event.external_id,
                "user registered"
            );
        }
        Ok(registration)
    }

    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<User>> {
        sqlx::query_as::<_, UserRow>(
            r#"
                SELECT
                    user_id,
                    external_id,
                    balance,
                    referrer_id,
                    role,
                    referral_bonus_given,
                    created_at
                FROM users
                WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?
        .map(User::try_from)
        .transpose()
    }

    async fn find_by_external_id(&self, external_id: i64) -> AppResult<Option<User>> {
        sqlx::query_as::<_, UserRow>(
            r#"
                SELECT
                    user_id,
                    external_id,
                    balance,
                    referrer_id,
                    role,
                    referral_bonus_given,
                    created_at
                FROM users
                WHERE external_id = $1
            "#,
        )
        .bind(external_id)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?
        .map(User::try_from)
        .transpose()
    }

    async fn update_role(&self, event: UpdateUserRole) -> AppResult<()> {
        let mut tx = self.db.begin().await?;

        ensure_admin(&mut *tx, event.requested_by).await?;

        let res = sqlx::query("UPDATE users SET role = $2 WHERE user_id = $1")
            .bind(event.user_id)
            .bind(event.role.as_ref())
            .execute(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;
        if res.rows_affected() < 1 {
            return Err(AppError::EntityNotFound(format!(
                "user {} not found",
                event.user_id
            )));
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        tracing::info!(
            user_id = %event.user_id,
            role = event.role.as_ref(),
            requested_by = %event.requested_by,
            "user role updated"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::model::role::Role;

    const ADMIN: UserId = UserId::new(1);
    const REFERRER: UserId = UserId::new(2);

    #[sqlx::test(fixtures("common"))]
    async fn test_register_is_idempotent(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = UserRepositoryImpl::new(ConnectionPool::new(pool.clone()));

        let first = repo.register(RegisterUser::new(2001, Some(1002))).await?;
        assert!(first.is_new());
        let user = first.into_user();
        assert_eq!(user.referrer_id, Some(REFERRER));
        assert_eq!(user.balance, 0);
        assert_eq!(user.role, Role::User);
        assert!(!user.referral_bonus_given);

        // 2 回目は別の紹介者を指定しても変わらない
        let second = repo.register(RegisterUser::new(2001, Some(1001))).await?;
        assert_eq!(second, Registration::AlreadyRegistered(user.clone()));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE external_id = 2001")
            .fetch_one(&pool)
            .await?;
        assert_eq!(count, 1);
        Ok(())
    }

    #[sqlx::test(fixtures("common"))]
    async fn test_unknown_or_self_referrer_is_dropped(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = UserRepositoryImpl::new(ConnectionPool::new(pool));

        let unknown = repo.register(RegisterUser::new(2002, Some(424242))).await?;
        assert_eq!(unknown.user().referrer_id, None);

        let own = repo.register(RegisterUser::new(2003, Some(2003))).await?;
        assert_eq!(own.user().referrer_id, None);

        let found = repo.find_by_external_id(2003).await?.unwrap();
        assert_eq!(Some(found.clone()), repo.find_by_id(found.user_id).await?);
        assert!(repo.find_by_external_id(9999).await?.is_none());
        Ok(())
    }

    #[sqlx::test(fixtures("common"))]
    async fn test_update_role_requires_admin(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let repo = UserRepositoryImpl::new(ConnectionPool::new(pool));

        let res = repo
            .update_role(UpdateUserRole::new(REFERRER, Role::Admin, REFERRER))
            .await;
        assert!(matches!(res, Err(AppError::Unauthorized)));

        repo.update_role(UpdateUserRole::new(REFERRER, Role::Admin, ADMIN))
            .await?;
        assert_eq!(repo.find_by_id(REFERRER).await?.unwrap().role, Role::Admin);

        let res = repo
            .update_role(UpdateUserRole::new(UserId::new(999), Role::Admin, ADMIN))
            .await;
        assert!(matches!(res, Err(AppError::EntityNotFound(_))));
        Ok(())
    }
}
