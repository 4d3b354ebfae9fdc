use crate::database::{
    model::session::{to_columns, SessionRow},
    ConnectionPool,
};
use async_trait::async_trait;
use derive_new::new;
use kernel::model::{id::UserId, session::SessionState};
use kernel::repository::session::SessionRepository;
use shared::error::{AppError, AppResult};

#[derive(new)]
pub struct SessionRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl SessionRepository for SessionRepositoryImpl {
    async fn load(&self, user_id: UserId) -> AppResult<SessionState> {
        sqlx::query_as::<_, SessionRow>("SELECT state, payment_id FROM sessions WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?
            .map(SessionState::try_from)
            .unwrap_or(Ok(SessionState::Idle))
    }

    async fn store(&self, user_id: UserId, state: SessionState) -> AppResult<()> {
        let (state, payment_id) = to_columns(state);
        sqlx::query(
            r#"
                INSERT INTO sessions (user_id, state, payment_id)
                VALUES ($1, $2, $3)
                ON CONFLICT (user_id) DO UPDATE
                SET state = EXCLUDED.state,
                    payment_id = EXCLUDED.payment_id,
                    updated_at = CURRENT_TIMESTAMP(3)
            "#,
        )
        .bind(user_id)
        .bind(state)
        .bind(payment_id)
        .execute(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;
        Ok(())
    }

    async fn transition(
        &self,
        user_id: UserId,
        from: SessionState,
        to: SessionState,
    ) -> AppResult<bool> {
        let (from_state, from_payment_id) = to_columns(from);
        let (to_state, to_payment_id) = to_columns(to);

        // 行がないのは Idle と同じなので、Idle からの遷移だけは行の追加も受け付ける
        let res = if from == SessionState::Idle {
            sqlx::query(
                r#"
                    INSERT INTO sessions (user_id, state, payment_id)
                    VALUES ($1, $2, $3)
                    ON CONFLICT (user_id) DO UPDATE
                    SET state = EXCLUDED.state,
                        payment_id = EXCLUDED.payment_id,
                        updated_at = CURRENT_TIMESTAMP(3)
                    WHERE sessions.state = 'idle'
                "#,
            )
            .bind(user_id)
            .bind(to_state)
            .bind(to_payment_id)
            .execute(self.db.inner_ref())
            .await
        } else {
            sqlx::query(
                r#"
                    UPDATE sessions
                    SET state = $2,
                        payment_id = $3,
                        updated_at = CURRENT_TIMESTAMP(3)
                    WHERE user_id = $1
                      AND state = $4
                      AND payment_id IS NOT DISTINCT FROM $5
                "#,
            )
            .bind(user_id)
            .bind(to_state)
            .bind(to_payment_id)
            .bind(from_state)
            .bind(from_payment_id)
            .execute(self.db.inner_ref())
            .await
        }
        .map_err(AppError::SpecificOperationError)?;

        Ok(res.rows_affected() == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::payment::PaymentRepositoryImpl;
    use kernel::model::payment::{event::CreatePayment, PaymentPolicy};
    use kernel::repository::payment::PaymentRepository;

    const REFERRER: UserId = UserId::new(2);
    const BUYER: UserId = UserId::new(3);

    #[sqlx::test(fixtures("common"))]
    async fn test_sessions_are_per_user(pool: sqlx::PgPool) -> anyhow::Result<()> {
        let db = ConnectionPool::new(pool);
        let repo = SessionRepositoryImpl::new(db.clone());
        let payments = PaymentRepositoryImpl::new(db, PaymentPolicy::default());

        assert_eq!(repo.load(BUYER).await?, SessionState::Idle);

        repo.store(BUYER, SessionState::AwaitingAmount).await?;
        assert_eq!(repo.load(BUYER).await?, SessionState::AwaitingAmount);
        assert_eq!(repo.load(REFERRER).await?, SessionState::Idle);

        let payment_id = payments
            .create(CreatePayment::new(BUYER, 700, "Top-up".into(), String::new()))
            .await?;
        let waiting = SessionState::AwaitingAttachment { payment_id };
        repo.store(BUYER, waiting).await?;
        assert_eq!(repo.load(BUYER).await?, waiting);

        repo.store(BUYER, SessionState::Idle).await?;
        assert_eq!(repo.load(BUYER).await?, SessionState::Idle);
        Ok(())
    }

    #[sqlx::test(fixtures("common"))]
    async fn test_transition_applies_only_from_the_expected_state(
        pool: sqlx::PgPool,
    ) -> anyhow::Result<()> {
        let repo = SessionRepositoryImpl::new(ConnectionPool::new(pool));

        // 行がなくても Idle からは遷移できる
        assert!(
            repo.transition(BUYER, SessionState::Idle, SessionState::AwaitingAmount)
                .await?
        );
        assert!(
            !repo
                .transition(BUYER, SessionState::Idle, SessionState::AwaitingAmount)
                .await?
        );
        assert!(
            !repo
                .transition(REFERRER, SessionState::AwaitingAmount, SessionState::Idle)
                .await?
        );
        assert_eq!(repo.load(REFERRER).await?, SessionState::Idle);

        assert!(
            repo.transition(BUYER, SessionState::AwaitingAmount, SessionState::Idle)
                .await?
        );
        assert_eq!(repo.load(BUYER).await?, SessionState::Idle);
        Ok(())
    }

    #[sqlx::test(fixtures("common"))]
    async fn test_concurrent_transitions_have_one_winner(
        pool: sqlx::PgPool,
    ) -> anyhow::Result<()> {
        let repo = std::sync::Arc::new(SessionRepositoryImpl::new(ConnectionPool::new(pool)));
        repo.store(BUYER, SessionState::AwaitingAmount).await?;

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..5 {
            let repo = repo.clone();
            tasks.spawn(async move {
                repo.transition(BUYER, SessionState::AwaitingAmount, SessionState::Idle)
                    .await
            });
        }
        let mut won = 0;
        while let Some(res) = tasks.join_next().await {
            if res?? {
                won += 1;
            }
        }
        assert_eq!(won, 1);
        Ok(())
    }
}
