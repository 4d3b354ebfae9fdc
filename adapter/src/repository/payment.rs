use crate::database::{
    model::payment::{parse_status, PaymentRow},
    ConnectionPool,
};
use async_trait::async_trait;
use derive_new::new;
use kernel::model::{
    id::{PaymentId, UserId},
    list::{ListOptions, PaginatedList},
    payment::{
        event::{AttachReceipt, CreatePayment, DecidePayment},
        Payment, PaymentPolicy, PaymentStatus,
    },
};
use crate::repository::ensure_admin;
use kernel::repository::payment::PaymentRepository;
use shared::error::{AppError, AppResult};

#[derive(new)]
pub struct PaymentRepositoryImpl {
    db: ConnectionPool,
    policy: PaymentPolicy,
}

#[async_trait]
impl PaymentRepository for PaymentRepositoryImpl {
    async fn create(&self, event: CreatePayment) -> AppResult<PaymentId> {
        self.policy.check(event.amount)?;

        // ユーザーが存在しなければ行は追加されない
        let payment_id: Option<PaymentId> = sqlx::query_scalar(
            r#"
                INSERT INTO payments (user_id, amount, order_label, details)
                SELECT $1, $2, $3, $4
                WHERE EXISTS (SELECT 1 FROM users WHERE user_id = $1)
                RETURNING payment_id
            "#,
        )
        .bind(event.user_id)
        .bind(event.amount)
        .bind(&event.order_label)
        .bind(&event.details)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        let payment_id = payment_id
            .ok_or_else(|| AppError::EntityNotFound(format!("user {} not found", event.user_id)))?;

        tracing::info!(
            payment_id = %payment_id,
            user_id = %event.user_id,
            amount = event.amount,
            "payment created"
        );
        Ok(payment_id)
    }

    async fn attach_receipt(&self, event: AttachReceipt) -> AppResult<()> {
        let updated: Option<PaymentId> = sqlx::query_scalar(
            r#"
                UPDATE payments
                SET receipt_url = $2
                WHERE payment_id = $1 AND status = 'pending'
                RETURNING payment_id
            "#,
        )
        .bind(event.payment_id)
        .bind(&event.receipt_url)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        if updated.is_none() {
            // 存在しないのか、すでに確定済みなのかを区別する
            let payment = self.find_by_id(event.payment_id).await?;
            return Err(already_finalized(&payment));
        }
        Ok(())
    }

    async fn approve(&self, event: DecidePayment) -> AppResult<Payment> {
        self.decide(event, PaymentStatus::Paid).await
    }

    async fn reject(&self, event: DecidePayment) -> AppResult<Payment> {
        self.decide(event, PaymentStatus::Rejected).await
    }

    async fn list_pending(&self, options: ListOptions) -> AppResult<PaginatedList<Payment>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM payments WHERE status = 'pending'")
            .fetch_one(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

        // 続きがあるかを知るために 1 件多く取る
        let mut rows = sqlx::query_as::<_, PaymentRow>(
            r#"
                SELECT
                    payment_id,
                    user_id,
                    amount,
                    order_label,
                    details,
                    status,
                    receipt_url,
                    created_at,
                    decided_by,
                    decided_at
                FROM payments
                WHERE status = 'pending'
                  AND ($1::BIGINT IS NULL OR payment_id < $1)
                ORDER BY payment_id DESC
                LIMIT $2
            "#,
        )
        .bind(options.before)
        .bind(options.limit() + 1)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        let has_more = rows.len() as i64 > options.limit();
        rows.truncate(options.limit() as usize);
        let next_cursor = if has_more {
            rows.last().map(|row| row.payment_id)
        } else {
            None
        };

        let items = rows
            .into_iter()
            .map(Payment::try_from)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(PaginatedList {
            total,
            page_size: options.page_size,
            next_cursor,
            items,
        })
    }

    async fn find_by_id(&self, payment_id: PaymentId) -> AppResult<Payment> {
        sqlx::query_as::<_, PaymentRow>(
            r#"
                SELECT
                    payment_id,
                    user_id,
                    amount,
                    order_label,
                    details,
                    status,
                    receipt_url,
                    created_at,
                    decided_by,
                    decided_at
                FROM payments
                WHERE payment_id = $1
            "#,
        )
        .bind(payment_id)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?
        .ok_or_else(|| AppError::EntityNotFound(format!("payment {payment_id} not found")))
        .and_then(Payment::try_from)
    }

    async fn find_by_user(&self, user_id: UserId) -> AppResult<Vec<Payment>> {
        sqlx::query_as::<_, PaymentRow>(
            r#"
                SELECT
                    payment_id,
                    user_id,
                    amount,
                    order_label,
                    details,
                    status,
                    receipt_url,
                    created_at,
                    decided_by,
                    decided_at
                FROM payments
                WHERE user_id = $1
                ORDER BY payment_id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?
        .into_iter()
        .map(Payment::try_from)
        .collect()
    }
}

impl PaymentRepositoryImpl {
    // approve, reject で共通の処理
    // 状態の確認・更新と残高への加算を 1 トランザクションで行うので、二重承認で二重に加算されることはない
    async fn decide(&self, event: DecidePayment, next: PaymentStatus) -> AppResult<Payment> {
        let mut tx = self.db.begin().await?;

        // ① 承認者が管理者かどうか
        ensure_admin(&mut *tx, event.decided_by).await?;

        // ② 入金申請の行をロックして状態を確認する
        let status: Option<String> =
            sqlx::query_scalar("SELECT status FROM payments WHERE payment_id = $1 FOR UPDATE")
                .bind(event.payment_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(AppError::SpecificOperationError)?;
        let Some(status) = status else {
            return Err(AppError::EntityNotFound(format!(
                "payment {} not found",
                event.payment_id
            )));
        };
        let current = parse_status(&status)?;
        if current.is_terminal() {
            return Err(AppError::AlreadyFinalized(format!(
                "payment {} is already {}",
                event.payment_id,
                current.as_ref()
            )));
        }

        // ③ 状態を更新する
        let row = sqlx::query_as::<_, PaymentRow>(
            r#"
                UPDATE payments
                SET status = $2, decided_by = $3, decided_at = CURRENT_TIMESTAMP(3)
                WHERE payment_id = $1 AND status = 'pending'
                RETURNING
                    payment_id,
                    user_id,
                    amount,
                    order_label,
                    details,
                    status,
                    receipt_url,
                    created_at,
                    decided_by,
                    decided_at
            "#,
        )
        .bind(event.payment_id)
        .bind(next.as_ref())
        .bind(event.decided_by)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?
        .ok_or_else(|| {
            AppError::NoRowsAffectedError(format!("payment {} was not updated", event.payment_id))
        })?;
        let payment = Payment::try_from(row)?;

        // ④ 承認なら残高に加算する
        if next == PaymentStatus::Paid {
            let res = sqlx::query("UPDATE users SET balance = balance + $2 WHERE user_id = $1")
                .bind(payment.user_id)
                .bind(payment.amount)
                .execute(&mut *tx)
                .await
                .map_err(AppError::SpecificOperationError)?;
            if res.rows_affected() < 1 {
                return Err(AppError::NoRowsAffectedError(format!(
                    "balance of user {} was not credited",
                    payment.user_id
                )));
            }
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        tracing::info!(
            payment_id = %payment.payment_id,
            decided_by = %event.decided_by,
            status = payment.status.as_ref(),
            amount = payment.amount,
            "payment decided"
        );
        Ok(payment)
    }
}

fn already_finalized(payment: &Payment) -> AppError {
    AppError::AlreadyFinalized(format!(
        "payment {} is already {}",
        payment.payment_id,
        payment.status.as_ref()
    ))
}
