use kernel::{
    model::{
        id::UserId,
        payment::{
            event::{AttachReceipt, CreatePayment},
            PaymentPolicy,
        },
        session::{SessionEvent, SessionReply, SessionState, SessionStep},
    },
    repository::{payment::PaymentRepository, session::SessionRepository},
};
use shared::error::{AppError, AppResult};

const TOP_UP_LABEL: &str = "balance top-up";

// 保存されている状態にイベントを適用し、副作用を実行してから次の状態を保存する。
// 状態の書き換えは読み込んだ状態からの条件付き遷移で行い、同じユーザーの
// イベントが同時に届いても副作用を実行するのは 1 つだけにする
pub async fn advance(
    sessions: &dyn SessionRepository,
    payments: &dyn PaymentRepository,
    policy: &PaymentPolicy,
    user_id: UserId,
    event: SessionEvent,
) -> AppResult<(SessionState, SessionReply)> {
    let current = sessions.load(user_id).await?;

    match current.on(event, policy) {
        SessionStep::Move(next, reply) => {
            if next != current && !sessions.transition(user_id, current, next).await? {
                return superseded(sessions, user_id).await;
            }
            Ok((next, reply))
        }
        SessionStep::CreatePayment { amount } => {
            // 金額の入力を先に確保してから申請を作る
            if !sessions
                .transition(user_id, current, SessionState::Idle)
                .await?
            {
                return superseded(sessions, user_id).await;
            }
            let payment_id = match payments
                .create(CreatePayment::new(
                    user_id,
                    amount,
                    TOP_UP_LABEL.into(),
                    String::new(),
                ))
                .await
            {
                Ok(payment_id) => payment_id,
                Err(e) => {
                    sessions
                        .transition(user_id, SessionState::Idle, current)
                        .await?;
                    return Err(e);
                }
            };
            let next = SessionState::AwaitingAttachment { payment_id };
            sessions.store(user_id, next).await?;
            Ok((next, SessionReply::AskReceipt { payment_id, amount }))
        }
        SessionStep::AttachReceipt {
            payment_id,
            receipt_url,
        } => {
            if !sessions
                .transition(user_id, current, SessionState::Idle)
                .await?
            {
                return superseded(sessions, user_id).await;
            }
            match payments
                .attach_receipt(AttachReceipt::new(payment_id, receipt_url))
                .await
            {
                Ok(()) => Ok((
                    SessionState::Idle,
                    SessionReply::ReceiptAccepted { payment_id },
                )),
                // 申請が既に処理済みか消えているので、待ち状態には戻さない
                Err(e @ (AppError::AlreadyFinalized(_) | AppError::EntityNotFound(_))) => Err(e),
                Err(e) => {
                    sessions
                        .transition(user_id, SessionState::Idle, current)
                        .await?;
                    Err(e)
                }
            }
        }
    }
}

// 同じユーザーの別のイベントが先に状態を変えていた
async fn superseded(
    sessions: &dyn SessionRepository,
    user_id: UserId,
) -> AppResult<(SessionState, SessionReply)> {
    let latest = sessions.load(user_id).await?;
    Ok((latest, SessionReply::Unexpected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::{
        model::id::PaymentId,
        repository::{payment::MockPaymentRepository, session::MockSessionRepository},
    };
    use mockall::{predicate::eq, Sequence};

    const USER: UserId = UserId::new(3);
    const WAITING: SessionState = SessionState::AwaitingAttachment {
        payment_id: PaymentId::new(4),
    };

    fn loads(state: SessionState) -> MockSessionRepository {
        let mut sessions = MockSessionRepository::new();
        sessions
            .expect_load()
            .with(eq(USER))
            .returning(move |_| Ok(state));
        sessions
    }

    #[tokio::test]
    async fn begin_top_up_asks_for_an_amount() -> anyhow::Result<()> {
        let mut sessions = loads(SessionState::Idle);
        sessions
            .expect_transition()
            .with(eq(USER), eq(SessionState::Idle), eq(SessionState::AwaitingAmount))
            .times(1)
            .returning(|_, _, _| Ok(true));
        let payments = MockPaymentRepository::new();

        let (state, reply) = advance(
            &sessions,
            &payments,
            &PaymentPolicy::default(),
            USER,
            SessionEvent::BeginTopUp,
        )
        .await?;

        assert_eq!(state, SessionState::AwaitingAmount);
        assert!(matches!(reply, SessionReply::AskAmount { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn amount_creates_a_pending_payment() -> anyhow::Result<()> {
        let mut sessions = loads(SessionState::AwaitingAmount);
        sessions
            .expect_transition()
            .with(eq(USER), eq(SessionState::AwaitingAmount), eq(SessionState::Idle))
            .times(1)
            .returning(|_, _, _| Ok(true));
        sessions
            .expect_store()
            .with(
                eq(USER),
                eq(SessionState::AwaitingAttachment {
                    payment_id: PaymentId::new(11),
                }),
            )
            .times(1)
            .returning(|_, _| Ok(()));

        let mut payments = MockPaymentRepository::new();
        payments
            .expect_create()
            .withf(|event| event.user_id == USER && event.amount == 500)
            .times(1)
            .returning(|_| Ok(PaymentId::new(11)));

        let (state, reply) = advance(
            &sessions,
            &payments,
            &PaymentPolicy::default(),
            USER,
            SessionEvent::Text("500".into()),
        )
        .await?;

        assert_eq!(
            state,
            SessionState::AwaitingAttachment {
                payment_id: PaymentId::new(11)
            }
        );
        assert_eq!(
            reply,
            SessionReply::AskReceipt {
                payment_id: PaymentId::new(11),
                amount: 500
            }
        );
        Ok(())
    }

    #[tokio::test]
    async fn amount_already_taken_creates_nothing() -> anyhow::Result<()> {
        // 同じユーザーの別のリクエストが先に金額を受け付けて申請を作った
        let mut seq = Sequence::new();
        let mut sessions = MockSessionRepository::new();
        sessions
            .expect_load()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(SessionState::AwaitingAmount));
        sessions
            .expect_transition()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(false));
        sessions
            .expect_load()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(WAITING));
        sessions.expect_store().never();
        let mut payments = MockPaymentRepository::new();
        payments.expect_create().never();

        let (state, reply) = advance(
            &sessions,
            &payments,
            &PaymentPolicy::default(),
            USER,
            SessionEvent::Text("500".into()),
        )
        .await?;

        assert_eq!(state, WAITING);
        assert_eq!(reply, SessionReply::Unexpected);
        Ok(())
    }

    #[tokio::test]
    async fn invalid_amount_does_not_touch_payments() -> anyhow::Result<()> {
        let mut sessions = loads(SessionState::AwaitingAmount);
        sessions.expect_transition().never();
        sessions.expect_store().never();
        let mut payments = MockPaymentRepository::new();
        payments.expect_create().never();

        let (state, reply) = advance(
            &sessions,
            &payments,
            &PaymentPolicy::default(),
            USER,
            SessionEvent::Text("10".into()),
        )
        .await?;

        assert_eq!(state, SessionState::AwaitingAmount);
        assert!(matches!(reply, SessionReply::InvalidAmount { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn receipt_returns_to_idle() -> anyhow::Result<()> {
        let mut sessions = loads(WAITING);
        sessions
            .expect_transition()
            .with(eq(USER), eq(WAITING), eq(SessionState::Idle))
            .times(1)
            .returning(|_, _, _| Ok(true));
        sessions.expect_store().never();
        let mut payments = MockPaymentRepository::new();
        payments
            .expect_attach_receipt()
            .withf(|event| {
                event.payment_id == PaymentId::new(4)
                    && event.receipt_url == "https://files.example/r.png"
            })
            .times(1)
            .returning(|_| Ok(()));

        let (state, reply) = advance(
            &sessions,
            &payments,
            &PaymentPolicy::default(),
            USER,
            SessionEvent::Attachment("https://files.example/r.png".into()),
        )
        .await?;

        assert_eq!(state, SessionState::Idle);
        assert_eq!(
            reply,
            SessionReply::ReceiptAccepted {
                payment_id: PaymentId::new(4)
            }
        );
        Ok(())
    }

    #[tokio::test]
    async fn finalized_payment_resets_the_session() {
        let mut sessions = loads(WAITING);
        sessions
            .expect_transition()
            .with(eq(USER), eq(WAITING), eq(SessionState::Idle))
            .times(1)
            .returning(|_, _, _| Ok(true));
        let mut payments = MockPaymentRepository::new();
        payments
            .expect_attach_receipt()
            .returning(|_| Err(AppError::AlreadyFinalized("payment 4".into())));

        let res = advance(
            &sessions,
            &payments,
            &PaymentPolicy::default(),
            USER,
            SessionEvent::Attachment("https://files.example/r.png".into()),
        )
        .await;

        assert!(matches!(res, Err(AppError::AlreadyFinalized(_))));
    }

    #[tokio::test]
    async fn failed_creation_restores_the_amount_prompt() {
        let mut sessions = loads(SessionState::AwaitingAmount);
        sessions
            .expect_transition()
            .with(eq(USER), eq(SessionState::AwaitingAmount), eq(SessionState::Idle))
            .times(1)
            .returning(|_, _, _| Ok(true));
        sessions
            .expect_transition()
            .with(eq(USER), eq(SessionState::Idle), eq(SessionState::AwaitingAmount))
            .times(1)
            .returning(|_, _, _| Ok(true));
        sessions.expect_store().never();
        let mut payments = MockPaymentRepository::new();
        payments
            .expect_create()
            .returning(|_| Err(AppError::EntityNotFound("user 3".into())));

        let res = advance(
            &sessions,
            &payments,
            &PaymentPolicy::default(),
            USER,
            SessionEvent::Text("500".into()),
        )
        .await;

        assert!(matches!(res, Err(AppError::EntityNotFound(_))));
    }
}
