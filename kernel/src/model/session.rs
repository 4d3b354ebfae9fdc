use crate::model::{id::PaymentId, payment::PaymentPolicy};

// ユーザーごとの会話状態。ハンドラの中でハンドラを登録する代わりに、
// 受け取ったイベントごとにこの状態を進める
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    AwaitingAmount,
    AwaitingAttachment { payment_id: PaymentId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    BeginTopUp,
    Text(String),
    Attachment(String),
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionReply {
    AskAmount { min_amount: i64, max_amount: i64 },
    InvalidAmount { reason: String },
    AskReceipt { payment_id: PaymentId, amount: i64 },
    ReceiptAccepted { payment_id: PaymentId },
    Cancelled,
    Unexpected,
}

// 副作用を伴う遷移は呼び出し側が実行し、その結果で次の状態を決める
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStep {
    Move(SessionState, SessionReply),
    CreatePayment { amount: i64 },
    AttachReceipt { payment_id: PaymentId, receipt_url: String },
}

impl SessionState {
    pub fn on(self, event: SessionEvent, policy: &PaymentPolicy) -> SessionStep {
        match (self, event) {
            (_, SessionEvent::Cancel) => {
                SessionStep::Move(SessionState::Idle, SessionReply::Cancelled)
            }
            (SessionState::Idle, SessionEvent::BeginTopUp) => SessionStep::Move(
                SessionState::AwaitingAmount,
                SessionReply::AskAmount {
                    min_amount: policy.min_amount,
                    max_amount: policy.max_amount,
                },
            ),
            (SessionState::AwaitingAmount, SessionEvent::Text(text)) => {
                match policy.parse(&text) {
                    Ok(amount) => SessionStep::CreatePayment { amount },
                    Err(e) => SessionStep::Move(
                        SessionState::AwaitingAmount,
                        SessionReply::InvalidAmount {
                            reason: e.to_string(),
                        },
                    ),
                }
            }
            (SessionState::AwaitingAttachment { payment_id }, SessionEvent::Attachment(url)) => {
                SessionStep::AttachReceipt {
                    payment_id,
                    receipt_url: url,
                }
            }
            (state, _) => SessionStep::Move(state, SessionReply::Unexpected),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn policy() -> PaymentPolicy {
        PaymentPolicy::default()
    }

    #[test]
    fn top_up_walks_through_amount_and_receipt() {
        let step = SessionState::Idle.on(SessionEvent::BeginTopUp, &policy());
        let SessionStep::Move(state, SessionReply::AskAmount { .. }) = step else {
            panic!("unexpected step: {step:?}");
        };
        assert_eq!(state, SessionState::AwaitingAmount);

        let step = state.on(SessionEvent::Text("500".into()), &policy());
        assert_eq!(step, SessionStep::CreatePayment { amount: 500 });

        let waiting = SessionState::AwaitingAttachment {
            payment_id: PaymentId::new(7),
        };
        let step = waiting.on(
            SessionEvent::Attachment("https://files.example/r.png".into()),
            &policy(),
        );
        assert_eq!(
            step,
            SessionStep::AttachReceipt {
                payment_id: PaymentId::new(7),
                receipt_url: "https://files.example/r.png".into(),
            }
        );
    }

    #[test]
    fn bad_amount_keeps_waiting() {
        let step = SessionState::AwaitingAmount.on(SessionEvent::Text("lots".into()), &policy());
        assert!(matches!(
            step,
            SessionStep::Move(SessionState::AwaitingAmount, SessionReply::InvalidAmount { .. })
        ));
    }

    #[rstest]
    #[case(SessionState::Idle)]
    #[case(SessionState::AwaitingAmount)]
    #[case(SessionState::AwaitingAttachment { payment_id: PaymentId::new(1) })]
    fn cancel_always_returns_to_idle(#[case] state: SessionState) {
        assert_eq!(
            state.on(SessionEvent::Cancel, &policy()),
            SessionStep::Move(SessionState::Idle, SessionReply::Cancelled)
        );
    }

    #[rstest]
    #[case(SessionState::Idle, SessionEvent::Text("500".into()))]
    #[case(SessionState::Idle, SessionEvent::Attachment("https://x".into()))]
    #[case(SessionState::AwaitingAmount, SessionEvent::Attachment("https://x".into()))]
    #[case(SessionState::AwaitingAttachment { payment_id: PaymentId::new(1) }, SessionEvent::BeginTopUp)]
    fn out_of_order_events_leave_state_alone(
        #[case] state: SessionState,
        #[case] event: SessionEvent,
    ) {
        assert_eq!(
            state.on(event, &policy()),
            SessionStep::Move(state, SessionReply::Unexpected)
        );
    }
}
