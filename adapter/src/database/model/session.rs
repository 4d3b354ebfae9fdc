use kernel::model::{id::PaymentId, session::SessionState};
use shared::error::AppError;

#[derive(sqlx::FromRow)]
pub struct SessionRow {
    pub state: String,
    pub payment_id: Option<PaymentId>,
}

impl TryFrom<SessionRow> for SessionState {
    type Error = AppError;

    fn try_from(value: SessionRow) -> Result<Self, Self::Error> {
        match (value.state.as_str(), value.payment_id) {
            ("idle", _) => Ok(SessionState::Idle),
            ("awaiting_amount", _) => Ok(SessionState::AwaitingAmount),
            ("awaiting_attachment", Some(payment_id)) => {
                Ok(SessionState::AwaitingAttachment { payment_id })
            }
            (state, payment_id) => Err(AppError::ConversionEntityError(format!(
                "invalid session row: state={state}, payment_id={payment_id:?}"
            ))),
        }
    }
}

// 保存用に (state, payment_id) の列表現に分解する
pub fn to_columns(state: SessionState) -> (&'static str, Option<PaymentId>) {
    match state {
        SessionState::Idle => ("idle", None),
        SessionState::AwaitingAmount => ("awaiting_amount", None),
        SessionState::AwaitingAttachment { payment_id } => ("awaiting_attachment", Some(payment_id)),
    }
}
