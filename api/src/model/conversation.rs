use garde::Validate;
use kernel::model::{
    id::PaymentId,
    session::{SessionEvent, SessionReply, SessionState},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Validate)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ConversationEventRequest {
    BeginTopUp,
    Text {
        #[garde(length(max = 64))]
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    Attachment {
        #[garde(url)]
        receipt_url: String,
    },
    Cancel,
}

impl From<ConversationEventRequest> for SessionEvent {
    fn from(value: ConversationEventRequest) -> Self {
        match value {
            ConversationEventRequest::BeginTopUp => SessionEvent::BeginTopUp,
            ConversationEventRequest::Text { text } => SessionEvent::Text(text),
            ConversationEventRequest::Attachment { receipt_url } => {
                SessionEvent::Attachment(receipt_url)
            }
            ConversationEventRequest::Cancel => SessionEvent::Cancel,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SessionStateResponse {
    Idle,
    AwaitingAmount,
    #[serde(rename_all = "camelCase")]
    AwaitingAttachment { payment_id: PaymentId },
}

impl From<SessionState> for SessionStateResponse {
    fn from(value: SessionState) -> Self {
        match value {
            SessionState::Idle => Self::Idle,
            SessionState::AwaitingAmount => Self::AwaitingAmount,
            SessionState::AwaitingAttachment { payment_id } => {
                Self::AwaitingAttachment { payment_id }
            }
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SessionReplyResponse {
    #[serde(rename_all = "camelCase")]
    AskAmount { min_amount: i64, max_amount: i64 },
    InvalidAmount { reason: String },
    #[serde(rename_all = "camelCase")]
    AskReceipt { payment_id: PaymentId, amount: i64 },
    #[serde(rename_all = "camelCase")]
    ReceiptAccepted { payment_id: PaymentId },
    Cancelled,
    Unexpected,
}

impl From<SessionReply> for SessionReplyResponse {
    fn from(value: SessionReply) -> Self {
        match value {
            SessionReply::AskAmount {
                min_amount,
                max_amount,
            } => Self::AskAmount {
                min_amount,
                max_amount,
            },
            SessionReply::InvalidAmount { reason } => Self::InvalidAmount { reason },
            SessionReply::AskReceipt { payment_id, amount } => {
                Self::AskReceipt { payment_id, amount }
            }
            SessionReply::ReceiptAccepted { payment_id } => Self::ReceiptAccepted { payment_id },
            SessionReply::Cancelled => Self::Cancelled,
            SessionReply::Unexpected => Self::Unexpected,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationResponse {
    pub state: SessionStateResponse,
    pub reply: SessionReplyResponse,
}

impl From<(SessionState, SessionReply)> for ConversationResponse {
    fn from((state, reply): (SessionState, SessionReply)) -> Self {
        Self {
            state: state.into(),
            reply: reply.into(),
        }
    }
}
