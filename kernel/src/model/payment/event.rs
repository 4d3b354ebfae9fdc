use crate::model::id::{PaymentId, UserId};
use derive_new::new;

#[derive(Debug, Clone, new)]
pub struct CreatePayment {
    pub user_id: UserId,
    pub amount: i64,
    pub order_label: String,
    pub details: String,
}

#[derive(Debug, Clone, new)]
pub struct AttachReceipt {
    pub payment_id: PaymentId,
    pub receipt_url: String,
}

// 承認・却下の両方で使う
#[derive(Debug, Clone, Copy, new)]
pub struct DecidePayment {
    pub payment_id: PaymentId,
    pub decided_by: UserId,
}
