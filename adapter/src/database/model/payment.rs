use kernel::model::{
    id::{PaymentId, UserId},
    payment::{Payment, PaymentStatus},
};
use shared::error::AppError;
use sqlx::types::chrono::{DateTime, Utc};
use std::str::FromStr;

#[derive(sqlx::FromRow)]
pub struct PaymentRow {
    pub payment_id: PaymentId,
    pub user_id: UserId,
    pub amount: i64,
    pub order_label: String,
    pub details: String,
    pub status: String,
    pub receipt_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub decided_by: Option<UserId>,
    pub decided_at: Option<DateTime<Utc>>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = AppError;

    fn try_from(value: PaymentRow) -> Result<Self, Self::Error> {
        let PaymentRow {
            payment_id,
            user_id,
            amount,
            order_label,
            details,
            status,
            receipt_url,
            created_at,
            decided_by,
            decided_at,
        } = value;
        Ok(Payment {
            payment_id,
            user_id,
            amount,
            order_label,
            details,
            status: parse_status(&status)?,
            receipt_url,
            created_at,
            decided_by,
            decided_at,
        })
    }
}

pub fn parse_status(status: &str) -> Result<PaymentStatus, AppError> {
    PaymentStatus::from_str(status)
        .map_err(|e| AppError::ConversionEntityError(format!("payment status {status}: {e}")))
}
