use crate::model::id::{PaymentId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{
    config::PaymentConfig,
    error::{AppError, AppResult},
};
use strum::{AsRefStr, EnumIter, EnumString};

pub mod event;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Rejected,
}

impl PaymentStatus {
    // Paid と Rejected は終端状態で、そこから遷移しない
    pub fn is_terminal(self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payment {
    pub payment_id: PaymentId,
    pub user_id: UserId,
    pub amount: i64,
    pub order_label: String,
    pub details: String,
    pub status: PaymentStatus,
    pub receipt_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub decided_by: Option<UserId>,
    pub decided_at: Option<DateTime<Utc>>,
}

// 入金申請として受け付ける金額の範囲
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentPolicy {
    pub min_amount: i64,
    pub max_amount: i64,
}

impl PaymentPolicy {
    pub fn check(&self, amount: i64) -> AppResult<()> {
        if amount <= 0 || amount < self.min_amount || amount > self.max_amount {
            return Err(AppError::InvalidAmount(format!(
                "amount must be between {} and {}, got {}",
                self.min_amount, self.max_amount, amount
            )));
        }
        Ok(())
    }

    // チャットで送られてきた文字列を金額として解釈する
    pub fn parse(&self, text: &str) -> AppResult<i64> {
        let amount = text.trim().parse::<i64>().map_err(|_| {
            AppError::InvalidAmount(format!("\"{}\" is not a whole amount", text.trim()))
        })?;
        self.check(amount)?;
        Ok(amount)
    }
}

impl Default for PaymentPolicy {
    fn default() -> Self {
        PaymentConfig::default().into()
    }
}

impl From<PaymentConfig> for PaymentPolicy {
    fn from(value: PaymentConfig) -> Self {
        let PaymentConfig {
            min_amount,
            max_amount,
        } = value;
        Self {
            min_amount,
            max_amount,
        }
    }
}
