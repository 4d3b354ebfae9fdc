use chrono::{DateTime, Utc};
use garde::Validate;
use kernel::model::{
    id::{PaymentId, UserId},
    list::{ListOptions, PaginatedList},
    payment::{
        event::{AttachReceipt, CreatePayment},
        Payment, PaymentStatus,
    },
};
use serde::{Deserialize, Serialize};

const DEFAULT_PAGE_SIZE: i64 = 20;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    // 範囲のチェックは PaymentPolicy で行う
    #[garde(skip)]
    pub amount: i64,
    #[garde(length(min = 1, max = 255))]
    pub order_label: String,
    #[garde(length(max = 1024))]
    #[serde(default)]
    pub details: String,
}

impl CreatePaymentRequest {
    pub fn into_event(self, user_id: UserId) -> CreatePayment {
        let CreatePaymentRequest {
            amount,
            order_label,
            details,
        } = self;
        CreatePayment::new(user_id, amount, order_label, details)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentResponse {
    pub payment_id: PaymentId,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AttachReceiptRequest {
    #[garde(url)]
    pub receipt_url: String,
}

impl AttachReceiptRequest {
    pub fn into_event(self, payment_id: PaymentId) -> AttachReceipt {
        AttachReceipt::new(payment_id, self.receipt_url)
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PendingPaymentsQuery {
    #[garde(range(min = 1, max = 100))]
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    // 前のページのレスポンスの nextCursor
    #[garde(skip)]
    pub before: Option<PaymentId>,
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl From<PendingPaymentsQuery> for ListOptions {
    fn from(value: PendingPaymentsQuery) -> Self {
        let PendingPaymentsQuery { page_size, before } = value;
        ListOptions::new(page_size).before(before)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatusName {
    Pending,
    Paid,
    Rejected,
}

impl From<PaymentStatus> for PaymentStatusName {
    fn from(value: PaymentStatus) -> Self {
        match value {
            PaymentStatus::Pending => Self::Pending,
            PaymentStatus::Paid => Self::Paid,
            PaymentStatus::Rejected => Self::Rejected,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub payment_id: PaymentId,
    pub user_id: UserId,
    pub amount: i64,
    pub order_label: String,
    pub details: String,
    pub status: PaymentStatusName,
    pub receipt_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub decided_by: Option<UserId>,
    pub decided_at: Option<DateTime<Utc>>,
}

impl From<Payment> for PaymentResponse {
    fn from(value: Payment) -> Self {
        let Payment {
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
        Self {
            payment_id,
            user_id,
            amount,
            order_label,
            details,
            status: status.into(),
            receipt_url,
            created_at,
            decided_by,
            decided_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentsResponse {
    pub items: Vec<PaymentResponse>,
}

impl From<Vec<Payment>> for PaymentsResponse {
    fn from(value: Vec<Payment>) -> Self {
        Self {
            items: value.into_iter().map(PaymentResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedPaymentResponse {
    pub total: i64,
    pub page_size: i64,
    // 次のページを取得するときに before として渡す
    pub next_cursor: Option<PaymentId>,
    pub items: Vec<PaymentResponse>,
}

impl From<PaginatedList<Payment>> for PaginatedPaymentResponse {
    fn from(value: PaginatedList<Payment>) -> Self {
        let PaginatedList {
            total,
            page_size,
            next_cursor,
            items,
        } = value.map(PaymentResponse::from);
        Self {
            total,
            page_size,
            next_cursor,
            items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_query_defaults_to_first_page() {
        let query: PendingPaymentsQuery = serde_json::from_str("{}").unwrap();
        assert!(query.validate(&()).is_ok());
        let options = ListOptions::from(query);
        assert_eq!(options, ListOptions::new(20));

        let query: PendingPaymentsQuery =
            serde_json::from_str(r#"{"pageSize":2,"before":7}"#).unwrap();
        assert_eq!(
            ListOptions::from(query),
            ListOptions::new(2).before(Some(PaymentId::new(7)))
        );
    }

    #[test]
    fn oversized_pages_are_rejected() {
        let query: PendingPaymentsQuery =
            serde_json::from_str(r#"{"pageSize":500}"#).unwrap();
        assert!(query.validate(&()).is_err());
    }

    #[test]
    fn receipt_must_be_a_url() {
        let req = AttachReceiptRequest {
            receipt_url: "not a url".into(),
        };
        assert!(req.validate(&()).is_err());
        let req = AttachReceiptRequest {
            receipt_url: "https://files.example/receipts/42.png".into(),
        };
        assert!(req.validate(&()).is_ok());
    }
}
