use crate::model::{
    id::{PaymentId, UserId},
    list::{ListOptions, PaginatedList},
    payment::{
        event::{AttachReceipt, CreatePayment, DecidePayment},
        Payment,
    },
};
use async_trait::async_trait;
use shared::error::AppResult;

#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn create(&self, event: CreatePayment) -> AppResult<PaymentId>;
    // Pending の間だけ受け付ける
    async fn attach_receipt(&self, event: AttachReceipt) -> AppResult<()>;
    // Pending -> Paid と残高への加算を 1 トランザクションで行う
    async fn approve(&self, event: DecidePayment) -> AppResult<Payment>;
    async fn reject(&self, event: DecidePayment) -> AppResult<Payment>;
    // 新しい順
    async fn list_pending(&self, options: ListOptions) -> AppResult<PaginatedList<Payment>>;
    async fn find_by_id(&self, payment_id: PaymentId) -> AppResult<Payment>;
    async fn find_by_user(&self, user_id: UserId) -> AppResult<Vec<Payment>>;
}
