use crate::{
    extractor::AuthorizedUser,
    model::payment::{
        AttachReceiptRequest, CreatePaymentRequest, CreatePaymentResponse,
        PaginatedPaymentResponse, PaymentResponse, PaymentsResponse, PendingPaymentsQuery,
    },
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use garde::Validate;
use kernel::model::{id::PaymentId, payment::event::DecidePayment};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

pub async fn create_payment(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    Json(req): Json<CreatePaymentRequest>,
) -> AppResult<(StatusCode, Json<CreatePaymentResponse>)> {
    req.validate(&())?;

    let payment_id = registry
        .payment_repository()
        .create(req.into_event(user.id()))
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatePaymentResponse { payment_id }),
    ))
}

pub async fn show_my_payments(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<PaymentsResponse>> {
    registry
        .payment_repository()
        .find_by_user(user.id())
        .await
        .map(PaymentsResponse::from)
        .map(Json)
}

pub async fn attach_receipt(
    user: AuthorizedUser,
    Path(payment_id): Path<PaymentId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<AttachReceiptRequest>,
) -> AppResult<StatusCode> {
    req.validate(&())?;

    // 他人の申請は存在しないものとして扱う
    let payment = registry.payment_repository().find_by_id(payment_id).await?;
    if payment.user_id != user.id() {
        return Err(AppError::EntityNotFound(format!(
            "payment {payment_id} not found"
        )));
    }

    registry
        .payment_repository()
        .attach_receipt(req.into_event(payment_id))
        .await
        .map(|_| StatusCode::OK)
}

pub async fn show_pending_payments(
    user: AuthorizedUser,
    Query(query): Query<PendingPaymentsQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<PaginatedPaymentResponse>> {
    if !user.is_admin() {
        return Err(AppError::Unauthorized);
    }
    query.validate(&())?;

    registry
        .payment_repository()
        .list_pending(query.into())
        .await
        .map(PaginatedPaymentResponse::from)
        .map(Json)
}

pub async fn approve_payment(
    user: AuthorizedUser,
    Path(payment_id): Path<PaymentId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<PaymentResponse>> {
    registry
        .payment_repository()
        .approve(DecidePayment::new(payment_id, user.id()))
        .await
        .map(PaymentResponse::from)
        .map(Json)
}

pub async fn reject_payment(
    user: AuthorizedUser,
    Path(payment_id): Path<PaymentId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<PaymentResponse>> {
    registry
        .payment_repository()
        .reject(DecidePayment::new(payment_id, user.id()))
        .await
        .map(PaymentResponse::from)
        .map(Json)
}
