use crate::{
    extractor::AuthorizedUser,
    model::user::{
        BalanceResponse, RegisterUserRequest, RegisterUserResponse, UpdateUserRoleRequest,
        UserResponse,
    },
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use garde::Validate;
use kernel::model::{id::UserId, user::event::UpdateUserRole};
use registry::AppRegistry;
use shared::error::AppResult;

// 登録はフロントエンドが最初のメッセージを受け取った時点で呼ぶので、認証ヘッダーは不要
pub async fn register_user(
    State(registry): State<AppRegistry>,
    Json(req): Json<RegisterUserRequest>,
) -> AppResult<(StatusCode, Json<RegisterUserResponse>)> {
    req.validate(&())?;

    let registration = registry.user_repository().register(req.into()).await?;
    let status = if registration.is_new() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(registration.into())))
}

pub async fn get_current_user(user: AuthorizedUser) -> Json<UserResponse> {
    Json(UserResponse::from(user.user))
}

pub async fn get_balance(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<BalanceResponse>> {
    let balance = registry.ledger_repository().get_balance(user.id()).await?;
    Ok(Json(BalanceResponse {
        user_id: user.id(),
        balance,
    }))
}

pub async fn change_role(
    user: AuthorizedUser,
    Path(user_id): Path<UserId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<UpdateUserRoleRequest>,
) -> AppResult<StatusCode> {
    registry
        .user_repository()
        .update_role(UpdateUserRole::new(user_id, req.role.into(), user.id()))
        .await
        .map(|_| StatusCode::OK)
}
