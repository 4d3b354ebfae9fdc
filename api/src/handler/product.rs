use crate::{
    extractor::AuthorizedUser,
    model::product::{KeysResponse, ProductResponse, ProductsResponse, PurchaseResponse},
};
use axum::{
    extract::{Path, State},
    Json,
};
use kernel::model::id::ProductId;
use registry::AppRegistry;
use shared::error::AppResult;

pub async fn show_product_list(
    _user: AuthorizedUser,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ProductsResponse>> {
    registry
        .catalog_repository()
        .list_products()
        .await
        .map(ProductsResponse::from)
        .map(Json)
}

pub async fn show_product(
    _user: AuthorizedUser,
    Path(product_id): Path<ProductId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ProductResponse>> {
    registry
        .catalog_repository()
        .find_product(product_id)
        .await
        .map(ProductResponse::from)
        .map(Json)
}

pub async fn purchase_product(
    user: AuthorizedUser,
    Path(product_id): Path<ProductId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<PurchaseResponse>> {
    let key = registry
        .inventory_repository()
        .allocate_key(product_id, user.id())
        .await?;

    // 購入自体は確定しているので、紹介ボーナスの判定に失敗しても購入は失敗させない
    let referral = match registry.referral_repository().evaluate(user.id()).await {
        Ok(outcome) => Some(outcome),
        Err(e) => {
            tracing::warn!(user_id = %user.id(), error = %e, "referral evaluation failed");
            None
        }
    };

    let balance = registry.ledger_repository().get_balance(user.id()).await?;
    Ok(Json(PurchaseResponse::new(key, balance, referral)))
}

pub async fn show_my_keys(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<KeysResponse>> {
    registry
        .inventory_repository()
        .find_keys_by_owner(user.id())
        .await
        .map(KeysResponse::from)
        .map(Json)
}
