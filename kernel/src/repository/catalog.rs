use crate::model::{id::ProductId, product::Product};
use async_trait::async_trait;
use shared::error::AppResult;

#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    // product_id の昇順で商品一覧を返す
    async fn list_products(&self) -> AppResult<Vec<Product>>;
    async fn find_product(&self, product_id: ProductId) -> AppResult<Product>;
}
