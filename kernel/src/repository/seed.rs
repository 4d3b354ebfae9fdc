use crate::model::product::event::{CreateKey, CreateProduct};
use async_trait::async_trait;
use shared::error::AppResult;

// 既に存在する商品名・キーは無視し、実際に追加した件数を返す
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait SeedRepository: Send + Sync {
    async fn load_products(&self, products: Vec<CreateProduct>) -> AppResult<u64>;
    async fn load_keys(&self, keys: Vec<CreateKey>) -> AppResult<u64>;
}
