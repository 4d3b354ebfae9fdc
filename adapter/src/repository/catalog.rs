use crate::database::{model::product::ProductRow, ConnectionPool};
use async_trait::async_trait;
use derive_new::new;
use kernel::model::{id::ProductId, product::Product};
use kernel::repository::catalog::CatalogRepository;
use shared::error::{AppError, AppResult};

#[derive(new)]
pub struct CatalogRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl CatalogRepository for CatalogRepositoryImpl {
    async fn list_products(&self) -> AppResult<Vec<Product>> {
        // 在庫数は未割り当てのキーを数えて出す
        sqlx::query_as::<_, ProductRow>(
            r#"
                SELECT
                    p.product_id,
                    p.name,
                    p.description,
                    p.price,
                    COUNT(k.key_id) AS available
                FROM products AS p
                LEFT JOIN keys AS k
                    ON k.product_id = p.product_id AND k.owner_id IS NULL
                GROUP BY p.product_id
                ORDER BY p.product_id ASC
            "#,
        )
        .fetch_all(self.db.inner_ref())
        .await
        .map(|rows| rows.into_iter().map(Product::from).collect())
        .map_err(AppError::SpecificOperationError)
    }

    async fn find_product(&self, product_id: ProductId) -> AppResult<Product> {
        sqlx::query_as::<_, ProductRow>(
            r#"
                SELECT
                    p.product_id,
                    p.name,
                    p.description,
                    p.price,
                    COUNT(k.key_id) AS available
                FROM products AS p
                LEFT JOIN keys AS k
                    ON k.product_id = p.product_id AND k.owner_id IS NULL
                WHERE p.product_id = $1
                GROUP BY p.product_id
            "#,
        )
        .bind(product_id)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?
        .map(Product::from)
        .ok_or_else(|| AppError::EntityNotFound(format!("product {product_id} not found")))
    }
}
