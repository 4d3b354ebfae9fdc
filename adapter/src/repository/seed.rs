use crate::database::ConnectionPool;
use async_trait::async_trait;
use derive_new::new;
use kernel::model::product::event::{CreateKey, CreateProduct};
use kernel::repository::seed::SeedRepository;
use shared::error::{AppError, AppResult};

#[derive(new)]
pub struct SeedRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl SeedRepository for SeedRepositoryImpl {
    async fn load_products(&self, products: Vec<CreateProduct>) -> AppResult<u64> {
        let mut tx = self.db.begin().await?;
        let mut inserted = 0;
        for product in products {
            let res = sqlx::query(
                r#"
                    INSERT INTO products (name, description, price)
                    VALUES ($1, $2, $3)
                    ON CONFLICT (name) DO NOTHING
                "#,
            )
            .bind(&product.name)
            .bind(&product.description)
            .bind(product.price)
            .execute(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;
            inserted += res.rows_affected();
        }
        tx.commit().await.map_err(AppError::TransactionError)?;

        tracing::info!(inserted, "products loaded");
        Ok(inserted)
    }

    async fn load_keys(&self, keys: Vec<CreateKey>) -> AppResult<u64> {
        let mut tx = self.db.begin().await?;
        let mut inserted = 0;
        for key in keys {
            // 存在しない商品を指すキーは外部キー制約で失敗し、全体がロールバックされる
            let res = sqlx::query(
                r#"
                    INSERT INTO keys (product_id, credential)
                    VALUES ($1, $2)
                    ON CONFLICT (credential) DO NOTHING
                "#,
            )
            .bind(key.product_id)
            .bind(&key.credential)
            .execute(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;
            inserted += res.rows_affected();
        }
        tx.commit().await.map_err(AppError::TransactionError)?;

        tracing::info!(inserted, "keys loaded");
        Ok(inserted)
    }
}
