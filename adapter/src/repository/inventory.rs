use crate::database::{
    model::key::{AllocatedKeyRow, LockedKeyRow},
    ConnectionPool,
};
use async_trait::async_trait;
use derive_new::new;
use kernel::model::{
    id::{ProductId, UserId},
    key::AllocatedKey,
};
use kernel::repository::inventory::InventoryRepository;
use shared::error::{AppError, AppResult};
use sqlx::types::chrono::{DateTime, Utc};

#[derive(new)]
pub struct InventoryRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl InventoryRepository for InventoryRepositoryImpl {
    async fn allocate_key(
        &self,
        product_id: ProductId,
        user_id: UserId,
    ) -> AppResult<AllocatedKey> {
        let mut tx = self.db.begin().await?;

        // ① 商品の存在確認
        let product: Option<(String, i64)> =
            sqlx::query_as("SELECT name, price FROM products WHERE product_id = $1")
                .bind(product_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(AppError::SpecificOperationError)?;
        let Some((product_name, price)) = product else {
            return Err(AppError::EntityNotFound(format!(
                "product {product_id} not found"
            )));
        };

        // ② 未割り当てのキーを 1 つ押さえる
        // SKIP LOCKED なので、並行する購入処理が同じキーを選ぶことはなく、互いを待つこともない
        let key = sqlx::query_as::<_, LockedKeyRow>(
            r#"
                SELECT key_id, credential
                FROM keys
                WHERE product_id = $1 AND owner_id IS NULL
                ORDER BY key_id ASC
                LIMIT 1
                FOR UPDATE SKIP LOCKED
            "#,
        )
        .bind(product_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;
        let Some(key) = key else {
            return Err(AppError::NoInventory(format!(
                "no keys left for product {product_id}"
            )));
        };

        // ③ 購入者の行をロックして残高を確認する
        // ここで Err を返すとトランザクションは commit されずに drop され、②のキーは解放される
        let balance: Option<i64> =
            sqlx::query_scalar("SELECT balance FROM users WHERE user_id = $1 FOR UPDATE")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(AppError::SpecificOperationError)?;
        let Some(balance) = balance else {
            return Err(AppError::EntityNotFound(format!("user {user_id} not found")));
        };
        if balance < price {
            return Err(AppError::InsufficientBalance(format!(
                "balance {balance} is below the price {price}"
            )));
        }

        // ④ 残高を引く
        let res = sqlx::query(
            r#"
                UPDATE users
                SET balance = balance - $2
                WHERE user_id = $1 AND balance >= $2
            "#,
        )
        .bind(user_id)
        .bind(price)
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;
        if res.rows_affected() < 1 {
            return Err(AppError::InsufficientBalance(format!(
                "balance of user {user_id} is below the price {price}"
            )));
        }

        // ⑤ キーを購入者に割り当てる
        let allocated_at: Option<DateTime<Utc>> = sqlx::query_scalar(
            r#"
                UPDATE keys
                SET owner_id = $2, allocated_at = CURRENT_TIMESTAMP(3)
                WHERE key_id = $1 AND owner_id IS NULL
                RETURNING allocated_at
            "#,
        )
        .bind(key.key_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;
        let Some(allocated_at) = allocated_at else {
            return Err(AppError::NoRowsAffectedError(format!(
                "key {} could not be assigned",
                key.key_id
            )));
        };

        tx.commit().await.map_err(AppError::TransactionError)?;

        tracing::info!(
            product_id = %product_id,
            user_id = %user_id,
            key_id = %key.key_id,
            price,
            "key allocated"
        );

        Ok(AllocatedKey {
            key_id: key.key_id,
            product_id,
            product_name,
            credential: key.credential,
            owner_id: user_id,
            price,
            allocated_at,
        })
    }

    async fn find_keys_by_owner(&self, user_id: UserId) -> AppResult<Vec<AllocatedKey>> {
        sqlx::query_as::<_, AllocatedKeyRow>(
            r#"
                SELECT
                    k.key_id,
                    k.product_id,
                    p.name AS product_name,
                    k.credential,
                    k.owner_id,
                    p.price,
                    k.allocated_at
                FROM keys AS k
                INNER JOIN products AS p ON k.product_id = p.product_id
                WHERE k.owner_id = $1
                ORDER BY k.allocated_at DESC, k.key_id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.db.inner_ref())
        .await
        .map(|rows| rows.into_iter().map(AllocatedKey::from).collect())
        .map_err(AppError::SpecificOperationError)
    }

    async fn count_available(&self, product_id: ProductId) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM keys WHERE product_id = $1 AND owner_id IS NULL",
        )
        .bind(product_id)
        .fetch_one(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)
    }
}
