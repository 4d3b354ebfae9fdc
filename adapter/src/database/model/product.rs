use kernel::model::{id::ProductId, product::Product};

#[derive(sqlx::FromRow)]
pub struct ProductRow {
    pub product_id: ProductId,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub available: i64,
}

impl From<ProductRow> for Product {
    fn from(value: ProductRow) -> Self {
        let ProductRow {
            product_id,
            name,
            description,
            price,
            available,
        } = value;
        Product {
            product_id,
            name,
            description,
            price,
            available,
        }
    }
}
