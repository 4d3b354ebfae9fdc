use crate::model::id::ProductId;
use derive_new::new;

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct CreateProduct {
    pub name: String,
    pub description: String,
    pub price: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct CreateKey {
    pub product_id: ProductId,
    pub credential: String,
}
