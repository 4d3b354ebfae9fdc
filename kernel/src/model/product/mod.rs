use crate::model::id::ProductId;

pub mod event;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub product_id: ProductId,
    pub name: String,
    pub description: String,
    pub price: i64,
    // 未割り当てのキーの数
    pub available: i64,
}

impl Product {
    pub fn is_sold_out(&self) -> bool {
        self.available == 0
    }
}
