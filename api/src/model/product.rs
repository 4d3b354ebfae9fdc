use chrono::{DateTime, Utc};
use kernel::model::{
    id::{KeyId, ProductId, UserId},
    key::AllocatedKey,
    product::Product,
    referral::ReferralOutcome,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub available: i64,
}

impl From<Product> for ProductResponse {
    fn from(value: Product) -> Self {
        let Product {
            product_id,
            name,
            description,
            price,
            available,
        } = value;
        Self {
            id: product_id,
            name,
            description,
            price,
            available,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductsResponse {
    pub items: Vec<ProductResponse>,
}

impl From<Vec<Product>> for ProductsResponse {
    fn from(value: Vec<Product>) -> Self {
        Self {
            items: value.into_iter().map(ProductResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyResponse {
    pub key_id: KeyId,
    pub product_id: ProductId,
    pub product_name: String,
    pub credential: String,
    pub price: i64,
    pub allocated_at: DateTime<Utc>,
}

impl From<AllocatedKey> for KeyResponse {
    fn from(value: AllocatedKey) -> Self {
        let AllocatedKey {
            key_id,
            product_id,
            product_name,
            credential,
            price,
            allocated_at,
            ..
        } = value;
        Self {
            key_id,
            product_id,
            product_name,
            credential,
            price,
            allocated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeysResponse {
    pub items: Vec<KeyResponse>,
}

impl From<Vec<AllocatedKey>> for KeysResponse {
    fn from(value: Vec<AllocatedKey>) -> Self {
        Self {
            items: value.into_iter().map(KeyResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralBonusResponse {
    pub referrer_id: UserId,
    pub amount: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseResponse {
    pub key: KeyResponse,
    pub balance: i64,
    // この購入で紹介者にボーナスが付与された場合のみ
    pub referral_bonus: Option<ReferralBonusResponse>,
}

impl PurchaseResponse {
    pub fn new(key: AllocatedKey, balance: i64, referral: Option<ReferralOutcome>) -> Self {
        let referral_bonus = match referral {
            Some(ReferralOutcome::Granted {
                referrer_id,
                amount,
            }) => Some(ReferralBonusResponse {
                referrer_id,
                amount,
            }),
            _ => None,
        };
        Self {
            key: key.into(),
            balance,
            referral_bonus,
        }
    }
}
