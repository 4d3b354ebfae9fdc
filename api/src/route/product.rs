use axum::{
    routing::{get, post},
    Router,
};
use registry::AppRegistry;

use crate::handler::product::{purchase_product, show_my_keys, show_product, show_product_list};

pub fn build_product_routers() -> Router<AppRegistry> {
    let products_routers = Router::new()
        .route("/", get(show_product_list))
        .route("/:product_id", get(show_product))
        .route("/:product_id/purchase", post(purchase_product));

    Router::new()
        .nest("/products", products_routers)
        .route("/keys", get(show_my_keys))
}
