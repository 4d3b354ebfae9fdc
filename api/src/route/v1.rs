use super::{
    conversation::build_conversation_routers, payment::build_payment_routers,
    product::build_product_routers, user::build_user_routers,
};
use axum::Router;
use registry::AppRegistry;

pub fn routes() -> Router<AppRegistry> {
    let router = Router::new()
        .merge(build_user_routers())
        .merge(build_product_routers())
        .merge(build_payment_routers())
        .merge(build_conversation_routers());
    Router::new().nest("/api/v1", router)
}
