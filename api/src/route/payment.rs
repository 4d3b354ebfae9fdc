use axum::{
    routing::{get, post, put},
    Router,
};
use registry::AppRegistry;

use crate::handler::payment::{
    approve_payment, attach_receipt, create_payment, reject_payment, show_my_payments,
    show_pending_payments,
};

pub fn build_payment_routers() -> Router<AppRegistry> {
    let payments_routers = Router::new()
        .route("/", post(create_payment))
        .route("/", get(show_my_payments))
        .route("/:payment_id/receipt", put(attach_receipt));

    let admin_routers = Router::new()
        .route("/pending", get(show_pending_payments))
        .route("/:payment_id/approve", put(approve_payment))
        .route("/:payment_id/reject", put(reject_payment));

    Router::new()
        .nest("/payments", payments_routers)
        .nest("/admin/payments", admin_routers)
}
