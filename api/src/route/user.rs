use axum::{
    routing::{get, post, put},
    Router,
};
use registry::AppRegistry;

use crate::handler::user::{change_role, get_balance, get_current_user, register_user};

pub fn build_user_routers() -> Router<AppRegistry> {
    let users_routers = Router::new()
        .route("/", post(register_user))
        .route("/me", get(get_current_user))
        .route("/:user_id/role", put(change_role));

    Router::new()
        .nest("/users", users_routers)
        .route("/balance", get(get_balance))
}
