use axum::{routing::post, Router};
use registry::AppRegistry;

use crate::handler::conversation::post_event;

pub fn build_conversation_routers() -> Router<AppRegistry> {
    Router::new().route("/conversation/events", post(post_event))
}
