use crate::{
    conversation::advance,
    extractor::AuthorizedUser,
    model::conversation::{ConversationEventRequest, ConversationResponse},
};
use axum::{extract::State, Json};
use garde::Validate;
use registry::AppRegistry;
use shared::error::AppResult;

pub async fn post_event(
    user: AuthorizedUser,
    State(registry): State<AppRegistry>,
    Json(req): Json<ConversationEventRequest>,
) -> AppResult<Json<ConversationResponse>> {
    req.validate(&())?;

    let sessions = registry.session_repository();
    let payments = registry.payment_repository();
    advance(
        sessions.as_ref(),
        payments.as_ref(),
        &registry.payment_policy(),
        user.id(),
        req.into(),
    )
    .await
    .map(ConversationResponse::from)
    .map(Json)
}
