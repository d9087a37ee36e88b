use axum::{routing::get, Extension, Json, Router};

use crate::{
    chat::{Message, MessageStore},
    error::AppResult,
    state::AppState,
};

pub fn router() -> Router {
    Router::new().route("/messages", get(list))
}

async fn list(Extension(st): Extension<AppState>) -> AppResult<Json<Vec<Message>>> {
    Ok(Json(st.store.list_all().await?))
}
