use std::sync::Arc;

use axum::{
    extract::{ws::{WebSocket, WebSocketUpgrade}, Extension, Query},
    response::IntoResponse,
    routing::get,
    Router,
};
use futures_util::stream::StreamExt;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    chat::{Handler, WsOutbound},
    error::{unauthorized, AppResult},
    state::AppState,
    utils::jwt,
};

#[derive(Deserialize)]
struct WsQuery { token: Option<String> }

pub fn router() -> Router {
    Router::new().route("/ws", get(ws_handler))
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(q): Query<WsQuery>,
    Extension(st): Extension<AppState>,
) -> AppResult<impl IntoResponse> {
    let username = q.token
        .as_deref()
        .and_then(|t| jwt::verify(t, &st.config.jwt_secret))
        .ok_or_else(unauthorized)?;
    Ok(ws.on_upgrade(move |sock| user_ws(sock, username, st)))
}

/* ---------------- per connection ---------------- */
async fn user_ws(sock: WebSocket, username: String, st: AppState) {
    let (sink, stream) = sock.split();
    let handler = Handler {
        id: Uuid::new_v4(),
        username,
        registry: st.registry.clone(),
        queue: st.queue.clone(),
        idle_timeout: st.config.idle_timeout,
    };
    handler.run(Arc::new(WsOutbound::new(sink)), stream).await;
}
