use axum::{routing::get, Router};

pub mod auth;
pub mod messages;
pub mod ws;

pub fn router() -> Router {
    Router::new()
        .route("/api", get(auth::list_users))
        .nest("/api", auth::router().merge(messages::router()))
        .merge(ws::router())
}
