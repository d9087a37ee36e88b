//! routes/auth.rs
use axum::{
    extract::{rejection::JsonRejection, Extension, Json},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{bad, unauthorized, AppErr, AppResult},
    state::AppState,
    utils::jwt,
};

const NAME_TAKEN: &str  = "Username not available.";
const EMAIL_TAKEN: &str = "An account has already been registered with the email entered.";

#[derive(Deserialize)]
struct RegisterInput {
    #[serde(rename = "Username")]
    username: String,
    #[serde(rename = "Password")]
    password: String,
    #[serde(rename = "Email", default)]
    email: String,
}

#[derive(Deserialize)]
struct LoginInput {
    #[serde(rename = "Username", default)]
    username: Option<String>,
    #[serde(rename = "Email", default)]
    email: Option<String>,
    #[serde(rename = "Password")]
    password: String,
}

#[derive(Serialize)]
struct TokenJson {
    token: String,
    username: String,
}

#[derive(Serialize, sqlx::FromRow)]
pub struct UserJson {
    #[serde(rename = "Username")]
    username: String,
    #[serde(rename = "Email")]
    email: String,
}

pub fn router() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/* ---------------- Users ---------------- */
pub async fn list_users(Extension(st): Extension<AppState>) -> AppResult<Json<Vec<UserJson>>> {
    let users = sqlx::query_as("SELECT username, email FROM users ORDER BY id")
        .fetch_all(&st.pool)
        .await?;
    Ok(Json(users))
}

/* ---------------- Register ---------------- */
async fn register(
    Extension(st): Extension<AppState>,
    payload: Result<Json<RegisterInput>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(p) = payload.map_err(bad)?;
    if p.username.trim().is_empty() || p.password.is_empty() {
        return Err(bad("username and password are required"));
    }

    let taken: Option<(String, String)> =
        sqlx::query_as("SELECT username, email FROM users WHERE username = ? OR email = ? LIMIT 1")
            .bind(&p.username)
            .bind(&p.email)
            .fetch_optional(&st.pool)
            .await?;
    if let Some((name, _)) = taken.as_ref() {
        let msg = if *name == p.username { NAME_TAKEN } else { EMAIL_TAKEN };
        return Err(AppErr::Conflict(msg.into()));
    }

    let (password, cost) = (p.password, st.config.bcrypt_cost);
    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;

    sqlx::query("INSERT INTO users (username, password, email, created_on) VALUES (?,?,?,?)")
        .bind(&p.username)
        .bind(&hash)
        .bind(&p.email)
        .bind(chrono::Utc::now().timestamp())
        .execute(&st.pool)
        .await
        .map_err(unique_conflict)?;

    tracing::info!(username = %p.username, "user registered");
    Ok(StatusCode::CREATED)
}

/// A concurrent registration got the row in first; SQLite names the
/// column in the constraint message.
fn unique_conflict(e: sqlx::Error) -> AppErr {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            let msg = if db.message().contains("users.email") { EMAIL_TAKEN } else { NAME_TAKEN };
            AppErr::Conflict(msg.into())
        }
        _ => e.into(),
    }
}

/* ---------------- Login ---------------- */
async fn login(
    Extension(st): Extension<AppState>,
    payload: Result<Json<LoginInput>, JsonRejection>,
) -> AppResult<Json<TokenJson>> {
    let Json(p) = payload.map_err(|_| unauthorized())?;

    let rows: Vec<(String, String)> =
        sqlx::query_as("SELECT username, password FROM users WHERE username = ? OR email = ?")
            .bind(&p.username)
            .bind(&p.email)
            .fetch_all(&st.pool)
            .await?;

    for (username, hash) in rows {
        let plain = p.password.clone();
        let ok = tokio::task::spawn_blocking(move || bcrypt::verify(plain, &hash).unwrap_or(false)).await?;
        if ok {
            let token = jwt::sign(&username, &st.config.jwt_secret, st.config.token_ttl)?;
            return Ok(Json(TokenJson { token, username }));
        }
    }
    Err(unauthorized())
}
