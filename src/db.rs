//! SQLite pool and schema.
use std::str::FromStr;

use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};

const SCHEMA: [&str; 2] = [
    "CREATE TABLE IF NOT EXISTS users (
        id         INTEGER PRIMARY KEY,
        username   TEXT NOT NULL UNIQUE,
        password   TEXT NOT NULL,
        email      TEXT NOT NULL UNIQUE,
        created_on INTEGER NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS messages (
        id        INTEGER PRIMARY KEY,
        username  TEXT NOT NULL,
        message   TEXT NOT NULL,
        timestamp INTEGER NOT NULL
    )",
];

/// Open (creating if needed) the database at `url` and make sure the tables exist.
pub async fn connect(url: &str) -> Result<SqlitePool, sqlx::Error> {
    let opts = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
    let pool = SqlitePool::connect_with(opts).await?;
    prepare(&pool).await?;
    Ok(pool)
}

/// Private in-memory database. One connection, since every SQLite
/// `:memory:` connection is its own database.
pub async fn memory() -> Result<SqlitePool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;
    prepare(&pool).await?;
    Ok(pool)
}

pub async fn prepare(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for stmt in SCHEMA {
        sqlx::query(stmt).execute(pool).await?;
    }
    Ok(())
}
