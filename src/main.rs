use chat_hub::{app, config::Config, db, error::AppErr, start};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppErr> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    let pool   = db::connect(&config.database_url).await?;
    let addr   = config.bind_addr.clone();
    let state  = start(pool, config);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "http server started");
    axum::serve(listener, app(state).into_make_service()).await?;
    Ok(())
}
