use std::sync::Arc;

use backend::{
    cache::TtlCache,
    catalog::CharityCatalog,
    catchers::{bad_gateway, bad_request, internal_error, not_found, unauthorized},
    config::AppConfig,
    cors::CORS,
    credentials::CredentialCache,
    facebook::FacebookClient,
    force::ForceClient,
    routes::{
        all_options, cast_vote, charity_votes, facebook_callback, facebook_login,
        flush_charity_cache, index, index_post, AppState,
    },
};
use rocket::{catchers, routes};
use sqlx::postgres::PgPoolOptions;
use time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[rocket::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    info!("🚀 Starting charity vote server");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("📋 Migrations complete");

    let cache = Arc::new(TtlCache::new(Duration::seconds(config.cache_ttl_secs as i64)));
    let force = Arc::new(ForceClient::new(
        config.login_server.clone(),
        config.force_client_id.clone(),
        config.force_client_secret.clone(),
        config.force_username.clone(),
        config.force_password.clone(),
    ));
    let credentials = CredentialCache::new(cache.clone(), force.clone());
    let catalog = CharityCatalog::new(cache, credentials, force);
    let facebook = FacebookClient::new(
        config.facebook_app_id.clone(),
        config.facebook_secret.clone(),
        format!("{}/auth/facebook/callback", config.base_url),
    );

    let state = AppState {
        db: pool,
        catalog,
        facebook,
    };

    // Session cookies are encrypted with this key.
    let figment = match std::env::var("SESSION_KEY") {
        Ok(key) => rocket::Config::figment().merge(("secret_key", key)),
        Err(_) => rocket::Config::figment(),
    };

    let _ = rocket::custom(figment)
        .attach(CORS)
        .manage(state)
        .mount(
            "/",
            routes![
                index,
                index_post,
                cast_vote,
                charity_votes,
                flush_charity_cache,
                facebook_login,
                facebook_callback,
                all_options
            ],
        )
        .register(
            "/",
            catchers![
                bad_request,
                unauthorized,
                not_found,
                internal_error,
                bad_gateway
            ],
        )
        .launch()
        .await?;

    Ok(())
}
