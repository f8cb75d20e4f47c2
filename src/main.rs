use std::sync::Arc;

use anyhow::Result;
use diesel_migrations::{EmbeddedMigrations, embed_migrations};
use tablefront_orderservice::{
    app_state::AppState,
    bootstrap::{self, app, serve},
    config, db,
    store::pg::PgStore,
};

/// Migrations embedded into the binary which helps with streamlining image building process
const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[tokio::main]
async fn main() -> Result<()> {
    bootstrap::init_env();
    bootstrap::init_tracing();

    let config = config::load()?;

    tracing::info!("Running migrations...");
    let migrations_count = db::run_migrations_blocking(MIGRATIONS, &config.database.url).await?;
    tracing::info!("Run {} new migrations successfully", migrations_count);

    tracing::info!("Bootstrapping...");
    let pool = db::create_pool(&config.database).await?;
    let state = AppState::from_config(Arc::new(PgStore::new(pool)), &config);

    serve("OrderService", app(state), &config.server).await
}
