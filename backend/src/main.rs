use std::sync::Arc;
use backend::{
    config::{AppConfig, StoreBackend},
    queries::PgStore,
    routes::{build_rocket, AppState},
};
use shuttle_runtime::CustomError;
use sqlx::PgPool;
use tracing::{info, warn};

#[shuttle_runtime::main]
async fn rocket(
    #[shuttle_shared_db::Postgres] pool: PgPool,
    #[shuttle_runtime::Secrets] secret_store: shuttle_runtime::SecretStore,
) -> shuttle_rocket::ShuttleRocket {
    info!("🚀 Starting poll server");

    let config = AppConfig::from_secrets(&secret_store).map_err(CustomError::new)?;

    let app_state = match config.store_backend {
        StoreBackend::Postgres => {
            if config.run_migrations {
                sqlx::migrate!("./migrations")
                    .run(&pool)
                    .await
                    .map_err(CustomError::new)?;
                info!("📋 Migrations complete");
            }
            AppState::new(Arc::new(PgStore::new(pool)))
        }
        StoreBackend::Memory => {
            warn!("STORE_BACKEND=memory - polls, votes and comments are lost on restart");
            AppState::in_memory()
        }
    };

    let rocket = build_rocket(app_state, &config);

    Ok(rocket.into())
}
