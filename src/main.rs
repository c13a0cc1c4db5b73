use clubhouse::{
    api::{AppState, build_router},
    auth::JwtService,
    config::{database, settings},
    core::user::seed_admins,
    errors::{Error, Result},
};
use dotenvy::dotenv;
use std::env;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Load the application configuration
    let app_config = settings::load_default_config()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;

    // 4. Connect and create tables
    let database_url = database::get_database_url();
    let db = database::create_connection(&database_url)
        .await
        .inspect(|_| info!("Connected to database"))
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed configured admin accounts
    if !app_config.admins.is_empty() {
        match env::var("ADMIN_PASSWORD") {
            Ok(password) => {
                let created = seed_admins(&db, &app_config.admins, &password)
                    .await
                    .inspect_err(|e| error!("Failed to seed admin accounts: {}", e))?;
                info!(created, "Admin accounts checked");
            }
            Err(_) => warn!("ADMIN_PASSWORD not set, skipping admin seeding"),
        }
    }

    // 6. Serve. JWT_SECRET is read directly before use, not stored in AppConfig
    let secret = env::var("JWT_SECRET")
        .inspect_err(|e| error!("JWT_SECRET not found: {}", e))
        .map_err(Error::EnvVar)?;
    let state = AppState::new(db, JwtService::new(&secret, &app_config.auth));

    let listener = TcpListener::bind(app_config.server.bind_address.as_str()).await?;
    info!("Listening on {}", app_config.server.bind_address);
    axum::serve(listener, build_router(state)).await?;

    Ok(())
}
