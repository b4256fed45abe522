use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use common::utils::logging::init_logging_from_env;
use configs::{AppConfig, StorageBackend, DEFAULT_JWT_SECRET};
use dotenvy::dotenv;
use migration::MigratorTrait;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes::{self, ServerState};
use service::customer::{
    password::Argon2PasswordEncoder,
    repo::seaorm::SeaOrmCustomerRepository,
    repository::{mock::InMemoryCustomerRepository, CustomerRepository},
    token::{JwtConfig, JwtTokenIssuer},
    CustomerService,
};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bind address: {e}")))
}

/// Pick the repository backend named in `[database]`, migrating first when asked to.
async fn build_repository(cfg: &AppConfig) -> Result<Arc<dyn CustomerRepository>, StartupError> {
    match cfg.database.backend {
        StorageBackend::Memory => {
            warn!("using in-memory customer store; data is lost on restart");
            Ok(Arc::new(InMemoryCustomerRepository::default()))
        }
        StorageBackend::Postgres => {
            let db = models::db::connect_with_config(&cfg.database)
                .await
                .map_err(|e| StartupError::Database(e.to_string()))?;
            if cfg.database.auto_migrate {
                migration::Migrator::up(&db, None)
                    .await
                    .map_err(|e| StartupError::Database(format!("migrate up: {e}")))?;
                info!("migrations applied");
            }
            Ok(Arc::new(SeaOrmCustomerRepository::new(db)))
        }
    }
}

/// Wire repository, password encoder and token issuer into the handler state.
pub async fn build_state(cfg: &AppConfig) -> Result<ServerState, StartupError> {
    let repo = build_repository(cfg).await?;
    let encoder = Arc::new(Argon2PasswordEncoder::new(cfg.auth.pepper.clone()));
    let tokens = Arc::new(JwtTokenIssuer::new(&JwtConfig {
        secret: cfg.auth.jwt_secret.clone(),
        issuer: cfg.auth.issuer.clone(),
        access_ttl_secs: cfg.auth.access_token_ttl_secs,
        refresh_ttl_secs: cfg.auth.refresh_token_ttl_secs,
    }));
    Ok(ServerState { customers: Arc::new(CustomerService::new(repo, encoder, tokens)) })
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging_from_env();

    let cfg = AppConfig::load_and_validate()
        .map_err(|e| StartupError::InvalidConfig(format!("{e:#}")))?;
    if cfg.auth.jwt_secret == DEFAULT_JWT_SECRET {
        warn!("JWT secret is the development default; set JWT_SECRET or auth.jwt_secret");
    }

    let state = build_state(&cfg).await?;
    let app: Router = routes::build_router(state, build_cors());

    let addr = bind_addr(&cfg)?;
    info!(%addr, backend = ?cfg.database.backend, "starting customer server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
