use cabinet_services::{
    AppState,
    catalog::PgCatalogStorage,
    config::Config,
    database::{self, PgStorage},
    routes,
    storage::CFFileStorage,
    telemetry,
    users::{LogMailer, PgUserStorage},
};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tracing::info;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

const BUILD_DATE: &str = env!("BUILD_DATE");
const BUILD_COMMIT: &str = env!("BUILD_COMMIT");
const BUILD_BRANCH: &str = env!("BUILD_BRANCH");

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config: Config = Config::init()?;
    telemetry::init_tracing(&config)?;

    print_build_info();
    info!(
        environment = %config.environment(),
        server_addr = %config.server_addr(),
        port = %config.port(),
        public_url = %config.public_url(),
        "Configuration loaded"
    );

    let pool = database::create_pool(&config).await?;
    let sql_storage = PgStorage::new(pool);

    let state = AppState::new(
        sql_storage.clone(),
        PgUserStorage::new(sql_storage.clone()),
        PgCatalogStorage::new(sql_storage),
        CFFileStorage::from_credentials(config.r2())?,
        Arc::new(LogMailer),
    );
    let route = routes(state, config.clone());

    let addr = SocketAddr::from((config.server_addr().parse::<IpAddr>()?, config.port()));
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, route).await?;

    Ok(())
}

fn print_build_info() {
    info!("===========================================");
    info!("  Cabinet Services {}", cabinet_services::SERVICE_VERSION);
    info!("===========================================");
    info!("Build Date:   {}", BUILD_DATE);
    info!("Build Commit: {}", BUILD_COMMIT);
    info!("Build Branch: {}", BUILD_BRANCH);
    info!("===========================================");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_info_constants_exist() {
        assert!(!BUILD_DATE.is_empty());
        assert!(!BUILD_COMMIT.is_empty());
        assert!(!BUILD_BRANCH.is_empty());
    }
}
