use crate::config::AppConfig;
use amon_core::{AmonEngine, AmonStores};
use amon_routes::state::AmonAppState;
use apps::{AppError, AppProperties, AppResult};
use axum::Router;
use dotenv::dotenv;
use error_stack::ResultExt;
use error_stack::fmt::ColorMode;
use repositories::memory::InMemoryStore;
use repositories::postgres::ConnectionDetails;
use repositories::postgres::entities::EntityRepo;
use repositories::postgres::initializer::RepoCreator;
use repositories::postgres::metering_points::MeteringPointRepo;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

mod config;

#[tokio::main]
async fn main() {
    match try_main().await {
        Ok(_) => info!("amon service shutting down"),
        Err(e) => {
            error!("amon service exited with error: {e:?}");
        }
    }
}

fn init_logging() {
    error_stack::Report::set_color_mode(ColorMode::None);

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_env("AMON_LOG"))
        .init();
}

async fn try_main() -> AppResult<()> {
    // loaded before logging so AMON_LOG can come from the file
    let env_file = dotenv();
    init_logging();
    if let Err(e) = env_file {
        warn!("failed to load .env file: {e}");
    }

    let config = AppConfig::from_env().change_context(AppError)?;
    debug!("loaded config: {config:?}");

    let routes = match config.database_url {
        Some(url) => {
            let engine = postgres_engine(url, config.pool_size).await?;
            build_routes(engine, config.metrics_enabled)?
        }
        None => {
            warn!("DATABASE_URL is not set, data is kept in memory and lost on shutdown");
            build_routes(InMemoryStore::new().into_engine(), config.metrics_enabled)?
        }
    };

    apps::run(
        routes,
        AppProperties {
            name: "amon service",
            port: config.port,
        },
    )
    .await
}

fn build_routes<T: AmonEngine>(engine: T, metrics_enabled: bool) -> AppResult<Router> {
    let state = if metrics_enabled {
        AmonAppState::new_with_metrics(engine).change_context(AppError)?
    } else {
        AmonAppState::new_without_metrics(engine)
    };

    debug!("building routes..");
    Ok(amon_routes::routes::build(state)).inspect(|_| debug!("routes built"))
}

#[instrument(skip(url))]
async fn postgres_engine(
    url: String,
    pool_size: Option<usize>,
) -> AppResult<AmonStores<EntityRepo, MeteringPointRepo>> {
    debug!("initializing postgres repositories");
    let (entities, metering_points) = RepoCreator::default()
        .with_metering_points()
        .create(ConnectionDetails::Url(url), pool_size)
        .await
        .change_context(AppError)?;

    Ok(AmonStores::new(entities, metering_points))
}
