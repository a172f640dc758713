use apod_etl::config::{Config, ScheduleMode};
use apod_etl::service::scheduler;
use apod_etl::{ApodPipeline, EtlError};
use mimalloc::MiMalloc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), EtlError> {
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        database_url = %cfg.basic.database_url,
        apod_url = %cfg.apod.url,
        proxy = %cfg.apod.proxy.as_ref().map(|u| u.as_str()).unwrap_or("<none>"),
        strategy = ?cfg.load.strategy,
        mode = ?cfg.schedule.mode,
        loglevel = %cfg.basic.loglevel
    );

    let pipeline = ApodPipeline::from_config(&cfg).await?;

    match cfg.schedule.mode {
        ScheduleMode::Once => {
            let report = pipeline.run_once().await.inspect_err(|e| {
                error!(stage = e.stage(), error = %e, "APOD run failed");
            })?;
            info!(
                date = %report.record.date,
                inserted = report.outcome.is_inserted(),
                "APOD run finished"
            );
        }
        ScheduleMode::Daily => {
            scheduler::run_daily(&pipeline, &cfg.schedule, shutdown_signal()).await;
        }
    }

    pipeline.storage().pool().close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c; running until killed");
        std::future::pending::<()>().await;
    }
    info!("ctrl-c received");
}
