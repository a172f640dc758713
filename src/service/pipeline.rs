use crate::api::ApodApi;
use crate::config::{Config, LoadStrategy};
use crate::db::{ApodStorage, LoadOutcome};
use crate::error::EtlError;
use crate::service::normalizer::normalize;
use crate::types::DailyRecord;
use tracing::{info, warn};

/// Result of one successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub record: DailyRecord,
    pub outcome: LoadOutcome,
}

/// The four ETL steps in order: schema, fetch, normalize, load.
#[derive(Clone)]
pub struct ApodPipeline {
    api: ApodApi,
    storage: ApodStorage,
    strategy: LoadStrategy,
}

impl ApodPipeline {
    pub fn new(api: ApodApi, storage: ApodStorage, strategy: LoadStrategy) -> Self {
        Self {
            api,
            storage,
            strategy,
        }
    }

    /// Connect the database and build the HTTP client from configuration.
    pub async fn from_config(cfg: &Config) -> Result<Self, EtlError> {
        let api = ApodApi::new(&cfg.apod)?;
        let storage = ApodStorage::connect(&cfg.basic.database_url).await?;
        Ok(Self::new(api, storage, cfg.load.strategy))
    }

    pub fn storage(&self) -> &ApodStorage {
        &self.storage
    }

    /// Run every step once. Any failure aborts the remaining steps.
    pub async fn run_once(&self) -> Result<RunReport, EtlError> {
        self.storage.init_schema().await?;
        info!("apod_data schema ready");

        let raw = self.api.fetch().await?;

        let record = normalize(&raw);
        if record.date.is_empty() {
            warn!("APOD payload has no date; loading with empty business key");
        }

        let outcome = self.storage.load(&record, self.strategy).await?;
        match outcome {
            LoadOutcome::Inserted { id } => {
                info!(id, date = %record.date, title = %record.title, "APOD record inserted")
            }
            LoadOutcome::Skipped => {
                info!(date = %record.date, "APOD record already stored; skipping")
            }
        }

        Ok(RunReport { record, outcome })
    }
}
