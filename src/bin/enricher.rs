//! # Enricher
//!
//! Runs the category backfill and then one translation run against the
//! configured catalog. Everything is driven by `config/enricher-config.yaml`
//! plus `ENRICHER_ENV`, `ENRICHER_PRESET`, `ENRICHER_WORKERS` and
//! `ENRICHER_MAX_BATCHES`.

use anyhow::Context;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use enricher_core::classification::{CategoryBackfill, CategoryClassifier};
use enricher_core::config::ConfigManager;
use enricher_core::logging::init_structured_logging;
use enricher_core::orchestration::{PersistenceWriter, TranslationEngine};
use enricher_core::resilience::RetryPolicy;
use enricher_core::store::{PgStoreConnector, StoreConnector};
use enricher_core::translation::OpenAiChatClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_structured_logging();

    let manager = ConfigManager::load().context("failed to load configuration")?;
    let config = manager.config();
    let run = config.run.resolve(Utc::now());
    info!(
        environment = manager.environment(),
        preset = %run.preset,
        workers = run.workers,
        "🚀 ENGINE: Starting"
    );

    let connector: Arc<dyn StoreConnector> = Arc::new(PgStoreConnector::new(config.database.clone()));
    let generator = Arc::new(
        OpenAiChatClient::new(&config.text_generation).context("invalid text-generation settings")?,
    );
    let engine = TranslationEngine::from_config(
        config,
        manager.config_directory(),
        run,
        connector.clone(),
        generator,
    )
    .context("failed to configure translation engine")?;

    if config.run.backfill_categories {
        let store = connector
            .connect()
            .await
            .context("failed to connect for category backfill")?;
        let backfill = CategoryBackfill::new(
            CategoryClassifier::new(),
            PersistenceWriter::new(RetryPolicy::from(&config.retry.record)),
        );
        let reclassified = backfill
            .run(store.as_ref())
            .await
            .context("category backfill failed")?;
        println!("{reclassified}");
    } else {
        info!("🏷️ CLASSIFY: Category backfill disabled");
    }

    let summary = engine.run().await.context("translation run failed")?;
    println!("{summary}");

    Ok(())
}
