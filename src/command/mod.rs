mod discovery;
mod resolve;
mod validation;

use std::env;
use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;

use udmi_coord::constants::{defaults, envvars};
use udmi_coord::discovery::FamilyKey;
use udmi_coord::interfaces::Store;
use udmi_coord::schema::FeatureStage;
use udmi_coord::validation::ValidationAggregator;
use udmi_coord::Coordinator;

pub use discovery::{
    configure, observe, promote, record_result, results, start, state, stop, tick, withdraw,
};
pub use resolve::resolve;
pub use validation::{
    expect, record_base64, record_capability, record_pointset, record_sequence, summarize,
};

/// In-memory coordinator backed by the persistent store for one invocation.
struct Session {
    store: Store,
    coordinator: Coordinator,
}

impl Session {
    fn open() -> Result<Self> {
        Ok(Session {
            store: Store::open()?,
            coordinator: Coordinator::new(default_min_stage()?),
        })
    }

    fn load_scan(&self, key: &FamilyKey) -> Result<()> {
        if let Some(scan) = self.store.load_scan(key)? {
            self.coordinator.discovery().restore(scan);
        }
        Ok(())
    }

    fn save_scan(&self, key: &FamilyKey) -> Result<()> {
        if let Some(scan) = self.coordinator.discovery().snapshot(key) {
            self.store.save_scan(&scan)?;
        }
        Ok(())
    }

    fn site(&self, site_id: &str) -> Result<Arc<ValidationAggregator>> {
        match self.store.load_site(site_id)? {
            Some(aggregator) => Ok(self.coordinator.insert_site(aggregator)),
            None => Ok(self.coordinator.site(site_id)),
        }
    }

    fn save_site(&self, aggregator: &ValidationAggregator) -> Result<()> {
        self.store.save_site(aggregator)
    }
}

fn default_min_stage() -> Result<FeatureStage> {
    match env::var(envvars::MIN_STAGE) {
        Ok(stage) => Ok(stage.parse()?),
        Err(_) => Ok(defaults::MIN_STAGE),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}
