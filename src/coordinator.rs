use std::sync::Arc;

use dashmap::DashMap;

use crate::discovery::DiscoveryCoordinator;
use crate::schema::{FeatureStage, ValidationState};
use crate::validation::ValidationAggregator;

/// Discovery scans plus one validation aggregator per site.
#[derive(Debug)]
pub struct Coordinator {
    discovery: DiscoveryCoordinator,
    sites: DashMap<String, Arc<ValidationAggregator>>,
    default_min_stage: FeatureStage,
}

impl Coordinator {
    pub fn new(default_min_stage: FeatureStage) -> Self {
        Coordinator {
            discovery: DiscoveryCoordinator::new(),
            sites: DashMap::new(),
            default_min_stage,
        }
    }

    pub fn discovery(&self) -> &DiscoveryCoordinator {
        &self.discovery
    }

    /// Aggregator for `site_id`, created on first use.
    pub fn site(&self, site_id: &str) -> Arc<ValidationAggregator> {
        self.sites
            .entry(site_id.to_string())
            .or_insert_with(|| Arc::new(ValidationAggregator::new(site_id, self.default_min_stage)))
            .value()
            .clone()
    }

    /// Install an aggregator, e.g. one restored from storage.
    pub fn insert_site(&self, aggregator: ValidationAggregator) -> Arc<ValidationAggregator> {
        let aggregator = Arc::new(aggregator);
        self.sites
            .insert(aggregator.site_id().to_string(), aggregator.clone());
        aggregator
    }

    pub fn summarize(&self, site_id: &str) -> Option<ValidationState> {
        // Clone the handle out so the map shard is not held while summarizing
        let aggregator = self.sites.get(site_id).map(|site| site.value().clone())?;
        Some(aggregator.summarize())
    }

    pub fn site_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.sites.iter().map(|entry| entry.key().clone()).collect();
        ids.sort();
        ids
    }
}
