//! Depth-bounded pruning of discovery result trees.
//!
//! Pruning only ever removes substructure. Resolving an already-pruned tree
//! at the same depth returns it unchanged, and a deeper request always yields
//! a superset of a shallower one.

use std::collections::BTreeMap;

use crate::enumeration::depth::DepthContext;
use crate::error::ConfigError;
use crate::schema::{
    Depth, DeviceDiscovery, DiscoveryEvents, FamilyDiscovery, FeatureDiscovery, RefDiscovery,
    RegistryDiscovery,
};

/// How much of a single map entry survives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Detail {
    /// Key only; the entry is empty.
    Bare,
    /// Scalar attributes, without nested parts.
    Scalars,
    Full,
}

trait Reduce: Clone + Default {
    fn scalars(&self) -> Self;

    fn reduce(&self, detail: Detail) -> Self {
        match detail {
            Detail::Bare => Self::default(),
            Detail::Scalars => self.scalars(),
            Detail::Full => self.clone(),
        }
    }
}

impl Reduce for FamilyDiscovery {
    fn scalars(&self) -> Self {
        FamilyDiscovery {
            addr: self.addr.clone(),
            network: self.network.clone(),
            status: None,
        }
    }
}

impl Reduce for RegistryDiscovery {
    fn scalars(&self) -> Self {
        RegistryDiscovery {
            last_event_time: self.last_event_time,
            ..RegistryDiscovery::default()
        }
    }
}

impl Reduce for DeviceDiscovery {
    fn scalars(&self) -> Self {
        DeviceDiscovery {
            num_id: self.num_id.clone(),
            last_event_time: self.last_event_time,
            blocked: self.blocked,
            ..DeviceDiscovery::default()
        }
    }
}

impl Reduce for RefDiscovery {
    fn scalars(&self) -> Self {
        RefDiscovery {
            point: self.point.clone(),
            name: self.name.clone(),
            ref_type: self.ref_type.clone(),
            units: self.units.clone(),
            writable: self.writable,
            description: self.description.clone(),
            ..RefDiscovery::default()
        }
    }
}

impl Reduce for FeatureDiscovery {
    fn scalars(&self) -> Self {
        self.clone()
    }
}

fn reduce_map<V: Reduce>(map: &Option<BTreeMap<String, V>>, detail: Detail) -> Option<BTreeMap<String, V>> {
    map.as_ref().map(|entries| {
        entries
            .iter()
            .map(|(key, value)| (key.clone(), value.reduce(detail)))
            .collect()
    })
}

/// Prune `tree` to `depth` within `context`. An absent depth means the shallowest level.
pub fn resolve(
    tree: &DiscoveryEvents,
    context: DepthContext,
    depth: Option<Depth>,
) -> Result<DiscoveryEvents, ConfigError> {
    let rank = context.rank(depth)?;
    let resolved = match context {
        DepthContext::Enumeration => resolve_enumeration(tree, rank),
        DepthContext::Discovery => resolve_discovery(tree, rank),
        DepthContext::Registry => resolve_registry(tree, rank),
    };
    Ok(resolved)
}

/// buckets < entries < details < parts
fn resolve_enumeration(tree: &DiscoveryEvents, rank: usize) -> DiscoveryEvents {
    let detail = match rank {
        0 | 1 => Detail::Bare,
        2 => Detail::Scalars,
        _ => Detail::Full,
    };
    let mut out = tree.envelope();
    out.features = reduce_map(&tree.features, detail);
    if rank >= 1 {
        out.families = reduce_map(&tree.families, detail);
        out.registries = reduce_map(&tree.registries, detail);
        out.devices = reduce_map(&tree.devices, detail);
        out.refs = reduce_map(&tree.refs, detail);
    }
    if rank >= 3 {
        out.system = tree.system.clone();
    }
    out
}

/// registries < entries < details
fn resolve_discovery(tree: &DiscoveryEvents, rank: usize) -> DiscoveryEvents {
    if rank >= 2 {
        return tree.clone();
    }
    let mut out = tree.envelope();
    out.registries = reduce_map(&tree.registries, Detail::Bare);
    if rank >= 1 {
        out.families = reduce_map(&tree.families, Detail::Bare);
        out.devices = reduce_map(&tree.devices, Detail::Bare);
        out.refs = reduce_map(&tree.refs, Detail::Bare);
        out.features = reduce_map(&tree.features, Detail::Bare);
    }
    out
}

/// registries < devices < details
fn resolve_registry(tree: &DiscoveryEvents, rank: usize) -> DiscoveryEvents {
    if rank >= 2 {
        return tree.clone();
    }
    let mut out = tree.envelope();
    out.registries = tree.registries.as_ref().map(|registries| {
        registries
            .iter()
            .map(|(id, registry)| {
                let devices = if rank >= 1 {
                    reduce_map(&registry.devices, Detail::Bare)
                } else {
                    None
                };
                (id.clone(), RegistryDiscovery { devices, ..RegistryDiscovery::default() })
            })
            .collect()
    });
    if rank >= 1 {
        out.devices = reduce_map(&tree.devices, Detail::Bare);
    }
    out
}
