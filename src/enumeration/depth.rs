use std::fmt;
use std::str::FromStr;

use crate::error::{ConfigError, SchemaError};
use crate::schema::Depth;

/// Query context that decides which depth tokens apply and in what order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DepthContext {
    /// Results of a family discovery scan.
    Discovery,
    /// A device enumerating its own features, families and points.
    Enumeration,
    /// Cloud-side registry listing.
    Registry,
}

const DISCOVERY_LEVELS: &[Depth] = &[Depth::Registries, Depth::Entries, Depth::Details];
const ENUMERATION_LEVELS: &[Depth] = &[Depth::Buckets, Depth::Entries, Depth::Details, Depth::Parts];
const REGISTRY_LEVELS: &[Depth] = &[Depth::Registries, Depth::Devices, Depth::Details];

impl DepthContext {
    pub fn name(&self) -> &'static str {
        match self {
            DepthContext::Discovery => "discovery",
            DepthContext::Enumeration => "enumeration",
            DepthContext::Registry => "registry",
        }
    }

    /// Levels of this context, shallowest first.
    pub fn levels(&self) -> &'static [Depth] {
        match self {
            DepthContext::Discovery => DISCOVERY_LEVELS,
            DepthContext::Enumeration => ENUMERATION_LEVELS,
            DepthContext::Registry => REGISTRY_LEVELS,
        }
    }

    pub fn shallowest(&self) -> Depth {
        self.levels()[0]
    }

    pub fn deepest(&self) -> Depth {
        self.levels()[self.levels().len() - 1]
    }

    /// Position of `depth` in this context's order. An absent depth is the shallowest level.
    pub fn rank(&self, depth: Option<Depth>) -> Result<usize, ConfigError> {
        let Some(depth) = depth else {
            return Ok(0);
        };
        self.levels()
            .iter()
            .position(|level| *level == depth)
            .ok_or_else(|| ConfigError::UnknownDepth {
                depth: depth.to_string(),
                context: self.name(),
            })
    }
}

impl fmt::Display for DepthContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DepthContext {
    type Err = SchemaError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "discovery" => Ok(DepthContext::Discovery),
            "enumeration" => Ok(DepthContext::Enumeration),
            "registry" => Ok(DepthContext::Registry),
            _ => Err(SchemaError::UnknownValue {
                kind: "depth context",
                value: value.to_string(),
            }),
        }
    }
}
