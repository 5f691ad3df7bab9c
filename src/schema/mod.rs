//! UDMI wire records
//!
//! Serde shapes for the discovery and validation messages this crate consumes
//! and produces. Field names and enum string values match the UDMI JSON schema
//! exactly; each concept has a single canonical record, with schema evolution
//! carried by the `version` / `upgraded_from` fields.

/// Declares a closed enum whose variants serialize to fixed wire strings.
///
/// Variant declaration order defines `Ord`.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($variant:ident => $wire:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, Debug, serde::Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd,
            serde::Serialize,
        )]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::error::SchemaError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($wire => Ok($name::$variant),)+
                    _ => Err($crate::error::SchemaError::UnknownValue {
                        kind: $kind,
                        value: value.to_string(),
                    }),
                }
            }
        }
    };
}

mod common;
mod discovery;
mod validation;

pub use common::{levels, Depth, Entry, FeatureStage, Generation, Scoring};
pub use discovery::{
    DeviceDiscovery, DiscoveryEvents, DiscoveryPhase, DiscoveryState, FamilyDiscovery,
    FamilyDiscoveryConfig, FamilyDiscoveryState, FeatureDiscovery, RefDiscovery,
    RegistryDiscovery,
};
pub use validation::{
    CapabilityResult, CapabilityValidationState, DeviceValidationState, PointsetSummary,
    SequenceResult, SequenceValidationState, ValidationState, ValidationSummary,
};

use serde::de::DeserializeOwned;

use crate::error::SchemaError;

/// Parse an ingress JSON record, reporting failures as [`SchemaError`].
pub fn from_json<T: DeserializeOwned>(raw: &str) -> Result<T, SchemaError> {
    serde_json::from_str::<T>(raw).map_err(Into::into)
}
