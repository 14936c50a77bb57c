//! Builder configuration: ring policy, fee thresholds, fog measurements.

use std::path::Path;

use mob_types::constants::ALLOWED_HARDENING_ADVISORY;
use serde::{Deserialize, Serialize};

use crate::fee::FeePolicy;
use crate::fog::MeasurementRegistry;
use crate::ring::RingPolicy;
use crate::TxError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    pub ring_policy: RingPolicy,
    pub fee_policy: FeePolicy,
    pub measurements: MeasurementRegistry,
    /// Hardening advisories accepted in fog enclave reports.
    pub allowed_advisories: Vec<String>,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            ring_policy: RingPolicy::default(),
            fee_policy: FeePolicy::default(),
            measurements: MeasurementRegistry::default(),
            allowed_advisories: vec![ALLOWED_HARDENING_ADVISORY.to_string()],
        }
    }
}

impl BuilderConfig {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, TxError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| TxError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TxError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| TxError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), TxError> {
        self.measurements.validate()
    }

    pub fn with_ring_policy(mut self, policy: RingPolicy) -> Self {
        self.ring_policy = policy;
        self
    }

    pub fn with_fee_policy(mut self, policy: FeePolicy) -> Self {
        self.fee_policy = policy;
        self
    }

    pub fn with_measurements(mut self, measurements: MeasurementRegistry) -> Self {
        self.measurements = measurements;
        self
    }
}
