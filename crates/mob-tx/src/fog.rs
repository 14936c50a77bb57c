//! Fog (hint service) attestation.
//!
//! A recipient address may name a fog report server. Before the engine
//! encrypts a fog hint for that address it must attest the server's enclave,
//! so the URL is resolved to an expected MRENCLAVE measurement through a
//! versioned, exact-match table.

use std::collections::BTreeMap;

use mob_types::constants::{ALLOWED_HARDENING_ADVISORY, KEY_SIZE};
use mob_types::PublicAddress;
use serde::{Deserialize, Serialize};

use crate::TxError;

/// MRENCLAVE of the production fog report enclave.
pub const PROD_FOG_MR_ENCLAVE: &str =
    "3d6e528ee0574ae3299915ea608b71ddd17cbe855d4f5e1c46df9b0d22b04cdb";

/// MRENCLAVE of the staging fog report enclave.
pub const STAGING_FOG_MR_ENCLAVE: &str =
    "a4764346f91979b4906d4ce26102228efe3aba39216dec1e7d22e6b06f919f11";

const MEASUREMENT_TABLE_VERSION: u32 = 1;

/// Fog report URL -> hex MRENCLAVE.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurementRegistry {
    pub version: u32,
    pub measurements: BTreeMap<String, String>,
}

impl Default for MeasurementRegistry {
    fn default() -> Self {
        let measurements = [
            ("fog://fog.prod.mobilecoinww.com", PROD_FOG_MR_ENCLAVE),
            ("fog://fog-rpt-prd.namda.net", PROD_FOG_MR_ENCLAVE),
            ("fog://service.fog.mob.production.namda.net", PROD_FOG_MR_ENCLAVE),
            ("fog://service.fog.mob.staging.namda.net", STAGING_FOG_MR_ENCLAVE),
        ]
        .into_iter()
        .map(|(url, mr)| (url.to_string(), mr.to_string()))
        .collect();
        Self {
            version: MEASUREMENT_TABLE_VERSION,
            measurements,
        }
    }
}

impl MeasurementRegistry {
    /// An empty table at the given version.
    pub fn empty(version: u32) -> Self {
        Self {
            version,
            measurements: BTreeMap::new(),
        }
    }

    /// Add or replace a measurement.
    pub fn insert(&mut self, url: &str, mr_enclave_hex: &str) -> Result<(), TxError> {
        parse_measurement(url, mr_enclave_hex)?;
        self.measurements
            .insert(url.to_string(), mr_enclave_hex.to_lowercase());
        Ok(())
    }

    /// Check every entry is a 32-byte hex measurement.
    pub fn validate(&self) -> Result<(), TxError> {
        for (url, mr) in &self.measurements {
            parse_measurement(url, mr)?;
        }
        Ok(())
    }

    /// Exact-match lookup.
    pub fn resolve(&self, url: &str) -> Result<[u8; KEY_SIZE], TxError> {
        let mr = self
            .measurements
            .get(url)
            .ok_or_else(|| TxError::UnknownFogUrl(url.to_string()))?;
        parse_measurement(url, mr)
    }

    /// Attestation policy for `address`, or `None` when it declares no fog URL.
    pub fn policy_for(
        &self,
        address: &PublicAddress,
        allowed_advisories: &[String],
    ) -> Result<Option<AttestationPolicy>, TxError> {
        let Some(url) = address.fog_report_url() else {
            return Ok(None);
        };
        let mr_enclave = self.resolve(url)?;
        log::debug!("fog url {} resolved (table v{})", url, self.version);
        Ok(Some(AttestationPolicy {
            mr_enclave,
            allowed_advisories: allowed_advisories.to_vec(),
        }))
    }
}

fn parse_measurement(url: &str, mr: &str) -> Result<[u8; KEY_SIZE], TxError> {
    let bytes =
        hex::decode(mr).map_err(|e| TxError::Config(format!("measurement for {url}: {e}")))?;
    bytes.as_slice().try_into().map_err(|_| {
        TxError::Config(format!(
            "measurement for {url} must be {KEY_SIZE} bytes, got {}",
            bytes.len()
        ))
    })
}

/// Enclave verification policy handed to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestationPolicy {
    pub mr_enclave: [u8; KEY_SIZE],
    /// Hardening advisories tolerated in the enclave's report.
    pub allowed_advisories: Vec<String>,
}

impl AttestationPolicy {
    /// Policy accepting the default hardening advisory.
    pub fn new(mr_enclave: [u8; KEY_SIZE]) -> Self {
        Self {
            mr_enclave,
            allowed_advisories: vec![ALLOWED_HARDENING_ADVISORY.to_string()],
        }
    }
}
