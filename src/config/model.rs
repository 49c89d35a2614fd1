use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

/// Parameters for a request template or a single check. Values may be
/// strings, numbers, booleans or nested mappings.
pub type ParameterMap = BTreeMap<String, Value>;

/// Top-level configuration: global limits plus the monitored resources.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Per-request timeout in seconds. A slow remote service can never
    /// stall a run longer than this.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Optional deadline for a whole run (request plus checks), in seconds.
    #[serde(default)]
    pub run_timeout_seconds: Option<u64>,

    /// Upper bound on concurrently executing probe runs.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_probes: usize,

    pub resources: Vec<ResourceConfig>,
}

/// A monitored resource and the probes to run against it.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceConfig {
    pub name: String,

    /// Base URL of the service, e.g. `https://example.org/wms`.
    pub url: String,

    pub probes: Vec<ProbeEntry>,
}

/// One configured probe: which probe type to run, with which request
/// parameters, verified by which checks.
#[derive(Debug, Clone, Deserialize)]
pub struct ProbeEntry {
    pub probe: String,

    #[serde(default)]
    pub parameters: ParameterMap,

    #[serde(default)]
    pub checks: Vec<CheckConfig>,
}

/// A check identifier plus the parameters it runs with. Position in the
/// list is execution order.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckConfig {
    pub check: String,

    #[serde(default)]
    pub parameters: ParameterMap,
}

/// The flattened input for a single run: one resource URL paired with one
/// configured probe. This is what the runner consumes; it stays immutable
/// for the duration of the run.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub resource_name: String,
    pub resource_url: String,
    pub probe: String,
    pub parameters: ParameterMap,
    pub checks: Vec<CheckConfig>,
}

impl ResourceConfig {
    /// Expand a resource into one `ProbeConfig` per configured probe.
    pub fn probe_configs(&self) -> Vec<ProbeConfig> {
        self.probes
            .iter()
            .map(|entry| ProbeConfig {
                resource_name: self.name.clone(),
                resource_url: self.url.clone(),
                probe: entry.probe.clone(),
                parameters: entry.parameters.clone(),
                checks: entry.checks.clone(),
            })
            .collect()
    }
}

fn default_timeout_seconds() -> u64 {
    10
}

fn default_max_concurrent() -> usize {
    8
}
