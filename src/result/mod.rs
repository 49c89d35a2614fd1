use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use crate::config::model::ParameterMap;

/// Outcome of a single check against a probe response. Immutable once
/// built; carries a faithful copy of the parameters the check ran with so
/// results stay auditable after the configuration changes.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub check_identifier: String,
    pub parameters: ParameterMap,
    pub success: bool,
    pub message: String,
}

impl CheckResult {
    pub fn new(
        check_identifier: impl Into<String>,
        parameters: ParameterMap,
        success: bool,
        message: impl Into<String>,
    ) -> Self {
        Self {
            check_identifier: check_identifier.into(),
            parameters,
            success,
            message: message.into(),
        }
    }
}

/// Everything gathered for a single probe run. Owned by the session that
/// assembles it; handed to the caller once the run is finalized.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeResult {
    pub probe_identifier: String,
    pub resource_url: String,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    check_results: Vec<CheckResult>,
}

impl ProbeResult {
    pub fn new(probe_identifier: impl Into<String>, resource_url: impl Into<String>) -> Self {
        Self {
            probe_identifier: probe_identifier.into(),
            resource_url: resource_url.into(),
            start_time: None,
            end_time: None,
            check_results: Vec::new(),
        }
    }

    /// Mark the start of the run, before the request goes out.
    pub fn start(&mut self) {
        self.start_time = Some(Utc::now());
    }

    /// Mark the end of the run, after the last check completed.
    pub fn stop(&mut self) {
        self.end_time = Some(Utc::now());
    }

    /// Append a check outcome. Call order is preserved; nothing is
    /// reordered or de-duplicated.
    pub fn add_result(&mut self, check_result: CheckResult) {
        self.check_results.push(check_result);
    }

    pub fn check_results(&self) -> &[CheckResult] {
        &self.check_results
    }

    /// Wall-clock duration of the run, available once stopped.
    pub fn duration(&self) -> Option<TimeDelta> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }

    /// Overall outcome: true iff every check passed. A run with no checks
    /// passes vacuously.
    pub fn success(&self) -> bool {
        self.check_results.iter().all(|check| check.success)
    }
}
