//! Identifier resolution.
//!
//! Probe types and checks are registered under dotted string identifiers
//! at startup, from a bounded, statically known set of implementations.
//! Resolution is a map lookup with no side effects, so the registry itself
//! is the resolution cache: built once, then shared read-only across
//! concurrent runs.

use std::collections::HashMap;

use thiserror::Error;

use crate::checks::{self, CheckFn};
use crate::probe::Probe;
use crate::probes;

/// Constructor for a probe type. Probe types are buildable without
/// arguments; per-run state arrives through `Probe::init`.
pub type ProbeCtor = fn() -> Box<dyn Probe>;

#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("unknown probe identifier '{0}'")]
    UnknownProbe(String),

    #[error("unknown check identifier '{0}'")]
    UnknownCheck(String),
}

#[derive(Default)]
pub struct Registry {
    probes: HashMap<String, ProbeCtor>,
    checks: HashMap<String, CheckFn>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with every built-in probe type and check.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        probes::register_builtins(&mut registry);
        checks::register_builtins(&mut registry);
        registry
    }

    pub fn register_probe<P>(&mut self, identifier: &str)
    where
        P: Probe + Default + 'static,
    {
        self.probes.insert(identifier.to_string(), ctor::<P>);
    }

    pub fn register_check(&mut self, identifier: &str, check: CheckFn) {
        self.checks.insert(identifier.to_string(), check);
    }

    /// Instantiate the probe type registered under `identifier`.
    pub fn resolve_probe(&self, identifier: &str) -> Result<Box<dyn Probe>, ResolutionError> {
        self.probes
            .get(identifier)
            .map(|ctor| ctor())
            .ok_or_else(|| ResolutionError::UnknownProbe(identifier.to_string()))
    }

    pub fn resolve_check(&self, identifier: &str) -> Result<CheckFn, ResolutionError> {
        self.checks
            .get(identifier)
            .copied()
            .ok_or_else(|| ResolutionError::UnknownCheck(identifier.to_string()))
    }

    /// Registered probe identifiers, sorted for stable listings.
    pub fn probe_identifiers(&self) -> Vec<&str> {
        let mut identifiers: Vec<&str> = self.probes.keys().map(String::as_str).collect();
        identifiers.sort_unstable();
        identifiers
    }

    /// Registered check identifiers, sorted for stable listings.
    pub fn check_identifiers(&self) -> Vec<&str> {
        let mut identifiers: Vec<&str> = self.checks.keys().map(String::as_str).collect();
        identifiers.sort_unstable();
        identifiers
    }
}

fn ctor<P: Probe + Default + 'static>() -> Box<dyn Probe> {
    Box::new(P::default())
}

#[cfg(test)]
pub mod test {
    use super::*;
    use crate::probe::RequestMethod;

    #[test]
    fn test_builtins_resolve() {
        let registry = Registry::with_builtins();

        let probe = registry.resolve_probe("ows.wms_get_capabilities").expect("probe");
        assert_eq!(probe.spec().method, RequestMethod::Get);
        assert_eq!(probe.spec().resource_type, "OGC:WMS");

        registry.resolve_check("http.status_code").expect("check");
        registry.resolve_check("content.no_ows_exception").expect("check");
    }

    #[test]
    fn test_unknown_identifiers_fail() {
        let registry = Registry::with_builtins();

        assert!(matches!(
            registry.resolve_probe("nope.missing"),
            Err(ResolutionError::UnknownProbe(_))
        ));
        assert!(matches!(
            registry.resolve_check("nope.missing"),
            Err(ResolutionError::UnknownCheck(_))
        ));
    }

    #[test]
    fn test_identifier_listings_are_sorted() {
        let registry = Registry::with_builtins();

        let probes = registry.probe_identifiers();
        assert!(probes.contains(&"http.get"));
        let mut sorted = probes.clone();
        sorted.sort_unstable();
        assert_eq!(probes, sorted);

        assert!(registry.check_identifiers().contains(&"content.contains"));
    }
}
