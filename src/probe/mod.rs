pub mod session;
pub mod template;

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::ConfigError;
use crate::config::model::{ParameterMap, ProbeConfig};
use crate::registry::ResolutionError;

/// HTTP method a probe type uses. A static property of the probe type,
/// not of the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
    Get,
    Post,
}

impl fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestMethod::Get => write!(f, "GET"),
            RequestMethod::Post => write!(f, "POST"),
        }
    }
}

/// Static metadata describing a probe type: what to request and how. The
/// runner and session query this descriptor instead of inspecting the
/// probe type itself.
#[derive(Debug, Clone)]
pub struct ProbeSpec {
    pub name: &'static str,
    pub description: &'static str,

    /// Resource type this probe applies to, e.g. `OGC:WMS`. `*` means any.
    pub resource_type: &'static str,

    pub method: RequestMethod,

    /// Format string with `{name}` placeholders, rendered into the query
    /// string (GET) or request body (POST). Empty means a bare request.
    pub request_template: &'static str,

    /// Headers sent with every request this probe type issues.
    pub request_headers: &'static [(&'static str, &'static str)],

    /// Parameter defaults, overridden by configured parameters.
    pub param_defaults: &'static [(&'static str, &'static str)],
}

/// A probe type: a request descriptor plus optional per-run lifecycle
/// hooks for types that hold resources beyond the shared HTTP client.
#[async_trait]
pub trait Probe: Send + Sync {
    fn spec(&self) -> &ProbeSpec;

    /// Called once before the request phase.
    async fn init(&mut self, _config: &ProbeConfig) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called exactly once per run, whether the run finished or failed.
    async fn exit(&mut self) {}
}

/// Response of the single HTTP request a run performs. Transient: consumed
/// by the checks, discarded with the run.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    /// First value of a header, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(header_name, _)| header_name.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Read-only view of a run handed to check functions: what was requested
/// and what came back. Checks never see the result being assembled.
#[derive(Debug, Clone, Copy)]
pub struct ProbeContext<'a> {
    pub resource_url: &'a str,

    /// Request parameters in force, defaults already applied.
    pub parameters: &'a ParameterMap,

    /// `None` when the request itself failed.
    pub response: Option<&'a HttpResponse>,
}

/// Hard failures of a run. Everything else (transport faults, failing or
/// crashing checks) is captured inside the returned `ProbeResult`.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("probe init failed: {0}")]
    Init(String),
}

#[cfg(test)]
pub mod test {
    use super::*;

    #[test]
    fn test_request_method_display() {
        assert_eq!(RequestMethod::Get.to_string(), "GET");
        assert_eq!(RequestMethod::Post.to_string(), "POST");
    }

    #[test]
    fn test_response_header_lookup_is_case_insensitive() {
        let response = HttpResponse {
            status: 200,
            headers: vec![("Content-Type".to_string(), "text/xml".to_string())],
            body: String::new(),
        };
        assert_eq!(response.header("content-type"), Some("text/xml"));
        assert_eq!(response.header("x-missing"), None);
    }
}
