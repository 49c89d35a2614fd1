//! One probe run, from fresh result to finalized outcomes.
//!
//! A session is created per run and consumed by `execute`; it can never be
//! re-initialized. Only configuration-shape errors escape it. Transport
//! faults and failing or crashing checks are captured as data in the
//! returned `ProbeResult`, so a run always produces a result.

use std::fmt::Write as _;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use reqwest::Client;

use super::template;
use super::{HttpResponse, ProbeContext, ProbeError, ProbeSpec, RequestMethod};
use crate::config::model::{CheckConfig, ParameterMap, ProbeConfig};
use crate::registry::Registry;
use crate::result::{CheckResult, ProbeResult};

/// Identifier of the synthesized outcome recorded when the request itself
/// failed and no checks were configured to report it.
pub const TRANSPORT_CHECK_ID: &str = "transport.error";

pub struct ProbeSession<'a> {
    spec: ProbeSpec,
    config: &'a ProbeConfig,

    /// Request parameters in force: probe defaults overlaid by config.
    parameters: ParameterMap,

    response: Option<HttpResponse>,
    transport_error: Option<String>,
    request_elapsed: Option<Duration>,
    result: ProbeResult,
}

impl<'a> ProbeSession<'a> {
    pub fn new(spec: ProbeSpec, config: &'a ProbeConfig) -> Self {
        let parameters = template::merge_parameters(&spec, &config.parameters);
        let result = ProbeResult::new(&config.probe, &config.resource_url);
        Self {
            spec,
            config,
            parameters,
            response: None,
            transport_error: None,
            request_elapsed: None,
            result,
        }
    }

    /// Drive the full run: request, then checks in declared order, then
    /// the summary. Timing brackets everything in between.
    pub async fn execute(
        mut self,
        registry: &Registry,
        client: &Client,
    ) -> Result<ProbeResult, ProbeError> {
        self.run_request(client).await?;
        self.run_checks(registry);
        self.result.stop();
        self.calc_result();
        Ok(self.result)
    }

    async fn run_request(&mut self, client: &Client) -> Result<(), ProbeError> {
        self.before_request();
        let outcome = self.perform_request(client).await;
        self.after_request();
        outcome
    }

    fn before_request(&mut self) {
        self.result.start();
    }

    fn after_request(&mut self) {
        if let Some(elapsed) = self.request_elapsed {
            debug!(
                "{}: request phase took {:.1}ms",
                self.spec.name,
                elapsed.as_secs_f64() * 1000.0
            );
        }
    }

    /// Build and send the HTTP call. The template is rendered up front:
    /// a missing placeholder key aborts before anything goes on the wire.
    async fn perform_request(&mut self, client: &Client) -> Result<(), ProbeError> {
        let request_string = if self.spec.request_template.is_empty() {
            None
        } else {
            Some(template::render(self.spec.request_template, &self.parameters)?)
        };

        let url_base = &self.config.resource_url;
        info!("{}: request method={} url={url_base}", self.spec.name, self.spec.method);

        let request = match self.spec.method {
            RequestMethod::Get => {
                let url = match &request_string {
                    Some(query) => format!("{url_base}?{query}"),
                    None => url_base.clone(),
                };
                client.get(url)
            }
            RequestMethod::Post => client
                .post(url_base.clone())
                .body(request_string.unwrap_or_default()),
        };
        let request = self
            .spec
            .request_headers
            .iter()
            .fold(request, |request, (name, value)| request.header(*name, *value));

        let started = Instant::now();
        let send_result = request.send().await;

        match send_result {
            Ok(response) => {
                let status = response.status();
                info!("{}: response status={status}", self.spec.name);

                let headers = response
                    .headers()
                    .iter()
                    .map(|(name, value)| {
                        (
                            name.to_string(),
                            String::from_utf8_lossy(value.as_bytes()).into_owned(),
                        )
                    })
                    .collect();

                match response.text().await {
                    Ok(body) => {
                        if status.is_client_error() || status.is_server_error() {
                            warn!(
                                "{}: error response status={status} body={}",
                                self.spec.name,
                                snippet(&body)
                            );
                        }
                        self.response = Some(HttpResponse {
                            status: status.as_u16(),
                            headers,
                            body,
                        });
                    }
                    Err(err) => self.record_transport_error(&err),
                }
            }
            Err(err) => self.record_transport_error(&err),
        }

        self.request_elapsed = Some(started.elapsed());
        Ok(())
    }

    fn record_transport_error(&mut self, err: &reqwest::Error) {
        let message = error_chain(err);
        warn!("{}: request failed: {message}", self.spec.name);
        self.transport_error = Some(message);
    }

    /// Run every configured check in declared order. A check that cannot
    /// be resolved, or that returns `Err`, yields a failed outcome for its
    /// position and the remaining checks still run.
    fn run_checks(&mut self, registry: &Registry) {
        if self.config.checks.is_empty() {
            // A failed request with nothing configured to report it must
            // not pass vacuously.
            if let Some(transport) = &self.transport_error {
                self.result.add_result(CheckResult::new(
                    TRANSPORT_CHECK_ID,
                    ParameterMap::new(),
                    false,
                    format!("request failed: {transport}"),
                ));
            }
            return;
        }

        let context = ProbeContext {
            resource_url: &self.config.resource_url,
            parameters: &self.parameters,
            response: self.response.as_ref(),
        };

        for check in &self.config.checks {
            let outcome =
                invoke_check(registry, &context, check, self.transport_error.as_deref());
            info!(
                "{}: check {} success={}",
                self.spec.name, check.check, outcome.success
            );
            self.result.add_result(outcome);
        }
    }

    fn calc_result(&self) {
        let passed = self
            .result
            .check_results()
            .iter()
            .filter(|check| check.success)
            .count();
        let duration_ms = self
            .result
            .duration()
            .map(|duration| duration.num_milliseconds())
            .unwrap_or_default();
        info!(
            "{}: result success={} checks={passed}/{} duration={duration_ms}ms",
            self.spec.name,
            self.result.success(),
            self.result.check_results().len()
        );
    }
}

/// Invoke one check, isolating every fault at this boundary: resolution
/// failures and check errors become failed outcomes, never aborts.
fn invoke_check(
    registry: &Registry,
    context: &ProbeContext<'_>,
    check: &CheckConfig,
    transport_error: Option<&str>,
) -> CheckResult {
    let (success, mut message) = match registry.resolve_check(&check.check) {
        Err(err) => (false, err.to_string()),
        Ok(fun) => match fun(context, &check.parameters) {
            Ok((success, message)) => (success, message),
            Err(err) => (false, format!("check error: {err:#}")),
        },
    };

    if !success && context.response.is_none() {
        if let Some(transport) = transport_error {
            let _ = write!(message, " (request failed: {transport})");
        }
    }

    CheckResult::new(&check.check, check.parameters.clone(), success, message)
}

fn error_chain(mut err: &(dyn std::error::Error + 'static)) -> String {
    let mut text = format!("{err}");
    while let Some(source) = err.source() {
        let _ = write!(text, ": {source}");
        err = source;
    }
    text
}

fn snippet(body: &str) -> &str {
    match body.char_indices().nth(200) {
        Some((index, _)) => &body[..index],
        None => body,
    }
}

#[cfg(test)]
pub mod test {
    use super::*;

    #[test]
    fn test_snippet_respects_char_boundaries() {
        let short = "body";
        assert_eq!(snippet(short), "body");

        let long = "é".repeat(300);
        let cut = snippet(&long);
        assert_eq!(cut.chars().count(), 200);
    }

    #[test]
    fn test_invoke_check_isolates_unknown_identifier() {
        let registry = Registry::with_builtins();
        let parameters = ParameterMap::new();
        let context = ProbeContext {
            resource_url: "https://example.org",
            parameters: &parameters,
            response: None,
        };
        let check = CheckConfig {
            check: "nope.missing".to_string(),
            parameters: ParameterMap::new(),
        };

        let outcome = invoke_check(&registry, &context, &check, None);
        assert!(!outcome.success);
        assert!(outcome.message.contains("nope.missing"));
    }

    #[test]
    fn test_invoke_check_appends_transport_context() {
        let registry = Registry::with_builtins();
        let parameters = ParameterMap::new();
        let context = ProbeContext {
            resource_url: "https://example.org",
            parameters: &parameters,
            response: None,
        };
        let check = CheckConfig {
            check: "http.status_code".to_string(),
            parameters: ParameterMap::new(),
        };

        let outcome = invoke_check(&registry, &context, &check, Some("connection refused"));
        assert!(!outcome.success);
        assert!(outcome.message.contains("no response available"));
        assert!(outcome.message.contains("connection refused"));
    }
}
