//! Entry points that drive probe runs.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use log::warn;
use reqwest::Client;

use crate::config::model::{AppConfig, ParameterMap, ProbeConfig};
use crate::probe::ProbeError;
use crate::probe::session::{ProbeSession, TRANSPORT_CHECK_ID};
use crate::registry::Registry;
use crate::result::{CheckResult, ProbeResult};

/// Run one probe to completion: resolve the probe type, initialize it,
/// drive the session, tear the probe down. `exit` runs exactly once
/// whether the run finished, hard-failed or hit its deadline.
pub async fn run_probe(
    registry: &Registry,
    client: &Client,
    config: &ProbeConfig,
    run_timeout: Option<Duration>,
) -> Result<ProbeResult, ProbeError> {
    let mut probe = registry.resolve_probe(&config.probe)?;
    probe
        .init(config)
        .await
        .map_err(|err| ProbeError::Init(format!("{err:#}")))?;

    let session = ProbeSession::new(probe.spec().clone(), config);
    let outcome = match run_timeout {
        None => session.execute(registry, client).await,
        Some(deadline) => {
            match tokio::time::timeout(deadline, session.execute(registry, client)).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    warn!(
                        "{}: run abandoned after {:.1}s",
                        config.probe,
                        deadline.as_secs_f64()
                    );
                    Ok(abandoned_result(config, deadline))
                }
            }
        }
    };

    probe.exit().await;
    outcome
}

/// Finalized result for a run abandoned at its deadline. The in-flight
/// session is dropped with whatever it had; the caller gets a single
/// synthesized transport outcome instead of a hang.
fn abandoned_result(config: &ProbeConfig, deadline: Duration) -> ProbeResult {
    let mut result = ProbeResult::new(&config.probe, &config.resource_url);
    result.start();
    result.stop();
    result.add_result(CheckResult::new(
        TRANSPORT_CHECK_ID,
        ParameterMap::new(),
        false,
        format!("run abandoned after {:.1}s deadline", deadline.as_secs_f64()),
    ));
    result
}

/// Fan independent runs out over a bounded worker pool. Runs share
/// nothing mutable; the bound keeps target services and the local
/// network stack from being overwhelmed.
pub async fn run_resources(
    registry: Arc<Registry>,
    client: Client,
    app: &AppConfig,
) -> Vec<(ProbeConfig, Result<ProbeResult, ProbeError>)> {
    let run_timeout = app.run_timeout_seconds.map(Duration::from_secs);
    let configs: Vec<ProbeConfig> = app
        .resources
        .iter()
        .flat_map(|resource| resource.probe_configs())
        .collect();

    stream::iter(configs)
        .map(|config| {
            let registry = Arc::clone(&registry);
            let client = client.clone();
            async move {
                let outcome = run_probe(&registry, &client, &config, run_timeout).await;
                (config, outcome)
            }
        })
        .buffer_unordered(app.max_concurrent_probes.max(1))
        .collect()
        .await
}
