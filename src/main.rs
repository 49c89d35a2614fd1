use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error};
use reqwest::Client;

pub mod checks;
pub mod config;
pub mod probe;
pub mod probes;
pub mod registry;
pub mod result;
pub mod runner;

use config::app_config::load_config;
use registry::Registry;

/// Run every configured probe once and report. Cadence belongs to an
/// external scheduler; this process is a single pass.
#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    env_logger::init();

    let app = match load_config() {
        Ok(app) => app,
        Err(err) => {
            error!("cannot load configuration: {err}");
            return ExitCode::FAILURE;
        }
    };

    let client = match Client::builder()
        .timeout(Duration::from_secs(app.timeout_seconds))
        .user_agent(concat!("geoprobe/", env!("CARGO_PKG_VERSION")))
        .build()
    {
        Ok(client) => client,
        Err(err) => {
            error!("cannot build HTTP client: {err}");
            return ExitCode::FAILURE;
        }
    };

    let registry = Arc::new(Registry::with_builtins());
    debug!("registered probes: {:?}", registry.probe_identifiers());
    debug!("registered checks: {:?}", registry.check_identifiers());

    let outcomes = runner::run_resources(registry, client, &app).await;

    let mut failures = 0usize;
    for (config, outcome) in &outcomes {
        match outcome {
            Ok(result) => {
                let passed = result
                    .check_results()
                    .iter()
                    .filter(|check| check.success)
                    .count();
                let total = result.check_results().len();
                let duration_ms = result
                    .duration()
                    .map(|duration| duration.num_milliseconds())
                    .unwrap_or_default();

                if result.success() {
                    println!(
                        "✅ [{}] {} via {}: {passed}/{total} checks passed in {duration_ms}ms",
                        config.resource_name, config.resource_url, config.probe
                    );
                } else {
                    failures += 1;
                    println!(
                        "❌ [{}] {} via {}: {passed}/{total} checks passed in {duration_ms}ms",
                        config.resource_name, config.resource_url, config.probe
                    );
                    for check in result.check_results().iter().filter(|check| !check.success) {
                        println!("   failed {}: {}", check.check_identifier, check.message);
                    }
                }
            }
            Err(err) => {
                failures += 1;
                println!(
                    "❌ [{}] {} via {}: {err}",
                    config.resource_name, config.resource_url, config.probe
                );
            }
        }
    }

    if failures > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
