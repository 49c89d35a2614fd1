//! Built-in response checks.
//!
//! A check reads the probe context and its own parameters and reports
//! `(success, message)`. Returning `Err` marks that check failed with the
//! error text in the message; it never affects the other checks of the
//! run. Checks validate their own parameters.

use anyhow::{Context as _, bail};
use serde_json::Value;

use crate::config::model::ParameterMap;
use crate::probe::{HttpResponse, ProbeContext};
use crate::registry::Registry;

/// Signature every check implements: probe context plus declared
/// parameters in, success flag plus human-readable message out.
pub type CheckFn = fn(&ProbeContext<'_>, &ParameterMap) -> anyhow::Result<(bool, String)>;

/// Register every built-in check under its dotted identifier.
pub fn register_builtins(registry: &mut Registry) {
    registry.register_check("http.status_code", http_status_code);
    registry.register_check("content.contains", contains);
    registry.register_check("content.not_contains", not_contains);
    registry.register_check("content.no_ows_exception", no_ows_exception);
    registry.register_check("content.json_parsable", json_parsable);
}

/// Response status must be one of the expected codes. Defaults to 200.
pub fn http_status_code(
    context: &ProbeContext<'_>,
    parameters: &ParameterMap,
) -> anyhow::Result<(bool, String)> {
    let response = response(context)?;
    let expected = match parameters.get("expected") {
        None => vec![200],
        Some(value) => expected_codes(value)?,
    };

    if expected.contains(&response.status) {
        Ok((true, format!("status {} as expected", response.status)))
    } else {
        Ok((
            false,
            format!("status {} not in expected {:?}", response.status, expected),
        ))
    }
}

/// Response body must contain every string in the `strings` parameter.
pub fn contains(
    context: &ProbeContext<'_>,
    parameters: &ParameterMap,
) -> anyhow::Result<(bool, String)> {
    let response = response(context)?;
    let strings = string_list(parameters, "strings")?;

    for text in &strings {
        if !response.body.contains(text.as_str()) {
            return Ok((false, format!("response does not contain '{text}'")));
        }
    }
    Ok((true, format!("response contains all of {strings:?}")))
}

/// Response body must contain none of the strings in the `strings`
/// parameter.
pub fn not_contains(
    context: &ProbeContext<'_>,
    parameters: &ParameterMap,
) -> anyhow::Result<(bool, String)> {
    let response = response(context)?;
    let strings = string_list(parameters, "strings")?;

    for text in &strings {
        if response.body.contains(text.as_str()) {
            return Ok((false, format!("response contains forbidden '{text}'")));
        }
    }
    Ok((true, format!("response contains none of {strings:?}")))
}

const OWS_EXCEPTION_MARKERS: [&str; 3] = ["ExceptionReport", "ServiceException", "ows:Exception"];

/// Response body must not carry an OGC service exception. OWS services
/// report errors in-band with status 200, so a status check alone misses
/// them.
pub fn no_ows_exception(
    context: &ProbeContext<'_>,
    _parameters: &ParameterMap,
) -> anyhow::Result<(bool, String)> {
    let response = response(context)?;

    for marker in OWS_EXCEPTION_MARKERS {
        if response.body.contains(marker) {
            return Ok((false, format!("response contains OGC exception marker '{marker}'")));
        }
    }
    Ok((true, "no OGC exception in response".to_string()))
}

/// Response body must parse as JSON.
pub fn json_parsable(
    context: &ProbeContext<'_>,
    _parameters: &ParameterMap,
) -> anyhow::Result<(bool, String)> {
    let response = response(context)?;

    match serde_json::from_str::<Value>(&response.body) {
        Ok(_) => Ok((true, "response parses as JSON".to_string())),
        Err(err) => Ok((false, format!("response is not valid JSON: {err}"))),
    }
}

fn response<'a>(context: &ProbeContext<'a>) -> anyhow::Result<&'a HttpResponse> {
    context.response.context("no response available")
}

fn expected_codes(value: &Value) -> anyhow::Result<Vec<u16>> {
    match value {
        Value::Number(_) => Ok(vec![status_code(value)?]),
        Value::Array(items) => items.iter().map(status_code).collect(),
        other => bail!("'expected' must be a status code or list of codes, got {other}"),
    }
}

fn status_code(value: &Value) -> anyhow::Result<u16> {
    value
        .as_u64()
        .and_then(|code| u16::try_from(code).ok())
        .with_context(|| format!("invalid status code {value}"))
}

fn string_list(parameters: &ParameterMap, key: &str) -> anyhow::Result<Vec<String>> {
    let value = parameters
        .get(key)
        .with_context(|| format!("missing required parameter '{key}'"))?;

    match value {
        Value::String(text) => Ok(vec![text.clone()]),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(text) => Ok(text.clone()),
                other => bail!("parameter '{key}' must contain strings, got {other}"),
            })
            .collect(),
        other => bail!("parameter '{key}' must be a string or list of strings, got {other}"),
    }
}
