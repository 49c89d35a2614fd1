//! Request template rendering.
//!
//! Probe types declare a request template with `{name}` placeholders,
//! filled from the probe type's parameter defaults overlaid by the
//! configured parameters. Rendering happens before any network call, so a
//! missing placeholder key can never produce a partial request on the wire.

use serde_json::Value;

use super::ProbeSpec;
use crate::config::ConfigError;
use crate::config::model::ParameterMap;

/// Merge a probe type's parameter defaults with the configured parameters.
/// Configured values win.
pub fn merge_parameters(spec: &ProbeSpec, configured: &ParameterMap) -> ParameterMap {
    let mut merged: ParameterMap = spec
        .param_defaults
        .iter()
        .map(|(key, value)| ((*key).to_string(), Value::String((*value).to_string())))
        .collect();
    for (key, value) in configured {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Substitute every `{name}` placeholder in `template` with the matching
/// parameter value. `{{` and `}}` are literal braces.
pub fn render(template: &str, parameters: &ParameterMap) -> Result<String, ConfigError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    loop {
        let Some(pos) = rest.find(['{', '}']) else {
            out.push_str(rest);
            return Ok(out);
        };

        out.push_str(&rest[..pos]);
        let delimiter = rest.as_bytes()[pos];
        let after = &rest[pos + 1..];

        if delimiter == b'{' {
            if let Some(stripped) = after.strip_prefix('{') {
                out.push('{');
                rest = stripped;
                continue;
            }
            let end = after.find('}').ok_or_else(|| malformed(template))?;
            let key = &after[..end];
            let value = parameters
                .get(key)
                .ok_or_else(|| ConfigError::MissingTemplateKey {
                    key: key.to_string(),
                    template: template.to_string(),
                })?;
            out.push_str(&value_text(value));
            rest = &after[end + 1..];
        } else {
            let Some(stripped) = after.strip_prefix('}') else {
                return Err(malformed(template));
            };
            out.push('}');
            rest = stripped;
        }
    }
}

fn malformed(template: &str) -> ConfigError {
    ConfigError::MalformedTemplate {
        template: template.to_string(),
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
pub mod test {
    use super::*;
    use crate::probe::RequestMethod;

    fn parameters(pairs: &[(&str, Value)]) -> ParameterMap {
        pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn test_render_substitutes_parameters() {
        let params = parameters(&[
            ("service", Value::String("WMS".to_string())),
            ("version", Value::String("1.3.0".to_string())),
        ]);
        let rendered = render(
            "SERVICE={service}&VERSION={version}&REQUEST=GetCapabilities",
            &params,
        )
        .expect("render");
        assert_eq!(rendered, "SERVICE=WMS&VERSION=1.3.0&REQUEST=GetCapabilities");
    }

    #[test]
    fn test_render_empty_template() {
        assert_eq!(render("", &ParameterMap::new()).expect("render"), "");
    }

    #[test]
    fn test_render_non_string_values() {
        let params = parameters(&[("count", Value::from(10))]);
        assert_eq!(render("MAXFEATURES={count}", &params).expect("render"), "MAXFEATURES=10");
    }

    #[test]
    fn test_render_missing_key_is_config_error() {
        let result = render("SERVICE={service}", &ParameterMap::new());
        match result {
            Err(ConfigError::MissingTemplateKey { key, .. }) => assert_eq!(key, "service"),
            other => panic!("expected MissingTemplateKey, got {other:?}"),
        }
    }

    #[test]
    fn test_render_escaped_braces() {
        let rendered = render("{{\"key\": \"value\"}}", &ParameterMap::new()).expect("render");
        assert_eq!(rendered, "{\"key\": \"value\"}");
    }

    #[test]
    fn test_render_unbalanced_braces() {
        assert!(matches!(
            render("SERVICE={service", &ParameterMap::new()),
            Err(ConfigError::MalformedTemplate { .. })
        ));
        assert!(matches!(
            render("SERVICE=}", &ParameterMap::new()),
            Err(ConfigError::MalformedTemplate { .. })
        ));
    }

    #[test]
    fn test_merge_parameters_configured_wins() {
        let spec = ProbeSpec {
            name: "test",
            description: "test",
            resource_type: "*",
            method: RequestMethod::Get,
            request_template: "VERSION={version}",
            request_headers: &[],
            param_defaults: &[("version", "1.1.1"), ("service", "WMS")],
        };
        let configured = parameters(&[("version", Value::String("1.3.0".to_string()))]);

        let merged = merge_parameters(&spec, &configured);
        assert_eq!(merged.get("version"), Some(&Value::String("1.3.0".to_string())));
        assert_eq!(merged.get("service"), Some(&Value::String("WMS".to_string())));
    }
}
