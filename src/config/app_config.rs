use std::env;
use std::fs;

use url::Url;

use super::ConfigError;
use super::model::AppConfig;

/// Load the application configuration from a YAML file.
/// The file location is taken from the `CONFIG_FILE` environment variable,
/// falling back to `config.yml` in the working directory.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let path = env::var("CONFIG_FILE").unwrap_or_else(|_| "config.yml".to_string());
    load_config_from(&path)
}

/// Load and validate a configuration file. Every resource URL must parse;
/// a bad URL is a configuration error, caught here rather than at request
/// time.
pub fn load_config_from(path: &str) -> Result<AppConfig, ConfigError> {
    let config_str = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_string(),
        source,
    })?;

    let config: AppConfig = serde_yaml::from_str(&config_str)?;

    for resource in &config.resources {
        Url::parse(&resource.url).map_err(|source| ConfigError::InvalidUrl {
            url: resource.url.clone(),
            source,
        })?;
    }

    log::info!("Loaded {} resource(s) from {path}", config.resources.len());

    Ok(config)
}

#[cfg(test)]
pub mod test {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config_from("/nonexistent/config.yml");
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        writeln!(
            file,
            r#"
timeout_seconds: 5
resources:
  - name: Demo
    url: https://example.org/wms
    probes:
      - probe: http.get
"#
        )
        .expect("Failed to write temp file");

        let config = load_config_from(file.path().to_str().unwrap()).expect("Load failed");
        assert_eq!(config.timeout_seconds, 5);
        assert_eq!(config.resources.len(), 1);
        assert_eq!(config.resources[0].probes[0].probe, "http.get");
    }

    #[test]
    fn test_load_config_rejects_bad_url() {
        let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        writeln!(
            file,
            r#"
resources:
  - name: Broken
    url: "not a url"
    probes: []
"#
        )
        .expect("Failed to write temp file");

        let result = load_config_from(file.path().to_str().unwrap());
        assert!(matches!(result, Err(ConfigError::InvalidUrl { .. })));
    }
}
