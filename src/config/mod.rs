pub mod app_config;
pub mod model;

use thiserror::Error;

/// Configuration-shape errors. These make a run meaningless, so they are
/// surfaced to the caller instead of being folded into a failed result.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid resource url '{url}'")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("request template references '{{{key}}}' but no such parameter is configured (template: '{template}')")]
    MissingTemplateKey { key: String, template: String },

    #[error("request template has unbalanced braces: '{template}'")]
    MalformedTemplate { template: String },
}
