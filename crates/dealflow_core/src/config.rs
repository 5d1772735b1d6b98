//! Core runtime configuration.
//!
//! # Responsibility
//! - Describe how a `Crm` is wired: latency model, transition policy and log
//!   level.
//! - Parse and validate configuration documents before anything is built.
//!
//! # Invariants
//! - Every field has a default; an empty JSON object is a valid config.
//! - No config, validated or not, yields a latency model that panics.

use crate::logging::{default_log_level, normalize_level};
use crate::pipeline::TransitionPolicy;
use crate::service::latency::{LatencyModel, NoLatency, SimulatedLatency, MAX_LATENCY_SCALE};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Which latency model sits in front of the stores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LatencyProfile {
    /// Calls resolve without suspending.
    None,
    /// Calls sleep for per-operation nominal delays.
    #[default]
    Simulated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    pub latency: LatencyProfile,
    /// Multiplier applied to simulated delays. Ignored for `None`.
    pub latency_scale: f64,
    /// Reject moves out of Closed Won / Closed Lost.
    pub lock_terminal_stages: bool,
    pub log_level: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            latency: LatencyProfile::default(),
            latency_scale: 1.0,
            lock_terminal_stages: false,
            log_level: default_log_level().to_string(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    InvalidLatencyScale(f64),
    InvalidLogLevel(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid config document: {err}"),
            Self::InvalidLatencyScale(value) => write!(
                f,
                "latency_scale must be within 0..={MAX_LATENCY_SCALE}, got {value}"
            ),
            Self::InvalidLogLevel(message) => write!(f, "{message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl CoreConfig {
    /// Config for tests and probes: no latency, source transition rules.
    pub fn immediate() -> Self {
        Self {
            latency: LatencyProfile::None,
            ..Self::default()
        }
    }

    /// Parses a JSON document and validates it.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.latency_scale.is_finite()
            || self.latency_scale < 0.0
            || self.latency_scale > MAX_LATENCY_SCALE
        {
            return Err(ConfigError::InvalidLatencyScale(self.latency_scale));
        }
        normalize_level(&self.log_level)
            .map(|_| ())
            .map_err(|err| ConfigError::InvalidLogLevel(err.to_string()))
    }

    pub fn latency_model(&self) -> Arc<dyn LatencyModel> {
        match self.latency {
            LatencyProfile::None => Arc::new(NoLatency),
            LatencyProfile::Simulated => Arc::new(SimulatedLatency::scaled(self.latency_scale)),
        }
    }

    pub fn transition_policy(&self) -> TransitionPolicy {
        TransitionPolicy {
            lock_terminal_stages: self.lock_terminal_stages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig, LatencyProfile};

    #[test]
    fn empty_document_uses_defaults() {
        let config = CoreConfig::from_json_str("{}").unwrap();
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.latency, LatencyProfile::Simulated);
        assert!(!config.transition_policy().lock_terminal_stages);
    }

    #[test]
    fn parses_snake_case_fields() {
        let config = CoreConfig::from_json_str(
            r#"{"latency":"none","lock_terminal_stages":true,"log_level":"WARN"}"#,
        )
        .unwrap();
        assert_eq!(config.latency, LatencyProfile::None);
        assert!(config.transition_policy().lock_terminal_stages);
    }

    #[test]
    fn rejects_negative_scale_unknown_fields_and_bad_level() {
        assert!(matches!(
            CoreConfig::from_json_str(r#"{"latency_scale":-1.0}"#),
            Err(ConfigError::InvalidLatencyScale(_))
        ));
        assert!(matches!(
            CoreConfig::from_json_str(r#"{"latency_ms":5}"#),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            CoreConfig::from_json_str(r#"{"log_level":"loud"}"#),
            Err(ConfigError::InvalidLogLevel(_))
        ));
    }
}
