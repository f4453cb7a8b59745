//! Config loading from JSON5 files.

use crate::{ConfigError, FrontdeskConfig};
use log::{debug, info};
use std::fs;
use std::path::Path;

impl FrontdeskConfig {
    /// Load and validate a config from a JSON5 file.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        info!("loading config from path: {}", path.as_ref().display());
        let contents = fs::read_to_string(path)?;
        Self::load_from_str(&contents)
    }

    /// Load and validate a config from JSON5 contents.
    pub fn load_from_str(contents: &str) -> Result<Self, ConfigError> {
        debug!("loading config from raw contents (len={})", contents.len());
        let config: FrontdeskConfig = json5::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration invariants that cannot be expressed in serde.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(invalid("server.port", "port must be non-zero"));
        }
        if self.faq.match_threshold == 0 {
            return Err(invalid("faq.match_threshold", "threshold must be at least 1"));
        }
        if self.history.ttl_secs == 0 {
            return Err(invalid("history.ttl_secs", "ttl must be non-zero"));
        }
        if self.llm.provider.trim().is_empty() {
            return Err(invalid("llm.provider", "provider must not be empty"));
        }
        if self.llm.model.trim().is_empty() {
            return Err(invalid("llm.model", "model must not be empty"));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(invalid("llm.temperature", "temperature must be between 0 and 2"));
        }
        if self.llm.context_window == 0 {
            return Err(invalid("llm.context_window", "context window must be non-zero"));
        }
        if self.sessions.sweep_interval_secs == 0 {
            return Err(invalid("sessions.sweep_interval_secs", "interval must be non-zero"));
        }
        if self.escalation.user_phrases.is_empty() {
            return Err(invalid("escalation.user_phrases", "phrase list must not be empty"));
        }
        if self.escalation.response_phrases.is_empty() {
            return Err(invalid(
                "escalation.response_phrases",
                "phrase list must not be empty",
            ));
        }
        Ok(())
    }
}

fn invalid(path: &str, message: &str) -> ConfigError {
    ConfigError::InvalidField {
        path: path.to_string(),
        message: message.to_string(),
    }
}
