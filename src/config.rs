//! Configuration for bridge sessions
//!
//! Provides SessionConfig with a validating builder and environment
//! overrides, mirroring how the server is configured from the command line.

use std::env;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ============================================================================
// Configuration Constants
// ============================================================================

/// Source label attached to diagnostics when none is configured
pub const DEFAULT_SOURCE_LABEL: &str = "findings-bridge";

// ============================================================================
// Core Configuration Types
// ============================================================================

/// Which feedback actions are offered next to every diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeedbackOptions {
    /// Offer "report as false alarm"
    pub report_false_positive: bool,
    /// Offer "I don't understand this message"
    pub report_confusion: bool,
}

/// Complete session configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Label written into the `source` field of every diagnostic
    pub source_label: String,

    /// Feedback actions to attach to diagnostics
    pub feedback: FeedbackOptions,

    /// Client can render HTML pages sent as messages
    pub show_html_support: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            source_label: DEFAULT_SOURCE_LABEL.to_string(),
            feedback: FeedbackOptions::default(),
            show_html_support: false,
        }
    }
}

impl SessionConfig {
    /// Create SessionConfig from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            source_label: env::var("BRIDGE_SOURCE").unwrap_or(defaults.source_label),
            feedback: FeedbackOptions {
                report_false_positive: env_flag("BRIDGE_REPORT_FALSE_POSITIVE"),
                report_confusion: env_flag("BRIDGE_REPORT_CONFUSION"),
            },
            show_html_support: env_flag("BRIDGE_SHOW_HTML"),
        }
    }
}

fn env_flag(name: &str) -> bool {
    env::var(name).unwrap_or_default() == "true"
}

// ============================================================================
// Configuration Builder
// ============================================================================

/// Builder for SessionConfig with validation and defaults
#[derive(Debug, Default)]
pub struct SessionConfigBuilder {
    source_label: Option<String>,
    report_false_positive: Option<bool>,
    report_confusion: Option<bool>,
    show_html_support: Option<bool>,
}

impl SessionConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration
    pub fn from_config(config: SessionConfig) -> Self {
        Self {
            source_label: Some(config.source_label),
            report_false_positive: Some(config.feedback.report_false_positive),
            report_confusion: Some(config.feedback.report_confusion),
            show_html_support: Some(config.show_html_support),
        }
    }

    /// Set the diagnostic source label
    pub fn source_label(mut self, label: impl Into<String>) -> Self {
        self.source_label = Some(label.into());
        self
    }

    /// Enable or disable the false positive feedback action
    pub fn report_false_positive(mut self, enabled: bool) -> Self {
        self.report_false_positive = Some(enabled);
        self
    }

    /// Enable or disable the confusion feedback action
    pub fn report_confusion(mut self, enabled: bool) -> Self {
        self.report_confusion = Some(enabled);
        self
    }

    /// Declare whether the client renders HTML messages inline
    pub fn show_html_support(mut self, enabled: bool) -> Self {
        self.show_html_support = Some(enabled);
        self
    }

    /// Build the configuration with validation
    pub fn build(self) -> Result<SessionConfig, ConfigError> {
        let source_label = self
            .source_label
            .unwrap_or_else(|| DEFAULT_SOURCE_LABEL.to_string());

        if source_label.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "source_label",
                "must not be empty",
            ));
        }

        Ok(SessionConfig {
            source_label,
            feedback: FeedbackOptions {
                report_false_positive: self.report_false_positive.unwrap_or(false),
                report_confusion: self.report_confusion.unwrap_or(false),
            },
            show_html_support: self.show_html_support.unwrap_or(false),
        })
    }
}
