//! Error types for the findings bridge
//!
//! Every error here is caught where it originates and logged. None of them is
//! allowed to reach the analysis engine that produced the finding.

use thiserror::Error;

/// Errors raised while turning a finding into protocol records
#[derive(Error, Debug)]
pub enum BridgeError {
    /// A document URI could not be percent-decoded or parsed
    #[error("Malformed URI '{uri}': {reason}")]
    MalformedUri { uri: String, reason: String },

    /// Local I/O failure while fetching or launching external content
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Remote content could not be fetched
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// A finding lacks a field the receiving surface requires
    #[error("Contract violation: {0}")]
    ContractViolation(String),
}

impl BridgeError {
    /// Create a malformed URI error
    pub fn malformed_uri(uri: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::MalformedUri {
            uri: uri.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a contract violation error
    pub fn contract_violation(message: impl Into<String>) -> Self {
        Self::ContractViolation(message.into())
    }
}

impl From<reqwest::Error> for BridgeError {
    fn from(error: reqwest::Error) -> Self {
        Self::Fetch(error.to_string())
    }
}

/// Session configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

impl ConfigError {
    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
