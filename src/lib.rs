//! Bridge from static-analysis findings to Language Server Protocol records
//!
//! Analysis engines push [`Finding`]s into per-surface consumers created from
//! a [`Session`]. The consumers translate engine document identifiers into
//! client URIs, build diagnostics, hovers, code lenses and code actions, and
//! index them in the session's [`StateStore`] for later protocol queries.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use findings_bridge::consumers::ResultSink;
//! use findings_bridge::{
//!     Finding, FindingKind, PublishedDiagnostics, Session, SessionConfig, Severity,
//! };
//!
//! let session = Arc::new(Session::new(SessionConfig::default(), Default::default()));
//! let published = Arc::new(PublishedDiagnostics::new());
//! let sink = session
//!     .consumer_factory()
//!     .create_diagnostic_consumer(published.clone(), "nullness");
//!
//! let position = "file:///src/A.java:4:1-11".parse().unwrap();
//! let finding = Finding::new(FindingKind::Diagnostic, position, Severity::Error, "null pointer");
//! sink.consume(&finding);
//! ```

pub mod actions;
pub mod config;
pub mod consumers;
pub mod error;
pub mod finding;
pub mod logging;
pub mod opener;
pub mod replay;
pub mod session;
pub mod store;
pub mod uri;

#[cfg(test)]
mod test_utils;

pub use config::{FeedbackOptions, SessionConfig, SessionConfigBuilder};
pub use consumers::{ResultConsumerFactory, ResultSink};
pub use error::{BridgeError, ConfigError};
pub use finding::{Finding, FindingKind, Severity, SourcePosition, SourceRange, SourceSpan};
pub use session::{Session, SessionServices};
pub use store::{PublishedDiagnostics, StateStore};
