//! Test utilities and global setup
//!
//! Provides centralized test logging configuration and shared fixtures.

/// Test logging utilities
#[cfg(all(test, feature = "test-logging"))]
pub mod logging {
    use std::sync::Once;
    use tracing_subscriber::{EnvFilter, fmt};

    static INIT: Once = Once::new();

    /// Initialize test logging globally - safe to call multiple times
    ///
    /// Respects `RUST_LOG`, defaulting to debug for this crate, and writes
    /// through the test writer so output is captured per test.
    ///
    /// ```bash
    /// RUST_LOG=findings_bridge=trace cargo test --features test-logging
    /// ```
    pub fn init() {
        INIT.call_once(|| {
            let env_filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("findings_bridge=debug,info"));

            fmt()
                .with_env_filter(env_filter)
                .with_test_writer()
                .with_target(true)
                .compact()
                .try_init()
                .ok();
        });
    }

    #[ctor::ctor]
    fn init_test_logging() {
        init();
    }
}

/// Findings, URIs and a configurable session for consumer tests
#[cfg(test)]
pub mod fixtures {
    use std::str::FromStr;
    use std::sync::Arc;

    use lsp_types::Uri;

    use crate::config::FeedbackOptions;
    use crate::error::BridgeError;
    use crate::finding::{SourceRange, SourceSpan};
    use crate::session::SessionServices;
    use crate::uri::{UriMap, UriTranslator};

    /// Span covering columns 0..10 of `line` in `document`
    pub fn span(document: &str, line: u32) -> SourceSpan {
        SourceSpan::new(document, SourceRange::on_line(line, 0, 10))
    }

    pub fn uri(raw: &str) -> Uri {
        Uri::from_str(raw).unwrap()
    }

    /// Session services with switchable capabilities
    pub struct MockSession {
        translator: UriTranslator,
        rich_hover: bool,
        feedback: FeedbackOptions,
        source_label: String,
    }

    impl MockSession {
        pub fn new() -> Self {
            Self {
                translator: UriTranslator::new(Arc::new(UriMap::new())),
                rich_hover: false,
                feedback: FeedbackOptions::default(),
                source_label: "mock-engine".to_string(),
            }
        }

        pub fn with_rich_hover(mut self, enabled: bool) -> Self {
            self.rich_hover = enabled;
            self
        }

        pub fn with_feedback(mut self, feedback: FeedbackOptions) -> Self {
            self.feedback = feedback;
            self
        }

        pub fn with_mapping(self, server_uri: &str, client_uri: &str) -> Self {
            self.translator.map().register(server_uri, client_uri);
            self
        }
    }

    impl SessionServices for MockSession {
        fn translate_uri(&self, internal: &str) -> Result<Uri, BridgeError> {
            self.translator.to_client(internal)
        }

        fn supports_rich_hover(&self) -> bool {
            self.rich_hover
        }

        fn feedback_options(&self) -> FeedbackOptions {
            self.feedback
        }

        fn source_label(&self) -> &str {
            &self.source_label
        }
    }
}
