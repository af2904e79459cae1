//! Per-client session context
//!
//! A session owns the indexed state store for one connected client and
//! answers the few questions the consumers ask of the transport layer: how
//! to address a document, whether the client renders markdown hovers, and
//! which feedback actions to offer.

use std::sync::Arc;

use lsp_types::{ClientCapabilities, MarkupKind, Uri};

use crate::config::{FeedbackOptions, SessionConfig};
use crate::consumers::ResultConsumerFactory;
use crate::error::BridgeError;
use crate::store::StateStore;
use crate::uri::{UriMap, UriTranslator};

// ============================================================================
// Session Services Trait
// ============================================================================

/// Services the consumers need from the owning session
pub trait SessionServices: Send + Sync {
    /// Client-facing URI for an analysis-internal one
    fn translate_uri(&self, internal: &str) -> Result<Uri, BridgeError>;

    /// Client declared markdown in its hover content formats
    fn supports_rich_hover(&self) -> bool;

    fn feedback_options(&self) -> FeedbackOptions;

    /// Label written into the `source` field of diagnostics
    fn source_label(&self) -> &str;
}

// ============================================================================
// Session
// ============================================================================

/// State and capabilities of one connected client
pub struct Session {
    config: SessionConfig,
    capabilities: ClientCapabilities,
    translator: UriTranslator,
    store: Arc<StateStore>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("rich_hover", &self.supports_rich_hover())
            .field("uri_mappings", &self.translator.map().len())
            .finish()
    }
}

impl Session {
    pub fn new(config: SessionConfig, capabilities: ClientCapabilities) -> Self {
        Self::with_uri_map(config, capabilities, Arc::new(UriMap::new()))
    }

    /// Create a session sharing a URI map with the transport layer
    pub fn with_uri_map(
        config: SessionConfig,
        capabilities: ClientCapabilities,
        uri_map: Arc<UriMap>,
    ) -> Self {
        Self {
            config,
            capabilities,
            translator: UriTranslator::new(uri_map),
            store: Arc::new(StateStore::new()),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn uri_map(&self) -> &Arc<UriMap> {
        self.translator.map()
    }

    pub fn translator(&self) -> &UriTranslator {
        &self.translator
    }

    /// Read-only access for protocol query handlers
    pub fn store(&self) -> &Arc<StateStore> {
        &self.store
    }

    /// Client renders HTML pages pushed as messages
    pub fn supports_show_html(&self) -> bool {
        self.config.show_html_support
    }

    /// Factory producing consumers bound to this session's store
    pub fn consumer_factory(self: &Arc<Self>) -> ResultConsumerFactory {
        ResultConsumerFactory::new(self.clone(), self.store.clone())
    }
}

impl SessionServices for Session {
    fn translate_uri(&self, internal: &str) -> Result<Uri, BridgeError> {
        self.translator.to_client(internal)
    }

    fn supports_rich_hover(&self) -> bool {
        self.capabilities
            .text_document
            .as_ref()
            .and_then(|text_document| text_document.hover.as_ref())
            .and_then(|hover| hover.content_format.as_ref())
            .map(|formats| formats.contains(&MarkupKind::Markdown))
            .unwrap_or(false)
    }

    fn feedback_options(&self) -> FeedbackOptions {
        self.config.feedback
    }

    fn source_label(&self) -> &str {
        &self.config.source_label
    }
}

/// Client capabilities announcing the given hover content formats
pub fn hover_capabilities(formats: Vec<MarkupKind>) -> ClientCapabilities {
    ClientCapabilities {
        text_document: Some(lsp_types::TextDocumentClientCapabilities {
            hover: Some(lsp_types::HoverClientCapabilities {
                dynamic_registration: Some(false),
                content_format: Some(formats),
            }),
            ..Default::default()
        }),
        ..Default::default()
    }
}
