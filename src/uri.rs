//! URI translation between analysis-internal and client-facing identifiers
//!
//! Analysis engines may address documents through synthetic or decoded URIs.
//! The transport layer registers the client's URI for every document it opens;
//! the bridge only ever looks mappings up, it never invents them.

use std::str::FromStr;
use std::sync::Arc;

use dashmap::DashMap;
use lsp_types::Uri;
use tracing::trace;

use crate::error::BridgeError;

// ============================================================================
// URI Map
// ============================================================================

/// Concurrent registry of server-side to client-side document URIs
#[derive(Debug, Default)]
pub struct UriMap {
    server_to_client: DashMap<String, String>,
    client_to_server: DashMap<String, String>,
}

impl UriMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `server_uri` is shown to the client as `client_uri`
    pub fn register(&self, server_uri: impl Into<String>, client_uri: impl Into<String>) {
        let server_uri = server_uri.into();
        let client_uri = client_uri.into();
        trace!("Registering URI mapping {} -> {}", server_uri, client_uri);
        self.client_to_server
            .insert(client_uri.clone(), server_uri.clone());
        self.server_to_client.insert(server_uri, client_uri);
    }

    /// Client URI for a server URI; unmapped URIs are their own client URI
    pub fn client_uri(&self, server_uri: &str) -> String {
        self.server_to_client
            .get(server_uri)
            .map(|entry| entry.value().clone())
            .unwrap_or_else(|| server_uri.to_string())
    }

    /// Server URI for a client URI; unmapped URIs are their own server URI
    pub fn server_uri(&self, client_uri: &str) -> String {
        self.client_to_server
            .get(client_uri)
            .map(|entry| entry.value().clone())
            .unwrap_or_else(|| client_uri.to_string())
    }

    pub fn len(&self) -> usize {
        self.server_to_client.len()
    }

    pub fn is_empty(&self) -> bool {
        self.server_to_client.is_empty()
    }
}

// ============================================================================
// URI Translator
// ============================================================================

/// Validating lookup on top of a [`UriMap`]
#[derive(Debug, Clone, Default)]
pub struct UriTranslator {
    map: Arc<UriMap>,
}

impl UriTranslator {
    pub fn new(map: Arc<UriMap>) -> Self {
        Self { map }
    }

    pub fn map(&self) -> &Arc<UriMap> {
        &self.map
    }

    /// Translate an analysis-internal URI into the client-facing one.
    ///
    /// The looked-up URI is percent-decoded and checked before use. The
    /// returned value keeps the client's own encoding so that it matches the
    /// identifiers the client sends back in requests.
    pub fn to_client(&self, internal: &str) -> Result<Uri, BridgeError> {
        let client = self.map.client_uri(internal);
        parse_checked(&client)
    }

    /// Translate a client-facing URI back into the analysis-internal one
    pub fn to_server(&self, client: &Uri) -> String {
        self.map.server_uri(client.as_str())
    }
}

/// Percent-decode and validate `raw`, then parse it as a protocol URI
pub fn parse_checked(raw: &str) -> Result<Uri, BridgeError> {
    let decoded = urlencoding::decode(raw).map_err(|e| BridgeError::malformed_uri(raw, e))?;
    validate_scheme(&decoded).map_err(|reason| BridgeError::malformed_uri(raw, reason))?;
    Uri::from_str(raw).map_err(|e| BridgeError::malformed_uri(raw, e))
}

fn validate_scheme(uri: &str) -> Result<(), &'static str> {
    let Some((scheme, _)) = uri.split_once(':') else {
        return Err("missing scheme");
    };
    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return Err("scheme must start with a letter"),
    }
    if chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) {
        Ok(())
    } else {
        Err("invalid character in scheme")
    }
}

/// Repair the single-slash `file:/path` form some platforms produce
pub fn normalize_uri(uri: &str) -> String {
    match uri.strip_prefix("file:/") {
        Some(rest) if !rest.starts_with('/') => format!("file:///{}", rest),
        _ => uri.to_string(),
    }
}
