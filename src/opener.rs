//! Showing external content to the user
//!
//! A page is either fetched and pushed to the client as a message, when the
//! client can render HTML inline, or handed to the operating system's default
//! viewer. Failures are logged here and never escape [`ContentOpener::show`].

use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lsp_types::{MessageType, ShowMessageParams};
use serde_json::Value;
use tokio::process::Command;
use tracing::{debug, error, info};

use crate::error::BridgeError;
use crate::uri::normalize_uri;

/// Upper bound for fetching remote content
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

// ============================================================================
// Collaborator Traits
// ============================================================================

/// Client able to render an HTML page sent as a message
#[async_trait]
pub trait HtmlClient: Send + Sync {
    async fn show_html(&self, params: ShowMessageParams) -> Result<(), BridgeError>;
}

/// Launcher for the system's default viewer
#[async_trait]
pub trait SystemViewer: Send + Sync {
    async fn browse(&self, uri: &str) -> Result<(), BridgeError>;
}

/// Opens URIs with `xdg-open`, `open` or `start` depending on the platform
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultViewer;

impl DefaultViewer {
    fn command_for(uri: &str) -> (&'static str, Vec<String>) {
        if cfg!(target_os = "macos") {
            ("open", vec![uri.to_string()])
        } else if cfg!(target_os = "windows") {
            (
                "cmd",
                vec![
                    "/C".to_string(),
                    "start".to_string(),
                    String::new(),
                    uri.to_string(),
                ],
            )
        } else {
            ("xdg-open", vec![uri.to_string()])
        }
    }
}

#[async_trait]
impl SystemViewer for DefaultViewer {
    async fn browse(&self, uri: &str) -> Result<(), BridgeError> {
        let (program, args) = Self::command_for(uri);
        debug!("Launching {} for {}", program, uri);

        let status = Command::new(program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await?;

        if status.success() {
            Ok(())
        } else {
            Err(BridgeError::Io(std::io::Error::other(format!(
                "{} exited with {}",
                program, status
            ))))
        }
    }
}

// ============================================================================
// Content Opener
// ============================================================================

pub struct ContentOpener {
    show_html_support: bool,
    client: Arc<dyn HtmlClient>,
    viewer: Arc<dyn SystemViewer>,
    http: reqwest::Client,
}

impl ContentOpener {
    /// Fails when the HTTP client cannot be set up, e.g. no TLS backend
    pub fn new(
        show_html_support: bool,
        client: Arc<dyn HtmlClient>,
        viewer: Arc<dyn SystemViewer>,
    ) -> Result<Self, BridgeError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            show_html_support,
            client,
            viewer,
            http,
        })
    }

    /// Show `uri` to the user; failures are logged only
    pub async fn show(&self, uri: &str) {
        if let Err(e) = self.try_show(uri).await {
            error!("Failed to show {}: {}", uri, e);
        }
    }

    pub async fn try_show(&self, uri: &str) -> Result<(), BridgeError> {
        let uri = normalize_uri(uri);
        if self.show_html_support {
            let content = self.fetch(&uri).await?;
            info!("Showing {} in client ({} bytes)", uri, content.len());
            self.client
                .show_html(ShowMessageParams {
                    typ: MessageType::INFO,
                    message: content,
                })
                .await
        } else {
            info!("Opening {} in system viewer", uri);
            self.viewer.browse(&uri).await
        }
    }

    /// Handle the open-URL command; the URI is the first argument
    pub async fn execute_open_url(&self, arguments: &[Value]) {
        match arguments.first() {
            Some(Value::String(uri)) => self.show(uri).await,
            other => error!("Open URL command expects a URI argument, got {:?}", other),
        }
    }

    async fn fetch(&self, uri: &str) -> Result<String, BridgeError> {
        if let Some(path) = uri.strip_prefix("file://") {
            let path =
                urlencoding::decode(path).map_err(|e| BridgeError::malformed_uri(uri, e))?;
            Ok(tokio::fs::read_to_string(path.as_ref()).await?)
        } else if uri.starts_with("http://") || uri.starts_with("https://") {
            let response = self.http.get(uri).send().await?.error_for_status()?;
            Ok(response.text().await?)
        } else {
            Err(BridgeError::Fetch(format!("unsupported scheme in {}", uri)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingClient {
        messages: Mutex<Vec<ShowMessageParams>>,
    }

    #[async_trait]
    impl HtmlClient for RecordingClient {
        async fn show_html(&self, params: ShowMessageParams) -> Result<(), BridgeError> {
            self.messages.lock().unwrap().push(params);
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingViewer {
        opened: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SystemViewer for RecordingViewer {
        async fn browse(&self, uri: &str) -> Result<(), BridgeError> {
            self.opened.lock().unwrap().push(uri.to_string());
            Ok(())
        }
    }

    fn opener(show_html: bool) -> (Arc<RecordingClient>, Arc<RecordingViewer>, ContentOpener) {
        let client = Arc::new(RecordingClient::default());
        let viewer = Arc::new(RecordingViewer::default());
        let opener = ContentOpener::new(show_html, client.clone(), viewer.clone()).unwrap();
        (client, viewer, opener)
    }

    #[tokio::test]
    async fn test_inline_client_receives_file_content() {
        let dir = tempfile::tempdir().unwrap();
        let page = dir.path().join("explain.html");
        std::fs::write(&page, "<h1>Null dereference</h1>").unwrap();

        let (client, viewer, opener) = opener(true);
        opener
            .try_show(&format!("file://{}", page.display()))
            .await
            .unwrap();

        let messages = client.messages.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].typ, MessageType::INFO);
        assert_eq!(messages[0].message, "<h1>Null dereference</h1>");
        assert!(viewer.opened.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_without_inline_support_uses_viewer() {
        let (client, viewer, opener) = opener(false);
        opener.show("file:/docs/rule.html").await;

        assert_eq!(
            *viewer.opened.lock().unwrap(),
            vec!["file:///docs/rule.html".to_string()]
        );
        assert!(client.messages.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error_and_show_swallows_it() {
        let dir = tempfile::tempdir().unwrap();
        let missing = format!("file://{}/absent.html", dir.path().display());
        let (client, _viewer, opener) = opener(true);

        assert!(matches!(
            opener.try_show(&missing).await,
            Err(BridgeError::Io(_))
        ));
        opener.show(&missing).await;
        assert!(client.messages.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_scheme_is_fetch_error() {
        let (_client, _viewer, opener) = opener(true);
        assert!(matches!(
            opener.try_show("ftp://example.org/x").await,
            Err(BridgeError::Fetch(_))
        ));
    }

    #[tokio::test]
    async fn test_execute_open_url_takes_first_string_argument() {
        let (_client, viewer, opener) = opener(false);
        opener
            .execute_open_url(&[Value::String("https://example.org/rule".into())])
            .await;
        opener.execute_open_url(&[Value::Bool(true)]).await;
        opener.execute_open_url(&[]).await;

        assert_eq!(
            *viewer.opened.lock().unwrap(),
            vec!["https://example.org/rule".to_string()]
        );
    }
}
