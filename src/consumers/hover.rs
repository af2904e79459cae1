//! Hover surface

use std::sync::Arc;

use lsp_types::{Hover, HoverContents, MarkedString, MarkupContent, MarkupKind};

use crate::error::BridgeError;
use crate::finding::Finding;
use crate::session::SessionServices;
use crate::store::StateStore;

use super::ResultSink;

pub struct HoverSink {
    session: Arc<dyn SessionServices>,
    store: Arc<StateStore>,
}

impl HoverSink {
    pub(super) fn new(session: Arc<dyn SessionServices>, store: Arc<StateStore>) -> Self {
        Self { session, store }
    }

    /// Markdown as one block for rich clients, otherwise one plain block per line.
    ///
    /// Some clients reject embedded newlines inside a single plain block.
    fn contents(&self, finding: &Finding) -> HoverContents {
        if self.session.supports_rich_hover() {
            HoverContents::Markup(MarkupContent {
                kind: MarkupKind::Markdown,
                value: finding.render(true).to_string(),
            })
        } else {
            let mut blocks: Vec<MarkedString> = finding
                .render(false)
                .lines()
                .map(|line| MarkedString::String(line.to_string()))
                .collect();
            // An empty message still gets a block.
            if blocks.is_empty() {
                blocks.push(MarkedString::String(String::new()));
            }
            HoverContents::Array(blocks)
        }
    }
}

impl ResultSink for HoverSink {
    fn surface(&self) -> &'static str {
        "hover"
    }

    fn try_consume(&self, finding: &Finding) -> Result<(), BridgeError> {
        let client_uri = self.session.translate_uri(&finding.position.document)?;
        let position = finding.position.with_document(client_uri.as_str());

        let hover = Hover {
            contents: self.contents(finding),
            range: Some(position.range.into()),
        };
        self.store.insert_hover(&client_uri, position.range.start, hover);
        Ok(())
    }
}

/// Number of content blocks in a hover
pub fn content_blocks(contents: &HoverContents) -> usize {
    match contents {
        HoverContents::Scalar(_) | HoverContents::Markup(_) => 1,
        HoverContents::Array(blocks) => blocks.len(),
    }
}
