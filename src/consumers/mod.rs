//! Result consumers
//!
//! One sink per protocol surface. Each sink holds an explicit reference to
//! the owning session's services and state store, turns a [`Finding`] into
//! protocol records and indexes them. A finding that cannot be converted is
//! logged and dropped; it never affects other findings.
//!
//! - **DiagnosticSink**: diagnostics plus their quick fixes and feedback actions
//! - **HoverSink**: position-ordered hover table
//! - **CodeLensSink**: lens per finding, from its repair or first command
//! - **FindingRouter**: dispatches findings to sinks by [`FindingKind`]

pub mod code_lens;
pub mod diagnostics;
pub mod hover;

use std::sync::Arc;

use tracing::{Level, error};

use crate::error::BridgeError;
use crate::finding::{Finding, FindingKind};
use crate::log_finding;
use crate::session::SessionServices;
use crate::store::{PublishedDiagnostics, StateStore};

pub use code_lens::CodeLensSink;
pub use diagnostics::DiagnosticSink;
pub use hover::HoverSink;

// ============================================================================
// Result Sink Trait
// ============================================================================

/// Consumer of findings for one protocol surface
pub trait ResultSink: Send + Sync {
    /// Surface name used in log events
    fn surface(&self) -> &'static str;

    /// Convert and index `finding`, reporting why it was rejected
    fn try_consume(&self, finding: &Finding) -> Result<(), BridgeError>;

    /// Convert and index `finding`; failures are logged, never returned
    fn consume(&self, finding: &Finding) {
        match self.try_consume(finding) {
            Ok(()) => log_finding!(Level::TRACE, self.surface(), finding, "accepted"),
            Err(e) => error!(
                surface = self.surface(),
                position = %finding.position,
                "Dropping finding: {}",
                e
            ),
        }
    }
}

// ============================================================================
// Result Consumer Factory
// ============================================================================

/// Builds sinks bound to one session
#[derive(Clone)]
pub struct ResultConsumerFactory {
    session: Arc<dyn SessionServices>,
    store: Arc<StateStore>,
}

impl ResultConsumerFactory {
    pub fn new(session: Arc<dyn SessionServices>, store: Arc<StateStore>) -> Self {
        Self { session, store }
    }

    /// Diagnostics sink publishing each touched document's list into `target`
    pub fn create_diagnostic_consumer(
        &self,
        target: Arc<PublishedDiagnostics>,
        source: impl Into<String>,
    ) -> DiagnosticSink {
        DiagnosticSink::new(
            self.session.clone(),
            self.store.clone(),
            target,
            source.into(),
        )
    }

    pub fn create_hover_consumer(&self) -> HoverSink {
        HoverSink::new(self.session.clone(), self.store.clone())
    }

    pub fn create_code_lens_consumer(&self) -> CodeLensSink {
        CodeLensSink::new(self.session.clone(), self.store.clone())
    }

    /// Router feeding every surface, with diagnostics labelled by the session
    pub fn create_router(&self, target: Arc<PublishedDiagnostics>) -> FindingRouter {
        let source = self.session.source_label().to_string();
        FindingRouter {
            diagnostics: self.create_diagnostic_consumer(target, source),
            hover: self.create_hover_consumer(),
            code_lens: self.create_code_lens_consumer(),
        }
    }
}

// ============================================================================
// Finding Router
// ============================================================================

/// Dispatches each finding to the sink matching its kind
pub struct FindingRouter {
    diagnostics: DiagnosticSink,
    hover: HoverSink,
    code_lens: CodeLensSink,
}

impl FindingRouter {
    pub fn sink_for(&self, kind: FindingKind) -> &dyn ResultSink {
        match kind {
            FindingKind::Diagnostic => &self.diagnostics,
            FindingKind::Hover => &self.hover,
            FindingKind::CodeLens => &self.code_lens,
        }
    }

    pub fn route(&self, finding: &Finding) {
        self.sink_for(finding.kind).consume(finding);
    }

    /// Route findings in order; returns how many were accepted
    pub fn route_all<'a>(&self, findings: impl IntoIterator<Item = &'a Finding>) -> usize {
        findings
            .into_iter()
            .filter(|finding| {
                let sink = self.sink_for(finding.kind);
                match sink.try_consume(finding) {
                    Ok(()) => true,
                    Err(e) => {
                        error!(
                            surface = sink.surface(),
                            position = %finding.position,
                            "Dropping finding: {}",
                            e
                        );
                        false
                    }
                }
            })
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::Severity;
    use crate::test_utils::fixtures::{MockSession, span, uri};

    fn finding(kind: FindingKind, document: &str, line: u32, message: &str) -> Finding {
        Finding::new(kind, span(document, line), Severity::Warning, message)
    }

    #[test]
    fn test_router_dispatches_by_kind() {
        let session = Arc::new(MockSession::new());
        let store = Arc::new(StateStore::new());
        let target = Arc::new(PublishedDiagnostics::new());
        let router =
            ResultConsumerFactory::new(session, store.clone()).create_router(target.clone());

        let findings = vec![
            finding(FindingKind::Diagnostic, "file:///a.c", 1, "diag"),
            finding(FindingKind::Hover, "file:///a.c", 2, "hover"),
            finding(FindingKind::CodeLens, "file:///a.c", 3, "lens")
                .with_repair(span("file:///a.c", 3), "x"),
        ];
        assert_eq!(router.route_all(&findings), 3);

        let uri = uri("file:///a.c");
        assert_eq!(store.diagnostics(&uri).len(), 1);
        assert_eq!(store.hovers(&uri).len(), 1);
        assert_eq!(store.code_lenses(&uri).len(), 1);
        assert_eq!(target.get(&uri).unwrap().len(), 1);
    }

    #[test]
    fn test_router_counts_rejected_findings() {
        let session = Arc::new(MockSession::new());
        let store = Arc::new(StateStore::new());
        let router = ResultConsumerFactory::new(session, store.clone())
            .create_router(Arc::new(PublishedDiagnostics::new()));

        let findings = vec![
            finding(FindingKind::CodeLens, "file:///a.c", 3, "bare"),
            finding(FindingKind::Diagnostic, "file:///a%FF.c", 1, "bad uri"),
            finding(FindingKind::Diagnostic, "file:///a.c", 1, "ok"),
        ];
        assert_eq!(router.route_all(&findings), 1);
        assert_eq!(store.documents().len(), 1);
    }
}
