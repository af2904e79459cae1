//! Diagnostics surface
//!
//! Every finding becomes one diagnostic. Quick fixes, engine commands and
//! feedback actions are registered next to it in the action registry, and
//! the document's deduplicated list is published into the caller's map.

use std::sync::Arc;

use lsp_types::{
    CodeAction, Diagnostic, DiagnosticRelatedInformation, Location, NumberOrString, Uri,
};
use tracing::debug;

use crate::actions::{self, BridgeCommand};
use crate::error::BridgeError;
use crate::finding::{Finding, SourceRange};
use crate::session::SessionServices;
use crate::store::{PublishedDiagnostics, StateStore};

use super::ResultSink;

pub struct DiagnosticSink {
    session: Arc<dyn SessionServices>,
    store: Arc<StateStore>,
    target: Arc<PublishedDiagnostics>,
    source: String,
}

impl DiagnosticSink {
    pub(super) fn new(
        session: Arc<dyn SessionServices>,
        store: Arc<StateStore>,
        target: Arc<PublishedDiagnostics>,
        source: String,
    ) -> Self {
        Self {
            session,
            store,
            target,
            source,
        }
    }

    /// Diagnostic record for `finding`
    fn build_diagnostic(&self, finding: &Finding) -> Diagnostic {
        let related_information = finding
            .related
            .iter()
            .filter_map(|related| {
                match self.session.translate_uri(&related.position.document) {
                    Ok(uri) => Some(DiagnosticRelatedInformation {
                        location: Location::new(uri, related.position.range.into()),
                        message: related.message.clone(),
                    }),
                    Err(e) => {
                        debug!("Skipping related information: {}", e);
                        None
                    }
                }
            })
            .collect();

        Diagnostic {
            range: finding.position.range.into(),
            severity: Some(finding.severity.into()),
            code: finding.code.clone().map(NumberOrString::String),
            code_description: None,
            source: Some(self.source.clone()),
            message: finding.render(false).to_string(),
            related_information: Some(related_information),
            tags: None,
            data: None,
        }
    }

    /// Actions offered for `diagnostic`, grouped by the range they are registered on
    fn build_actions(
        &self,
        finding: &Finding,
        diagnostic: &Diagnostic,
        client_uri: &Uri,
    ) -> Vec<(SourceRange, CodeAction)> {
        let diagnostic_range = finding.position.range;
        let mut result = Vec::new();

        if let Some(repair) = &finding.repair {
            let fix = actions::replace(
                actions::fix_title(&repair.replacement),
                repair.position.range.into(),
                &repair.replacement,
                client_uri,
                diagnostic,
            );
            result.push((repair.position.range, fix));
        } else {
            for command in &finding.commands {
                result.push((
                    diagnostic_range,
                    actions::informational(command, diagnostic),
                ));
            }
        }

        let feedback = self.session.feedback_options();
        if feedback.report_false_positive {
            let title = format!("Report it as false alarm ({}).", diagnostic.message);
            result.push((
                diagnostic_range,
                actions::invoke_command(
                    title,
                    client_uri,
                    diagnostic,
                    BridgeCommand::ReportFalsePositive,
                ),
            ));
        }
        if feedback.report_confusion {
            let title = format!(
                "I don't understand this warning message ({}).",
                diagnostic.message
            );
            result.push((
                diagnostic_range,
                actions::invoke_command(
                    title,
                    client_uri,
                    diagnostic,
                    BridgeCommand::ReportConfusion,
                ),
            ));
        }

        result
    }
}

impl ResultSink for DiagnosticSink {
    fn surface(&self) -> &'static str {
        "diagnostics"
    }

    fn try_consume(&self, finding: &Finding) -> Result<(), BridgeError> {
        // Translate before touching any collection so a bad URI leaves no trace.
        let client_uri = self.session.translate_uri(&finding.position.document)?;

        let diagnostic = self.build_diagnostic(finding);
        let added = self
            .store
            .publish_diagnostic(&client_uri, diagnostic, &self.target, |stored| {
                self.build_actions(finding, stored, &client_uri)
            });
        if !added {
            debug!("Duplicate diagnostic at {}", finding.position);
        }
        Ok(())
    }
}
