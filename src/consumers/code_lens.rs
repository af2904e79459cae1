//! Code lens surface

use std::sync::Arc;

use lsp_types::CodeLens;

use crate::actions;
use crate::error::BridgeError;
use crate::finding::{Finding, Remediation};
use crate::session::SessionServices;
use crate::store::StateStore;

use super::ResultSink;

pub struct CodeLensSink {
    session: Arc<dyn SessionServices>,
    store: Arc<StateStore>,
}

impl CodeLensSink {
    pub(super) fn new(session: Arc<dyn SessionServices>, store: Arc<StateStore>) -> Self {
        Self { session, store }
    }
}

impl ResultSink for CodeLensSink {
    fn surface(&self) -> &'static str {
        "code_lens"
    }

    fn try_consume(&self, finding: &Finding) -> Result<(), BridgeError> {
        let client_uri = self.session.translate_uri(&finding.position.document)?;

        let command = match finding.remediation() {
            Some(Remediation::Fix(repair)) => actions::fix_command(
                &client_uri,
                repair.position.range.into(),
                &repair.replacement,
            ),
            Some(Remediation::Commands(commands)) => commands.first().cloned().ok_or_else(|| {
                BridgeError::contract_violation(format!(
                    "code lens finding at {} has an empty command list",
                    finding.position
                ))
            })?,
            None => {
                return Err(BridgeError::contract_violation(format!(
                    "code lens finding at {} has neither a repair nor commands",
                    finding.position
                )));
            }
        };

        self.store.add_code_lens(
            &client_uri,
            CodeLens {
                range: finding.position.range.into(),
                command: Some(command),
                data: None,
            },
        );
        Ok(())
    }
}
