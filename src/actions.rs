//! Code action and command construction
//!
//! Pure constructors only. Registering an action against a document range is
//! the caller's job, so nothing here touches session state.

use std::collections::HashMap;
use std::fmt;

use lsp_types::{
    CodeAction, CodeActionKind, Command, Diagnostic, Range, TextEdit, Uri, WorkspaceEdit,
};
use serde_json::Value;

/// Kind given to actions that only wrap an engine-provided command
pub const INFO_KIND: CodeActionKind = CodeActionKind::new("info");

/// Commands the bridge itself knows how to execute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BridgeCommand {
    /// Apply a literal replacement: `[uri, range, text]`
    Fix,
    /// Report a diagnostic as a false alarm: `[uri, diagnostic]`
    ReportFalsePositive,
    /// Report a confusing diagnostic message: `[uri, diagnostic]`
    ReportConfusion,
    /// Show a page in the client or a browser: `[uri]`
    OpenUrl,
}

impl BridgeCommand {
    pub const ALL: [BridgeCommand; 4] = [
        BridgeCommand::Fix,
        BridgeCommand::ReportFalsePositive,
        BridgeCommand::ReportConfusion,
        BridgeCommand::OpenUrl,
    ];

    /// Wire identifier used in `workspace/executeCommand`
    pub fn id(self) -> &'static str {
        match self {
            BridgeCommand::Fix => "bridge.fix",
            BridgeCommand::ReportFalsePositive => "bridge.reportFalsePositive",
            BridgeCommand::ReportConfusion => "bridge.reportConfusion",
            BridgeCommand::OpenUrl => "bridge.openUrl",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|command| command.id() == id)
    }
}

impl fmt::Display for BridgeCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Title of the quick fix offered for a repair
pub fn fix_title(replacement: &str) -> String {
    format!("Fix: replace it with {}", replacement)
}

/// Quick fix replacing `range` in `target_uri` with `replacement`
pub fn replace(
    title: impl Into<String>,
    range: Range,
    replacement: &str,
    target_uri: &Uri,
    diagnostic: &Diagnostic,
) -> CodeAction {
    let edit = TextEdit {
        range,
        new_text: replacement.to_string(),
    };
    let changes = HashMap::from([(target_uri.clone(), vec![edit])]);

    CodeAction {
        title: title.into(),
        kind: Some(CodeActionKind::QUICKFIX),
        diagnostics: Some(vec![diagnostic.clone()]),
        edit: Some(WorkspaceEdit {
            changes: Some(changes),
            ..Default::default()
        }),
        command: None,
        is_preferred: Some(true),
        disabled: None,
        data: None,
    }
}

/// Action invoking one of the bridge's own commands for a diagnostic
pub fn invoke_command(
    title: impl Into<String>,
    target_uri: &Uri,
    diagnostic: &Diagnostic,
    command: BridgeCommand,
) -> CodeAction {
    let title = title.into();
    let arguments = vec![
        Value::String(target_uri.as_str().to_string()),
        serde_json::to_value(diagnostic).unwrap_or_default(),
    ];

    CodeAction {
        title: title.clone(),
        kind: Some(CodeActionKind::QUICKFIX),
        diagnostics: Some(vec![diagnostic.clone()]),
        edit: None,
        command: Some(Command::new(title, command.id().to_string(), Some(arguments))),
        is_preferred: None,
        disabled: None,
        data: None,
    }
}

/// Action wrapping an engine-provided command as-is
pub fn informational(command: &Command, diagnostic: &Diagnostic) -> CodeAction {
    CodeAction {
        title: command.title.clone(),
        kind: Some(INFO_KIND),
        diagnostics: Some(vec![diagnostic.clone()]),
        edit: None,
        command: Some(command.clone()),
        is_preferred: None,
        disabled: None,
        data: None,
    }
}

/// Command carried by a fix code lens
pub fn fix_command(target_uri: &Uri, range: Range, replacement: &str) -> Command {
    let arguments = vec![
        Value::String(target_uri.as_str().to_string()),
        serde_json::to_value(range).unwrap_or_default(),
        Value::String(replacement.to_string()),
    ];
    Command::new("fix".to_string(), BridgeCommand::Fix.id().to_string(), Some(arguments))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lsp_types::Position;
    use std::str::FromStr;

    fn uri() -> Uri {
        Uri::from_str("file:///work/a.c").unwrap()
    }

    fn range() -> Range {
        Range::new(Position::new(3, 4), Position::new(3, 9))
    }

    fn diagnostic() -> Diagnostic {
        Diagnostic {
            range: range(),
            message: "null pointer".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_replace_builds_single_text_edit() {
        let action = replace(fix_title("y"), range(), "y", &uri(), &diagnostic());

        assert_eq!(action.title, "Fix: replace it with y");
        assert_eq!(action.kind, Some(CodeActionKind::QUICKFIX));
        assert_eq!(action.diagnostics.as_ref().unwrap().len(), 1);

        let changes = action.edit.unwrap().changes.unwrap();
        let edits = &changes[&uri()];
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].range, range());
        assert_eq!(edits[0].new_text, "y");
    }

    #[test]
    fn test_invoke_command_passes_uri_and_diagnostic() {
        let action = invoke_command(
            "Report it",
            &uri(),
            &diagnostic(),
            BridgeCommand::ReportFalsePositive,
        );
        let command = action.command.unwrap();
        assert_eq!(command.command, "bridge.reportFalsePositive");
        let arguments = command.arguments.unwrap();
        assert_eq!(arguments[0], Value::String("file:///work/a.c".to_string()));
        assert_eq!(arguments[1]["message"], "null pointer");
    }

    #[test]
    fn test_informational_wraps_command() {
        let command = Command::new("Explain".into(), "engine.explain".into(), None);
        let action = informational(&command, &diagnostic());
        assert_eq!(action.title, "Explain");
        assert_eq!(action.kind, Some(INFO_KIND));
        assert_eq!(action.command, Some(command));
    }

    #[test]
    fn test_fix_command_arguments() {
        let command = fix_command(&uri(), range(), "if (x != null)");
        assert_eq!(command.title, "fix");
        assert_eq!(BridgeCommand::from_id(&command.command), Some(BridgeCommand::Fix));
        let arguments = command.arguments.unwrap();
        assert_eq!(arguments.len(), 3);
        assert_eq!(arguments[1]["start"]["line"], 3);
        assert_eq!(arguments[2], "if (x != null)");
    }

    #[test]
    fn test_command_ids_round_trip() {
        for command in BridgeCommand::ALL {
            assert_eq!(BridgeCommand::from_id(command.id()), Some(command));
        }
        assert_eq!(BridgeCommand::from_id("unknown"), None);
    }
}
