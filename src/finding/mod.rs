//! Analysis findings
//!
//! A [`Finding`] is the unit of input to the bridge: one issue reported by an
//! analysis engine, addressed with the engine's own document identifiers.
//! The [`location`] module maps engine positions onto protocol ranges.

pub mod location;

use lsp_types::{Command, DiagnosticSeverity};
use serde::{Deserialize, Serialize};

pub use location::{SourcePosition, SourceRange, SourceSpan};

/// Severity reported by the analysis engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

impl From<Severity> for DiagnosticSeverity {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Error => DiagnosticSeverity::ERROR,
            Severity::Warning => DiagnosticSeverity::WARNING,
            Severity::Info => DiagnosticSeverity::INFORMATION,
            Severity::Hint => DiagnosticSeverity::HINT,
        }
    }
}

/// Protocol surface a finding is meant for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    #[default]
    Diagnostic,
    Hover,
    CodeLens,
}

/// Secondary location explaining a finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedInfo {
    pub position: SourceSpan,
    pub message: String,
}

/// Literal text substitution that fixes a finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repair {
    pub position: SourceSpan,
    pub replacement: String,
}

/// Primary remediation path of a finding, as seen by the code lens surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Remediation<'a> {
    Fix(&'a Repair),
    Commands(&'a [Command]),
}

/// One issue reported by an analysis engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    #[serde(default)]
    pub kind: FindingKind,
    pub position: SourceSpan,
    pub severity: Severity,
    /// Plain-text message
    pub message: String,
    /// Optional markdown rendition of the message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markdown: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<RelatedInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repair: Option<Repair>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<Command>,
}

impl Finding {
    pub fn new(
        kind: FindingKind,
        position: SourceSpan,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            position,
            severity,
            message: message.into(),
            markdown: None,
            code: None,
            related: Vec::new(),
            repair: None,
            commands: Vec::new(),
        }
    }

    pub fn with_markdown(mut self, markdown: impl Into<String>) -> Self {
        self.markdown = Some(markdown.into());
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_related(mut self, position: SourceSpan, message: impl Into<String>) -> Self {
        self.related.push(RelatedInfo {
            position,
            message: message.into(),
        });
        self
    }

    pub fn with_repair(mut self, position: SourceSpan, replacement: impl Into<String>) -> Self {
        self.repair = Some(Repair {
            position,
            replacement: replacement.into(),
        });
        self
    }

    pub fn with_command(mut self, command: Command) -> Self {
        self.commands.push(command);
        self
    }

    /// Message text, in markdown when asked for and available
    pub fn render(&self, markdown: bool) -> &str {
        match (&self.markdown, markdown) {
            (Some(rich), true) => rich,
            _ => &self.message,
        }
    }

    /// The remediation a code lens is built from; a repair takes precedence
    pub fn remediation(&self) -> Option<Remediation<'_>> {
        if let Some(repair) = &self.repair {
            Some(Remediation::Fix(repair))
        } else if !self.commands.is_empty() {
            Some(Remediation::Commands(&self.commands))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position() -> SourceSpan {
        SourceSpan::new("file:///a.c", SourceRange::on_line(2, 0, 4))
    }

    #[test]
    fn test_render_prefers_markdown_only_when_requested() {
        let finding = Finding::new(FindingKind::Hover, position(), Severity::Info, "plain")
            .with_markdown("**rich**");
        assert_eq!(finding.render(true), "**rich**");
        assert_eq!(finding.render(false), "plain");

        let plain_only = Finding::new(FindingKind::Hover, position(), Severity::Info, "plain");
        assert_eq!(plain_only.render(true), "plain");
    }

    #[test]
    fn test_remediation_prefers_repair() {
        let command = Command::new("Explain".into(), "explain".into(), None);
        let finding = Finding::new(FindingKind::CodeLens, position(), Severity::Hint, "m")
            .with_command(command.clone())
            .with_repair(position(), "x");
        assert!(matches!(finding.remediation(), Some(Remediation::Fix(_))));

        let commands_only = Finding::new(FindingKind::CodeLens, position(), Severity::Hint, "m")
            .with_command(command);
        match commands_only.remediation() {
            Some(Remediation::Commands(commands)) => assert_eq!(commands.len(), 1),
            other => panic!("unexpected remediation: {:?}", other),
        }

        let bare = Finding::new(FindingKind::CodeLens, position(), Severity::Hint, "m");
        assert!(bare.remediation().is_none());
    }

    #[test]
    fn test_deserialize_finding_from_json() {
        let json = r#"{
            "kind": "code_lens",
            "position": "file:///a.c:3:1-10",
            "severity": "warning",
            "message": "unused value",
            "code": "W042",
            "repair": {"position": "file:///a.c:3:1-10", "replacement": "_value"}
        }"#;
        let finding: Finding = serde_json::from_str(json).unwrap();
        assert_eq!(finding.kind, FindingKind::CodeLens);
        assert_eq!(finding.severity, Severity::Warning);
        assert_eq!(finding.code.as_deref(), Some("W042"));
        assert_eq!(finding.position.range, SourceRange::on_line(2, 0, 9));
        assert_eq!(finding.repair.unwrap().replacement, "_value");
        assert!(finding.commands.is_empty());
    }

    #[test]
    fn test_kind_defaults_to_diagnostic() {
        let json = r#"{"position": "file:///a.c:1:1", "severity": "error", "message": "m"}"#;
        let finding: Finding = serde_json::from_str(json).unwrap();
        assert_eq!(finding.kind, FindingKind::Diagnostic);
    }

    #[test]
    fn test_severity_mapping() {
        assert_eq!(
            DiagnosticSeverity::from(Severity::Error),
            DiagnosticSeverity::ERROR
        );
        assert_eq!(
            DiagnosticSeverity::from(Severity::Hint),
            DiagnosticSeverity::HINT
        );
    }
}
