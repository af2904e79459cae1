use std::fmt;
use std::str::FromStr;

use lsp_types::{Position as LspPosition, Range as LspRange};
use serde::{Deserialize, Serialize, Serializer};

/// Zero-based line/column position inside a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct SourcePosition {
    pub line: u32,
    pub column: u32,
}

/// Zero-based half-open extent between two positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct SourceRange {
    pub start: SourcePosition,
    pub end: SourcePosition,
}

/// A range inside a document, as reported by an analysis engine.
///
/// `document` is the engine's own identifier for the file. It is only turned
/// into a client-facing URI by the URI translator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceSpan {
    pub document: String,
    pub range: SourceRange,
}

impl SourcePosition {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl SourceRange {
    pub fn new(start: SourcePosition, end: SourcePosition) -> Self {
        Self { start, end }
    }

    /// Single-line range `line:start_column..end_column`
    pub fn on_line(line: u32, start_column: u32, end_column: u32) -> Self {
        Self {
            start: SourcePosition::new(line, start_column),
            end: SourcePosition::new(line, end_column),
        }
    }

    pub fn contains(&self, position: SourcePosition) -> bool {
        self.start <= position && position <= self.end
    }

    /// True if the two ranges share at least one position.
    ///
    /// Touching ranges count as intersecting so that a cursor placed at the
    /// end of a marker still finds its actions.
    pub fn intersects(&self, other: &SourceRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

impl SourceSpan {
    pub fn new(document: impl Into<String>, range: SourceRange) -> Self {
        Self {
            document: document.into(),
            range,
        }
    }

    /// Same range, different document identity
    pub fn with_document(&self, document: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            range: self.range,
        }
    }

    /// Convert to compact human form, 1-based
    /// Examples:
    /// - Point location: "file:///a.c:23:5"
    /// - Same line range: "file:///a.c:23:5-20"
    /// - Multi-line range: "file:///a.c:23:5-25:10"
    pub fn to_compact_range(&self) -> String {
        let start = &self.range.start;
        let end = &self.range.end;

        let start_line = start.line.saturating_add(1);
        let start_col = start.column.saturating_add(1);
        let end_line = end.line.saturating_add(1);
        let end_col = end.column.saturating_add(1);

        if start_line == end_line {
            if start_col == end_col {
                format!("{}:{}:{}", self.document, start_line, start_col)
            } else {
                format!("{}:{}:{}-{}", self.document, start_line, start_col, end_col)
            }
        } else {
            format!(
                "{}:{}:{}-{}:{}",
                self.document, start_line, start_col, end_line, end_col
            )
        }
    }
}

/// Parse the 1-based range suffix of a compact span: `23:5`, `23:5-20` or `23:5-25:10`
fn parse_compact_range(range_part: &str) -> Result<SourceRange, String> {
    let range_parts: Vec<&str> = range_part.split('-').collect();
    if range_parts.len() > 2 {
        return Err(format!("Invalid range format: '{}'", range_part));
    }

    let start_parts: Vec<&str> = range_parts[0].split(':').collect();
    if start_parts.len() != 2 {
        return Err(format!("Invalid start position format: '{}'", range_parts[0]));
    }
    let start_line = parse_one_based(start_parts[0])?;
    let start_col = parse_one_based(start_parts[1])?;

    let (end_line, end_col) = match range_parts.get(1) {
        Some(end) => {
            let end_parts: Vec<&str> = end.split(':').collect();
            match end_parts.as_slice() {
                [line, col] => (parse_one_based(line)?, parse_one_based(col)?),
                [col] => (start_line, parse_one_based(col)?),
                _ => return Err(format!("Invalid end position format: '{}'", end)),
            }
        }
        None => (start_line, start_col),
    };

    Ok(SourceRange {
        start: SourcePosition::new(start_line - 1, start_col - 1),
        end: SourcePosition::new(end_line - 1, end_col - 1),
    })
}

fn parse_one_based(value: &str) -> Result<u32, String> {
    let number: u32 = value
        .parse()
        .map_err(|_| format!("Invalid number: '{}'", value))?;
    if number == 0 {
        return Err("Line and column numbers must be 1-based (> 0)".to_string());
    }
    Ok(number)
}

impl FromStr for SourceSpan {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Document identifiers contain colons themselves, so take the
        // rightmost split whose suffix is a well-formed range.
        for (idx, _) in s.rmatch_indices(':') {
            let (document, range_part) = (&s[..idx], &s[idx + 1..]);
            if document.is_empty() {
                break;
            }
            if let Ok(range) = parse_compact_range(range_part) {
                return Ok(SourceSpan::new(document, range));
            }
        }
        Err(format!(
            "Invalid format: expected '<document>:line:column[-[line:]column]', got '{}'",
            s
        ))
    }
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_compact_range())
    }
}

impl Serialize for SourceSpan {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_compact_range())
    }
}

impl<'de> Deserialize<'de> for SourceSpan {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct SourceSpanVisitor;

        impl<'de> Visitor<'de> for SourceSpanVisitor {
            type Value = SourceSpan;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a compact span string or SourceSpan object")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                value.parse().map_err(E::custom)
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                let mut range = None;
                let mut document = None;

                while let Some(key) = map.next_key::<String>()? {
                    match key.as_str() {
                        "range" => range = Some(map.next_value()?),
                        "document" => document = Some(map.next_value()?),
                        _ => {
                            let _: serde::de::IgnoredAny = map.next_value()?;
                        }
                    }
                }

                Ok(SourceSpan {
                    range: range.ok_or_else(|| de::Error::missing_field("range"))?,
                    document: document.ok_or_else(|| de::Error::missing_field("document"))?,
                })
            }
        }

        deserializer.deserialize_any(SourceSpanVisitor)
    }
}

impl From<LspPosition> for SourcePosition {
    fn from(pos: LspPosition) -> Self {
        SourcePosition {
            line: pos.line,
            column: pos.character,
        }
    }
}

impl From<SourcePosition> for LspPosition {
    fn from(pos: SourcePosition) -> Self {
        LspPosition {
            line: pos.line,
            character: pos.column,
        }
    }
}

impl From<LspRange> for SourceRange {
    fn from(range: LspRange) -> Self {
        SourceRange {
            start: range.start.into(),
            end: range.end.into(),
        }
    }
}

impl From<SourceRange> for LspRange {
    fn from(range: SourceRange) -> Self {
        LspRange {
            start: range.start.into(),
            end: range.end.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(document: &str, range: SourceRange) -> SourceSpan {
        SourceSpan::new(document, range)
    }

    #[test]
    fn test_compact_range_point_location() {
        let loc = span(
            "file:///src/a.c",
            SourceRange::new(SourcePosition::new(22, 4), SourcePosition::new(22, 4)),
        );
        assert_eq!(loc.to_compact_range(), "file:///src/a.c:23:5");
    }

    #[test]
    fn test_compact_range_same_line() {
        let loc = span("file:///src/a.c", SourceRange::on_line(22, 4, 19));
        assert_eq!(loc.to_compact_range(), "file:///src/a.c:23:5-20");
    }

    #[test]
    fn test_compact_range_multi_line() {
        let loc = span(
            "file:///src/a.c",
            SourceRange::new(SourcePosition::new(22, 4), SourcePosition::new(24, 9)),
        );
        assert_eq!(loc.to_compact_range(), "file:///src/a.c:23:5-25:10");
    }

    #[test]
    fn test_parse_span_with_colons_in_document() {
        let loc: SourceSpan = "file:///src/a.c:23:5-25:10".parse().unwrap();
        assert_eq!(loc.document, "file:///src/a.c");
        assert_eq!(loc.range.start, SourcePosition::new(22, 4));
        assert_eq!(loc.range.end, SourcePosition::new(24, 9));

        let loc: SourceSpan = "file:///src/a.c:10:3-16".parse().unwrap();
        assert_eq!(loc.document, "file:///src/a.c");
        assert_eq!(loc.range, SourceRange::on_line(9, 2, 15));

        let loc: SourceSpan = "file:///src/a.c:10:3".parse().unwrap();
        assert_eq!(loc.range, SourceRange::on_line(9, 2, 2));
    }

    #[test]
    fn test_parse_span_rejects_zero_and_garbage() {
        assert!("file:///a.c:0:1".parse::<SourceSpan>().is_err());
        assert!("file:///a.c".parse::<SourceSpan>().is_err());
        assert!(":1:1".parse::<SourceSpan>().is_err());
    }

    #[test]
    fn test_deserialize_object_format() {
        let json = r#"{
            "document": "file:///test/a.c",
            "range": {
                "start": {"line": 9, "column": 2},
                "end": {"line": 11, "column": 6}
            }
        }"#;
        let loc: SourceSpan = serde_json::from_str(json).unwrap();
        assert_eq!(loc.document, "file:///test/a.c");
        assert_eq!(loc.range.end, SourcePosition::new(11, 6));
    }

    #[test]
    fn test_serialize_span_compact() {
        let loc = span("file:///test/a.c", SourceRange::on_line(9, 2, 15));
        let serialized = serde_json::to_string(&loc).unwrap();
        assert_eq!(serialized, "\"file:///test/a.c:10:3-16\"");
    }

    #[test]
    fn test_lsp_range_conversion() {
        let range = SourceRange::new(SourcePosition::new(3, 1), SourcePosition::new(4, 7));
        let lsp: LspRange = range.into();
        assert_eq!(lsp.start.line, 3);
        assert_eq!(lsp.start.character, 1);
        assert_eq!(lsp.end.character, 7);
        assert_eq!(SourceRange::from(lsp), range);
    }

    #[test]
    fn test_compact_form_saturates_at_max_position() {
        let max = SourcePosition::new(u32::MAX, u32::MAX);
        let span = SourceSpan::new("file:///a.c", SourceRange::new(max, max));
        assert_eq!(
            span.to_string(),
            format!("file:///a.c:{}:{}", u32::MAX, u32::MAX)
        );
    }

    #[test]
    fn test_intersects() {
        let a = SourceRange::on_line(3, 0, 10);
        assert!(a.intersects(&SourceRange::on_line(3, 5, 5)));
        assert!(a.intersects(&SourceRange::on_line(3, 10, 12)));
        assert!(!a.intersects(&SourceRange::on_line(4, 0, 1)));
        assert!(!a.intersects(&SourceRange::on_line(2, 0, 30)));
    }
}
