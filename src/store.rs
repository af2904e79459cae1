//! Indexed per-document state answering protocol queries
//!
//! Four collections, each keyed by the client-facing URI and sharded per
//! document by `DashMap`, so findings for different documents never contend
//! and each collection of one document is mutated under its own shard lock.
//! Entries live for the lifetime of the session; re-published findings are
//! absorbed by deduplication rather than by clearing.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use lsp_types::{CodeAction, CodeLens, Diagnostic, Hover, Uri};
use serde::Serialize;

use crate::finding::{SourcePosition, SourceRange};

/// Caller-owned map the diagnostics consumer publishes into
pub type PublishedDiagnostics = DashMap<Uri, Vec<Diagnostic>>;

/// Structural identity of a diagnostic: message, range, severity and code
pub fn same_diagnostic(a: &Diagnostic, b: &Diagnostic) -> bool {
    a.message == b.message && a.range == b.range && a.severity == b.severity && a.code == b.code
}

#[derive(Debug, Default)]
pub struct StateStore {
    diagnostics: DashMap<Uri, Vec<Diagnostic>>,
    hovers: DashMap<Uri, BTreeMap<SourcePosition, Hover>>,
    code_lenses: DashMap<Uri, Vec<CodeLens>>,
    actions: DashMap<Uri, HashMap<SourceRange, Vec<CodeAction>>>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------------
    // Mutation (consumers only)
    // ------------------------------------------------------------------------

    /// Record `diagnostic` with its actions and publish the document's list.
    ///
    /// The diagnostic is appended unless a structurally equal one is already
    /// present. `actions_for` receives the stored record, so actions attach to
    /// the diagnostic clients actually see, and actions already registered on
    /// a range are skipped. The document's diagnostics entry stays locked until
    /// the list is in `target`, so concurrent producers publish in the order
    /// they extended the list. Returns whether the list grew.
    pub(crate) fn publish_diagnostic<F>(
        &self,
        uri: &Uri,
        diagnostic: Diagnostic,
        target: &PublishedDiagnostics,
        actions_for: F,
    ) -> bool
    where
        F: FnOnce(&Diagnostic) -> Vec<(SourceRange, CodeAction)>,
    {
        let mut list = self.diagnostics.entry(uri.clone()).or_default();
        let existing = list
            .iter()
            .position(|stored| same_diagnostic(stored, &diagnostic));
        let (index, added) = match existing {
            Some(index) => (index, false),
            None => {
                list.push(diagnostic);
                (list.len() - 1, true)
            }
        };

        let actions = actions_for(&list[index]);
        if !actions.is_empty() {
            let mut registry = self.actions.entry(uri.clone()).or_default();
            for (range, action) in actions {
                let slot = registry.entry(range).or_default();
                if !slot.contains(&action) {
                    slot.push(action);
                }
            }
        }

        target.insert(uri.clone(), list.value().clone());
        added
    }

    /// Insert a hover, replacing any entry at exactly the same position
    pub(crate) fn insert_hover(
        &self,
        uri: &Uri,
        position: SourcePosition,
        hover: Hover,
    ) -> Option<Hover> {
        self.hovers
            .entry(uri.clone())
            .or_default()
            .insert(position, hover)
    }

    pub(crate) fn add_code_lens(&self, uri: &Uri, lens: CodeLens) {
        self.code_lenses.entry(uri.clone()).or_default().push(lens);
    }

    // ------------------------------------------------------------------------
    // Read-only views
    // ------------------------------------------------------------------------

    pub fn diagnostics(&self, uri: &Uri) -> Vec<Diagnostic> {
        self.diagnostics
            .get(uri)
            .map(|list| list.value().clone())
            .unwrap_or_default()
    }

    /// Hover for a cursor position.
    ///
    /// Takes the closest entry at or before `position`, and only returns it
    /// when it starts exactly there or its range covers the cursor.
    pub fn hover_at(&self, uri: &Uri, position: SourcePosition) -> Option<Hover> {
        let table = self.hovers.get(uri)?;
        let (key, hover) = table.range(..=position).next_back()?;
        let covers = hover
            .range
            .map(|range| SourceRange::from(range).contains(position))
            .unwrap_or(false);
        (*key == position || covers).then(|| hover.clone())
    }

    /// All hovers of a document, in position order
    pub fn hovers(&self, uri: &Uri) -> Vec<Hover> {
        self.hovers
            .get(uri)
            .map(|table| table.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn code_lenses(&self, uri: &Uri) -> Vec<CodeLens> {
        self.code_lenses
            .get(uri)
            .map(|list| list.value().clone())
            .unwrap_or_default()
    }

    /// Actions registered on any range intersecting `range`, in range order
    pub fn code_actions(&self, uri: &Uri, range: SourceRange) -> Vec<CodeAction> {
        let Some(registry) = self.actions.get(uri) else {
            return Vec::new();
        };
        let mut matching: Vec<(&SourceRange, &Vec<CodeAction>)> = registry
            .iter()
            .filter(|(registered, _)| registered.intersects(&range))
            .collect();
        matching.sort_by_key(|(registered, _)| **registered);
        matching
            .into_iter()
            .flat_map(|(_, actions)| actions.iter().cloned())
            .collect()
    }

    /// Every document with at least one entry in any collection
    pub fn documents(&self) -> Vec<Uri> {
        let mut seen: BTreeSet<String> = BTreeSet::new();
        let mut found = Vec::new();
        let mut collect = |uri: &Uri| {
            if seen.insert(uri.as_str().to_string()) {
                found.push(uri.clone());
            }
        };
        // One collection at a time, so no shard lock is held across maps.
        for entry in self.diagnostics.iter() {
            collect(entry.key());
        }
        for entry in self.hovers.iter() {
            collect(entry.key());
        }
        for entry in self.code_lenses.iter() {
            collect(entry.key());
        }
        for entry in self.actions.iter() {
            collect(entry.key());
        }
        found.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        found
    }

    /// Serializable copy of the whole store
    pub fn snapshot(&self) -> StoreSnapshot {
        let documents = self
            .documents()
            .into_iter()
            .map(|uri| {
                let code_actions: Vec<CodeAction> = self
                    .actions
                    .get(&uri)
                    .map(|registry| {
                        let mut ranges: Vec<_> = registry.iter().collect();
                        ranges.sort_by_key(|(range, _)| **range);
                        ranges
                            .into_iter()
                            .flat_map(|(_, actions)| actions.iter().cloned())
                            .collect()
                    })
                    .unwrap_or_default();
                let snapshot = DocumentSnapshot {
                    diagnostics: self.diagnostics(&uri),
                    hovers: self.hovers(&uri),
                    code_lenses: self.code_lenses(&uri),
                    code_actions,
                };
                (uri.as_str().to_string(), snapshot)
            })
            .collect();

        StoreSnapshot {
            generated_at: Utc::now(),
            documents,
        }
    }
}

/// Point-in-time copy of one document's state
#[derive(Debug, Clone, Serialize)]
pub struct DocumentSnapshot {
    pub diagnostics: Vec<Diagnostic>,
    pub hovers: Vec<Hover>,
    pub code_lenses: Vec<CodeLens>,
    pub code_actions: Vec<CodeAction>,
}

/// Point-in-time copy of the store, keyed by client URI
#[derive(Debug, Clone, Serialize)]
pub struct StoreSnapshot {
    pub generated_at: DateTime<Utc>,
    pub documents: BTreeMap<String, DocumentSnapshot>,
}
