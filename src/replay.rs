//! Offline replay of recorded findings
//!
//! Loads findings from JSON files, pushes them through a session's consumers
//! and returns the resulting state, without any client attached.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::finding::Finding;
use crate::session::Session;
use crate::store::{PublishedDiagnostics, StoreSnapshot};
use crate::uri::UriMap;

#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// One entry of a URI map file
#[derive(Debug, Deserialize)]
struct UriMapping {
    server: String,
    client: String,
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, ReplayError> {
    let content = fs::read_to_string(path).map_err(|source| ReplayError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ReplayError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Load findings from a JSON array file, or from every `*.json` under a directory.
///
/// Directory entries are read in file name order.
pub fn load_findings(path: &Path) -> Result<Vec<Finding>, ReplayError> {
    if !path.is_dir() {
        return read_json(path);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = entry.map_err(|source| ReplayError::Walk {
            path: path.to_path_buf(),
            source,
        })?;
        let is_json = entry.path().extension().and_then(|ext| ext.to_str()) == Some("json");
        if entry.file_type().is_file() && is_json {
            files.push(entry.into_path());
        }
    }

    let mut findings = Vec::new();
    for file in files {
        let mut batch: Vec<Finding> = read_json(&file)?;
        debug!("Loaded {} findings from {}", batch.len(), file.display());
        findings.append(&mut batch);
    }
    Ok(findings)
}

/// Register every `{ "server": ..., "client": ... }` entry of a JSON array file
pub fn load_uri_map(path: &Path, map: &UriMap) -> Result<usize, ReplayError> {
    let mappings: Vec<UriMapping> = read_json(path)?;
    for mapping in &mappings {
        map.register(mapping.server.as_str(), mapping.client.as_str());
    }
    Ok(mappings.len())
}

/// Route `findings` through `session` and snapshot its store
pub fn replay(session: &Arc<Session>, findings: &[Finding]) -> StoreSnapshot {
    let published = Arc::new(PublishedDiagnostics::new());
    let router = session.consumer_factory().create_router(published.clone());
    let accepted = router.route_all(findings);
    info!(
        "Replayed {} findings: {} accepted, {} dropped, {} documents published",
        findings.len(),
        accepted,
        findings.len() - accepted,
        published.len()
    );
    session.store().snapshot()
}
