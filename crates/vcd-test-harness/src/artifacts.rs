// crates/vcd-test-harness/src/artifacts.rs
// ============================================================================
// Module: Template Artifacts
// Description: Writes rendered Terraform snippets under test-artifacts.
// Purpose: Keep one file per test function for post-mortem troubleshooting.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Each rendered snippet lands in `<dir>/<artifact name>.tf`. The registry
//! remembers which caller produced every file and refuses a second write to
//! the same path, so two tests cannot silently overwrite each other.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::debug;

use crate::error::HarnessError;

/// Directory name used for rendered snippets.
pub const TEST_ARTIFACTS_DIR: &str = "test-artifacts";
/// Extension appended to artifact names.
const ARTIFACT_EXTENSION: &str = "tf";

/// Tracks artifact files written during a suite run.
#[derive(Debug)]
pub struct ArtifactRegistry {
    /// Directory receiving the files.
    dir: PathBuf,
    /// File path to the caller that wrote it.
    used: Mutex<BTreeMap<PathBuf, String>>,
}

impl ArtifactRegistry {
    /// Creates a registry rooted at `dir`; the directory is created lazily.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            used: Mutex::new(BTreeMap::new()),
        }
    }

    /// Returns the artifacts directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the path an artifact name maps to.
    #[must_use]
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{ARTIFACT_EXTENSION}"))
    }

    /// Returns the caller recorded for `name`, if it was written.
    #[must_use]
    pub fn writer_of(&self, name: &str) -> Option<String> {
        let path = self.path_for(name);
        self.used.lock().ok().and_then(|used| used.get(&path).cloned())
    }

    /// Writes `content` to the artifact `name` on behalf of `caller`.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Artifact`] when the file was already written in
    /// this run, the content is empty, or the file cannot be written.
    pub fn write(&self, name: &str, caller: &str, content: &str) -> Result<PathBuf, HarnessError> {
        let path = self.path_for(name);
        let mut used = self
            .used
            .lock()
            .map_err(|_| HarnessError::Artifact("artifact registry lock poisoned".to_string()))?;
        if let Some(previous) = used.get(&path) {
            return Err(HarnessError::Artifact(format!(
                "File {} was already used from function {previous}",
                path.display()
            )));
        }
        if content.is_empty() {
            return Err(HarnessError::Artifact(format!(
                "error writing to file {}: nothing to write",
                path.display()
            )));
        }
        fs::create_dir_all(&self.dir).map_err(|err| {
            HarnessError::Artifact(format!("error creating directory {}: {err}", self.dir.display()))
        })?;
        fs::write(&path, content.as_bytes()).map_err(|err| {
            HarnessError::Artifact(format!("error creating file {}: {err}", path.display()))
        })?;
        used.insert(path.clone(), caller.to_string());
        debug!(path = %path.display(), caller, "template artifact written");
        Ok(path)
    }
}
