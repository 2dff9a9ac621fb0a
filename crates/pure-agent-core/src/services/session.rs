use super::SessionLookup;
use crate::types::SESSION_OUTPUT_FILENAME;
use std::path::{Path, PathBuf};

/// Reads the session id from the first line of the agent's last output file.
#[derive(Debug, Clone)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn in_work_dir(work_dir: &Path) -> Self {
        Self {
            path: work_dir.join(SESSION_OUTPUT_FILENAME),
        }
    }
}

impl SessionLookup for SessionFile {
    fn read_session_id(&self) -> Option<String> {
        let content = std::fs::read_to_string(&self.path).ok()?;
        let first_line = content.lines().next()?.trim();
        if first_line.is_empty() {
            return None;
        }
        let parsed: serde_json::Value = serde_json::from_str(first_line).ok()?;
        parsed["session_id"].as_str().map(str::to_string)
    }
}
