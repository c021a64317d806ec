use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::queue::RoleEvent;
use crate::scoreboard::ScoreboardObserver;

#[derive(Serialize)]
struct AuditRecord<'a> {
    at: String,
    event: &'a RoleEvent,
}

/// Append-only JSON-lines record of role and score changes.
pub struct AuditLog {
    path: PathBuf,
    file: File,
}

impl AuditLog {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("create audit log dir {}", dir.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("open audit log {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ScoreboardObserver for AuditLog {
    fn role_event(&mut self, event: &RoleEvent) {
        let record = AuditRecord {
            at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            event,
        };
        // Best effort: a full disk must not take the scoreboard down.
        if let Ok(line) = serde_json::to_string(&record) {
            let _ = writeln!(self.file, "{line}");
        }
    }
}
