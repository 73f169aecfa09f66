//! JSON-lines journal for store persistence
//!
//! Append-only writes, one JSON event per line; the full state is rebuilt by
//! replaying the file on open. Comment volume is low, so every append is
//! flushed. Durability matters more than write throughput here.

use sentiguard_core::{Comment, Error, Label, LinkedChild, MonitoredAccount, Parent, Result};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// One persisted state mutation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JournalEvent {
    AccountSeeded {
        account: MonitoredAccount,
    },
    ParentCreated {
        parent: Parent,
    },
    ChildUpserted {
        child: LinkedChild,
    },
    ChildDeleted {
        id: Uuid,
    },
    CommentStored {
        comment: Comment,
    },
    LabelUpdated {
        child_id: Uuid,
        comment_id: String,
        label: Label,
    },
}

/// Append-only journal writer
pub struct Journal {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl Journal {
    /// Open (or create) the journal at `path` for appending
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    /// Append one event and flush it to disk
    pub fn append(&mut self, event: &JournalEvent) -> Result<()> {
        let line = serde_json::to_string(event)?;
        writeln!(self.writer, "{line}")?;
        self.writer.flush()?;
        Ok(())
    }

    /// Replay all events from `path`; missing file yields an empty history.
    ///
    /// A torn final line (crash mid-write) is skipped with a warning; any
    /// earlier undecodable line is corruption and fails the open.
    pub fn replay(path: impl AsRef<Path>) -> Result<Vec<JournalEvent>> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(File::open(path)?);
        let lines: Vec<String> = reader.lines().collect::<std::io::Result<_>>()?;
        let last = lines.len().saturating_sub(1);

        let mut events = Vec::with_capacity(lines.len());
        for (index, line) in lines.iter().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(line) {
                Ok(event) => events.push(event),
                Err(e) if index == last => {
                    warn!(path = %path.display(), error = %e, "skipping torn final journal line");
                }
                Err(e) => {
                    return Err(Error::store(format!(
                        "corrupt journal line {} in {}: {e}",
                        index + 1,
                        path.display()
                    )));
                }
            }
        }

        debug!(path = %path.display(), events = events.len(), "journal replayed");
        Ok(events)
    }

    /// Atomically replace the journal with the given snapshot events
    pub fn rewrite(&mut self, events: &[JournalEvent]) -> Result<()> {
        let tmp_path = self.path.with_extension("tmp");
        {
            let mut tmp = BufWriter::new(File::create(&tmp_path)?);
            for event in events {
                let line = serde_json::to_string(event)?;
                writeln!(tmp, "{line}")?;
            }
            tmp.flush()?;
        }
        std::fs::rename(&tmp_path, &self.path)?;

        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        self.writer = BufWriter::new(file);
        Ok(())
    }
}
