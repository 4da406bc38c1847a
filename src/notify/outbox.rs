use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{errors::Result, utils::ensure_dir};

use super::{Mailer, MessageReceipt, OutgoingMessage};

/// File written for each queued message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutboxEntry {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub message: OutgoingMessage,
}

/// Queues messages as JSON files for a relay that owns SMTP delivery.
#[derive(Debug, Clone)]
pub struct OutboxMailer {
    dir: PathBuf,
}

impl OutboxMailer {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        ensure_dir(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Queued entries, oldest first.
    pub fn pending(&self) -> Result<Vec<OutboxEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let data = fs::read_to_string(&path)?;
            entries.push(serde_json::from_str::<OutboxEntry>(&data)?);
        }
        entries.sort_by_key(|entry| entry.created_at);
        Ok(entries)
    }
}

impl Mailer for OutboxMailer {
    fn send(&self, message: &OutgoingMessage) -> Result<MessageReceipt> {
        let entry = OutboxEntry {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            message: message.clone(),
        };
        let path = self.dir.join(format!("{}.json", entry.id));
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(&entry)?)?;
        fs::rename(&tmp, &path)?;
        info!(id = %entry.id, to = %message.to, subject = %message.subject, "report queued");
        Ok(MessageReceipt {
            id: entry.id,
            accepted_at: entry.created_at,
            location: Some(path.display().to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn send_writes_one_file_per_message() {
        let temp = TempDir::new().unwrap();
        let mailer = OutboxMailer::new(temp.path().join("outbox")).unwrap();
        let message = OutgoingMessage {
            from: "\"SpendWise Reports\" <r@example.com>".into(),
            to: "me@example.com".into(),
            subject: "hello".into(),
            html: "<p>hi</p>".into(),
        };
        let receipt = mailer.send(&message).unwrap();
        let pending = mailer.pending().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, receipt.id);
        assert_eq!(pending[0].message, message);
    }
}
