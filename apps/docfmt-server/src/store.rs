//! In-memory storage for uploaded and formatted documents
//!
//! Entries are immutable once stored. An entry older than the TTL is
//! treated as missing, and expired entries are dropped on every upload.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Stem used when sanitising leaves nothing usable
const FALLBACK_STEM: &str = "document";

#[derive(Debug)]
pub struct StoredFile {
    pub id: String,
    pub name: String,
    pub contents: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

impl StoredFile {
    pub fn size(&self) -> u64 {
        self.contents.len() as u64
    }
}

pub struct FileStore {
    files: RwLock<HashMap<String, Arc<StoredFile>>>,
    ttl: TimeDelta,
}

impl FileStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            files: RwLock::new(HashMap::new()),
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
        }
    }

    fn is_expired(&self, file: &StoredFile, now: DateTime<Utc>) -> bool {
        now - file.created_at >= self.ttl
    }

    /// Store a document under a fresh UUIDv4 identifier
    pub async fn insert(&self, name: String, contents: Vec<u8>) -> Arc<StoredFile> {
        let file = Arc::new(StoredFile {
            id: Uuid::new_v4().to_string(),
            name,
            contents,
            created_at: Utc::now(),
        });

        self.files
            .write()
            .await
            .insert(file.id.clone(), Arc::clone(&file));
        debug!("stored {} ({} bytes) as {}", file.name, file.size(), file.id);
        file
    }

    /// The stored document, unless missing or expired
    pub async fn get(&self, id: &str) -> Option<Arc<StoredFile>> {
        let files = self.files.read().await;
        let file = files.get(id)?;
        if self.is_expired(file, Utc::now()) {
            return None;
        }
        Some(Arc::clone(file))
    }

    /// Drop expired entries, returning how many were removed
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut files = self.files.write().await;
        let before = files.len();
        files.retain(|_, file| !self.is_expired(file, now));
        let removed = before - files.len();
        if removed > 0 {
            debug!("purged {} expired files", removed);
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.files.read().await.len()
    }
}

/// Make an uploaded file name safe to store and send back.
///
/// Directory components are dropped, whitespace becomes `_` and only
/// letters, digits, `.`, `-` and `_` are kept. Non-ASCII letters survive.
pub fn sanitize_filename(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default();

    let cleaned: String = base
        .chars()
        .filter_map(|c| {
            if c.is_whitespace() {
                Some('_')
            } else if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                Some(c)
            } else {
                None
            }
        })
        .collect();
    let (stem, extension) = match cleaned.rfind('.') {
        Some(dot) => cleaned.split_at(dot),
        None => (cleaned.as_str(), ""),
    };
    let stem = stem.trim_start_matches(['.', '_']);
    let stem = if stem.is_empty() { FALLBACK_STEM } else { stem };
    format!("{}{}", stem, extension)
}

/// `paper.docx` becomes `paper_formatted.docx`
pub fn formatted_name(original: &str) -> String {
    let stem = Path::new(original)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .unwrap_or(FALLBACK_STEM);
    format!("{}_formatted.docx", stem)
}
