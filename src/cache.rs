use crate::error::Result;
use crate::model::{CacheDocument, LinesChanged, RecentCommits, SCHEMA_VERSION};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

pub const DEFAULT_CACHE_PATH: &str = ".cache-runtime/stats.json";

/// On-disk store for the versioned cache document.
///
/// Single-writer-per-run: the document is read fully, merged in memory and
/// written fully. Corruption or schema drift is self-healing because `load`
/// treats both as an absent document.
pub struct CacheStore {
    path: PathBuf,
}

impl CacheStore {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            path: path.unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_PATH)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `None` if the file is missing, unparseable, or carries a
    /// different schema version. Never an error.
    pub fn load(&self) -> Option<CacheDocument> {
        let raw = std::fs::read_to_string(&self.path).ok()?;
        let doc: CacheDocument = serde_json::from_str(&raw).ok()?;
        (doc.version == SCHEMA_VERSION).then_some(doc)
    }

    /// Stamps the schema version and a fresh `updated_at`, then writes the
    /// whole document. The parent directory is created on first write.
    pub fn save(&self, mut doc: CacheDocument) -> Result<()> {
        doc.version = SCHEMA_VERSION;
        doc.updated_at = Some(Utc::now());
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&doc)?)?;
        Ok(())
    }
}

pub fn lines_changed(doc: &Option<CacheDocument>) -> Option<&LinesChanged> {
    doc.as_ref()?.lines_changed.as_ref()
}

pub fn set_lines_changed(
    doc: Option<CacheDocument>,
    additions: u64,
    deletions: u64,
    last_commit_date: DateTime<Utc>,
) -> CacheDocument {
    let mut doc = doc.unwrap_or_default();
    doc.lines_changed = Some(LinesChanged {
        additions,
        deletions,
        last_commit_date,
    });
    doc
}

pub fn recent_commits(doc: &Option<CacheDocument>) -> Option<&RecentCommits> {
    doc.as_ref()?.recent_commits.as_ref()
}

pub fn set_recent_commits(doc: Option<CacheDocument>, fingerprints: Vec<String>) -> CacheDocument {
    let mut doc = doc.unwrap_or_default();
    doc.recent_commits = Some(RecentCommits {
        fingerprints,
        last_checked: Utc::now(),
    });
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store_in(dir: &tempfile::TempDir) -> CacheStore {
        CacheStore::new(Some(dir.path().join("nested").join("stats.json")))
    }

    #[test]
    fn missing_file_loads_as_absent() {
        let dir = tempdir().unwrap();
        assert!(store_in(&dir).load().is_none());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);

        let date = "2024-05-01T12:00:00Z".parse().unwrap();
        let doc = set_lines_changed(None, 8, 3, date);
        store.save(doc).unwrap();

        let loaded = store.load().expect("document should load");
        assert_eq!(loaded.version, SCHEMA_VERSION);
        assert!(loaded.updated_at.is_some());
        let lc = loaded.lines_changed.expect("lines_changed present");
        assert_eq!(lc.additions, 8);
        assert_eq!(lc.deletions, 3);
        assert_eq!(lc.last_commit_date, date);
    }

    #[test]
    fn save_merges_namespaces() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);

        let date = Utc::now();
        store.save(set_lines_changed(None, 1, 2, date)).unwrap();
        let doc = store.load();
        store
            .save(set_recent_commits(doc, vec!["o/r@abc1234".into()]))
            .unwrap();

        let loaded = store.load().unwrap();
        assert!(loaded.lines_changed.is_some());
        assert_eq!(
            loaded.recent_commits.unwrap().fingerprints,
            vec!["o/r@abc1234".to_string()]
        );
    }

    #[test]
    fn version_mismatch_loads_as_absent() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);

        store.save(set_lines_changed(None, 1, 1, Utc::now())).unwrap();
        let raw = std::fs::read_to_string(store.path()).unwrap();
        let bumped = raw.replace(
            &format!("\"version\": {SCHEMA_VERSION}"),
            "\"version\": 999",
        );
        std::fs::write(store.path(), bumped).unwrap();

        assert!(store.load().is_none());
    }

    #[test]
    fn parse_failure_loads_as_absent() {
        let dir = tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "{ not json").unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn accessors_tolerate_absent_document() {
        assert!(lines_changed(&None).is_none());
        assert!(recent_commits(&None).is_none());

        let doc = set_recent_commits(None, Vec::new());
        let rc = doc.recent_commits.as_ref().unwrap();
        assert!(rc.fingerprints.is_empty());
    }
}
