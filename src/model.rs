use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

pub const SCHEMA_VERSION: u32 = 1;

/// The single persisted document. Read fully, merged in memory, written
/// fully; a version mismatch or parse failure degrades to a full rebuild.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheDocument {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines_changed: Option<LinesChanged>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recent_commits: Option<RecentCommits>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinesChanged {
    pub additions: u64,
    pub deletions: u64,
    /// Watermark: commits authored at or before this instant are already
    /// accounted for. Advanced only forward.
    pub last_commit_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentCommits {
    /// `owner/repo@short-sha` tokens, most recent first. Best-effort cache
    /// key only; a force-push on the remote can desynchronize it until the
    /// list next changes.
    pub fingerprints: Vec<String>,
    pub last_checked: DateTime<Utc>,
}

/// Expanded commit record, fetched only when the fingerprint list changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitDetail {
    pub repo: String,
    pub message: String,
    pub author: String,
    pub date: String,
    pub sha: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepoInfo {
    pub stargazers: u64,
    pub forks: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Language {
    pub size: u64,
    pub occurrences: u32,
    pub color: Option<String>,
    /// Share of total byte-size across all repositories, in percent.
    pub prop: f64,
}

/// Accumulated result of one repository discovery pass. Built once per run
/// and held in memory only; nothing in here persists across runs.
#[derive(Debug, Default)]
pub struct Overview {
    pub name: String,
    pub repos: BTreeMap<String, RepoInfo>,
    pub languages: HashMap<String, Language>,
}

impl Overview {
    pub fn stargazers(&self) -> u64 {
        self.repos.values().map(|r| r.stargazers).sum()
    }

    pub fn forks(&self) -> u64 {
        self.repos.values().map(|r| r.forks).sum()
    }
}

/// Exclusion rules applied during discovery.
#[derive(Debug, Clone, Default)]
pub struct Filters {
    pub exclude_repos: HashSet<String>,
    /// Lowercased; language exclusion is case-insensitive.
    pub exclude_langs: HashSet<String>,
    /// When false, the contributed-to discovery stream is dropped.
    pub include_contributed: bool,
}

impl Filters {
    pub fn new(
        exclude_repos: &[String],
        exclude_langs: &[String],
        ignore_forked_repos: bool,
    ) -> Self {
        Self {
            exclude_repos: exclude_repos
                .iter()
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty())
                .collect(),
            exclude_langs: exclude_langs
                .iter()
                .map(|l| l.trim().to_lowercase())
                .filter(|l| !l.is_empty())
                .collect(),
            include_contributed: !ignore_forked_repos,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_trim_and_lowercase() {
        let f = Filters::new(
            &["owner/repo ".to_string(), " ".to_string()],
            &["Jupyter Notebook".to_string()],
            false,
        );
        assert!(f.exclude_repos.contains("owner/repo"));
        assert_eq!(f.exclude_repos.len(), 1);
        assert!(f.exclude_langs.contains("jupyter notebook"));
        assert!(f.include_contributed);
    }

    #[test]
    fn overview_totals_sum_over_repos() {
        let mut overview = Overview::default();
        overview.repos.insert(
            "a/x".into(),
            RepoInfo { stargazers: 3, forks: 1 },
        );
        overview.repos.insert(
            "b/y".into(),
            RepoInfo { stargazers: 7, forks: 0 },
        );
        assert_eq!(overview.stargazers(), 10);
        assert_eq!(overview.forks(), 1);
    }
}
