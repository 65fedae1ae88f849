//! Recent-commits reconciler.
//!
//! Fingerprints (`owner/repo@short-sha`) from the head commit of each push
//! event stand in for full commit identity. Commit detail is fetched only
//! when the fingerprint list changed; the persistent cache stores the
//! fingerprints alone.

use crate::api::types::{CommitResponse, UserEvent};
use crate::api::Transport;
use crate::cache::{self, CacheStore};
use crate::error::Result;
use crate::model::CommitDetail;

pub const DEFAULT_LIMIT: usize = 3;

const SHORT_SHA_LEN: usize = 7;

/// Reconcile the cached fingerprint list against the live event stream.
/// `memo` is the (fingerprints, details) pair from an earlier reconcile in
/// this run; an unchanged list served from it issues zero detail fetches.
pub async fn reconcile(
    transport: &dyn Transport,
    store: &CacheStore,
    username: &str,
    limit: usize,
    memo: Option<&(Vec<String>, Vec<CommitDetail>)>,
) -> Result<(Vec<String>, Vec<CommitDetail>)> {
    let doc = store.load();
    let old = cache::recent_commits(&doc)
        .map(|rc| rc.fingerprints.clone())
        .unwrap_or_default();
    let new = fingerprints(transport, username, limit).await;

    if old.is_empty() && new.is_empty() {
        store.save(cache::set_recent_commits(doc, Vec::new()))?;
        return Ok((Vec::new(), Vec::new()));
    }

    if !old.is_empty() && new == old {
        if let Some((memo_fps, memo_details)) = memo {
            if *memo_fps == new {
                return Ok((new, memo_details.clone()));
            }
        }
        let details = fetch_details(transport, &new).await;
        return Ok((new, details));
    }

    let details = fetch_details(transport, &new).await;
    store.save(cache::set_recent_commits(doc, new.clone()))?;
    Ok((new, details))
}

/// Collect up to `limit` unique fingerprints from the user's push events,
/// most recent first. Only the head commit of each push is considered;
/// intermediate commits in a multi-commit push are ignored.
pub async fn fingerprints(transport: &dyn Transport, username: &str, limit: usize) -> Vec<String> {
    let raw = transport.rest(&format!("users/{username}/events"), &[]).await;
    let events: Vec<UserEvent> = serde_json::from_value(raw).unwrap_or_default();

    let mut fingerprints = Vec::new();
    for event in events.iter().filter(|e| e.kind == "PushEvent") {
        let Some(head) = event.payload.head.as_deref() else {
            continue;
        };
        let short = &head[..head.len().min(SHORT_SHA_LEN)];
        let fingerprint = format!("{}@{}", event.repo.name, short);
        if !fingerprints.contains(&fingerprint) {
            fingerprints.push(fingerprint);
        }
        if fingerprints.len() >= limit {
            break;
        }
    }
    fingerprints
}

/// Expand fingerprints into full commit records, one request each.
// TODO: one detail request per fingerprint (N+1); acceptable at the default
// limit of 3 but worth batching if the limit ever grows.
pub async fn fetch_details(
    transport: &dyn Transport,
    fingerprints: &[String],
) -> Vec<CommitDetail> {
    let mut commits = Vec::new();
    for fingerprint in fingerprints {
        let Some((repo, sha)) = fingerprint.rsplit_once('@') else {
            continue;
        };
        let raw = transport
            .rest(&format!("repos/{repo}/commits/{sha}"), &[])
            .await;
        let detail: CommitResponse = serde_json::from_value(raw).unwrap_or_default();
        let Some(body) = detail.commit else {
            continue;
        };
        commits.push(CommitDetail {
            repo: repo.to_string(),
            message: body.message.lines().next().unwrap_or_default().to_string(),
            author: body.author.name,
            date: body.author.date,
            sha: sha.to_string(),
        });
    }
    commits
}
