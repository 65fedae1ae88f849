//! Lines-changed reconciler.
//!
//! Cold path: sum contributor-statistics weeks attributed to the user over
//! every discovered repository, then watermark with the fetch-completion
//! time. Warm path: walk recent push events and apply per-commit deltas
//! strictly newer than the watermark, advancing it to the newest commit's
//! authored timestamp.

use crate::api::types::{CommitResponse, ContributorStats, UserEvent};
use crate::api::Transport;
use crate::cache::{self, CacheStore};
use crate::error::Result;
use crate::model::{CacheDocument, LinesChanged};
use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};

pub async fn reconcile(
    transport: &dyn Transport,
    store: &CacheStore,
    username: &str,
    repos: &[String],
) -> Result<(u64, u64)> {
    let doc = store.load();
    match cache::lines_changed(&doc).cloned() {
        None => cold_scan(transport, store, doc, username, repos).await,
        Some(cached) => warm_update(transport, store, doc, cached, username).await,
    }
}

async fn cold_scan(
    transport: &dyn Transport,
    store: &CacheStore,
    doc: Option<CacheDocument>,
    username: &str,
    repos: &[String],
) -> Result<(u64, u64)> {
    let mut additions = 0u64;
    let mut deletions = 0u64;

    let pb = ProgressBar::new(repos.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    pb.set_message("Scanning contributor statistics");

    for repo in repos {
        let raw = transport
            .rest(&format!("repos/{repo}/stats/contributors"), &[])
            .await;
        let contributors: Vec<ContributorStats> = serde_json::from_value(raw).unwrap_or_default();
        for contributor in contributors {
            if contributor.author.login != username {
                continue;
            }
            for week in &contributor.weeks {
                additions += week.a;
                deletions += week.d;
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    // Watermark with the scan-completion time, not a commit time.
    store.save(cache::set_lines_changed(doc, additions, deletions, Utc::now()))?;
    Ok((additions, deletions))
}

async fn warm_update(
    transport: &dyn Transport,
    store: &CacheStore,
    doc: Option<CacheDocument>,
    cached: LinesChanged,
    username: &str,
) -> Result<(u64, u64)> {
    let delta = delta_since(transport, username, cached.last_commit_date).await;

    if delta.additions == 0 && delta.deletions == 0 {
        return Ok((cached.additions, cached.deletions));
    }

    let additions = cached.additions + delta.additions;
    let deletions = cached.deletions + delta.deletions;
    store.save(cache::set_lines_changed(doc, additions, deletions, delta.newest))?;
    Ok((additions, deletions))
}

struct Delta {
    additions: u64,
    deletions: u64,
    newest: DateTime<Utc>,
}

/// Accumulate additions/deletions from every push-event commit authored
/// strictly after `since`.
// TODO: one detail request per commit (N+1); batch once the commits API
// grows a bulk endpoint.
async fn delta_since(transport: &dyn Transport, username: &str, since: DateTime<Utc>) -> Delta {
    let raw = transport.rest(&format!("users/{username}/events"), &[]).await;
    let events: Vec<UserEvent> = serde_json::from_value(raw).unwrap_or_default();

    let mut delta = Delta {
        additions: 0,
        deletions: 0,
        newest: since,
    };

    for event in events.iter().filter(|e| e.kind == "PushEvent") {
        for commit in &event.payload.commits {
            let raw = transport
                .rest(
                    &format!("repos/{}/commits/{}", event.repo.name, commit.sha),
                    &[],
                )
                .await;
            let detail: CommitResponse = serde_json::from_value(raw).unwrap_or_default();
            let Some(body) = detail.commit else {
                continue;
            };
            let Ok(authored) = DateTime::parse_from_rfc3339(&body.author.date) else {
                continue;
            };
            let authored = authored.with_timezone(&Utc);
            if authored <= since {
                continue;
            }
            // Merge commits carry no stats; they contribute zero.
            let Some(stats) = detail.stats else {
                continue;
            };
            delta.additions += stats.additions;
            delta.deletions += stats.deletions;
            if authored > delta.newest {
                delta.newest = authored;
            }
        }
    }

    delta
}
