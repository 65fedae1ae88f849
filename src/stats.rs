//! Aggregate statistics facade.
//!
//! Every derived figure is computed once per run and memoized in a plain
//! field; only the lines-changed totals and recent-commit fingerprints
//! persist across runs (through the cache store).

use crate::activity::{self, DayActivity};
use crate::api::types::{AllContribsData, ContribYearsData, GraphQl, OverviewData, TrafficViews, Viewer};
use crate::api::{queries, Transport};
use crate::cache::CacheStore;
use crate::commits;
use crate::error::Result;
use crate::lines;
use crate::model::{CommitDetail, Filters, Language, Overview, RepoInfo};
use crate::util::with_commas;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;

pub struct Stats {
    username: String,
    transport: Arc<dyn Transport>,
    cache: CacheStore,
    filters: Filters,

    overview: Option<Overview>,
    total_contributions: Option<u64>,
    lines_changed: Option<(u64, u64)>,
    views: Option<u64>,
    recent: Option<(Vec<String>, Vec<CommitDetail>)>,
}

impl Stats {
    pub fn new(
        username: impl Into<String>,
        transport: Arc<dyn Transport>,
        cache: CacheStore,
        filters: Filters,
    ) -> Self {
        Self {
            username: username.into(),
            transport,
            cache,
            filters,
            overview: None,
            total_contributions: None,
            lines_changed: None,
            views: None,
            recent: None,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    async fn ensure_overview(&mut self) -> &Overview {
        if self.overview.is_none() {
            let built = discover(self.transport.as_ref(), &self.filters).await;
            self.overview = Some(built);
        }
        self.overview.get_or_insert_with(Overview::default)
    }

    pub async fn name(&mut self) -> Result<String> {
        Ok(self.ensure_overview().await.name.clone())
    }

    pub async fn stargazers(&mut self) -> Result<u64> {
        Ok(self.ensure_overview().await.stargazers())
    }

    pub async fn forks(&mut self) -> Result<u64> {
        Ok(self.ensure_overview().await.forks())
    }

    pub async fn repos(&mut self) -> Result<Vec<String>> {
        Ok(self.ensure_overview().await.repos.keys().cloned().collect())
    }

    /// Languages sorted by aggregate size, largest first.
    pub async fn languages(&mut self) -> Result<Vec<(String, Language)>> {
        let overview = self.ensure_overview().await;
        let mut languages: Vec<(String, Language)> = overview
            .languages
            .iter()
            .map(|(name, lang)| (name.clone(), lang.clone()))
            .collect();
        languages.sort_by(|a, b| b.1.size.cmp(&a.1.size).then_with(|| a.0.cmp(&b.0)));
        Ok(languages)
    }

    /// Contributions summed over every year the account has contributed.
    pub async fn total_contributions(&mut self) -> Result<u64> {
        if let Some(total) = self.total_contributions {
            return Ok(total);
        }

        let raw = self.transport.graphql(&queries::contrib_years()).await;
        let years_resp: GraphQl<ContribYearsData> = serde_json::from_value(raw).unwrap_or_default();
        let years = years_resp
            .data
            .map(|d| d.viewer.contributions_collection.contribution_years)
            .unwrap_or_default();

        let raw = self.transport.graphql(&queries::all_contribs(&years)).await;
        let by_year: GraphQl<AllContribsData> = serde_json::from_value(raw).unwrap_or_default();
        let total = by_year
            .data
            .map(|d| {
                d.viewer
                    .values()
                    .map(|y| y.contribution_calendar.total_contributions)
                    .sum()
            })
            .unwrap_or(0);

        self.total_contributions = Some(total);
        Ok(total)
    }

    /// Total lines added and deleted by the user: a full scan on the first
    /// run, incremental deltas afterward.
    pub async fn lines_changed(&mut self) -> Result<(u64, u64)> {
        if let Some(totals) = self.lines_changed {
            return Ok(totals);
        }
        let repos = self.repos().await?;
        let totals =
            lines::reconcile(self.transport.as_ref(), &self.cache, &self.username, &repos).await?;
        self.lines_changed = Some(totals);
        Ok(totals)
    }

    /// Page views across the user's projects over the service's 14-day
    /// reporting window.
    pub async fn views(&mut self) -> Result<u64> {
        if let Some(total) = self.views {
            return Ok(total);
        }

        let repos = self.repos().await?;
        let pb = scan_bar(repos.len() as u64, "Fetching traffic views");
        let mut total = 0u64;
        for repo in &repos {
            let raw = self
                .transport
                .rest(&format!("repos/{repo}/traffic/views"), &[])
                .await;
            let traffic: TrafficViews = serde_json::from_value(raw).unwrap_or_default();
            total += traffic.views.iter().map(|bucket| bucket.count).sum::<u64>();
            pb.inc(1);
        }
        pb.finish_and_clear();

        self.views = Some(total);
        Ok(total)
    }

    /// The user's most recent commits, change-detected via fingerprints.
    pub async fn recent_commits(&mut self, limit: usize) -> Result<Vec<CommitDetail>> {
        if let Some((_, details)) = &self.recent {
            return Ok(details.clone());
        }
        let (fingerprints, details) = commits::reconcile(
            self.transport.as_ref(),
            &self.cache,
            &self.username,
            limit,
            self.recent.as_ref(),
        )
        .await?;
        self.recent = Some((fingerprints, details.clone()));
        Ok(details)
    }

    /// Daily contribution counts for one calendar year.
    // TODO: cache per-year daily activity so regenerating the activity
    // graph does not repeat the calendar query.
    pub async fn daily_activity(&mut self, year: i32) -> Result<Vec<DayActivity>> {
        Ok(activity::daily(self.transport.as_ref(), year).await)
    }

    pub async fn print_summary(&mut self) -> Result<()> {
        let name = self.name().await?;
        let stargazers = self.stargazers().await?;
        let forks = self.forks().await?;
        let contributions = self.total_contributions().await?;
        let repo_count = self.repos().await?.len();
        let (additions, deletions) = self.lines_changed().await?;
        let views = self.views().await?;
        let languages = self.languages().await?;

        println!("{}", style(format!("GitHub statistics for {name}")).bold());
        println!("{}", "─".repeat(50));
        println!("Stargazers: {}", style(with_commas(stargazers)).cyan());
        println!("Forks: {}", style(with_commas(forks)).cyan());
        println!(
            "All-time contributions: {}",
            style(with_commas(contributions)).cyan()
        );
        println!(
            "Repositories with contributions: {}",
            style(repo_count).cyan()
        );
        println!("Lines of code added: {}", style(with_commas(additions)).green());
        println!("Lines of code deleted: {}", style(with_commas(deletions)).red());
        println!(
            "Lines of code changed: {}",
            style(with_commas(additions + deletions)).yellow()
        );
        println!("Project page views: {}", style(with_commas(views)).cyan());
        println!("Languages:");
        for (language, data) in &languages {
            println!("  - {language}: {:.4}%", data.prop);
        }
        Ok(())
    }
}

fn scan_bar(len: u64, message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    pb.set_message(message);
    pb
}

/// One full discovery pass: paginate the owned and contributed-to edges in
/// cursor order until both report no further page, deduplicating by
/// `nameWithOwner`.
pub(crate) async fn discover(transport: &dyn Transport, filters: &Filters) -> Overview {
    let mut acc = Overview::default();
    let mut owned_cursor: Option<String> = None;
    let mut contrib_cursor: Option<String> = None;

    loop {
        let query = queries::repos_overview(owned_cursor.as_deref(), contrib_cursor.as_deref());
        let raw = transport.graphql(&query).await;
        let page: GraphQl<OverviewData> = serde_json::from_value(raw).unwrap_or_default();
        let Some(data) = page.data else {
            // Both transports failed; proceed with whatever is aggregated.
            break;
        };
        let viewer = data.viewer;
        absorb_page(&mut acc, &viewer, filters);

        let owned = viewer.repositories.page_info;
        let contrib = viewer.repositories_contributed_to.page_info;
        if owned.has_next_page || contrib.has_next_page {
            if let Some(cursor) = owned.end_cursor {
                owned_cursor = Some(cursor);
            }
            if let Some(cursor) = contrib.end_cursor {
                contrib_cursor = Some(cursor);
            }
        } else {
            break;
        }
    }

    finalize_language_props(&mut acc);
    acc
}

fn absorb_page(acc: &mut Overview, viewer: &Viewer, filters: &Filters) {
    if acc.name.is_empty() {
        acc.name = viewer
            .name
            .clone()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| {
                if viewer.login.is_empty() {
                    "No Name".to_string()
                } else {
                    viewer.login.clone()
                }
            });
    }

    let mut nodes: Vec<_> = viewer.repositories.nodes.iter().flatten().collect();
    if filters.include_contributed {
        nodes.extend(viewer.repositories_contributed_to.nodes.iter().flatten());
    }

    for repo in nodes {
        let name = &repo.name_with_owner;
        if name.is_empty() || acc.repos.contains_key(name) || filters.exclude_repos.contains(name)
        {
            continue;
        }
        acc.repos.insert(
            name.clone(),
            RepoInfo {
                stargazers: repo.stargazers.total_count,
                forks: repo.fork_count,
            },
        );

        for edge in &repo.languages.edges {
            let lang_name = if edge.node.name.is_empty() {
                "Other"
            } else {
                edge.node.name.as_str()
            };
            if filters.exclude_langs.contains(&lang_name.to_lowercase()) {
                continue;
            }
            let entry = acc
                .languages
                .entry(lang_name.to_string())
                .or_insert_with(|| Language {
                    color: edge.node.color.clone(),
                    ..Language::default()
                });
            entry.size += edge.size;
            entry.occurrences += 1;
        }
    }
}

fn finalize_language_props(acc: &mut Overview) {
    let total: u64 = acc.languages.values().map(|lang| lang.size).sum();
    if total == 0 {
        return;
    }
    for lang in acc.languages.values_mut() {
        lang.prop = 100.0 * lang.size as f64 / total as f64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::FakeTransport;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn repo_node(name: &str, stars: u64, forks: u64, langs: &[(&str, u64)]) -> Value {
        let edges: Vec<Value> = langs
            .iter()
            .map(|(lang, size)| {
                json!({"size": size, "node": {"name": lang, "color": "#123456"}})
            })
            .collect();
        json!({
            "nameWithOwner": name,
            "stargazers": {"totalCount": stars},
            "forkCount": forks,
            "languages": {"edges": edges}
        })
    }

    fn overview_page(
        owned: (&[Value], bool, Option<&str>),
        contrib: (&[Value], bool, Option<&str>),
    ) -> Value {
        json!({
            "data": {
                "viewer": {
                    "login": "octocat",
                    "name": "The Octocat",
                    "repositories": {
                        "pageInfo": {"hasNextPage": owned.1, "endCursor": owned.2},
                        "nodes": owned.0
                    },
                    "repositoriesContributedTo": {
                        "pageInfo": {"hasNextPage": contrib.1, "endCursor": contrib.2},
                        "nodes": contrib.0
                    }
                }
            }
        })
    }

    #[tokio::test]
    async fn discovery_terminates_after_last_page() {
        let fake = FakeTransport::new();
        fake.push_graphql(overview_page(
            (&[repo_node("o/a", 1, 0, &[])], true, Some("c1")),
            (&[], false, None),
        ));
        fake.push_graphql(overview_page(
            (&[repo_node("o/b", 2, 0, &[])], true, Some("c2")),
            (&[], false, None),
        ));
        fake.push_graphql(overview_page(
            (&[repo_node("o/c", 4, 1, &[])], false, None),
            (&[], false, None),
        ));

        let overview = discover(&fake, &Filters::new(&[], &[], false)).await;

        assert_eq!(fake.graphql_calls(), 3);
        assert_eq!(overview.repos.len(), 3);
        assert_eq!(overview.stargazers(), 7);
        assert_eq!(overview.forks(), 1);

        // Cursor order: second page queried with the first page's cursor.
        let log = fake.graphql_log();
        assert!(log[1].contains("after: \"c1\""));
        assert!(log[2].contains("after: \"c2\""));
    }

    #[tokio::test]
    async fn discovery_dedups_across_edges_and_applies_exclusions() {
        let fake = FakeTransport::new();
        fake.push_graphql(overview_page(
            (
                &[
                    repo_node("o/a", 5, 0, &[("Rust", 100)]),
                    repo_node("o/skipped", 50, 50, &[("Rust", 500)]),
                ],
                false,
                None,
            ),
            (
                &[
                    repo_node("o/a", 5, 0, &[("Rust", 100)]),
                    repo_node("peer/b", 2, 1, &[("Python", 300)]),
                ],
                false,
                None,
            ),
        ));

        let filters = Filters::new(&["o/skipped".to_string()], &[], false);
        let overview = discover(&fake, &filters).await;

        assert_eq!(overview.repos.len(), 2);
        assert_eq!(overview.stargazers(), 7);
        // Deduplicated repo contributes its languages once.
        assert_eq!(overview.languages["Rust"].size, 100);
        assert_eq!(overview.languages["Rust"].occurrences, 1);
    }

    #[tokio::test]
    async fn discovery_excludes_languages_case_insensitively() {
        let fake = FakeTransport::new();
        fake.push_graphql(overview_page(
            (
                &[repo_node("o/a", 0, 0, &[("HTML", 700), ("Rust", 300)])],
                false,
                None,
            ),
            (&[], false, None),
        ));

        let filters = Filters::new(&[], &["html".to_string()], false);
        let overview = discover(&fake, &filters).await;

        assert!(!overview.languages.contains_key("HTML"));
        assert!((overview.languages["Rust"].prop - 100.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn discovery_drops_contributed_stream_when_forks_ignored() {
        let fake = FakeTransport::new();
        fake.push_graphql(overview_page(
            (&[repo_node("o/a", 1, 0, &[])], false, None),
            (&[repo_node("peer/b", 9, 9, &[])], false, None),
        ));

        let filters = Filters::new(&[], &[], true);
        let overview = discover(&fake, &filters).await;

        assert_eq!(overview.repos.len(), 1);
        assert!(overview.repos.contains_key("o/a"));
    }

    #[tokio::test]
    async fn language_props_sum_to_one_hundred() {
        let fake = FakeTransport::new();
        fake.push_graphql(overview_page(
            (
                &[
                    repo_node("o/a", 0, 0, &[("Rust", 600), ("Python", 250)]),
                    repo_node("o/b", 0, 0, &[("Go", 150)]),
                ],
                false,
                None,
            ),
            (&[], false, None),
        ));

        let overview = discover(&fake, &Filters::new(&[], &[], false)).await;
        let sum: f64 = overview.languages.values().map(|lang| lang.prop).sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn facade_memoizes_discovery() {
        let fake = std::sync::Arc::new(FakeTransport::new());
        fake.push_graphql(overview_page(
            (&[repo_node("o/a", 3, 2, &[])], false, None),
            (&[], false, None),
        ));

        let dir = tempfile::tempdir().unwrap();
        let cache = CacheStore::new(Some(dir.path().join("stats.json")));
        let mut stats = Stats::new("octocat", fake.clone(), cache, Filters::default());

        assert_eq!(stats.name().await.unwrap(), "The Octocat");
        assert_eq!(stats.stargazers().await.unwrap(), 3);
        assert_eq!(stats.forks().await.unwrap(), 2);
        assert_eq!(fake.graphql_calls(), 1);
    }

    #[tokio::test]
    async fn total_contributions_sums_every_year() {
        let fake = std::sync::Arc::new(FakeTransport::new());
        fake.push_graphql(json!({
            "data": {"viewer": {"contributionsCollection": {"contributionYears": [2024, 2023]}}}
        }));
        fake.push_graphql(json!({
            "data": {"viewer": {
                "year2024": {"contributionCalendar": {"totalContributions": 120}},
                "year2023": {"contributionCalendar": {"totalContributions": 80}}
            }}
        }));

        let dir = tempfile::tempdir().unwrap();
        let cache = CacheStore::new(Some(dir.path().join("stats.json")));
        let mut stats = Stats::new("octocat", fake.clone(), cache, Filters::default());

        assert_eq!(stats.total_contributions().await.unwrap(), 200);
        // Memoized: no further queries.
        assert_eq!(stats.total_contributions().await.unwrap(), 200);
        assert_eq!(fake.graphql_calls(), 2);
    }

    #[tokio::test]
    async fn views_sum_across_repositories() {
        let fake = std::sync::Arc::new(FakeTransport::new());
        fake.push_graphql(overview_page(
            (
                &[repo_node("o/a", 0, 0, &[]), repo_node("o/b", 0, 0, &[])],
                false,
                None,
            ),
            (&[], false, None),
        ));
        fake.route_rest(
            "repos/o/a/traffic/views",
            json!({"views": [{"count": 4}, {"count": 6}]}),
        );
        fake.route_rest("repos/o/b/traffic/views", json!({"views": [{"count": 1}]}));

        let dir = tempfile::tempdir().unwrap();
        let cache = CacheStore::new(Some(dir.path().join("stats.json")));
        let mut stats = Stats::new("octocat", fake.clone(), cache, Filters::default());

        assert_eq!(stats.views().await.unwrap(), 11);
    }
}
