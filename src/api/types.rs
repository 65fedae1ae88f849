//! Wire shapes for the two API surfaces.
//!
//! Every field is absent-tolerant: missing or null values deserialize to
//! defaults so a degraded response never fails a run.

use serde::Deserialize;
use std::collections::HashMap;

/// Generic GraphQL envelope. An error response simply carries no `data`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GraphQl<T> {
    #[serde(default)]
    pub data: Option<T>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OverviewData {
    pub viewer: Viewer,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Viewer {
    pub login: String,
    pub name: Option<String>,
    pub repositories: RepoConnection,
    pub repositories_contributed_to: RepoConnection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RepoConnection {
    pub page_info: PageInfo,
    pub nodes: Vec<Option<RepoNode>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RepoNode {
    pub name_with_owner: String,
    pub stargazers: StargazerCount,
    pub fork_count: u64,
    pub languages: LanguageConnection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StargazerCount {
    pub total_count: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LanguageConnection {
    pub edges: Vec<LanguageEdge>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LanguageEdge {
    pub size: u64,
    pub node: LanguageNode,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LanguageNode {
    pub name: String,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContribYearsData {
    pub viewer: ContribYearsViewer,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContribYearsViewer {
    pub contributions_collection: ContributionYears,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContributionYears {
    pub contribution_years: Vec<i32>,
}

/// Viewer keys are `year2024`-style aliases, so the map is dynamic.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AllContribsData {
    pub viewer: HashMap<String, YearContributions>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct YearContributions {
    pub contribution_calendar: ContributionCalendar,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContributionCalendar {
    pub total_contributions: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CalendarData {
    pub viewer: CalendarViewer,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CalendarViewer {
    pub contributions_collection: CalendarCollection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CalendarCollection {
    pub contribution_calendar: WeeksCalendar,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WeeksCalendar {
    pub weeks: Vec<CalendarWeek>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CalendarWeek {
    pub contribution_days: Vec<CalendarDay>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: String,
    pub contribution_count: u64,
}

/// One element of `repos/{owner}/{repo}/stats/contributors`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContributorStats {
    pub author: ContributorAuthor,
    pub weeks: Vec<WeekStats>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContributorAuthor {
    pub login: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WeekStats {
    pub a: u64,
    pub d: u64,
}

/// One element of `users/{user}/events`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub repo: EventRepo,
    pub payload: EventPayload,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EventRepo {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EventPayload {
    pub head: Option<String>,
    pub commits: Vec<EventCommit>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EventCommit {
    pub sha: String,
}

/// `repos/{owner}/{repo}/commits/{sha}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CommitResponse {
    pub commit: Option<CommitBody>,
    /// Absent for merge commits carrying no diff.
    pub stats: Option<CommitTotals>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CommitBody {
    pub message: String,
    pub author: CommitAuthor,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CommitAuthor {
    pub name: String,
    pub date: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CommitTotals {
    pub additions: u64,
    pub deletions: u64,
}

/// `repos/{owner}/{repo}/traffic/views`; the service reports the last
/// 14 days only.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TrafficViews {
    pub views: Vec<TrafficBucket>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TrafficBucket {
    pub count: u64,
}
