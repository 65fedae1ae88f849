//! Static artifact generation: placeholder substitution over the SVG
//! templates, written to the output directory.

pub mod graph;

use crate::activity;
use crate::commits::DEFAULT_LIMIT;
use crate::error::{Result, StatsError};
use crate::model::{CommitDetail, Language};
use crate::stats::Stats;
use crate::util::with_commas;
use chrono::{Datelike, Utc};
use console::style;
use std::fmt::Write as _;
use std::path::Path;

pub const TEMPLATE_DIR: &str = "templates";
pub const OUTPUT_DIR: &str = "generated";

const ANIMATION_DELAY_STEP_MS: usize = 150;
const FALLBACK_COLOR: &str = "#000000";

fn load_template(name: &str) -> Result<String> {
    let path = Path::new(TEMPLATE_DIR).join(name);
    std::fs::read_to_string(&path)
        .map_err(|e| StatsError::Template(format!("{}: {e}", path.display())))
}

fn write_artifact(name: &str, contents: &str) -> Result<()> {
    std::fs::create_dir_all(OUTPUT_DIR)?;
    std::fs::write(Path::new(OUTPUT_DIR).join(name), contents)?;
    Ok(())
}

/// Generate every artifact. Each one reuses the statistics memoized by the
/// previous ones, so discovery and the reconcilers run at most once.
pub async fn generate_all(stats: &mut Stats) -> Result<()> {
    overview(stats).await?;
    println!("{} generated/overview.svg", style("✓").green());
    languages(stats).await?;
    println!("{} generated/languages.svg", style("✓").green());
    recent_commits(stats).await?;
    println!("{} generated/recent_commits.svg", style("✓").green());
    activity_graph(stats).await?;
    println!("{} generated/activity_graph.svg", style("✓").green());
    Ok(())
}

/// Overview badge with the headline numbers.
pub async fn overview(stats: &mut Stats) -> Result<()> {
    let template = load_template("overview.svg")?;
    let (additions, deletions) = stats.lines_changed().await?;
    let output = template
        .replace("{{ name }}", &stats.name().await?)
        .replace("{{ stars }}", &with_commas(stats.stargazers().await?))
        .replace("{{ forks }}", &with_commas(stats.forks().await?))
        .replace(
            "{{ contributions }}",
            &with_commas(stats.total_contributions().await?),
        )
        .replace("{{ lines_changed }}", &with_commas(additions + deletions))
        .replace("{{ views }}", &with_commas(stats.views().await?))
        .replace("{{ repos }}", &with_commas(stats.repos().await?.len() as u64));
    write_artifact("overview.svg", &output)
}

/// Language breakdown: a stacked progress bar plus an animated list.
pub async fn languages(stats: &mut Stats) -> Result<()> {
    let template = load_template("languages.svg")?;
    let languages = stats.languages().await?;
    let (progress, lang_list) = language_markup(&languages);
    let output = template
        .replace("{{ progress }}", &progress)
        .replace("{{ lang_list }}", &lang_list);
    write_artifact("languages.svg", &output)
}

fn language_markup(languages: &[(String, Language)]) -> (String, String) {
    let mut progress = String::new();
    let mut lang_list = String::new();
    for (i, (name, data)) in languages.iter().enumerate() {
        let color = data.color.as_deref().unwrap_or(FALLBACK_COLOR);
        let _ = write!(
            progress,
            r#"<span style="background-color: {color};width: {:.3}%;" class="progress-item"></span>"#,
            data.prop
        );
        let _ = write!(
            lang_list,
            r#"
<li style="animation-delay: {delay}ms;">
<svg xmlns="http://www.w3.org/2000/svg" class="octicon" style="fill:{color};"
viewBox="0 0 16 16" version="1.1" width="16" height="16"><path
fill-rule="evenodd" d="M8 4a4 4 0 100 8 4 4 0 000-8z"></path></svg>
<span class="lang">{name}</span>
<span class="percent">{prop:.2}%</span>
</li>
"#,
            delay = i * ANIMATION_DELAY_STEP_MS,
            prop = data.prop,
        );
    }
    (progress, lang_list)
}

/// Recent-commits card, newest first with a "latest" badge.
pub async fn recent_commits(stats: &mut Stats) -> Result<()> {
    let template = load_template("recent_commits.svg")?;
    let commits = stats.recent_commits(DEFAULT_LIMIT).await?;
    let output = template.replace("{{ commits }}", &commit_markup(&commits));
    write_artifact("recent_commits.svg", &output)
}

fn commit_markup(commits: &[CommitDetail]) -> String {
    let mut items = String::new();
    for (i, commit) in commits.iter().enumerate() {
        let badge = if i == 0 {
            r#"<span class="badge">latest</span>"#
        } else {
            ""
        };
        let _ = write!(
            items,
            r#"
<li style="animation-delay:{delay}ms">
<div class="repo">
<span class="dot"></span>
<span class="text">{repo}</span>
{badge}
</div>
<div class="commit">
<span class="child-line"></span>
<div>
<span class="commit-msg">{message}</span>
<span class="meta">
by {author} &#8226; {date}
</span>
</div>
</div>
</li>
"#,
            delay = i * ANIMATION_DELAY_STEP_MS,
            repo = commit.repo,
            message = commit.message,
            author = commit.author,
            date = commit.date,
        );
    }
    items
}

/// Yearly contribution activity graph for the current year.
pub async fn activity_graph(stats: &mut Stats) -> Result<()> {
    let template = load_template("activity_graph.svg")?;
    let current_year = Utc::now().year();
    let days = stats.daily_activity(current_year).await?;
    let (year, slots) = activity::month_slots(&days, current_year);
    let output = graph::render(&template, year, &slots);
    write_artifact("activity_graph.svg", &output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lang(name: &str, prop: f64, color: Option<&str>) -> (String, Language) {
        (
            name.to_string(),
            Language {
                size: 100,
                occurrences: 1,
                color: color.map(str::to_string),
                prop,
            },
        )
    }

    #[test]
    fn language_markup_defaults_color_and_staggers_delays() {
        let languages = vec![
            lang("Rust", 60.5, Some("#dea584")),
            lang("Python", 39.5, None),
        ];
        let (progress, list) = language_markup(&languages);
        assert!(progress.contains("background-color: #dea584;width: 60.500%;"));
        assert!(progress.contains("background-color: #000000;width: 39.500%;"));
        assert!(list.contains("animation-delay: 0ms;"));
        assert!(list.contains("animation-delay: 150ms;"));
        assert!(list.contains("<span class=\"percent\">39.50%</span>"));
    }

    #[test]
    fn commit_markup_badges_only_the_newest() {
        let commits = vec![
            CommitDetail {
                repo: "o/a".into(),
                message: "fix parser".into(),
                author: "Octo Cat".into(),
                date: "2024-05-02T08:30:00Z".into(),
                sha: "abc1234".into(),
            },
            CommitDetail {
                repo: "o/b".into(),
                message: "add docs".into(),
                author: "Octo Cat".into(),
                date: "2024-05-01T08:30:00Z".into(),
                sha: "def5678".into(),
            },
        ];
        let items = commit_markup(&commits);
        assert_eq!(items.matches("latest").count(), 1);
        assert!(items.contains("fix parser"));
        assert!(items.contains("animation-delay:150ms"));
    }

    #[test]
    fn commit_markup_of_no_commits_is_empty() {
        assert!(commit_markup(&[]).is_empty());
    }
}
