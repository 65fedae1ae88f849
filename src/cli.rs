use crate::api::{Client, DEFAULT_MAX_CONNECTIONS};
use crate::cache::CacheStore;
use crate::model::Filters;
use crate::stats::Stats;
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "octostat")]
#[command(about = "GitHub profile statistics generator with incremental caching and SVG badges")]
#[command(version)]
pub struct Cli {
    #[clap(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone)]
pub struct CommonArgs {
    #[arg(
        long,
        env = "ACCESS_TOKEN",
        hide_env_values = true,
        help = "GitHub personal access token"
    )]
    pub token: String,

    #[arg(long, env = "GITHUB_ACTOR", help = "GitHub username to collect statistics for")]
    pub user: String,

    #[arg(
        long,
        env = "EXCLUDED",
        value_delimiter = ',',
        help = "Repositories to exclude, as owner/name"
    )]
    pub exclude_repos: Vec<String>,

    #[arg(
        long,
        env = "EXCLUDED_LANGS",
        value_delimiter = ',',
        help = "Languages to exclude (case-insensitive)"
    )]
    pub exclude_langs: Vec<String>,

    #[arg(
        long,
        env = "EXCLUDE_FORKED_REPOS",
        value_parser = parse_truthy,
        default_value = "",
        num_args = 0..=1,
        default_missing_value = "true",
        help = "Ignore contributions to repositories the user does not own"
    )]
    pub exclude_forked_repos: bool,

    #[arg(long, help = "Path to cache file")]
    pub cache: Option<PathBuf>,

    #[arg(
        long,
        default_value_t = DEFAULT_MAX_CONNECTIONS,
        help = "Maximum concurrent API requests"
    )]
    pub max_connections: usize,
}

/// Any non-empty value other than the literal "false" (case-insensitive)
/// counts as true.
fn parse_truthy(raw: &str) -> std::result::Result<bool, String> {
    let value = raw.trim();
    Ok(!value.is_empty() && !value.eq_ignore_ascii_case("false"))
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Generate all SVG artifacts")]
    Generate,
    #[command(about = "Print a summary of the collected statistics")]
    Summary,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    pub async fn execute(self) -> Result<()> {
        let client = Client::new(self.common.token.clone(), self.common.max_connections)
            .context("Failed to build API client")?;
        let cache = CacheStore::new(self.common.cache.clone());
        let filters = Filters::new(
            &self.common.exclude_repos,
            &self.common.exclude_langs,
            self.common.exclude_forked_repos,
        );
        let mut stats = Stats::new(self.common.user.clone(), Arc::new(client), cache, filters);

        match self.command {
            Commands::Generate => crate::render::generate_all(&mut stats)
                .await
                .context("Failed to generate artifacts"),
            Commands::Summary => stats
                .print_summary()
                .await
                .context("Failed to collect statistics"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthy_parses_like_the_environment_contract() {
        assert_eq!(parse_truthy(""), Ok(false));
        assert_eq!(parse_truthy("  "), Ok(false));
        assert_eq!(parse_truthy("false"), Ok(false));
        assert_eq!(parse_truthy("FALSE"), Ok(false));
        assert_eq!(parse_truthy("true"), Ok(true));
        assert_eq!(parse_truthy("1"), Ok(true));
        assert_eq!(parse_truthy("anything"), Ok(true));
    }

    #[test]
    fn cli_requires_token_and_user() {
        std::env::remove_var("ACCESS_TOKEN");
        std::env::remove_var("GITHUB_ACTOR");
        let parsed = Cli::try_parse_from(["octostat", "generate"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn cli_parses_exclusion_lists() {
        let cli = Cli::try_parse_from([
            "octostat",
            "--token",
            "t",
            "--user",
            "octocat",
            "--exclude-repos",
            "o/a,o/b",
            "--exclude-langs",
            "HTML",
            "generate",
        ])
        .unwrap();
        assert_eq!(cli.common.exclude_repos, vec!["o/a", "o/b"]);
        assert_eq!(cli.common.exclude_langs, vec!["HTML"]);
        assert!(!cli.common.exclude_forked_repos);
    }

    #[test]
    fn exclude_forked_repos_flag_works_bare() {
        let cli = Cli::try_parse_from([
            "octostat",
            "--token",
            "t",
            "--user",
            "octocat",
            "--exclude-forked-repos",
            "generate",
        ])
        .unwrap();
        assert!(cli.common.exclude_forked_repos);
    }
}
