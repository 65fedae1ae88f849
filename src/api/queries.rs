//! GraphQL query builders for the structured query endpoint.

fn cursor_literal(cursor: Option<&str>) -> String {
    match cursor {
        Some(c) => format!("\"{c}\""),
        None => "null".to_string(),
    }
}

/// Overview of the viewer's owned and contributed-to repositories, both
/// edges paginated independently.
pub fn repos_overview(owned_cursor: Option<&str>, contrib_cursor: Option<&str>) -> String {
    format!(
        r#"{{
  viewer {{
    login
    name
    repositories(
      first: 100,
      orderBy: {{field: UPDATED_AT, direction: DESC}},
      isFork: false,
      after: {owned}
    ) {{
      pageInfo {{
        hasNextPage
        endCursor
      }}
      nodes {{
        nameWithOwner
        stargazers {{
          totalCount
        }}
        forkCount
        languages(first: 10, orderBy: {{field: SIZE, direction: DESC}}) {{
          edges {{
            size
            node {{
              name
              color
            }}
          }}
        }}
      }}
    }}
    repositoriesContributedTo(
      first: 100,
      includeUserRepositories: false,
      orderBy: {{field: UPDATED_AT, direction: DESC}},
      contributionTypes: [COMMIT, PULL_REQUEST, REPOSITORY, PULL_REQUEST_REVIEW],
      after: {contrib}
    ) {{
      pageInfo {{
        hasNextPage
        endCursor
      }}
      nodes {{
        nameWithOwner
        stargazers {{
          totalCount
        }}
        forkCount
        languages(first: 10, orderBy: {{field: SIZE, direction: DESC}}) {{
          edges {{
            size
            node {{
              name
              color
            }}
          }}
        }}
      }}
    }}
  }}
}}"#,
        owned = cursor_literal(owned_cursor),
        contrib = cursor_literal(contrib_cursor),
    )
}

/// All years the viewer has contributed in.
pub fn contrib_years() -> String {
    r#"query {
  viewer {
    contributionsCollection {
      contributionYears
    }
  }
}"#
    .to_string()
}

fn contribs_by_year(year: i32) -> String {
    format!(
        r#"  year{year}: contributionsCollection(
    from: "{year}-01-01T00:00:00Z",
    to: "{next}-01-01T00:00:00Z"
  ) {{
    contributionCalendar {{
      totalContributions
    }}
  }}"#,
        next = year + 1,
    )
}

/// Contribution totals for every given year, one aliased sub-query per year.
pub fn all_contribs(years: &[i32]) -> String {
    let by_years = years
        .iter()
        .map(|y| contribs_by_year(*y))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        r#"query {{
  viewer {{
{by_years}
  }}
}}"#
    )
}

/// Daily contribution counts for a single calendar year.
pub fn daily_activity(year: i32) -> String {
    format!(
        r#"query {{
  viewer {{
    contributionsCollection(
      from: "{year}-01-01T00:00:00Z",
      to: "{next}-01-01T00:00:00Z"
    ) {{
      contributionCalendar {{
        weeks {{
          contributionDays {{
            date
            contributionCount
          }}
        }}
      }}
    }}
  }}
}}"#,
        next = year + 1,
    )
}
