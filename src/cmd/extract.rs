//! Issue extraction command (`issue-scout extract`).

use std::path::PathBuf;

use anyhow::{Context, Result};
use console::style;
use tracing::{error, info};

use issue_scout::backend::github::{GitHubClient, parse_github_url};
use issue_scout::config::Config;
use issue_scout::scout::issues::{collect_issues, is_good_first_issue, progress_bar, write_issues};
use issue_scout::scout::{GitHubIssueSource, IssueSource, MANUAL_PROMPT_HINT, Recommender};

pub struct ExtractOptions {
    pub repo_url: String,
    pub output: PathBuf,
    pub no_llm: bool,
    pub good_first_only: bool,
}

pub async fn cmd_extract(config: &Config, opts: ExtractOptions) -> Result<()> {
    let (owner, repo) = parse_github_url(&opts.repo_url)?;
    eprintln!(
        "Extracting issues from {}...",
        style(format!("{}/{}", owner, repo)).cyan().bold()
    );

    let client = GitHubClient::new(&config.github.api_base, &config.github.oauth_base);
    let source = GitHubIssueSource::new(client, config.github.token.clone());

    let mut issues = source
        .open_issues(&owner, &repo)
        .await
        .with_context(|| format!("Failed to fetch issues for {}/{}", owner, repo))?;
    eprintln!("Found {} open issues.", style(issues.len()).bold());

    if opts.good_first_only {
        issues.retain(is_good_first_issue);
        eprintln!(
            "Kept {} issues labelled {}.",
            style(issues.len()).bold(),
            style("good first issue").green()
        );
    }

    let progress = progress_bar(issues.len() as u64);
    let formatted = collect_issues(&source, &owner, &repo, &issues, &progress).await;

    write_issues(&opts.output, &formatted)?;
    eprintln!(
        "\nIssues data saved to {}",
        style(opts.output.display()).green()
    );
    info!(count = formatted.len(), output = %opts.output.display(), "wrote issues");

    if opts.no_llm {
        return Ok(());
    }

    let Some(recommender) = Recommender::from_config(&config.llm) else {
        eprintln!(
            "{} OPENAI_API_KEY not found in environment variables.",
            style("Warning:").yellow().bold()
        );
        eprintln!(
            "To get recommendations, set OPENAI_API_KEY or pass {} to your preferred LLM with this prompt:",
            opts.output.display()
        );
        println!("\n{}\n", MANUAL_PROMPT_HINT);
        return Ok(());
    };

    match recommender.recommend(&formatted, &owner, &repo).await {
        Ok(recommendation) => {
            println!("\n{}", style("LLM Recommendation:").bold());
            println!("===================");
            println!("{}", recommendation);
        }
        Err(e) => {
            error!(error = %e, "failed to get recommendation");
            eprintln!("{} {:#}", style("Error calling LLM:").red(), e);
        }
    }

    Ok(())
}
