use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use log::info;
use std::path::{Path, PathBuf};

use crate::auth::Token;
use crate::config::{Config, OutputFormat};
use crate::error::StalemateError;
use crate::output;
use crate::providers::{GitLabClient, JiraClient, SlackClient};
use crate::report::SweepReport;
use crate::sweep::staleness::Thresholds;
use crate::sweep::{SweepOptions, Sweeper};

#[derive(Parser)]
#[command(name = "stalemate")]
#[command(
    author,
    version,
    about = "Closes stale GitLab merge requests and branches and reports them on Slack",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to ./stalemate.{toml,json,yaml,yml})
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Write the JSON report to this file
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[arg(short, long, global = true, default_value_t = false)]
    pretty: bool,

    #[arg(short, long, global = true, value_enum)]
    format: Option<OutputFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sweep a project: delete stale branches, close expired MRs, notify Slack
    Run(RunArgs),

    /// Write a starter config file
    Init {
        #[arg(default_value = "stalemate.toml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

#[derive(Args, Debug, Default)]
struct RunArgs {
    /// GitLab project ID or path
    #[arg(short = 'P', long)]
    project: Option<String>,

    #[arg(long, env = "GITLAB_TOKEN", hide_env_values = true)]
    gitlab_token: Option<String>,

    #[arg(long, env = "JIRA_TOKEN", hide_env_values = true)]
    jira_token: Option<String>,

    #[arg(long, env = "SLACK_TOKEN", hide_env_values = true)]
    slack_token: Option<String>,

    /// Slack channel ID to post the summary to
    #[arg(long)]
    channel: Option<String>,

    #[arg(long)]
    gitlab_url: Option<String>,

    #[arg(long)]
    jira_url: Option<String>,

    #[arg(long)]
    slack_url: Option<String>,

    /// Mail domain of GitLab users, used to find their Slack accounts
    #[arg(long)]
    email_domain: Option<String>,

    /// Jira status that closes linked merge requests
    #[arg(long)]
    closed_status: Option<String>,

    #[arg(long)]
    stale_months: Option<u32>,

    #[arg(long)]
    expire_months: Option<u32>,

    #[arg(long)]
    branch_months: Option<u32>,

    /// Query everything but change nothing and post nothing
    #[arg(short = 'n', long, default_value_t = false)]
    dry_run: bool,
}

/// Fully resolved settings for one run: CLI flags over config file over defaults.
#[derive(Debug)]
struct RunSettings {
    gitlab_url: String,
    gitlab_token: Token,
    jira_url: String,
    jira_token: Token,
    slack_url: String,
    slack_token: Token,
    options: SweepOptions,
}

fn required(value: Option<String>, what: &str, hint: &str) -> Result<String, StalemateError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| StalemateError::Config(format!("missing {what} ({hint})")))
}

impl RunSettings {
    fn resolve(config: Config, args: &RunArgs) -> Result<Self, StalemateError> {
        let thresholds = Thresholds {
            stale_mr_months: args
                .stale_months
                .unwrap_or(config.thresholds.stale_mr_months),
            expired_mr_months: args
                .expire_months
                .unwrap_or(config.thresholds.expired_mr_months),
            stale_branch_months: args
                .branch_months
                .unwrap_or(config.thresholds.stale_branch_months),
        };
        thresholds.validate()?;

        let options = SweepOptions {
            project_id: required(
                args.project.clone().or(config.gitlab.project),
                "GitLab project",
                "--project or [gitlab] project",
            )?,
            channel_id: required(
                args.channel.clone().or(config.slack.channel_id),
                "Slack channel",
                "--channel or [slack] channel-id",
            )?,
            email_domain: required(
                args.email_domain.clone().or(config.slack.email_domain),
                "email domain",
                "--email-domain or [slack] email-domain",
            )?,
            closed_status: args
                .closed_status
                .clone()
                .unwrap_or(config.jira.closed_status),
            thresholds,
            dry_run: args.dry_run,
        };

        Ok(Self {
            gitlab_url: args.gitlab_url.clone().unwrap_or(config.gitlab.base_url),
            gitlab_token: required(
                args.gitlab_token.clone().or(config.gitlab.token),
                "GitLab token",
                "--gitlab-token or GITLAB_TOKEN",
            )?
            .into(),
            jira_url: required(
                args.jira_url.clone().or(config.jira.base_url),
                "Jira URL",
                "--jira-url or [jira] base-url",
            )?,
            jira_token: required(
                args.jira_token.clone().or(config.jira.token),
                "Jira token",
                "--jira-token or JIRA_TOKEN",
            )?
            .into(),
            slack_url: args.slack_url.clone().unwrap_or(config.slack.api_url),
            slack_token: required(
                args.slack_token.clone().or(config.slack.token),
                "Slack token",
                "--slack-token or SLACK_TOKEN",
            )?
            .into(),
            options,
        })
    }
}

impl Cli {
    async fn execute_run(&self, args: &RunArgs) -> Result<()> {
        let config = Config::load(self.config.as_deref())?;
        let format = self.format.unwrap_or(config.output.format);
        let pretty = self.pretty || config.output.pretty;

        let settings = RunSettings::resolve(config, args)?;
        let thresholds = settings.options.thresholds;

        info!(
            "Sweeping GitLab project: {}",
            settings.options.project_id
        );

        let sweeper = Sweeper::new(
            GitLabClient::new(&settings.gitlab_url, settings.gitlab_token)?,
            JiraClient::new(&settings.jira_url, settings.jira_token)?,
            SlackClient::new(&settings.slack_url, settings.slack_token)?,
            settings.options,
        );

        let report = sweeper.run(Utc::now()).await?;

        self.write_report(&report, format, pretty, &thresholds)
    }

    fn write_report(
        &self,
        report: &SweepReport,
        format: OutputFormat,
        pretty: bool,
        thresholds: &Thresholds,
    ) -> Result<()> {
        let json_output = if pretty {
            serde_json::to_string_pretty(report)?
        } else {
            serde_json::to_string(report)?
        };

        if let Some(output_path) = &self.output {
            std::fs::write(output_path, &json_output)
                .with_context(|| format!("Failed to write report: {}", output_path.display()))?;
            info!("Report written to: {}", output_path.display());
        }

        match format {
            OutputFormat::Summary => output::print_summary(report, thresholds),
            OutputFormat::Json => println!("{json_output}"),
        }

        Ok(())
    }

    fn execute_init(path: &Path, force: bool) -> Result<()> {
        if path.exists() && !force {
            anyhow::bail!(
                "{} already exists, pass --force to overwrite it",
                path.display()
            );
        }

        Config::default().save(path)?;
        info!("Config written to: {}", path.display());
        Ok(())
    }

    pub async fn execute(&self) -> Result<()> {
        match &self.command {
            Commands::Run(args) => self.execute_run(args).await,
            Commands::Init { path, force } => Self::execute_init(path, *force),
        }
    }
}
