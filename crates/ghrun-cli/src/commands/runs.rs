//! Run commands.

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::Args;
use ghrun_core::{ActionsApi, Annotation, Job, RepoRef, Run};
use tracing::{debug, info};

use crate::error::{CommandError, CommandResult};
use crate::factory::Factory;
use crate::iostreams::IoStreams;
use crate::prompt::RunPrompter;
use crate::render::render_run;

/// Arguments of `run view`.
#[derive(Debug, Clone, Default, Args)]
pub struct ViewArgs {
    /// Run ID; prompts for one when omitted in an interactive terminal
    #[arg(value_name = "RUN_ID")]
    pub run_id: Option<String>,

    /// Show job steps
    #[arg(short, long)]
    pub verbose: bool,

    /// Exit with non-zero status if run failed
    #[arg(short, long)]
    pub exit_status: bool,
}

/// How the run to display is chosen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RunSelection {
    /// Given on the command line, used verbatim.
    Explicit(String),
    /// Ask the user to pick one.
    #[default]
    Prompt,
}

#[derive(Debug, Clone)]
pub struct ViewOptions {
    pub selection: RunSelection,
    pub verbose: bool,
    pub exit_status: bool,
    pub show_progress: bool,
    /// Clock used for the "Triggered via ... ago" line.
    pub now: fn() -> DateTime<Utc>,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            selection: RunSelection::default(),
            verbose: false,
            exit_status: false,
            show_progress: false,
            now: Utc::now,
        }
    }
}

impl ViewOptions {
    /// Decide which run to show. Without a run ID and without a terminal to
    /// prompt on, this is a usage error.
    pub fn resolve(args: ViewArgs, interactive: bool) -> CommandResult<Self> {
        let selection = match args.run_id {
            Some(id) => RunSelection::Explicit(id),
            None if interactive => RunSelection::Prompt,
            None => return Err(CommandError::Usage("expected a run ID".to_string())),
        };

        Ok(Self {
            selection,
            verbose: args.verbose,
            exit_status: args.exit_status,
            show_progress: interactive,
            now: Utc::now,
        })
    }
}

/// Everything rendered for one run.
#[derive(Debug, Clone)]
pub struct RunDetails {
    pub run: Run,
    pub jobs: Vec<Job>,
    /// Annotations of every job, in job order.
    pub annotations: Vec<Annotation>,
}

/// `run view`: show a summary of a workflow run.
///
/// `opts` comes from [`ViewOptions::resolve`], which runs before any
/// configuration is loaded.
pub async fn view(opts: ViewOptions, factory: &dyn Factory, io: &mut IoStreams) -> CommandResult {
    let api = factory
        .api_client()
        .context("failed to create http client")?;
    let repo = factory
        .base_repo()
        .await
        .context("failed to determine base repo")?;

    run_view(&opts, io, api.as_ref(), &repo, factory.prompter()).await
}

pub async fn run_view(
    opts: &ViewOptions,
    io: &mut IoStreams,
    api: &dyn ActionsApi,
    repo: &RepoRef,
    prompter: &dyn RunPrompter,
) -> CommandResult {
    let run_id = match &opts.selection {
        RunSelection::Explicit(id) => id.clone(),
        RunSelection::Prompt => {
            let cs = io.color_scheme();
            prompter.prompt_for_run(&cs, api, repo).await?
        }
    };

    info!(run_id = %run_id, repo = %repo, "Viewing run");

    let details = {
        let _progress = io.start_progress(opts.show_progress);
        fetch_run_details(api, repo, &run_id).await?
    };

    let cs = io.color_scheme();
    render_run(
        io.out.as_mut(),
        &cs,
        opts,
        (opts.now)(),
        &details.run,
        &details.jobs,
        &details.annotations,
    )
}

/// Fetch the run, its jobs and their annotations, in that order.
///
/// The first failure aborts the whole fetch; annotations gathered from earlier
/// jobs are dropped.
pub async fn fetch_run_details(
    api: &dyn ActionsApi,
    repo: &RepoRef,
    run_id: &str,
) -> anyhow::Result<RunDetails> {
    let run = api
        .get_run(repo, run_id)
        .await
        .context("failed to get run")?;

    let jobs = api
        .get_jobs(repo, &run)
        .await
        .context("failed to get jobs")?;
    debug!(run_id = run.id, jobs = jobs.len(), "Fetched jobs");

    let mut annotations = Vec::new();
    for job in &jobs {
        let mut job_annotations = api
            .get_annotations(repo, job)
            .await
            .context("failed to get annotations")?;
        annotations.append(&mut job_annotations);
    }
    debug!(annotations = annotations.len(), "Fetched annotations");

    Ok(RunDetails {
        run,
        jobs,
        annotations,
    })
}
