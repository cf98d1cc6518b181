//! Interactive run picker.

use std::io::{BufRead, Write};

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use ghrun_core::{ActionsApi, RepoRef, Run};

use crate::iostreams::ColorScheme;
use crate::render::symbol;

/// Number of recent runs offered for selection.
const RECENT_RUNS: u32 = 10;

/// Asks the user to choose a run.
#[async_trait]
pub trait RunPrompter: Send + Sync {
    /// Returns the identifier of the chosen run.
    async fn prompt_for_run(
        &self,
        cs: &ColorScheme,
        api: &dyn ActionsApi,
        repo: &RepoRef,
    ) -> Result<String>;
}

/// Numbered menu on stderr, answered on stdin.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

#[async_trait]
impl RunPrompter for TerminalPrompter {
    async fn prompt_for_run(
        &self,
        cs: &ColorScheme,
        api: &dyn ActionsApi,
        repo: &RepoRef,
    ) -> Result<String> {
        let runs = api
            .list_runs(repo, RECENT_RUNS)
            .await
            .context("failed to get runs")?;
        let cs = *cs;

        tokio::task::spawn_blocking(move || {
            let stdin = std::io::stdin();
            let mut stderr = std::io::stderr();
            select_run(&cs, &runs, &mut stdin.lock(), &mut stderr)
        })
        .await
        .context("run selection task failed")?
    }
}

/// One menu line per run: `<symbol> <branch> <name> · <id>`.
pub fn format_choices(cs: &ColorScheme, runs: &[Run]) -> Vec<String> {
    runs.iter()
        .map(|run| {
            format!(
                "{} {} {} · {}",
                symbol(cs, run.status, run.conclusion),
                cs.bold(&run.head_branch),
                run.name,
                cs.cyan(&run.id.to_string())
            )
        })
        .collect()
}

/// Parse a 1-based menu choice into an index.
pub fn parse_selection(input: &str, count: usize) -> Result<usize> {
    let input = input.trim();
    if input.is_empty() {
        bail!("run selection cancelled");
    }
    match input.parse::<usize>() {
        Ok(n) if (1..=count).contains(&n) => Ok(n - 1),
        _ => bail!(
            "invalid choice {:?}: expected a number between 1 and {}",
            input,
            count
        ),
    }
}

/// Show the menu on `prompt_out`, read one line from `input`, return the chosen run ID.
pub fn select_run(
    cs: &ColorScheme,
    runs: &[Run],
    input: &mut dyn BufRead,
    prompt_out: &mut dyn Write,
) -> Result<String> {
    if runs.is_empty() {
        bail!("found no recent runs");
    }

    writeln!(prompt_out, "Select a workflow run")?;
    for (i, choice) in format_choices(cs, runs).iter().enumerate() {
        writeln!(prompt_out, "{:>3}. {}", i + 1, choice)?;
    }
    write!(prompt_out, "? Choice [1-{}]: ", runs.len())?;
    prompt_out.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;

    let index = parse_selection(&line, runs.len())?;
    Ok(runs[index].id.to_string())
}
