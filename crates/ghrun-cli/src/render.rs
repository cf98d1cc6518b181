//! Terminal rendering of a workflow run.

use std::io::Write;

use chrono::{DateTime, Utc};
use ghrun_core::{Annotation, AnnotationLevel, Conclusion, Job, Run, Status, Symbol};

use crate::commands::runs::ViewOptions;
use crate::error::{CommandError, CommandResult};
use crate::iostreams::ColorScheme;

/// Colored glyph for a run, job or step.
pub fn symbol(cs: &ColorScheme, status: Status, conclusion: Option<Conclusion>) -> String {
    match Symbol::for_state(status, conclusion) {
        Symbol::Success => cs.success_icon(),
        Symbol::Failure => cs.failure_icon(),
        Symbol::Neutral => cs.neutral_icon(),
        Symbol::Pending => cs.pending_icon(),
    }
}

/// Colored glyph for an annotation.
pub fn annotation_symbol(cs: &ColorScheme, level: AnnotationLevel) -> String {
    match level {
        AnnotationLevel::Failure => cs.failure_icon(),
        AnnotationLevel::Warning => cs.warning_icon(),
        AnnotationLevel::Notice | AnnotationLevel::Unknown => "-".to_string(),
    }
}

/// Human fuzzy duration, e.g. "5 hours ago". Negative durations read as "now".
pub fn fuzzy_ago(ago: chrono::Duration) -> String {
    let ago = ago.to_std().unwrap_or_default();
    timeago::Formatter::new().convert(ago)
}

fn title_for_run(cs: &ColorScheme, run: &Run) -> String {
    format!("{} {}", cs.bold(&run.head_branch), run.name)
}

/// Write the run summary.
///
/// Returns [`CommandError::Silent`] when `--exit-status` was requested and the
/// run concluded in a failure state.
pub fn render_run(
    out: &mut dyn Write,
    cs: &ColorScheme,
    opts: &ViewOptions,
    now: DateTime<Utc>,
    run: &Run,
    jobs: &[Job],
    annotations: &[Annotation],
) -> CommandResult {
    let title = title_for_run(cs, run);
    let run_symbol = symbol(cs, run.status, run.conclusion);
    let id = cs.cyan(&run.id.to_string());

    writeln!(out)?;
    writeln!(out, "{} {} · {}", run_symbol, title, id)?;
    writeln!(
        out,
        "Triggered via {} {}",
        run.event,
        fuzzy_ago(now - run.created_at)
    )?;
    writeln!(out)?;

    if jobs.is_empty() && run.conclusion == Some(Conclusion::Failure) {
        writeln!(
            out,
            "{} {}",
            cs.failure_icon(),
            cs.bold("This run likely failed because of a workflow file issue.")
        )?;
        writeln!(out)?;
        writeln!(out, "For more information, see: {}", cs.bold(&run.url))?;

        return exit_status(opts, run);
    }

    writeln!(out, "{}", cs.bold("JOBS"))?;

    for job in jobs {
        let job_symbol = symbol(cs, job.status, job.conclusion);
        let id = cs.cyan(&job.id.to_string());
        writeln!(out, "{} {} (ID {})", job_symbol, job.name, id)?;
        if opts.verbose || ghrun_core::is_failure_state(job.conclusion) {
            for step in &job.steps {
                writeln!(
                    out,
                    "  {} {}",
                    symbol(cs, step.status, step.conclusion),
                    step.name
                )?;
            }
        }
    }

    if !annotations.is_empty() {
        writeln!(out)?;
        writeln!(out, "{}", cs.bold("ANNOTATIONS"))?;

        for a in annotations {
            writeln!(out, "{} {}", annotation_symbol(cs, a.level), a.message)?;
            writeln!(
                out,
                "{}",
                cs.gray(&format!("{}: {}#{}\n", a.job_name, a.path, a.start_line))
            )?;
        }
    }

    writeln!(out)?;
    writeln!(
        out,
        "For more information about a job, try: gh job view <job-id>"
    )?;
    writeln!(
        out,
        "{}",
        cs.gray(&format!("view this run on GitHub: {}", run.url))
    )?;

    exit_status(opts, run)
}

fn exit_status(opts: &ViewOptions, run: &Run) -> CommandResult {
    if opts.exit_status && ghrun_core::is_failure_state(run.conclusion) {
        return Err(CommandError::Silent);
    }
    Ok(())
}
