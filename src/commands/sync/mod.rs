//! Full reconciliation batch and the scoped variants behind the other
//! mutating commands.

pub mod pipeline;

use crate::commands::{BatchContext, persist_state};
use crate::core::report::Outcome;
use crate::error::{Result, VimpackError};
use crate::state::io::BatchLock;
use crate::ui::{self, ConsoleSink, ProgressSink};
use pipeline::{BatchSummary, PipelineOptions, StageScope};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    pub config: Option<PathBuf>,
    /// Restrict install/update to these plugins; `None` = all declared.
    pub targets: Option<Vec<String>>,
    pub jobs: Option<usize>,
    /// Approve prompts (clean confirmation) without asking.
    pub yes: bool,
}

pub fn run(options: &SyncOptions) -> Result<()> {
    run_scoped(options, StageScope::full(), "Syncing plugins")
}

pub(crate) fn run_scoped(options: &SyncOptions, scope: StageScope, title: &str) -> Result<()> {
    let started = Instant::now();
    let mut ctx = BatchContext::load(options.config.as_deref(), options.jobs)?;

    ui::header(title);
    ui::verbose(&format!(
        "{} plugin(s) declared, pack dir {}",
        ctx.registry.len(),
        ctx.settings.pack_dir.display()
    ));

    // Held for the whole batch; a concurrent invocation fails fast.
    let _lock = BatchLock::acquire(&ctx.settings.pack_dir)?;

    let sink = ConsoleSink::new(options.yes);
    let pipeline_options = PipelineOptions {
        targets: options.targets.clone(),
        jobs: ctx.settings.jobs,
        auto_clean: options.yes || ctx.settings.auto_clean,
        scope,
    };

    let summary = pipeline::run(
        &mut ctx.registry,
        &ctx.layout,
        &ctx.backends,
        &ctx.hooks,
        &sink,
        &pipeline_options,
    )?;

    persist_state(&ctx)?;
    print_summary(&summary);
    sink.finish(started.elapsed());

    let failures = summary
        .report
        .values()
        .filter(|outcome| outcome.is_failure())
        .count();
    if failures > 0 {
        return Err(VimpackError::Other(format!(
            "{} plugin(s) failed; see output above",
            failures
        )));
    }
    Ok(())
}

fn print_summary(summary: &BatchSummary) {
    let mut installed = 0usize;
    let mut updated = 0usize;
    let mut commits = 0usize;
    let mut up_to_date = 0usize;
    let mut frozen = 0usize;
    let mut moved = 0usize;
    let mut failed = 0usize;

    for outcome in summary.report.values() {
        match outcome {
            Outcome::Installed => installed += 1,
            Outcome::Updated { .. } => {
                updated += 1;
                commits += outcome.commit_count();
            }
            Outcome::UpToDate => up_to_date += 1,
            Outcome::Frozen => frozen += 1,
            Outcome::Moved { .. } => moved += 1,
            Outcome::Failed { .. } => failed += 1,
        }
    }

    ui::separator();
    if installed > 0 {
        ui::info(&format!("Installed: {}", installed));
    }
    if updated > 0 {
        ui::info(&format!("Updated: {} ({} commits)", updated, commits));
    }
    if moved > 0 {
        ui::info(&format!("Moved: {}", moved));
    }
    if up_to_date > 0 {
        ui::info(&format!("Up to date: {}", up_to_date));
    }
    if frozen > 0 {
        ui::info(&format!("Frozen (skipped): {}", frozen));
    }
    if !summary.removed.is_empty() {
        ui::info(&format!("Removed: {} director(ies)", summary.removed.len()));
    }
    if !summary.regenerated.is_empty() {
        ui::info(&format!(
            "Helptags regenerated: {}",
            summary.regenerated.join(", ")
        ));
    }
    if failed > 0 {
        ui::error(&format!("Failed: {}", failed));
    }
    if summary.report.is_empty() && summary.removed.is_empty() {
        ui::info("Everything already in sync");
    }
}
