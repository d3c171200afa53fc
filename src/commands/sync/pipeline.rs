//! The reconciliation pipeline: placement fix, clean, install, update,
//! helptags. Stages are strictly ordered; work inside the install and
//! update stages fans out on the task scheduler.

use crate::backends::BackendSet;
use crate::core::helptags;
use crate::core::registry::PluginRegistry;
use crate::core::report::{Aggregator, Outcome, Report};
use crate::core::resolver::{self, PlacementState};
use crate::core::scheduler::{self, Task};
use crate::core::types::{PackLayout, Placement, Plugin};
use crate::editor::HookRunner;
use crate::error::{Result, VimpackError};
use crate::ui::{self, ProgressSink};
use std::fs;
use std::path::PathBuf;

/// Which stages a batch runs. `install`/`update`/`clean` as standalone
/// commands are scoped-down syncs.
#[derive(Debug, Clone, Copy)]
pub struct StageScope {
    pub moves: bool,
    pub clean: bool,
    pub install: bool,
    pub update: bool,
    pub helptags: bool,
}

impl StageScope {
    pub fn full() -> Self {
        Self {
            moves: true,
            clean: true,
            install: true,
            update: true,
            helptags: true,
        }
    }

    pub fn install_only() -> Self {
        Self {
            moves: false,
            clean: false,
            install: true,
            update: false,
            helptags: true,
        }
    }

    pub fn update_only() -> Self {
        Self {
            moves: false,
            clean: false,
            install: false,
            update: true,
            helptags: true,
        }
    }

    pub fn clean_only() -> Self {
        Self {
            moves: false,
            clean: true,
            install: false,
            update: false,
            helptags: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Explicit subset of plugin names; restricts install/update only.
    pub targets: Option<Vec<String>>,
    /// Concurrency limit; 0 = batch size.
    pub jobs: usize,
    /// Delete clean candidates without asking.
    pub auto_clean: bool,
    pub scope: StageScope,
}

/// Everything a batch produced, for reporting and persistence.
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// Keyed per-plugin outcomes across moves, installs, and updates.
    pub report: Report,
    /// Directories deleted by the clean stage.
    pub removed: Vec<PathBuf>,
    /// Plugins whose helptags index was regenerated.
    pub regenerated: Vec<String>,
}

fn interrupted_check() -> impl Fn() -> bool {
    || !ui::is_interrupted()
}

/// Run the scoped pipeline over an explicit registry value.
pub fn run(
    registry: &mut PluginRegistry,
    layout: &PackLayout,
    backends: &BackendSet,
    hooks: &HookRunner,
    sink: &dyn ProgressSink,
    options: &PipelineOptions,
) -> Result<BatchSummary> {
    let mut aggregator = Aggregator::new();
    let check = interrupted_check();

    let (targets, unknown) = registry.filter_names(options.targets.as_deref());
    for name in &unknown {
        ui::warning(&format!("'{}' is not a declared plugin; skipping", name));
    }
    if targets.is_empty() && options.targets.is_some() {
        // Nothing requested matches configuration: logged, not thrown.
        ui::warning("No requested plugin matches the configuration");
    }

    let mut state = resolver::resolve(registry, layout, backends)?;

    if options.scope.moves {
        let moves = placement_fix(registry, layout, &mut state);
        registry.apply_report(&moves);
        aggregator.moves = moves;
        // A unit may still be dirty for unrelated reasons; recompute.
        state = resolver::resolve(registry, layout, backends)?;
        bail_if_interrupted()?;
    }

    if options.scope.clean {
        aggregator.removed = clean_stage(&state, sink, options.auto_clean)?;
        if !aggregator.removed.is_empty() {
            state = resolver::resolve(registry, layout, backends)?;
        }
        bail_if_interrupted()?;
    }

    if options.scope.install {
        let names: Vec<String> = state
            .missing
            .iter()
            .filter(|n| targets.contains(*n))
            .filter(|n| !aggregator.moves.contains_key(*n))
            .cloned()
            .collect();
        let tasks = install_tasks(registry, layout, backends, hooks, &names);
        if !tasks.is_empty() {
            sink.update_headline(&format!("Installing {} plugin(s)", tasks.len()));
        }
        let installs = scheduler::run(tasks, options.jobs, Some(&check), sink)?;
        registry.apply_report(&installs);
        aggregator.installs = installs;
        bail_if_interrupted()?;
    }

    if options.scope.update {
        let names: Vec<String> = state
            .installed()
            .filter(|n| targets.contains(*n))
            .filter(|n| !aggregator.moves.contains_key(*n))
            .filter(|n| !aggregator.installs.contains_key(*n))
            .cloned()
            .collect();
        let tasks = update_tasks(registry, layout, backends, hooks, &names);
        if !tasks.is_empty() {
            sink.update_headline(&format!("Updating {} plugin(s)", tasks.len()));
        }
        let updates = scheduler::run(tasks, options.jobs, Some(&check), sink)?;
        registry.apply_report(&updates);
        aggregator.updates = updates;
        bail_if_interrupted()?;
    }

    let mut summary = BatchSummary::default();

    if options.scope.helptags {
        summary.regenerated = helptags_stage(registry, layout, &aggregator);
    }

    summary.removed = std::mem::take(&mut aggregator.removed);
    summary.report = aggregator.finish()?;
    Ok(summary)
}

fn bail_if_interrupted() -> Result<()> {
    if ui::is_interrupted() {
        return Err(VimpackError::Interrupted);
    }
    Ok(())
}

/// Stage 1: rename declared plugins installed under the wrong root. The
/// rename is atomic; on success the in-memory state is patched without a
/// rescan, on failure the plugin's prior classification stays untouched.
fn placement_fix(
    registry: &PluginRegistry,
    layout: &PackLayout,
    state: &mut PlacementState,
) -> Report {
    let mut report = Report::new();

    for plugin in registry.iter() {
        if !state.missing.contains(&plugin.name) {
            continue;
        }
        let from = layout.wrong_dir_for(plugin);
        if !state.extra.contains(&from) {
            continue;
        }
        let to = layout.dir_for(plugin);

        let moved = fs::create_dir_all(layout.root_for(plugin.placement))
            .and_then(|()| fs::rename(&from, &to));

        match moved {
            Ok(()) => {
                state.extra.remove(&from);
                state.missing.remove(&plugin.name);
                match plugin.placement {
                    Placement::Start => state.start.insert(plugin.name.clone()),
                    Placement::Opt => state.opt.insert(plugin.name.clone()),
                };
                report.insert(plugin.name.clone(), Outcome::Moved { from, to });
            }
            Err(e) => {
                let err = VimpackError::MoveError {
                    plugin: plugin.name.clone(),
                    from,
                    to,
                    reason: e.to_string(),
                };
                report.insert(plugin.name.clone(), Outcome::failed(err.to_string()));
            }
        }
    }

    report
}

/// Stage 2: remove extra and dirty directories after confirmation.
/// Deletion failures are warnings; a leftover dir is clutter, not
/// corruption.
fn clean_stage(
    state: &PlacementState,
    sink: &dyn ProgressSink,
    auto_clean: bool,
) -> Result<Vec<PathBuf>> {
    let candidates = state.clean_candidates();
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    if !auto_clean {
        let lines: Vec<String> = candidates.iter().map(|p| p.display().to_string()).collect();
        if !sink.ask_user(
            &format!("Remove {} unmanaged director(ies)?", candidates.len()),
            &lines,
        ) {
            ui::warning("Clean skipped by user");
            return Ok(Vec::new());
        }
    }

    let mut removed = Vec::new();
    for path in candidates {
        let is_symlink = fs::symlink_metadata(&path)
            .map(|m| m.file_type().is_symlink())
            .unwrap_or(false);
        let result = if is_symlink {
            fs::remove_file(&path)
        } else {
            fs::remove_dir_all(&path)
        };
        match result {
            Ok(()) => removed.push(path),
            Err(e) => ui::warning(&format!(
                "Could not remove '{}': {} (left for next run)",
                path.display(),
                e
            )),
        }
    }
    Ok(removed)
}

fn install_tasks<'a>(
    registry: &PluginRegistry,
    layout: &'a PackLayout,
    backends: &'a BackendSet,
    hooks: &'a HookRunner,
    names: &[String],
) -> Vec<Task<'a>> {
    names
        .iter()
        .filter_map(|name| registry.get(name).cloned())
        .map(|plugin| {
            let dir = layout.dir_for(&plugin);
            let root = layout.root_for(plugin.placement).to_path_buf();
            Task::new(plugin.name.clone(), move |sink: &dyn ProgressSink| {
                install_one(&plugin, backends, hooks, dir, root, sink)
            })
        })
        .collect()
}

fn install_one(
    plugin: &Plugin,
    backends: &BackendSet,
    hooks: &HookRunner,
    dir: PathBuf,
    root: PathBuf,
    sink: &dyn ProgressSink,
) -> Outcome {
    let backend = match backends.get(plugin.backend) {
        Ok(backend) => backend,
        Err(e) => return Outcome::failed(e.to_string()),
    };
    if let Err(e) = fs::create_dir_all(&root) {
        return Outcome::failed(format!("cannot create '{}': {}", root.display(), e));
    }

    sink.task_update(&plugin.name, "installing");
    if let Err(e) = backend.install(plugin, &dir) {
        return Outcome::failed(e.to_string());
    }

    // "Installed" is derived from the directory existing, not from the
    // backend's own success signal.
    if fs::symlink_metadata(&dir).is_err() {
        return Outcome::failed(format!(
            "backend reported success but '{}' does not exist",
            dir.display()
        ));
    }

    if let Err(e) = hooks.run_hook(plugin, &dir) {
        return Outcome::failed(e.to_string());
    }

    Outcome::Installed
}

fn update_tasks<'a>(
    registry: &PluginRegistry,
    layout: &'a PackLayout,
    backends: &'a BackendSet,
    hooks: &'a HookRunner,
    names: &[String],
) -> Vec<Task<'a>> {
    names
        .iter()
        .filter_map(|name| registry.get(name).cloned())
        .map(|plugin| {
            let dir = layout.dir_for(&plugin);
            Task::new(plugin.name.clone(), move |sink: &dyn ProgressSink| {
                update_one(&plugin, backends, hooks, dir, sink)
            })
        })
        .collect()
}

fn update_one(
    plugin: &Plugin,
    backends: &BackendSet,
    hooks: &HookRunner,
    dir: PathBuf,
    sink: &dyn ProgressSink,
) -> Outcome {
    // Frozen plugins short-circuit with no backend call.
    if plugin.frozen {
        return Outcome::Frozen;
    }

    let backend = match backends.get(plugin.backend) {
        Ok(backend) => backend,
        Err(e) => return Outcome::failed(e.to_string()),
    };

    sink.task_update(&plugin.name, "updating");
    let outcome = match backend.update(plugin, &dir) {
        Ok(outcome) => outcome,
        Err(e) => return Outcome::failed(e.to_string()),
    };

    if !outcome.changed() {
        return Outcome::UpToDate;
    }

    // The hook runs only on an actual update.
    if let Err(e) = hooks.run_hook(plugin, &dir) {
        return Outcome::failed(e.to_string());
    }

    Outcome::Updated {
        before: outcome.before,
        after: outcome.after,
        messages: outcome.messages,
    }
}

/// Stage 5: regenerate stale helptags for every plugin that changed
/// without error. Pure filesystem work, fanned out on the rayon pool.
fn helptags_stage(
    registry: &PluginRegistry,
    layout: &PackLayout,
    aggregator: &Aggregator,
) -> Vec<String> {
    let eligible: Vec<(String, PathBuf)> = aggregator
        .doc_eligible()
        .into_iter()
        .filter_map(|name| {
            registry
                .get(&name)
                .map(|plugin| (name, layout.dir_for(plugin)))
        })
        .collect();

    let mut regenerated = Vec::new();
    for (name, result) in helptags::regenerate_batch(&eligible) {
        match result {
            Ok(true) => regenerated.push(name),
            Ok(false) => {}
            Err(e) => ui::warning(&format!("helptags for '{}' failed: {}", name, e)),
        }
    }
    regenerated.sort();
    regenerated
}
