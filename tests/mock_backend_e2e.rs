// End-to-end pipeline runs over a temp pack dir with a mock backend.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use vimpack::backends::BackendSet;
use vimpack::backends::traits::{PluginBackend, UpdateOutcome};
use vimpack::commands::sync::pipeline::{self, PipelineOptions, StageScope};
use vimpack::core::registry::PluginRegistry;
use vimpack::core::report::Outcome;
use vimpack::core::types::{BackendKind, PackLayout, Placement, Plugin};
use vimpack::editor::{HookRunner, NullBridge};
use vimpack::error::{Result, VimpackError};
use vimpack::ui::ProgressSink;

struct NullSink;

impl ProgressSink for NullSink {
    fn task_start(&self, _: &str) {}
    fn task_update(&self, _: &str, _: &str) {}
    fn task_succeeded(&self, _: &str, _: &str) {}
    fn task_failed(&self, _: &str, _: &str) {}
    fn task_done(&self, _: &str) {}
    fn update_headline(&self, _: &str) {}
    fn ask_user(&self, _: &str, _: &[String]) -> bool {
        true
    }
    fn finish(&self, _: Duration) {}
}

/// In-process stand-in for the git backend. An install dir counts as
/// intact when it carries the `ok` marker file.
#[derive(Default)]
struct MockBackend {
    /// Shared so tests can inspect calls after the backend is boxed.
    calls: Arc<Mutex<Vec<String>>>,
    fail_install: BTreeSet<String>,
    next_update: Mutex<BTreeMap<String, UpdateOutcome>>,
}

impl MockBackend {
    fn call_log(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.calls)
    }

    fn queue_update(&self, name: &str, before: &str, after: &str, messages: &[&str]) {
        self.next_update.lock().unwrap().insert(
            name.to_string(),
            UpdateOutcome {
                before: before.to_string(),
                after: after.to_string(),
                messages: messages.iter().map(|m| m.to_string()).collect(),
            },
        );
    }
}

impl PluginBackend for MockBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Git
    }

    fn is_available(&self) -> bool {
        true
    }

    fn install(&self, plugin: &Plugin, dir: &Path) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("install {}", plugin.name));
        if self.fail_install.contains(&plugin.name) {
            return Err(VimpackError::InstallError {
                plugin: plugin.name.clone(),
                reason: "mock clone refused".to_string(),
            });
        }
        seed_install_dir(dir, &plugin.name)?;
        Ok(())
    }

    fn update(&self, plugin: &Plugin, _dir: &Path) -> Result<UpdateOutcome> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("update {}", plugin.name));
        Ok(self
            .next_update
            .lock()
            .unwrap()
            .remove(&plugin.name)
            .unwrap_or(UpdateOutcome {
                before: "aaa".to_string(),
                after: "aaa".to_string(),
                messages: Vec::new(),
            }))
    }

    fn head_revision(&self, _dir: &Path) -> Result<String> {
        Ok("aaa".to_string())
    }

    fn is_intact(&self, dir: &Path) -> bool {
        dir.join("ok").exists()
    }
}

/// What a successful mock install leaves behind: the intact marker and a
/// help file so the helptags stage has something to index.
fn seed_install_dir(dir: &Path, name: &str) -> Result<()> {
    fs::create_dir_all(dir.join("doc"))?;
    fs::write(dir.join("ok"), b"")?;
    fs::write(
        dir.join("doc").join(format!("{}.txt", name)),
        format!("*{}-intro*\nIntro text.\n", name),
    )?;
    Ok(())
}

fn backend_set(backend: MockBackend) -> BackendSet {
    let mut set = BackendSet::new();
    set.register(Box::new(backend));
    set
}

fn registry(plugins: Vec<Plugin>) -> PluginRegistry {
    PluginRegistry::from_plugins(plugins).unwrap()
}

fn plugin(name: &str, placement: Placement) -> Plugin {
    Plugin::new(name, &format!("owner/{}", name), placement, BackendKind::Git)
}

fn full_sync() -> PipelineOptions {
    PipelineOptions {
        targets: None,
        jobs: 0,
        auto_clean: true,
        scope: StageScope::full(),
    }
}

fn run_pipeline(
    registry: &mut PluginRegistry,
    layout: &PackLayout,
    backends: &BackendSet,
    options: &PipelineOptions,
) -> pipeline::BatchSummary {
    let hooks = HookRunner::new(Box::new(NullBridge));
    pipeline::run(registry, layout, backends, &hooks, &NullSink, options).unwrap()
}

#[test]
fn full_sync_reconciles_a_mixed_tree() {
    let tmp = tempfile::tempdir().unwrap();
    let layout = PackLayout::new(tmp.path());

    // alpha: declared, absent. beta: declared for start, sitting in opt.
    // stray: on disk, undeclared.
    seed_install_dir(&tmp.path().join("opt").join("beta"), "beta").unwrap();
    seed_install_dir(&tmp.path().join("start").join("stray"), "stray").unwrap();

    let mut reg = registry(vec![
        plugin("alpha", Placement::Start),
        plugin("beta", Placement::Start),
    ]);
    let backends = backend_set(MockBackend::default());

    let summary = run_pipeline(&mut reg, &layout, &backends, &full_sync());

    assert_eq!(summary.report["alpha"], Outcome::Installed);
    assert!(matches!(summary.report["beta"], Outcome::Moved { .. }));
    assert!(tmp.path().join("start").join("alpha").join("ok").exists());
    assert!(tmp.path().join("start").join("beta").join("ok").exists());
    assert!(!tmp.path().join("opt").join("beta").exists());

    assert_eq!(summary.removed, vec![tmp.path().join("start").join("stray")]);
    assert!(!tmp.path().join("start").join("stray").exists());

    // Both changed plugins got a helptags index.
    assert_eq!(summary.regenerated, vec!["alpha", "beta"]);
    assert!(tmp.path().join("start").join("alpha").join("doc").join("tags").exists());
    assert!(tmp.path().join("start").join("beta").join("doc").join("tags").exists());
}

#[test]
fn second_sync_is_a_no_op() {
    let tmp = tempfile::tempdir().unwrap();
    let layout = PackLayout::new(tmp.path());

    let mut reg = registry(vec![
        plugin("alpha", Placement::Start),
        plugin("beta", Placement::Opt),
    ]);
    let backends = backend_set(MockBackend::default());

    run_pipeline(&mut reg, &layout, &backends, &full_sync());
    let second = run_pipeline(&mut reg, &layout, &backends, &full_sync());

    assert!(second.removed.is_empty());
    assert!(second.regenerated.is_empty());
    assert!(second.report.values().all(|o| *o == Outcome::UpToDate));
}

#[test]
fn placement_round_trip_moves_the_same_directory_twice() {
    let tmp = tempfile::tempdir().unwrap();
    let layout = PackLayout::new(tmp.path());
    let backend = MockBackend::default();
    let calls = backend.call_log();
    let backends = backend_set(backend);

    let mut reg = registry(vec![plugin("gamma", Placement::Opt)]);
    run_pipeline(&mut reg, &layout, &backends, &full_sync());
    assert!(tmp.path().join("opt").join("gamma").exists());

    // Flip to start: the dir must be renamed, not recloned.
    let mut reg = registry(vec![plugin("gamma", Placement::Start)]);
    let summary = run_pipeline(&mut reg, &layout, &backends, &full_sync());
    assert!(matches!(summary.report["gamma"], Outcome::Moved { .. }));
    assert!(tmp.path().join("start").join("gamma").exists());
    assert!(!tmp.path().join("opt").join("gamma").exists());

    // And back again.
    let mut reg = registry(vec![plugin("gamma", Placement::Opt)]);
    let summary = run_pipeline(&mut reg, &layout, &backends, &full_sync());
    assert!(matches!(summary.report["gamma"], Outcome::Moved { .. }));
    assert!(tmp.path().join("opt").join("gamma").exists());

    // One install total across the three batches; the moves were renames.
    let log = calls.lock().unwrap();
    assert_eq!(
        log.iter().filter(|c| c.starts_with("install")).count(),
        1
    );
}

#[test]
fn one_failed_install_does_not_poison_the_batch() {
    let tmp = tempfile::tempdir().unwrap();
    let layout = PackLayout::new(tmp.path());

    let backend = MockBackend {
        fail_install: BTreeSet::from(["bad".to_string()]),
        ..Default::default()
    };
    let backends = backend_set(backend);

    let mut reg = registry(vec![
        plugin("bad", Placement::Start),
        plugin("good", Placement::Start),
    ]);
    let summary = run_pipeline(&mut reg, &layout, &backends, &full_sync());

    assert!(summary.report["bad"].is_failure());
    assert_eq!(summary.report["good"], Outcome::Installed);
    assert!(tmp.path().join("start").join("good").join("ok").exists());
    // The failed plugin gets no helptags pass.
    assert_eq!(summary.regenerated, vec!["good"]);
}

#[test]
fn frozen_plugins_skip_the_backend_entirely() {
    let tmp = tempfile::tempdir().unwrap();
    let layout = PackLayout::new(tmp.path());

    seed_install_dir(&tmp.path().join("start").join("pinned"), "pinned").unwrap();

    let mut frozen = plugin("pinned", Placement::Start);
    frozen.frozen = true;
    let mut reg = registry(vec![frozen]);

    let backend = MockBackend::default();
    let calls = backend.call_log();
    let backends = backend_set(backend);

    let options = PipelineOptions {
        scope: StageScope::update_only(),
        ..full_sync()
    };
    let summary = run_pipeline(&mut reg, &layout, &backends, &options);

    assert_eq!(summary.report["pinned"], Outcome::Frozen);
    assert!(calls.lock().unwrap().is_empty());
}

#[test]
fn update_with_new_commits_reports_messages() {
    let tmp = tempfile::tempdir().unwrap();
    let layout = PackLayout::new(tmp.path());

    seed_install_dir(&tmp.path().join("start").join("delta"), "delta").unwrap();

    let backend = MockBackend::default();
    backend.queue_update("delta", "aaa", "bbb", &["fix: crash", "feat: speed"]);
    let backends = backend_set(backend);

    let mut reg = registry(vec![plugin("delta", Placement::Start)]);
    let options = PipelineOptions {
        scope: StageScope::update_only(),
        ..full_sync()
    };
    let summary = run_pipeline(&mut reg, &layout, &backends, &options);

    match &summary.report["delta"] {
        Outcome::Updated {
            before,
            after,
            messages,
        } => {
            assert_eq!(before, "aaa");
            assert_eq!(after, "bbb");
            assert_eq!(messages.len(), 2);
        }
        other => panic!("expected update, got {:?}", other),
    }
    assert_eq!(summary.report["delta"].commit_count(), 2);
    // An actual update re-indexes docs.
    assert_eq!(summary.regenerated, vec!["delta"]);
}

#[test]
fn dirty_dir_is_removed_and_reinstalled_in_one_batch() {
    let tmp = tempfile::tempdir().unwrap();
    let layout = PackLayout::new(tmp.path());

    // Right path, but no intact marker: fails the integrity probe.
    let broken = tmp.path().join("start").join("epsilon");
    fs::create_dir_all(&broken).unwrap();
    fs::write(broken.join("leftover"), b"half a clone").unwrap();

    let backend = MockBackend::default();
    let backends = backend_set(backend);

    let mut reg = registry(vec![plugin("epsilon", Placement::Start)]);
    let summary = run_pipeline(&mut reg, &layout, &backends, &full_sync());

    assert_eq!(summary.removed, vec![broken.clone()]);
    assert_eq!(summary.report["epsilon"], Outcome::Installed);
    assert!(broken.join("ok").exists());
    assert!(!broken.join("leftover").exists());
}

#[test]
fn targeted_install_leaves_other_missing_plugins_alone() {
    let tmp = tempfile::tempdir().unwrap();
    let layout = PackLayout::new(tmp.path());
    let backends = backend_set(MockBackend::default());

    let mut reg = registry(vec![
        plugin("wanted", Placement::Start),
        plugin("ignored", Placement::Start),
    ]);
    let options = PipelineOptions {
        targets: Some(vec!["wanted".to_string()]),
        scope: StageScope::install_only(),
        ..full_sync()
    };
    let summary = run_pipeline(&mut reg, &layout, &backends, &options);

    assert_eq!(summary.report.len(), 1);
    assert_eq!(summary.report["wanted"], Outcome::Installed);
    assert!(!tmp.path().join("start").join("ignored").exists());
}
