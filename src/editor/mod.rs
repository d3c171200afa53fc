//! Editor collaboration: loading plugins into the host editor and running
//! post-install/update hooks.

use crate::core::types::{HookSpec, Placement, Plugin};
use crate::error::{Result, VimpackError};
use crate::ui;
use crate::utils::cmd;
use std::path::Path;
use std::sync::Mutex;

/// Host-editor collaborator: loads a plugin into the running editor and
/// executes editor commands on its behalf.
pub trait EditorBridge: Send {
    fn load(&self, plugin: &Plugin) -> Result<()>;
    fn exec(&self, command: &str) -> Result<()>;
}

/// Bridge that spawns a headless editor process per call.
pub struct HeadlessEditor {
    program: String,
    base_args: Vec<String>,
}

impl HeadlessEditor {
    /// `cmdline` is the user-configured editor line, e.g. `"nvim"` or
    /// `"nvim -u ~/.config/nvim/min.lua"`.
    pub fn new(cmdline: &str) -> Result<Self> {
        let parts = shlex::split(cmdline).ok_or_else(|| {
            VimpackError::ConfigError(format!("Unparsable editor command line: '{}'", cmdline))
        })?;
        let (program, base_args) = parts.split_first().ok_or_else(|| {
            VimpackError::ConfigError("Empty editor command line".to_string())
        })?;
        if which::which(program).is_err() {
            return Err(VimpackError::EditorUnavailable(program.clone()));
        }
        Ok(Self {
            program: program.clone(),
            base_args: base_args.to_vec(),
        })
    }

    fn run_commands(&self, commands: &[String]) -> Result<()> {
        let mut args: Vec<&str> = self.base_args.iter().map(String::as_str).collect();
        args.push("--headless");
        for command in commands {
            args.push("-c");
            args.push(command);
        }
        args.push("-c");
        args.push("qa!");
        cmd::run_checked(&self.program, &args, None)?;
        Ok(())
    }
}

impl EditorBridge for HeadlessEditor {
    fn load(&self, plugin: &Plugin) -> Result<()> {
        self.run_commands(&[format!("packadd {}", plugin.name)])
    }

    fn exec(&self, command: &str) -> Result<()> {
        self.run_commands(&[command.to_string()])
    }
}

/// Bridge used when no editor is configured or available. Loading is a
/// no-op (the editor picks the plugin up on next start); editor-command
/// hooks cannot run and fail explicitly.
pub struct NullBridge;

impl EditorBridge for NullBridge {
    fn load(&self, _plugin: &Plugin) -> Result<()> {
        Ok(())
    }

    fn exec(&self, _command: &str) -> Result<()> {
        Err(VimpackError::EditorUnavailable("none configured".to_string()))
    }
}

/// Runs post-processing hooks. The bridge sits behind a mutex so hooks
/// from concurrent tasks never touch editor state at the same time.
pub struct HookRunner {
    bridge: Mutex<Box<dyn EditorBridge>>,
}

impl HookRunner {
    pub fn new(bridge: Box<dyn EditorBridge>) -> Self {
        Self {
            bridge: Mutex::new(bridge),
        }
    }

    /// Pick a bridge from settings, degrading to [`NullBridge`] with a
    /// warning when the configured editor is missing.
    pub fn from_editor_setting(editor: Option<&str>) -> Self {
        match editor {
            Some(cmdline) => match HeadlessEditor::new(cmdline) {
                Ok(bridge) => Self::new(Box::new(bridge)),
                Err(e) => {
                    ui::warning(&format!("{}; editor hooks disabled", e));
                    Self::new(Box::new(NullBridge))
                }
            },
            None => Self::new(Box::new(NullBridge)),
        }
    }

    /// Run the plugin's hook after a successful install or actual update.
    /// Start plugins are loaded into the editor first: hooks commonly
    /// assume their own plugin code is already active.
    pub fn run_hook(&self, plugin: &Plugin, install_dir: &Path) -> Result<()> {
        let Some(hook) = &plugin.hook else {
            return Ok(());
        };

        let bridge = self
            .bridge
            .lock()
            .map_err(|_| VimpackError::Other("hook bridge mutex poisoned".to_string()))?;

        if plugin.placement == Placement::Start {
            bridge.load(plugin).map_err(|e| VimpackError::HookError {
                plugin: plugin.name.clone(),
                reason: format!("load before hook failed: {}", e),
            })?;
        }

        match hook {
            HookSpec::Callable(callable) => {
                callable(plugin).map_err(|e| VimpackError::HookError {
                    plugin: plugin.name.clone(),
                    reason: e.to_string(),
                })
            }
            HookSpec::EditorCommand(command) => {
                bridge.exec(command).map_err(|e| VimpackError::HookError {
                    plugin: plugin.name.clone(),
                    reason: e.to_string(),
                })
            }
            HookSpec::Shell(command) => {
                let out = cmd::run("sh", &["-c", command], Some(install_dir))?;
                if !out.status_ok {
                    return Err(VimpackError::HookError {
                        plugin: plugin.name.clone(),
                        reason: out.stderr.trim().to_string(),
                    });
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{BackendKind, Placement, Plugin};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn plugin_with_hook(hook: HookSpec) -> Plugin {
        let mut plugin = Plugin::new("p", "o/p", Placement::Opt, BackendKind::Git);
        plugin.hook = Some(hook);
        plugin
    }

    #[test]
    fn absent_hook_is_a_silent_no_op() {
        let runner = HookRunner::new(Box::new(NullBridge));
        let plugin = Plugin::new("p", "o/p", Placement::Start, BackendKind::Git);
        runner.run_hook(&plugin, Path::new("/nonexistent")).unwrap();
    }

    #[test]
    fn callable_hooks_run_and_capture_errors() {
        let runner = HookRunner::new(Box::new(NullBridge));
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);
        let plugin = plugin_with_hook(HookSpec::Callable(Arc::new(move |_| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })));
        runner.run_hook(&plugin, Path::new("/tmp")).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let failing = plugin_with_hook(HookSpec::Callable(Arc::new(|_| {
            Err(VimpackError::Other("hook logic broke".to_string()))
        })));
        let err = runner.run_hook(&failing, Path::new("/tmp")).unwrap_err();
        assert!(matches!(err, VimpackError::HookError { .. }));
    }

    #[test]
    fn shell_hook_runs_in_install_dir_and_captures_stderr() {
        let tmp = tempfile::tempdir().unwrap();
        let runner = HookRunner::new(Box::new(NullBridge));

        let plugin = plugin_with_hook(HookSpec::Shell("touch built.ok".to_string()));
        runner.run_hook(&plugin, tmp.path()).unwrap();
        assert!(tmp.path().join("built.ok").exists());

        let failing = plugin_with_hook(HookSpec::Shell("echo no-compiler >&2; exit 1".to_string()));
        let err = runner.run_hook(&failing, tmp.path()).unwrap_err();
        match err {
            VimpackError::HookError { reason, .. } => assert_eq!(reason, "no-compiler"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn editor_command_without_editor_fails_explicitly() {
        let runner = HookRunner::new(Box::new(NullBridge));
        let plugin = plugin_with_hook(HookSpec::EditorCommand("UpdateRemotePlugins".to_string()));
        let err = runner.run_hook(&plugin, Path::new("/tmp")).unwrap_err();
        assert!(matches!(err, VimpackError::HookError { .. }));
    }

    #[test]
    fn hooks_are_serialized_across_threads() {
        let runner = Arc::new(HookRunner::new(Box::new(NullBridge)));
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        std::thread::scope(|scope| {
            for i in 0..4 {
                let runner = Arc::clone(&runner);
                let active = Arc::clone(&active);
                let peak = Arc::clone(&peak);
                scope.spawn(move || {
                    let active_inner = Arc::clone(&active);
                    let peak_inner = Arc::clone(&peak);
                    let plugin = {
                        let mut p = Plugin::new(
                            &format!("p{}", i),
                            "o/p",
                            Placement::Opt,
                            BackendKind::Git,
                        );
                        p.hook = Some(HookSpec::Callable(Arc::new(move |_| {
                            let now = active_inner.fetch_add(1, Ordering::SeqCst) + 1;
                            peak_inner.fetch_max(now, Ordering::SeqCst);
                            std::thread::sleep(std::time::Duration::from_millis(5));
                            active_inner.fetch_sub(1, Ordering::SeqCst);
                            Ok(())
                        })));
                        p
                    };
                    runner.run_hook(&plugin, Path::new("/tmp")).unwrap();
                });
            }
        });

        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }
}
