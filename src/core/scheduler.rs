//! Bounded-concurrency task execution.
//!
//! A batch of independent per-plugin tasks runs on a worker pool: at most
//! `limit` tasks are in flight at once, and as each completes (signalled
//! over a completion channel) the next queued task is admitted. Completion
//! order across tasks is unspecified.

use crate::core::report::{Outcome, Report};
use crate::error::{Result, VimpackError};
use crate::ui::ProgressSink;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::mpsc;
use std::thread;

/// A deferred unit of work targeting exactly one plugin. Produces exactly
/// one keyed outcome; errors inside the body are captured into the outcome,
/// never propagated to sibling tasks.
pub struct Task<'a> {
    name: String,
    work: Box<dyn FnOnce(&dyn ProgressSink) -> Outcome + Send + 'a>,
}

impl<'a> Task<'a> {
    pub fn new<F>(name: impl Into<String>, work: F) -> Self
    where
        F: FnOnce(&dyn ProgressSink) -> Outcome + Send + 'a,
    {
        Self {
            name: name.into(),
            work: Box::new(work),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "task panicked".to_string()
    }
}

/// Run a batch with at most `limit` tasks in flight. `limit = 0` means
/// "batch size" (unbounded fan-out up to the batch). `check` is polled once
/// per admission step; returning `false` stops admitting new tasks while
/// in-flight tasks run to completion.
pub fn run(
    tasks: Vec<Task<'_>>,
    limit: usize,
    check: Option<&dyn Fn() -> bool>,
    sink: &dyn ProgressSink,
) -> Result<Report> {
    if tasks.is_empty() {
        sink.update_headline("Nothing to do");
        return Ok(Report::new());
    }

    let limit = if limit == 0 { tasks.len() } else { limit };
    let (tx, rx) = mpsc::channel::<(String, Outcome)>();

    thread::scope(|scope| {
        let mut queue = tasks.into_iter();
        let mut in_flight = 0usize;
        let mut admitting = true;
        let mut report = Report::new();

        loop {
            while admitting && in_flight < limit {
                if let Some(check) = check
                    && !check()
                {
                    admitting = false;
                    break;
                }
                let Some(task) = queue.next() else {
                    admitting = false;
                    break;
                };
                let tx = tx.clone();
                scope.spawn(move || {
                    let Task { name, work } = task;
                    sink.task_start(&name);
                    let outcome = catch_unwind(AssertUnwindSafe(|| work(sink)))
                        .unwrap_or_else(|payload| Outcome::failed(panic_message(payload)));
                    match &outcome {
                        Outcome::Failed { errors } => {
                            sink.task_failed(&name, errors.first().map(String::as_str).unwrap_or(""));
                        }
                        other => sink.task_succeeded(&name, &other.summary()),
                    }
                    sink.task_done(&name);
                    // Receiver outlives every worker; send cannot fail.
                    let _ = tx.send((name, outcome));
                });
                in_flight += 1;
            }

            if in_flight == 0 {
                break;
            }

            let (name, outcome) = rx.recv().map_err(|e| {
                VimpackError::Other(format!("scheduler channel closed early: {}", e))
            })?;
            in_flight -= 1;

            if report.insert(name.clone(), outcome).is_some() {
                return Err(VimpackError::ReportConflict { plugin: name });
            }
        }

        Ok(report)
    })
}
