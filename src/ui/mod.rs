use colored::Colorize;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

static QUIET: AtomicBool = AtomicBool::new(false);
static VERBOSE: AtomicBool = AtomicBool::new(false);
static INTERRUPTED: AtomicBool = AtomicBool::new(false);

pub fn init_colors() {
    if !atty::is(atty::Stream::Stdout) {
        colored::control::set_override(false);
    }
}

pub fn set_quiet(value: bool) {
    QUIET.store(value, Ordering::Relaxed);
}

pub fn is_quiet() -> bool {
    QUIET.load(Ordering::Relaxed)
}

pub fn set_verbose(value: bool) {
    VERBOSE.store(value, Ordering::Relaxed);
}

pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

/// Set by the Ctrl-C handler; polled by the scheduler between admissions.
pub fn mark_interrupted() {
    INTERRUPTED.store(true, Ordering::Relaxed);
}

pub fn is_interrupted() -> bool {
    INTERRUPTED.load(Ordering::Relaxed)
}

pub fn header(title: &str) {
    if is_quiet() {
        return;
    }
    println!("\n{}", title.bold().underline());
}

pub fn success(msg: &str) {
    if is_quiet() {
        return;
    }
    println!("{} {}", "✓".green().bold(), msg);
}

pub fn info(msg: &str) {
    if is_quiet() {
        return;
    }
    println!("{} {}", "ℹ".blue().bold(), msg);
}

pub fn warning(msg: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), msg);
}

pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red().bold(), msg);
}

pub fn separator() {
    if is_quiet() {
        return;
    }
    println!("{}", "─".repeat(60).bright_black());
}

pub fn keyval(key: &str, val: &str) {
    println!("{}: {}", key.bold(), val);
}

pub fn verbose(msg: &str) {
    if is_verbose() && !is_quiet() {
        println!("{} {}", "·".dimmed(), msg.dimmed());
    }
}

pub fn prompt_yes_no(question: &str) -> bool {
    print!("{} {} [Y/n] ", "?".yellow().bold(), question);

    // Attempt to flush stdout, default to true if terminal is broken
    if let Err(e) = io::stdout().flush() {
        eprintln!("\nWarning: Failed to flush terminal: {}", e);
        return true;
    }

    let mut input = String::new();

    match io::stdin().read_line(&mut input) {
        Ok(_) => {
            let input = input.trim().to_lowercase();
            if input.is_empty() {
                return true;
            }
            input == "y" || input == "yes"
        }
        Err(e) => {
            eprintln!("\nWarning: Failed to read input: {}", e);
            true // fail-open for non-interactive runs
        }
    }
}

/// Display sink consumed by the scheduler and the sync pipeline.
///
/// Implementations must tolerate calls from multiple worker threads.
pub trait ProgressSink: Send + Sync {
    fn task_start(&self, name: &str);
    fn task_update(&self, name: &str, message: &str);
    fn task_succeeded(&self, name: &str, message: &str);
    fn task_failed(&self, name: &str, message: &str);
    fn task_done(&self, name: &str);
    fn update_headline(&self, message: &str);
    fn ask_user(&self, prompt: &str, lines: &[String]) -> bool;
    fn finish(&self, elapsed: Duration);
}

/// Console implementation over the module's print helpers.
pub struct ConsoleSink {
    /// When true, `ask_user` approves without prompting.
    pub assume_yes: bool,
}

impl ConsoleSink {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl ProgressSink for ConsoleSink {
    fn task_start(&self, name: &str) {
        verbose(&format!("{} started", name));
    }

    fn task_update(&self, name: &str, message: &str) {
        verbose(&format!("{}: {}", name, message));
    }

    fn task_succeeded(&self, name: &str, message: &str) {
        if is_quiet() {
            return;
        }
        println!("  {} {} {}", "✓".green(), name.bold(), message.dimmed());
    }

    fn task_failed(&self, name: &str, message: &str) {
        eprintln!("  {} {} {}", "✗".red(), name.bold(), message);
    }

    fn task_done(&self, name: &str) {
        verbose(&format!("{} done", name));
    }

    fn update_headline(&self, message: &str) {
        info(message);
    }

    fn ask_user(&self, prompt: &str, lines: &[String]) -> bool {
        for line in lines {
            println!("  {} {}", "-".red(), line);
        }
        if self.assume_yes {
            return true;
        }
        prompt_yes_no(prompt)
    }

    fn finish(&self, elapsed: Duration) {
        if is_quiet() {
            return;
        }
        separator();
        success(&format!("Finished in {:.1}s", elapsed.as_secs_f64()));
    }
}
