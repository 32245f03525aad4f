use crate::dedupe::DuplicateGroup;
use crate::error::{FilterError, UserFriendlyError};
use crate::report::{RecordOutcome, RunSummary};
use console::{style, Emoji, Term};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

// Emojis with text fallbacks
static CHECKMARK: Emoji = Emoji("✅ ", "✓ ");
static CROSS: Emoji = Emoji("❌ ", "✗ ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static WARNING: Emoji = Emoji("⚠️  ", "! ");
static ROCKET: Emoji = Emoji("🚀 ", "> ");

#[derive(Clone)]
pub struct OutputFormatter {
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let use_colors = match mode {
            OutputMode::Human => Term::stdout().features().colors_supported() && !quiet,
            _ => false,
        };

        Self {
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    // Core messaging methods
    pub fn success(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Success, message),
                OutputMode::Json => self.print_json_message("success", message),
                OutputMode::Plain => println!("SUCCESS: {}", message),
            }
        }
    }

    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Error, message),
            OutputMode::Json => self.print_json_message("error", message),
            OutputMode::Plain => eprintln!("ERROR: {}", message),
        }
    }

    pub fn warning(&self, message: &str) {
        if self.should_show_message(1) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Warning, message),
                OutputMode::Json => self.print_json_message("warning", message),
                OutputMode::Plain => println!("WARNING: {}", message),
            }
        }
    }

    pub fn info(&self, message: &str) {
        if self.should_show_message(1) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Info, message),
                OutputMode::Json => self.print_json_message("info", message),
                OutputMode::Plain => println!("INFO: {}", message),
            }
        }
    }

    pub fn debug(&self, message: &str) {
        if self.should_show_message(2) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("  {}", style(message).dim());
                    } else {
                        println!("  DEBUG: {}", message);
                    }
                }
                OutputMode::Json => self.print_json_message("debug", message),
                OutputMode::Plain => println!("DEBUG: {}", message),
            }
        }
    }

    pub fn start_operation(&self, operation: &str) {
        if self.should_show_message(1) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("{}{}", ROCKET, style(operation).bold());
                    } else {
                        println!("> {}", operation);
                    }
                }
                OutputMode::Json => self.print_json_message("operation_start", operation),
                OutputMode::Plain => println!("STARTING: {}", operation),
            }
        }
    }

    /// Prints the per-record status line.
    ///
    /// Human and plain modes print the bare message text so the transcript
    /// reads `Copied files for number 007` / `Warning: Files for number 042
    /// not found`. These lines are shown even in quiet mode.
    pub fn record_outcome(&self, outcome: &RecordOutcome) {
        let message = match outcome.console_message() {
            Some(message) => message,
            None => {
                if let RecordOutcome::Skipped { line, reason } = outcome {
                    self.debug(&format!("Skipped line {}: {}", line, reason));
                }
                return;
            }
        };

        match self.mode {
            OutputMode::Human if self.use_colors => {
                if outcome.is_warning() {
                    println!("{}", style(&message).yellow());
                } else {
                    println!("{}", style(&message).green());
                }
            }
            OutputMode::Human | OutputMode::Plain => println!("{}", message),
            OutputMode::Json => {
                let mut value =
                    serde_json::to_value(outcome).unwrap_or_else(|_| serde_json::json!({}));
                if let Some(obj) = value.as_object_mut() {
                    obj.insert("type".to_string(), serde_json::json!("record"));
                    obj.insert("message".to_string(), serde_json::json!(message));
                }
                self.print_json_object(&value);
            }
        }
    }

    /// One duplicate group from the dedupe pass. Like record lines these are
    /// printed even in quiet mode since they describe deletions.
    pub fn duplicate_group(&self, group: &DuplicateGroup, dry_run: bool) {
        let verb = if dry_run { "Would remove" } else { "Removing" };

        match self.mode {
            OutputMode::Json => {
                self.print_json_object(&serde_json::json!({
                    "type": "duplicate_group",
                    "kept": group.kept,
                    "removed": group.removed,
                    "dry_run": dry_run,
                }));
            }
            OutputMode::Human | OutputMode::Plain => {
                println!("Duplicate group: keeping {}", group.kept.display());
                for (ltlf, part) in group.removed.iter().zip(group.removed_parts()) {
                    println!("{} {} and {}", verb, ltlf.display(), part.display());
                }
            }
        }
    }

    // User-friendly error handling
    pub fn print_user_friendly_error(&self, error: &FilterError) {
        let user_message = error.user_message();
        self.error(&user_message);

        if let Some(suggestion) = error.suggestion() {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        eprintln!(
                            "{}{}",
                            INFO,
                            style(&format!("Suggestion: {}", suggestion)).cyan()
                        );
                    } else {
                        eprintln!("Suggestion: {}", suggestion);
                    }
                }
                OutputMode::Json => {
                    self.print_json_object(&serde_json::json!({
                        "type": "suggestion",
                        "message": suggestion
                    }));
                }
                OutputMode::Plain => {
                    eprintln!("SUGGESTION: {}", suggestion);
                }
            }
        }
    }

    // Summary and reporting
    pub fn print_run_summary(&self, summary: &RunSummary, dry_run: bool) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => self.print_human_summary(summary, dry_run),
            OutputMode::Json => self.print_json_summary(summary, dry_run),
            OutputMode::Plain => self.print_plain_summary(summary, dry_run),
        }
    }

    pub fn print_separator(&self) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("{}", style("─".repeat(60)).dim());
                } else {
                    println!("{}", "-".repeat(60));
                }
            }
            OutputMode::Plain => {
                println!("{}", "-".repeat(60));
            }
            OutputMode::Json => {} // No separator in JSON mode
        }
    }

    // Private helper methods
    fn should_show_message(&self, min_verbose_level: u8) -> bool {
        !self.quiet && self.verbose_level >= min_verbose_level
    }

    fn print_human_message(&self, msg_type: MessageType, message: &str) {
        #[allow(clippy::type_complexity)]
        let (emoji, color_fn): (Emoji, Box<dyn Fn(&str) -> console::StyledObject<&str>>) =
            match msg_type {
                MessageType::Success => (CHECKMARK, Box::new(|msg| style(msg).green().bold())),
                MessageType::Error => (CROSS, Box::new(|msg| style(msg).red().bold())),
                MessageType::Warning => (WARNING, Box::new(|msg| style(msg).yellow().bold())),
                MessageType::Info => (INFO, Box::new(|msg| style(msg).cyan())),
            };

        if self.use_colors {
            match msg_type {
                MessageType::Error => eprintln!("{}{}", emoji, color_fn(message)),
                _ => println!("{}{}", emoji, color_fn(message)),
            }
        } else {
            let prefix = match msg_type {
                MessageType::Success => "✓",
                MessageType::Error => "✗",
                MessageType::Warning => "!",
                MessageType::Info => "i",
            };

            match msg_type {
                MessageType::Error => eprintln!("{} {}", prefix, message),
                _ => println!("{} {}", prefix, message),
            }
        }
    }

    fn print_json_message(&self, level: &str, message: &str) {
        self.print_json_object(&serde_json::json!({
            "type": "message",
            "level": level,
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));
    }

    fn print_json_object(&self, obj: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string(obj).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn highlight(&self, value: String) -> String {
        if self.use_colors {
            style(value).cyan().bold().to_string()
        } else {
            value
        }
    }

    fn print_human_summary(&self, summary: &RunSummary, dry_run: bool) {
        println!();
        self.print_separator();

        let headline = if dry_run {
            "Dry run completed, no files were copied"
        } else {
            "Filtering completed!"
        };
        if self.use_colors {
            println!("{} {}", style(headline).green().bold(), CHECKMARK);
        } else {
            println!("✓ {}", headline);
        }

        println!();
        let copied_label = if dry_run { "Pairs to copy:  " } else { "Pairs copied:   " };
        println!("  {} {}", copied_label, self.highlight(summary.copied.to_string()));
        println!("  Missing pairs:    {}", self.highlight(summary.missing.to_string()));
        if summary.copy_failures > 0 {
            println!("  Copy failures:    {}", summary.copy_failures);
        }
        if summary.malformed > 0 {
            println!("  Malformed rows:   {}", summary.malformed);
        }
        if summary.skipped > 0 {
            println!("  Skipped rows:     {}", summary.skipped);
        }
        if summary.duplicates > 0 {
            println!("  Duplicates:       {}", summary.duplicates);
        }
        println!(
            "  Bytes copied:     {}",
            self.highlight(format_bytes(summary.bytes_copied))
        );
        println!(
            "  Time taken:       {}",
            self.highlight(format_duration(Duration::from_millis(summary.duration_ms)))
        );

        self.print_separator();
    }

    fn print_json_summary(&self, summary: &RunSummary, dry_run: bool) {
        let value = serde_json::json!({
            "type": "summary",
            "dry_run": dry_run,
            "records": summary.records,
            "copied": summary.copied,
            "missing": summary.missing,
            "copy_failures": summary.copy_failures,
            "malformed": summary.malformed,
            "skipped": summary.skipped,
            "duplicates": summary.duplicates,
            "bytes_copied": summary.bytes_copied,
            "duration_ms": summary.duration_ms,
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        self.print_json_object(&value);
    }

    fn print_plain_summary(&self, summary: &RunSummary, dry_run: bool) {
        if dry_run {
            println!("COMPLETED: Dry run");
        } else {
            println!("COMPLETED: Filtering");
        }
        println!("Records: {}", summary.records);
        println!("Copied: {}", summary.copied);
        println!("Missing: {}", summary.missing);
        if summary.copy_failures > 0 {
            println!("Copy failures: {}", summary.copy_failures);
        }
        if summary.malformed > 0 {
            println!("Malformed: {}", summary.malformed);
        }
        if summary.skipped > 0 {
            println!("Skipped: {}", summary.skipped);
        }
        if summary.duplicates > 0 {
            println!("Duplicates: {}", summary.duplicates);
        }
        println!("Bytes copied: {}", summary.bytes_copied);
        println!("Duration: {}ms", summary.duration_ms);
    }
}

#[derive(Debug, Clone, Copy)]
enum MessageType {
    Success,
    Error,
    Warning,
    Info,
}

pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}s", secs)
    } else {
        format!("{}ms", duration.as_millis())
    }
}
