use crate::file_processing::{FileChangeApplier, Preview};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Manages CLI display and output formatting.
pub struct CliDisplayManager {
    spinner: Option<ProgressBar>,
}

impl Default for CliDisplayManager {
    fn default() -> Self {
        Self::new()
    }
}

impl CliDisplayManager {
    /// Creates a new `CliDisplayManager`.
    pub fn new() -> Self {
        CliDisplayManager { spinner: None }
    }

    /// Prints the application header.
    pub fn print_header(&self, backend: &str) {
        println!("\n{}", "╭──────────────────────╮".bright_magenta());
        println!(
            "{}",
            format!("│  ✦ codemind v{:<7} │", env!("CARGO_PKG_VERSION"))
                .bright_magenta()
                .bold()
        );
        println!("{}", "╰──────────────────────╯".bright_magenta());
        self.print_info(&format!("Using {}", backend));
        println!();
    }

    /// Prints the files attached to the prompt.
    pub fn print_context(&self, current_file: Option<&str>, context_files: usize) {
        self.print_section(
            "📁",
            "[1/3] Collecting Context",
            &match current_file {
                Some(file) => format!("Open file: {}", file),
                None => "No open file".to_string(),
            },
        );
        self.print_info(&format!("{} context file(s) attached", context_files));
    }

    pub fn print_query_start(&self) {
        self.print_section("⚓", "[2/3] Asking the Assistant", "");
    }

    /// Prints the assistant's reply text.
    pub fn print_message(&self, text: &str) {
        println!();
        println!("{} {}", "AI:".bright_cyan().bold(), text);
        println!();
    }

    /// Prints a suggested replacement for the open file.
    pub fn print_code(&self, code: &str) {
        println!("{}", "Suggested Code:".bright_cyan().bold());
        for line in code.lines() {
            println!("   {}", line.bright_white());
        }
        println!();
    }

    pub fn print_file_list(&self, applier: &FileChangeApplier) {
        self.print_section("💾", "[3/3] Suggested File Changes", "");
        for filename in applier.filenames() {
            let marker = match applier.get(filename) {
                Some(change) if change.is_noop() => "same".dimmed(),
                Some(change) if change.existed_before => "modify".yellow(),
                _ => "create".green(),
            };
            println!("   {} {} {}", "→".bright_white(), marker, filename);
        }
    }

    /// Prints a colored diff, or the full content of a file that will be created.
    pub fn print_preview(&self, filename: &str, preview: &Preview) {
        println!();
        match preview {
            Preview::Diff(diff) if diff.is_empty() => {
                self.print_info(&format!("{} is unchanged", filename));
            }
            Preview::Diff(diff) => {
                for line in diff.lines() {
                    if line.starts_with("@@") {
                        println!("{}", line.blue());
                    } else if line.starts_with('+') {
                        println!("{}", line.green());
                    } else if line.starts_with('-') {
                        println!("{}", line.red());
                    } else {
                        println!("{}", line);
                    }
                }
            }
            Preview::NewFile(content) => {
                println!(
                    "{}",
                    format!("# New file will be created: {}", filename).green()
                );
                println!("{}", content);
            }
        }
    }

    pub fn print_applied(&self, filename: &str) {
        println!("   {} {}", "✓".green(), format!("Applied changes to: {}", filename));
    }

    pub fn print_apply_error(&self, filename: &str, error: &str) {
        println!(
            "   {} {}",
            "✗".red(),
            format!("Error applying changes to {}: {}", filename, error).red()
        );
    }

    pub fn print_apply_summary(&self, succeeded: usize, total: usize) {
        if succeeded == total {
            self.print_info(&format!(
                "Successfully applied all changes ({} files)",
                succeeded
            ));
        } else {
            println!(
                "   {} {}",
                "→".bright_white(),
                format!(
                    "Applied changes to {} out of {} files. See above for errors.",
                    succeeded, total
                )
                .red()
            );
        }
    }

    pub fn print_hint(&self, message: &str) {
        self.print_info(message);
    }

    pub fn print_error(&self, message: &str) {
        println!("{} {}", "Error:".red().bold(), message);
    }

    /// Prints the application footer.
    pub fn print_footer(&self, duration: Duration) {
        println!();
        println!(
            "{}",
            format!("⚡ Completed in {:.2?}", duration)
                .bright_white()
                .dimmed(),
        );
        println!();
    }

    /// Starts a spinner while the assistant is thinking.
    pub fn start_spinner(&mut self) {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template(&format!(
            "   {} {{spinner}} {}",
            "→".bright_white(),
            "Thinking...".italic().bright_white()
        )) {
            spinner.set_style(
                style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
            );
        }
        spinner.enable_steady_tick(Duration::from_millis(80));
        self.spinner = Some(spinner);
    }

    /// Stops the spinner.
    pub fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    /// Helper function to print a section header.
    fn print_section(&self, icon: &str, title: &str, description: &str) {
        println!("{} {}", icon.bright_yellow(), title.bright_cyan().bold());
        if !description.is_empty() {
            println!(
                "   {} {}",
                "→".bright_white(),
                description.italic().bright_white()
            );
        }
    }

    /// Helper function to print an informational message.
    fn print_info(&self, message: &str) {
        println!(
            "   {} {}",
            "→".bright_white(),
            message.italic().bright_white()
        );
    }
}
