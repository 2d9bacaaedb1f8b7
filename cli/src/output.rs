//! Terminal output utilities for styled CLI output.

use cabinet_business::{FileCategory, ManagedFile};
use console::{Term, style};
use std::fmt::Display;

/// Terminal output helper for consistent styled output.
pub struct Output {
    term: Term,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    /// Create a new output helper writing to stdout.
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
        }
    }

    fn line(&self, text: &str) {
        drop(self.term.write_line(text));
    }

    pub fn success(&self, message: impl Display) {
        self.line(&format!("{} {}", style("✓").green().bold(), message));
    }

    pub fn error(&self, message: impl Display) {
        self.line(&format!("{} {}", style("✗").red().bold(), message));
    }

    pub fn warning(&self, message: impl Display) {
        self.line(&format!("{} {}", style("⚠").yellow().bold(), message));
    }

    pub fn info(&self, message: impl Display) {
        self.line(&format!("{} {}", style("ℹ").blue().bold(), message));
    }

    /// Print a plain message without any prefix.
    pub fn print(&self, message: impl Display) {
        self.line(&message.to_string());
    }

    pub fn newline(&self) {
        self.line("");
    }

    pub fn header(&self, message: impl Display) {
        self.line(&style(message).bold().cyan().to_string());
    }

    pub fn dim(&self, message: impl Display) {
        self.line(&style(message).dim().to_string());
    }

    pub fn labeled(&self, label: impl Display, value: impl Display) {
        self.line(&format!("  {}: {}", style(label).dim(), value));
    }

    /// Folder line for a category bucket.
    pub fn folder(&self, category: FileCategory, count: usize) {
        self.line(&format!(
            "\n{} {} {}",
            style("📁").bold(),
            style(category.label()).cyan().bold(),
            style(format!("({count})")).dim()
        ));
    }

    /// One file inside a folder.
    pub fn file_item(&self, file: &ManagedFile) {
        self.line(&format!(
            "  {} {} - {} {}",
            style("📄").bold(),
            style(&file.name).white().bold(),
            style(file.size_display()).cyan(),
            style(format!("[{}]", file.id)).dim()
        ));
    }

    pub fn total(&self, count: usize) {
        self.line(&format!(
            "\n{}: {}",
            style("Total").bold(),
            style(format!("{count} file(s)")).cyan()
        ));
    }
}
