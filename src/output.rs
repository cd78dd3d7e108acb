//! Output formatting and styling module.
//!
//! All human-facing terminal output goes through [`OutputFormatter`]:
//! coloured status lines, the progress bar shown while files are moved, and
//! the end-of-run summary.

use crate::report::{Action, Report, ReportEntry};
use bytesize::ByteSize;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

/// Manages all CLI output with consistent styling and formatting.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Creates a progress bar for `total` files.
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        pb.set_style(style);
        pb
    }

    /// One line describing what happened to a file, relative to `root`.
    pub fn format_entry(root: &Path, entry: &ReportEntry, dry_run: bool) -> String {
        let name = relative(root, &entry.source);
        let verb = if dry_run { "would move" } else { "moved" };
        match &entry.action {
            Action::MovedToCategory { destination, .. } => format!(
                "{} {} {} {}",
                "✓".green(),
                name,
                format!("{verb} to").dimmed(),
                relative(root, destination)
            ),
            Action::MovedToDuplicates { destination, .. } => format!(
                "{} {} {} {}",
                "≡".yellow(),
                name,
                format!("duplicate, {verb} to").dimmed(),
                relative(root, destination)
            ),
            Action::SkippedError { error } => {
                format!("{} {} {}", "✗".red(), name, error.red())
            }
        }
    }

    /// Prints the end-of-run summary: files per folder, duplicates, and
    /// every skipped file with its error.
    pub fn summary(report: &Report) {
        if report.dry_run {
            Self::header("DRY RUN SUMMARY");
        } else {
            Self::header("SUMMARY");
        }

        if report.is_empty() {
            Self::info("No files found to organize.");
            return;
        }

        let counts = report.folder_counts();
        let mut rows: Vec<(String, usize)> = counts
            .iter()
            .map(|(folder, count)| (format!("{folder}/"), *count))
            .collect();
        if report.duplicate_count() > 0 {
            rows.push(("(duplicates)".to_string(), report.duplicate_count()));
        }
        let skipped = report.errors().count();
        if skipped > 0 {
            rows.push(("(skipped)".to_string(), skipped));
        }

        let width = rows
            .iter()
            .map(|(name, _)| name.len())
            .max()
            .unwrap_or(0)
            .max("Folder".len());

        println!("{:<width$} | {}", "Folder".bold(), "Files".bold(), width = width);
        println!("{}", "-".repeat(width + 10));
        for (folder, count) in &rows {
            println!(
                "{:<width$} | {} {}",
                folder,
                count.to_string().green(),
                plural(*count),
                width = width
            );
        }
        println!("{}", "-".repeat(width + 10));
        let total = report.entries.len();
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total.to_string().green().bold(),
            plural(total),
            width = width
        );

        if !report.duplicate_groups.is_empty() {
            Self::header("Duplicates");
            for group in &report.duplicate_groups {
                println!(
                    "  {} ({}) kept {}",
                    group.fingerprint.short().dimmed(),
                    human_size(group.size),
                    relative(&report.root, &group.kept)
                );
                for duplicate in &group.duplicates {
                    println!("    - {}", relative(&report.root, duplicate));
                }
            }
        }

        if skipped > 0 {
            Self::header("Skipped");
            for (path, error) in report.errors() {
                Self::error(&format!("{}: {}", relative(&report.root, path), error));
            }
        }

        if !report.excluded.is_empty() {
            Self::info(&format!(
                "{} {} left in place by filters.",
                report.excluded.len(),
                plural(report.excluded.len())
            ));
        }

        if report.dry_run {
            println!();
            Self::dry_run_notice("No files were modified.");
        } else if skipped > 0 {
            println!();
            Self::warning("Some files could not be organized. Please review errors above.");
        } else {
            println!();
            Self::success("Organization complete!");
        }
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}

fn relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

/// Formats a byte count with a binary unit, e.g. `1.5 MiB`.
pub fn human_size(bytes: u64) -> String {
    ByteSize::b(bytes).to_string_as(true)
}
