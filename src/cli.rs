//! Command-line interface module for tidyfold.
//!
//! This module handles:
//! - Argument parsing
//! - Choosing the folder (argument, prompt, or native dialog)
//! - Confirmation before files are moved
//! - Running the organizer and printing its report

use crate::config::{ConfigError, OrganizerConfig};
use crate::file_category::Grouping;
use crate::file_organizer::{OrganizeError, Organizer, Progress, validate_root};
use crate::output::OutputFormatter;
use crate::picker::{FixedPicker, FolderPicker, PickerError, PromptPicker, prompt_confirm};
use crate::report::Report;
use clap::{ArgAction, Parser};
use indicatif::ProgressBar;
use std::io;
use std::path::{Path, PathBuf};

/// Sort a folder's files into category subfolders and set duplicates aside.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "tidyfold", version, about)]
pub struct Args {
    /// Folder to organize. Without it a folder picker is shown.
    pub path: Option<PathBuf>,

    /// Show what would happen without moving anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Do not ask for confirmation.
    #[arg(short, long)]
    pub yes: bool,

    /// Configuration file (TOML).
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the report as JSON instead of a summary.
    #[arg(long)]
    pub json: bool,

    /// Do not look for duplicate files.
    #[arg(long)]
    pub no_dedupe: bool,

    /// Name folders after file extensions instead of categories.
    #[arg(long)]
    pub by_extension: bool,

    /// Look at file content when the extension is unknown or missing.
    #[arg(long)]
    pub sniff: bool,

    /// Always pick the folder with a native dialog.
    #[arg(long, conflicts_with = "no_gui")]
    pub gui: bool,

    /// Ask for the folder on the terminal even when a display is available.
    #[arg(long)]
    pub no_gui: bool,

    /// More diagnostic logging (-v, -vv, -vvv).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only print the summary.
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Picker(#[from] PickerError),
    #[error(transparent)]
    Organize(#[from] OrganizeError),
    #[error("confirmation prompt failed: {0}")]
    Prompt(#[source] io::Error),
    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

/// How a run ended.
#[derive(Debug)]
pub enum Outcome {
    /// Files were processed (individual files may still have failed).
    Completed(Report),
    /// The user backed out before anything was touched.
    Cancelled,
}

/// Runs the CLI with interactive defaults: the path argument, or a picker,
/// and a stdin confirmation prompt.
pub fn run_cli(args: &Args) -> Result<Outcome, CliError> {
    let mut picker = default_picker(args)?;
    let mut confirm = |root: &Path| {
        prompt_confirm(
            &mut io::stdin().lock(),
            &mut io::stderr(),
            &format!(
                "Move the files in {} into subfolders? Back up anything important first.",
                root.display()
            ),
        )
    };
    run_with(args, picker.as_mut(), &mut confirm)
}

/// Which picker a run without a path argument uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PickerKind {
    Fixed,
    Dialog,
    Prompt,
}

/// A path argument always wins. Otherwise the dialog is used when it was
/// asked for, or when it is built in and a display is available.
fn picker_kind(args: &Args, display: bool) -> PickerKind {
    if args.path.is_some() {
        PickerKind::Fixed
    } else if args.gui || (!args.no_gui && cfg!(feature = "gui") && display) {
        PickerKind::Dialog
    } else {
        PickerKind::Prompt
    }
}

/// Whether a native dialog can be shown in this session.
fn display_available() -> bool {
    if cfg!(any(windows, target_os = "macos")) {
        return true;
    }
    ["DISPLAY", "WAYLAND_DISPLAY"]
        .iter()
        .any(|var| std::env::var_os(var).is_some_and(|v| !v.is_empty()))
}

fn default_picker(args: &Args) -> Result<Box<dyn FolderPicker>, CliError> {
    match (picker_kind(args, display_available()), &args.path) {
        (PickerKind::Fixed, Some(path)) => Ok(Box::new(FixedPicker::new(path.clone()))),
        (PickerKind::Dialog, _) => dialog_picker(),
        _ => Ok(Box::new(PromptPicker::stdio())),
    }
}

#[cfg(feature = "gui")]
fn dialog_picker() -> Result<Box<dyn FolderPicker>, CliError> {
    Ok(Box::new(crate::picker::DialogPicker::default()))
}

#[cfg(not(feature = "gui"))]
fn dialog_picker() -> Result<Box<dyn FolderPicker>, CliError> {
    Err(PickerError::Unavailable("built without the `gui` feature".to_string()).into())
}

/// Runs the CLI with an explicit picker and confirmation callback.
///
/// `args.path` is ignored here; the picker decides the folder.
pub fn run_with(
    args: &Args,
    picker: &mut dyn FolderPicker,
    confirm: &mut dyn FnMut(&Path) -> io::Result<bool>,
) -> Result<Outcome, CliError> {
    let mut config = OrganizerConfig::load(args.config.as_deref())?;
    if args.no_dedupe {
        config.layout.dedupe = false;
    }
    if args.by_extension {
        config.layout.grouping = Grouping::Extension;
    }
    if args.sniff {
        config.layout.sniff_content = true;
    }
    let organizer = Organizer::new(config.compile()?).dry_run(args.dry_run);

    let Some(root) = picker.pick_folder()? else {
        if !args.json {
            OutputFormatter::info("No folder selected. Nothing was changed.");
        }
        return Ok(Outcome::Cancelled);
    };

    validate_root(&root)?;

    if !args.dry_run && !args.yes && !confirm(&root).map_err(CliError::Prompt)? {
        if !args.json {
            OutputFormatter::info("Organization cancelled. Nothing was changed.");
        }
        return Ok(Outcome::Cancelled);
    }

    let report = if args.json {
        organizer.organize(&root)?
    } else {
        organize_with_output(&organizer, &root, args)?
    };

    if args.json {
        println!("{}", report.to_json()?);
    } else {
        OutputFormatter::summary(&report);
    }

    Ok(Outcome::Completed(report))
}

fn organize_with_output(
    organizer: &Organizer,
    root: &Path,
    args: &Args,
) -> Result<Report, OrganizeError> {
    if args.dry_run {
        OutputFormatter::dry_run_notice(&format!("Analyzing contents of: {}", root.display()));
    } else {
        OutputFormatter::info(&format!("Organizing contents of: {}", root.display()));
    }

    let mut bar = ProgressBar::hidden();
    let report = organizer.organize_with_progress(root, |progress| match progress {
        Progress::Scanned { total } => {
            if !args.quiet && total > 0 {
                bar = OutputFormatter::create_progress_bar(total as u64);
            }
        }
        Progress::Processed(entry) => {
            if !args.quiet {
                // ProgressBar::println is a no-op when the bar is hidden.
                let line = OutputFormatter::format_entry(root, entry, args.dry_run);
                bar.suspend(|| println!("{line}"));
            }
            bar.inc(1);
        }
    })?;
    bar.finish_and_clear();

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse_flags() {
        let args = Args::parse_from([
            "tidyfold",
            "/tmp/inbox",
            "--dry-run",
            "-y",
            "--by-extension",
            "-vv",
        ]);
        assert_eq!(args.path, Some(PathBuf::from("/tmp/inbox")));
        assert!(args.dry_run);
        assert!(args.yes);
        assert!(args.by_extension);
        assert!(!args.no_dedupe);
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_args_path_is_optional() {
        let args = Args::parse_from(["tidyfold"]);
        assert_eq!(args.path, None);
        assert!(!args.gui);
    }

    #[cfg(not(feature = "gui"))]
    #[test]
    fn test_gui_without_feature_is_unavailable() {
        let args = Args {
            gui: true,
            ..Default::default()
        };
        assert!(matches!(
            default_picker(&args),
            Err(CliError::Picker(PickerError::Unavailable(_)))
        ));
    }

    #[test]
    fn test_picker_kind_selection() {
        let with_path = Args {
            path: Some(PathBuf::from("/tmp/inbox")),
            ..Default::default()
        };
        assert_eq!(picker_kind(&with_path, true), PickerKind::Fixed);

        let bare = Args::default();
        assert_eq!(picker_kind(&bare, false), PickerKind::Prompt);
        let expected = if cfg!(feature = "gui") {
            PickerKind::Dialog
        } else {
            PickerKind::Prompt
        };
        assert_eq!(picker_kind(&bare, true), expected);

        let forced_prompt = Args {
            no_gui: true,
            ..Default::default()
        };
        assert_eq!(picker_kind(&forced_prompt, true), PickerKind::Prompt);

        let forced_dialog = Args {
            gui: true,
            ..Default::default()
        };
        assert_eq!(picker_kind(&forced_dialog, false), PickerKind::Dialog);
    }

    #[test]
    fn test_gui_and_no_gui_conflict() {
        assert!(Args::try_parse_from(["tidyfold", "--gui", "--no-gui"]).is_err());
    }

    #[test]
    fn test_path_argument_wins_over_gui() {
        let args = Args {
            path: Some(PathBuf::from("/tmp/inbox")),
            gui: true,
            ..Default::default()
        };
        let mut picker = default_picker(&args).unwrap();
        assert_eq!(
            picker.pick_folder().unwrap(),
            Some(PathBuf::from("/tmp/inbox"))
        );
    }
}
