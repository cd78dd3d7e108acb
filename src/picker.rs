//! Choosing the folder to organize.
//!
//! A [`FolderPicker`] either yields a path or reports that the user backed
//! out. Backing out is `Ok(None)`, not an error. Only a picker that cannot
//! run at all returns [`PickerError`].

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PickerError {
    /// Reading the answer or writing the prompt failed.
    #[error("folder prompt failed: {0}")]
    Io(#[from] io::Error),
    /// No picker can be shown in this environment.
    #[error("no folder picker available: {0}")]
    Unavailable(String),
}

/// Something that can ask for a folder.
pub trait FolderPicker {
    /// Returns the chosen folder, or `None` if the user cancelled.
    fn pick_folder(&mut self) -> Result<Option<PathBuf>, PickerError>;
}

/// Returns a folder decided in advance. Used for path arguments and tests.
#[derive(Debug, Clone)]
pub struct FixedPicker {
    path: Option<PathBuf>,
}

impl FixedPicker {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// A picker whose user always cancels.
    pub fn cancelled() -> Self {
        Self { path: None }
    }
}

impl FolderPicker for FixedPicker {
    fn pick_folder(&mut self) -> Result<Option<PathBuf>, PickerError> {
        Ok(self.path.clone())
    }
}

/// Asks for a folder on a line-based terminal.
///
/// An empty answer or end of input cancels.
pub struct PromptPicker<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptPicker<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl PromptPicker<io::StdinLock<'static>, io::Stderr> {
    /// Prompt on stderr so stdout stays clean for reports.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> FolderPicker for PromptPicker<R, W> {
    fn pick_folder(&mut self) -> Result<Option<PathBuf>, PickerError> {
        write!(self.output, "Folder to organize (leave empty to cancel): ")?;
        self.output.flush()?;

        let mut answer = String::new();
        if self.input.read_line(&mut answer)? == 0 {
            return Ok(None);
        }

        let answer = answer.trim();
        if answer.is_empty() {
            return Ok(None);
        }
        Ok(Some(expand_home(answer)))
    }
}

fn expand_home(answer: &str) -> PathBuf {
    if let Some(rest) = answer.strip_prefix("~/")
        && let Ok(home) = std::env::var("HOME")
    {
        return PathBuf::from(home).join(rest);
    }
    PathBuf::from(answer)
}

/// Native folder selection dialog.
#[cfg(feature = "gui")]
#[derive(Debug, Clone)]
pub struct DialogPicker {
    title: String,
}

#[cfg(feature = "gui")]
impl DialogPicker {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

#[cfg(feature = "gui")]
impl Default for DialogPicker {
    fn default() -> Self {
        Self::new("Select Folder to Organize")
    }
}

#[cfg(feature = "gui")]
impl FolderPicker for DialogPicker {
    fn pick_folder(&mut self) -> Result<Option<PathBuf>, PickerError> {
        Ok(rfd::FileDialog::new()
            .set_title(self.title.as_str())
            .pick_folder())
    }
}

/// Reads a yes/no answer. Anything but an explicit yes is a no.
pub fn prompt_confirm<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
) -> io::Result<bool> {
    let mut answer = String::new();
    loop {
        answer.clear();
        write!(output, "{prompt} (y/N): ")?;
        output.flush()?;

        if input.read_line(&mut answer)? == 0 {
            return Ok(false);
        }

        match answer.trim().to_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "" | "n" | "no" => return Ok(false),
            _ => continue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_fixed_picker() {
        let mut picker = FixedPicker::new("/tmp/inbox");
        assert_eq!(picker.pick_folder().unwrap(), Some(PathBuf::from("/tmp/inbox")));
        assert_eq!(FixedPicker::cancelled().pick_folder().unwrap(), None);
    }

    #[test]
    fn test_prompt_picker_reads_path() {
        let mut output = Vec::new();
        let mut picker = PromptPicker::new(Cursor::new("  /srv/inbox \n"), &mut output);
        assert_eq!(picker.pick_folder().unwrap(), Some(PathBuf::from("/srv/inbox")));
        drop(picker);
        assert!(String::from_utf8(output).unwrap().contains("Folder to organize"));
    }

    #[test]
    fn test_prompt_picker_empty_or_eof_cancels() {
        let mut picker = PromptPicker::new(Cursor::new("\n"), Vec::new());
        assert_eq!(picker.pick_folder().unwrap(), None);

        let mut picker = PromptPicker::new(Cursor::new(""), Vec::new());
        assert_eq!(picker.pick_folder().unwrap(), None);
    }

    #[test]
    fn test_prompt_confirm_answers() {
        let mut out = Vec::new();
        assert!(prompt_confirm(&mut Cursor::new("y\n"), &mut out, "Go?").unwrap());
        assert!(prompt_confirm(&mut Cursor::new("YES\n"), &mut out, "Go?").unwrap());
        assert!(!prompt_confirm(&mut Cursor::new("n\n"), &mut out, "Go?").unwrap());
        assert!(!prompt_confirm(&mut Cursor::new("\n"), &mut out, "Go?").unwrap());
        assert!(!prompt_confirm(&mut Cursor::new(""), &mut out, "Go?").unwrap());
    }

    #[test]
    fn test_prompt_confirm_repeats_on_garbage() {
        let mut out = Vec::new();
        assert!(prompt_confirm(&mut Cursor::new("maybe\ny\n"), &mut out, "Go?").unwrap());
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.matches("Go? (y/N): ").count(), 2);
    }
}
