//! The script file written at the end of a run.

use seinfeld_error::{SeinfeldError, SeinfeldResult, StorageError, StorageErrorKind};
use seinfeld_pipeline::StagePlan;
use std::path::{Path, PathBuf};
use tracing::instrument;

/// Number of characters shown in the console preview.
pub const PREVIEW_CHARS: usize = 2000;

/// Where the script goes when neither the command line nor the plan says.
pub const DEFAULT_OUTPUT_PATH: &str = "output/seinfeld_script.md";

/// Pick the artifact path: an explicit path wins, then the plan's final
/// `output_destination`, then [`DEFAULT_OUTPUT_PATH`].
pub fn resolve_output_path(explicit: Option<&Path>, plan: &StagePlan) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| plan.output_destination().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_PATH))
}

/// The persisted document: a title line followed by the script.
///
/// ```
/// let doc = seinfeld::render_artifact("The Parking Space", "INT. GARAGE - DAY");
/// assert_eq!(doc, "# Seinfeld Episode: The Parking Space\n\nINT. GARAGE - DAY");
/// ```
pub fn render_artifact(theme: &str, script: &str) -> String {
    format!("# Seinfeld Episode: {}\n\n{}", theme, script)
}

/// Write the artifact to `path`, creating parent directories.
///
/// # Errors
///
/// Returns an error if a directory or the file cannot be written.
#[instrument(skip(theme, script), fields(path = %path.as_ref().display()))]
pub fn write_artifact(path: impl AsRef<Path>, theme: &str, script: &str) -> SeinfeldResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            SeinfeldError::from(StorageError::new(StorageErrorKind::DirectoryCreation {
                path: parent.display().to_string(),
                reason: e.to_string(),
            }))
        })?;
    }

    std::fs::write(path, render_artifact(theme, script)).map_err(|e| {
        SeinfeldError::from(StorageError::new(StorageErrorKind::FileWrite {
            path: path.display().to_string(),
            reason: e.to_string(),
        }))
    })?;

    tracing::info!(bytes = script.len(), "Script saved");
    Ok(())
}

/// The first [`PREVIEW_CHARS`] characters of `script`, with a continuation
/// note when it was cut.
pub fn preview(script: &str) -> String {
    match script.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!(
            "{}\n\n... [Script continues - see full output file] ...",
            &script[..cut]
        ),
        None => script.to_string(),
    }
}
