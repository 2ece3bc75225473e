//! Placeholder resolution for stage instructions and retrieval queries.
//!
//! Supported placeholders:
//! - `{{theme}}`: the episode theme
//! - `{{previous}}`: output of the stage immediately before this one
//! - `{{stage_name}}`: output of the named earlier stage

use seinfeld_core::Theme;
use seinfeld_error::{PipelineError, PipelineErrorKind};
use seinfeld_interface::StageResult;

/// Placeholder for the episode theme.
pub const THEME_PLACEHOLDER: &str = "theme";
/// Placeholder for the immediately preceding stage.
pub const PREVIOUS_PLACEHOLDER: &str = "previous";

fn placeholder_regex() -> Result<regex::Regex, PipelineError> {
    regex::Regex::new(r"\{\{\s*([A-Za-z0-9_\-]+)\s*\}\}").map_err(|e| {
        PipelineError::new(PipelineErrorKind::Template(format!(
            "Invalid template regex: {}",
            e
        )))
    })
}

/// Names referenced by `{{...}}` placeholders, in order of appearance.
pub fn template_references(template: &str) -> Result<Vec<String>, PipelineError> {
    let re = placeholder_regex()?;
    Ok(re
        .captures_iter(template)
        .filter_map(|cap| cap.get(1).map(|m| m.as_str().to_string()))
        .collect())
}

/// Resolve every placeholder in `template`.
///
/// `prior_results` are the results of all earlier stages in execution order.
///
/// # Errors
///
/// Returns a `Template` error for `{{previous}}` in the first stage or for a
/// name that matches no earlier stage.
pub fn resolve_template(
    template: &str,
    theme: &Theme,
    prior_results: &[StageResult],
) -> Result<String, PipelineError> {
    let re = placeholder_regex()?;
    let mut failure = None;

    let resolved = re.replace_all(template, |cap: &regex::Captures<'_>| {
        let reference = cap.get(1).map(|m| m.as_str()).unwrap_or_default();

        let replacement = match reference {
            THEME_PLACEHOLDER => Some(theme.as_str().to_string()),
            PREVIOUS_PLACEHOLDER => prior_results.last().map(|r| r.content().clone()),
            name => prior_results
                .iter()
                .find(|r| r.stage_name() == name)
                .map(|r| r.content().clone()),
        };

        replacement.unwrap_or_else(|| {
            if failure.is_none() {
                failure = Some(reference.to_string());
            }
            String::new()
        })
    });

    match failure {
        Some(reference) if reference == PREVIOUS_PLACEHOLDER => Err(PipelineError::new(
            PipelineErrorKind::Template("'{{previous}}' used before any stage has run".to_string()),
        )),
        Some(reference) => Err(PipelineError::new(PipelineErrorKind::Template(format!(
            "No earlier stage named '{}'",
            reference
        )))),
        None => Ok(resolved.into_owned()),
    }
}
