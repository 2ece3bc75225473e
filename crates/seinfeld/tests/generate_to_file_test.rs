//! End-to-end: generate with the bundled plan and persist the artifact.

use async_trait::async_trait;
use seinfeld::{
    CompletionDriver, DegradedReason, GenerateRequest, GenerateResponse, GenerationError,
    RetrievalTool, ScriptGenerator, SeinfeldErrorKind, StagePlan, StorageErrorKind,
    resolve_output_path, write_artifact,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Answers each call with the stage number it was made for.
struct CountingDriver {
    calls: AtomicUsize,
}

#[async_trait]
impl CompletionDriver for CountingDriver {
    async fn generate(&self, req: &GenerateRequest) -> Result<GenerateResponse, GenerationError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        assert_eq!(req.messages.len(), 2);
        Ok(GenerateResponse::from_text(format!("STAGE {} OUTPUT", n)))
    }

    fn provider_name(&self) -> &'static str {
        "counting"
    }

    fn model_name(&self) -> &str {
        "counting-model"
    }
}

#[tokio::test]
async fn test_generated_script_written_with_title() {
    let generator = ScriptGenerator::new(
        CountingDriver {
            calls: AtomicUsize::new(0),
        },
        Arc::new(RetrievalTool::degraded(DegradedReason::Forced)),
        StagePlan::default_plan().unwrap(),
    );
    let theme = "Elaine's new boyfriend only communicates through emojis";

    let script = generator.generate(theme).await.unwrap();
    assert_eq!(script, "STAGE 5 OUTPUT");

    let plan = StagePlan::default_plan().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(resolve_output_path(None, &plan));
    assert!(path.ends_with("output/seinfeld_script.md"));
    write_artifact(&path, theme, &script).unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(
        written,
        "# Seinfeld Episode: Elaine's new boyfriend only communicates through emojis\n\nSTAGE 5 OUTPUT"
    );
}

#[test]
fn test_write_artifact_reports_unwritable_path() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not_a_dir");
    std::fs::write(&blocker, "file").unwrap();

    let err = write_artifact(blocker.join("script.md"), "theme", "script").unwrap_err();
    assert!(matches!(
        err.kind(),
        SeinfeldErrorKind::Storage(e) if matches!(e.kind, StorageErrorKind::DirectoryCreation { .. })
    ));
    assert!(err.to_string().contains("Storage Error"));
}
