//! Loading stage plans from files.

use seinfeld_error::PipelineErrorKind;
use seinfeld_pipeline::StagePlan;
use std::io::Write;

#[test]
fn test_plan_loaded_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[plan]
name = "short"
description = "Two-stage sketch"

[[stages]]
name = "premise"
role_description = "You pitch sitcom premises."
instructions = "Pitch a premise about {{{{theme}}}}."

[[stages.retrieval]]
query = "{{{{theme}}}}"
result_count = 3
character = "ELAINE"

[[stages]]
name = "scene"
role_description = "You write sitcom scenes."
instructions = "Write the opening scene for: {{{{premise}}}}"
output_destination = "output/scene.md"
"#
    )
    .unwrap();

    let plan = StagePlan::from_file(file.path()).unwrap();

    assert_eq!(plan.metadata().name(), "short");
    assert_eq!(plan.len(), 2);
    let retrieval = &plan.stages()[0].retrieval()[0];
    assert_eq!(*retrieval.result_count(), Some(3));
    assert_eq!(retrieval.character().as_deref(), Some("ELAINE"));
    assert_eq!(plan.output_destination(), Some("output/scene.md"));
}

#[test]
fn test_missing_plan_file_reported() {
    let err = StagePlan::from_file("/nonexistent/plan.toml").unwrap_err();
    assert!(matches!(err.kind, PipelineErrorKind::FileRead(_)));
}

#[test]
fn test_plan_file_with_forward_reference_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[plan]
name = "broken"

[[stages]]
name = "premise"
role_description = "You pitch sitcom premises."
instructions = "Build on {{{{scene}}}}."

[[stages]]
name = "scene"
role_description = "You write sitcom scenes."
instructions = "Write it."
"#
    )
    .unwrap();

    let err = StagePlan::from_file(file.path()).unwrap_err();
    assert_eq!(err.kind.stage_name(), Some("premise"));
}
