//! Console output for the seinfeld binary.

use seinfeld_core::SeinfeldConfig;
use seinfeld_pipeline::StagePlan;

const RULE: &str = "======================================================================";

pub fn print_banner() {
    println!(
        r#"
╔═══════════════════════════════════════════════════════════════════╗
║                                                                   ║
║   SEINFELD SCRIPT GENERATOR                                       ║
║                                                                   ║
║   Multi-stage script writing grounded in real Seinfeld dialogue   ║
║                                                                   ║
╚═══════════════════════════════════════════════════════════════════╝
"#
    );
}

/// Print which settings are missing and what a `.env` file should contain.
pub fn warn_missing_configuration(config: &SeinfeldConfig) {
    let mut missing: Vec<&str> = config.generation().missing_fields();
    let retrieval_missing: Vec<&str> = config
        .embedding()
        .missing_fields()
        .into_iter()
        .chain(config.retrieval().missing_fields())
        .collect();
    let demo = *config.retrieval().demo() || !retrieval_missing.is_empty();
    missing.extend(retrieval_missing);

    if missing.is_empty() {
        if demo {
            println!("Running in demo mode: reference dialogue comes from sample scenes.");
        }
        return;
    }

    println!("Warning: missing configuration:");
    for field in &missing {
        println!("   - {}", field);
    }
    if demo {
        println!("\nThe script will run in demo mode without the dialogue index.");
    }
    println!("To enable full functionality, create a .env file with:");
    println!(
        r#"
LLM_API_KEY=cbsk-v1-xxx
LLM_MODEL_NAME="mistralai/mistral-7b-instruct-v0.3"
EMBEDDING_API_KEY=cbsk-v1-xxx
EMBEDDING_MODEL_NAME="nvidia/llama-3.2-nv-embedqa-1b-v2"
CAPELLA_AI_ENDPOINT=https://your-ai-endpoint.cloud.couchbase.com/v1
CB_CONNECTION_STRING=couchbase://localhost
CB_USERNAME=Administrator
CB_PASSWORD=password
CB_BUCKET=demos
CB_SCOPE=docs
CB_COLLECTION=default
"#
    );
}

pub fn print_stage_roster(plan: &StagePlan) {
    println!("STAGES:\n");
    for (i, stage) in plan.stages().iter().enumerate() {
        let title = if stage.role().is_empty() {
            stage.name().as_str()
        } else {
            stage.role().as_str()
        };
        println!("  {}. {}", i + 1, title);
        if !stage.goal().is_empty() {
            println!("     -> {}", stage.goal());
        }
    }
    println!("\n{}", RULE);
}

pub fn print_preview(script: &str) {
    println!("\n{}", RULE);
    println!("SCRIPT PREVIEW");
    println!("{}\n", RULE);
    println!("{}", seinfeld::preview(script));
}

pub fn rule() -> &'static str {
    RULE
}
