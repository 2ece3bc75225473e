//! Script generation command handler.

use super::Cli;
use super::display::{print_banner, print_preview, print_stage_roster, rule, warn_missing_configuration};
use seinfeld::{
    ScriptGenerator, SeinfeldConfig, SeinfeldResult, StagePlan, resolve_output_path, write_artifact,
};
use std::io::{BufRead, Write};
use tokio_util::sync::CancellationToken;

/// Run the generator for the theme given on the command line or stdin.
///
/// Returns the script that was written, or `None` when no theme was given.
pub async fn run_generator(cli: &Cli, mut config: SeinfeldConfig) -> SeinfeldResult<Option<String>> {
    print_banner();

    if cli.demo {
        let retrieval = config.retrieval().clone().with_demo(true);
        config = config.with_retrieval(retrieval);
    }
    warn_missing_configuration(&config);

    let theme = match resolve_theme(cli) {
        Some(theme) => theme,
        None => {
            eprintln!("\nNo theme provided. Exiting.");
            return Ok(None);
        }
    };

    let plan = match &cli.plan {
        Some(path) => StagePlan::from_file(path)?,
        None => StagePlan::default_plan()?,
    };

    let output = resolve_output_path(cli.output.as_deref(), &plan);

    println!("\nGenerating Seinfeld episode about: \"{}\"\n", theme);
    print_stage_roster(&plan);

    let generator = ScriptGenerator::from_config_with_plan(&config, plan).await?;
    if let Some(reason) = generator.retrieval().degraded_reason() {
        tracing::warn!(reason = %reason, "Reference dialogue will come from demo passages");
    }

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received; stopping after the current stage");
            on_interrupt.cancel();
        }
    });

    println!("Starting the writing stages...\n");
    println!("{}", rule());

    let run = generator.generate_run(&theme, &cancel).await?;
    let script = run.into_output()?;

    println!("{}", rule());
    println!("\nScript generation complete!\n");

    write_artifact(&output, &theme, &script)?;
    println!("Script saved to: {}", output.display());

    print_preview(&script);
    Ok(Some(script))
}

fn resolve_theme(cli: &Cli) -> Option<String> {
    if !cli.needs_prompt() {
        return cli.theme.as_ref().map(|t| t.trim().to_string());
    }

    println!("\nWhat's the theme for your Seinfeld episode?");
    println!("   (e.g., 'Jerry gets a smart speaker that mishears everything')\n");
    print!("Theme: ");
    std::io::stdout().flush().ok()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line).ok()?;
    let theme = line.trim().to_string();
    (!theme.is_empty()).then_some(theme)
}
