mod cli;
mod settings;
mod workflow;

use std::process::ExitCode;

use anyhow::{Context, Result};
use log::warn;

use pounce::{logging, open, preview};

use cli::{OutputFormat, parse_cli, print_json, print_plain, print_preview};
use settings::ResolvedConfig;
use workflow::{SearchOutcome, SearchWorkflow};

fn main() -> ExitCode {
    logging::initialize();

    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = parse_cli();
    let config = settings::load(&cli)?;

    if cli.print_config {
        config.print_summary();
    }

    let outcome = SearchWorkflow::from_config(&config).run();

    for failure in &outcome.failures {
        warn!("{failure}");
    }

    if cli.open {
        return open_first_hit(&config, &outcome);
    }

    if cli.preview {
        show_preview(&config, &outcome)?;
        return Ok(exit_code(&outcome));
    }

    match cli.output {
        OutputFormat::Plain => print_plain(&outcome),
        OutputFormat::Json => print_json(&outcome)?,
    }

    Ok(exit_code(&outcome))
}

/// Hand the first hit to the user's editor. With `auto_close` set the
/// listing is suppressed and the process ends once the editor returns.
fn open_first_hit(config: &ResolvedConfig, outcome: &SearchOutcome) -> Result<ExitCode> {
    let Some(hit) = outcome.hits.first() else {
        println!("No matches for '{}'", outcome.query);
        return Ok(ExitCode::FAILURE);
    };

    let editor = open::editor_from_env()?;
    open::open_at_line(&editor, hit.path(), hit.line_number().unwrap_or(1))
        .with_context(|| format!("failed to open {}", hit.path().display()))?;

    if !config.auto_close {
        print_plain(outcome);
    }
    Ok(ExitCode::SUCCESS)
}

/// Print an excerpt around the first line hit.
fn show_preview(config: &ResolvedConfig, outcome: &SearchOutcome) -> Result<()> {
    let Some(hit) = outcome.hits.first() else {
        println!("No matches for '{}'", outcome.query);
        return Ok(());
    };

    let line = hit.line_number().unwrap_or(1);
    let excerpt = preview::render(hit.path(), line, &outcome.query, config.context_lines)?;
    print_preview(&excerpt);
    Ok(())
}

fn exit_code(outcome: &SearchOutcome) -> ExitCode {
    if outcome.hits.is_empty() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
