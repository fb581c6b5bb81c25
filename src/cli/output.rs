use anyhow::Result;
use pounce::preview::Excerpt;
use pounce::{FileHit, Hit, LineHit};
use serde_json::json;

use crate::workflow::SearchOutcome;

/// Print a plain-text listing of the search outcome, one hit per line.
pub(crate) fn print_plain(outcome: &SearchOutcome) {
    if outcome.hits.is_empty() {
        println!("No matches for '{}'", outcome.query);
        return;
    }

    for hit in &outcome.hits {
        match hit {
            Hit::Line(LineHit {
                path,
                line_number,
                content,
                ..
            }) => println!("{}:{line_number}:{content}", path.display()),
            Hit::File(FileHit { path, .. }) => println!("{}", path.display()),
        }
    }
}

/// Format the search outcome as a JSON string.
pub(crate) fn format_outcome_json(outcome: &SearchOutcome) -> Result<String> {
    let hits: Vec<_> = outcome
        .hits
        .iter()
        .map(|hit| match hit {
            Hit::Line(hit) => json!({
                "type": "line",
                "path": hit.path,
                "file_name": hit.file_name,
                "line": hit.line_number,
                "content": hit.content,
                "relative_path": hit.relative_path,
            }),
            Hit::File(hit) => json!({
                "type": "file",
                "path": hit.path,
                "file_name": hit.file_name,
                "relative_path": hit.relative_path,
            }),
        })
        .collect();

    let payload = json!({
        "query": outcome.query,
        "total": outcome.total,
        "hits": hits,
        "failures": outcome.failures,
    });

    Ok(serde_json::to_string_pretty(&payload)?)
}

/// Print the JSON representation of the search outcome.
pub(crate) fn print_json(outcome: &SearchOutcome) -> Result<()> {
    println!("{}", format_outcome_json(outcome)?);
    Ok(())
}

/// Print an excerpt with line numbers, marking the target line.
pub(crate) fn print_preview(excerpt: &Excerpt) {
    println!("--- {}", excerpt.path.display());
    for (index, line) in excerpt.lines.iter().enumerate() {
        let marker = if index == excerpt.target { '>' } else { ' ' };
        println!("{marker} {:>5} | {}", line.number, line.text);
    }
}
