pub mod check;
pub mod fmt;
pub mod inspect;
pub mod run;

use std::path::Path;

use acorn_cfg::diagnostics::{render_diagnostics, Severity};
use acorn_cfg::{decode_tolerant, Document};
use acorn_core::Environment;
use acorn_runtime::Context;

fn read_source(file: &Path) -> Result<String, String> {
    std::fs::read_to_string(file).map_err(|e| format!("cannot read {}: {e}", file.display()))
}

/// Decode a scene file, printing diagnostics to stderr. Syntax errors
/// fail the load; warnings are reported and tolerated.
fn load_document(file: &Path) -> Result<Document, String> {
    let source = read_source(file)?;
    let (doc, diagnostics) = decode_tolerant(&source);

    if !diagnostics.is_empty() {
        let filename = file.display().to_string();
        let rendered = render_diagnostics(&source, &filename, &diagnostics);
        eprint!("{rendered}");

        let errors = diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count();
        if errors > 0 {
            return Err(format!(
                "{} syntax error{}",
                errors,
                if errors == 1 { "" } else { "s" }
            ));
        }
    }
    Ok(doc)
}

fn scene_name(file: &Path) -> String {
    file.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "scene".to_string())
}

/// Decode and build a scene file with the built-in classes.
fn build_environment(file: &Path) -> Result<Environment, String> {
    let doc = load_document(file)?;
    Context::new()
        .build(&scene_name(file), &doc)
        .map_err(|e| e.to_string())
}
